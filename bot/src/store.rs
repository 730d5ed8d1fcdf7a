//! Whole-document JSON persistence. Every handler loads the document,
//! mutates it, and saves it back; because updates are handled one at a
//! time this needs no locking. Read and write failures degrade: a load
//! that fails yields an empty document, a save that fails drops the write.
//! Both leave a log line.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clutch_types::{PlayerRecord, PromoEntry};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Players of a single chat, keyed by user id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLedger {
    #[serde(default)]
    pub players: BTreeMap<String, PlayerRecord>,
}

/// The persisted document: chat ids at the top level plus the reserved
/// `promo_uses` key carrying global promo counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_uses: Option<BTreeMap<String, PromoEntry>>,
    #[serde(flatten)]
    pub chats: BTreeMap<String, ChatLedger>,
}

impl Document {
    pub fn chat(&self, chat_id: &str) -> Option<&ChatLedger> {
        self.chats.get(chat_id)
    }

    pub fn player(&self, chat_id: &str, user_id: &str) -> Option<&PlayerRecord> {
        self.chats.get(chat_id)?.players.get(user_id)
    }

    /// Fetches a player record, creating the chat and the record on first
    /// contact.
    pub fn player_mut(&mut self, chat_id: &str, user_id: &str) -> &mut PlayerRecord {
        self.chats
            .entry(chat_id.to_string())
            .or_default()
            .players
            .entry(user_id.to_string())
            .or_default()
    }
}

/// Flat-file store for the ledger document.
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document. A missing file is a fresh install; any other
    /// failure is logged and treated the same way.
    pub fn load(&self) -> Document {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Document::default(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ledger read failed, starting empty");
                return Document::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ledger parse failed, starting empty");
                Document::default()
            }
        }
    }

    /// Writes the document back. A failed write keeps the process alive;
    /// the state lives on in memory until the next successful save.
    pub fn save(&self, document: &Document) {
        let payload = match serde_json::to_string_pretty(document) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, "ledger encode failed, dropping write");
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, payload) {
            warn!(path = %self.path.display(), %err, "ledger write failed, dropping write");
        }
    }
}

/// Reads the optional promo-definition overlay file. A missing file means
/// no extra codes; a malformed one is logged and skipped.
pub fn load_promo_definitions(path: &Path) -> BTreeMap<String, PromoEntry> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            warn!(path = %path.display(), %err, "promo overlay read failed");
            return BTreeMap::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(codes) => codes,
        Err(err) => {
            warn!(path = %path.display(), %err, "promo overlay parse failed");
            BTreeMap::new()
        }
    }
}
