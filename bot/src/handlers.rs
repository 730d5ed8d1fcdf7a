//! Update dispatch. One [`App`] instance owns every long-lived handle and
//! processes updates sequentially, so each handler sees the ledger state
//! the previous one left behind.
//!
//! Telegram failures never abort a handler mid-flow: sends, deletes and
//! lookups degrade to a log line and the game state already persisted
//! stays authoritative.

use std::time::Duration as StdDuration;

use chrono::Local;
use clutch_engine::{
    cases, cooldown, matchplay, MatchOutcome, PromoLedger, Readiness, Team,
};
use clutch_types::{Catalog, PlayerRecord, RankMetric, RankTable};
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::store::Store;
use crate::sweeper::Sweeper;
use crate::telegram::types::{
    CallbackQuery, Chat, ChatKind, Message, ReplyMarkup, SendMessage, SendPhoto, Update, User,
    PARSE_MODE_HTML,
};
use crate::telegram::Telegram;
use crate::texts;
use crate::ui;

pub struct App {
    pub telegram: Telegram,
    pub sweeper: Sweeper,
    pub store: Store,
    pub config: BotConfig,
    pub catalog: Catalog,
    pub ranks: RankTable,
    pub ledger: PromoLedger,
    /// Own identity from `getMe`: the id spots our join events, the
    /// username filters commands addressed to other bots.
    pub me: User,
    pub rng: StdRng,
}

fn is_group(chat: &Chat) -> bool {
    matches!(chat.kind, ChatKind::Group | ChatKind::Supergroup)
}

/// Splits `/command@bot args` into the command name and its argument tail.
/// Commands addressed to a different bot resolve to `None`.
fn parse_command<'a>(text: &'a str, me: Option<&str>) -> Option<(&'a str, &'a str)> {
    let rest = text.strip_prefix('/')?;
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let (token, args) = rest.split_at(end);
    let (command, mention) = match token.split_once('@') {
        Some((command, mention)) => (command, Some(mention)),
        None => (token, None),
    };
    if command.is_empty() {
        return None;
    }
    if let Some(mention) = mention {
        if !me.is_some_and(|me| me.eq_ignore_ascii_case(mention)) {
            return None;
        }
    }
    Some((command, args.trim_start()))
}

/// Leaderboard ordering: primary by the configured metric, the other
/// counter breaks ties.
fn sort_key(metric: RankMetric, record: &PlayerRecord) -> (u64, u64) {
    match metric {
        RankMetric::Wins => (record.wins, record.points),
        RankMetric::Points => (record.points, record.wins),
    }
}

impl App {
    /// Polls updates forever. Transport errors back off and retry; a
    /// restart gap is flushed first so stale commands are not replayed.
    pub async fn run(&mut self) {
        let mut offset = None;
        self.drain_backlog(&mut offset).await;
        info!("entering update loop");
        loop {
            let updates = match self
                .telegram
                .get_updates(offset, self.config.poll_timeout_secs)
                .await
            {
                Ok(updates) => updates,
                Err(err) => {
                    warn!(%err, "poll failed, retrying");
                    tokio::time::sleep(StdDuration::from_secs(self.config.retry_delay_secs)).await;
                    continue;
                }
            };
            for update in updates {
                offset = Some(update.update_id + 1);
                self.handle_update(update).await;
            }
        }
    }

    async fn drain_backlog(&self, offset: &mut Option<i64>) {
        loop {
            match self.telegram.get_updates(*offset, 0).await {
                Ok(updates) if updates.is_empty() => break,
                Ok(updates) => {
                    for update in &updates {
                        *offset = Some(update.update_id + 1);
                    }
                    debug!(count = updates.len(), "discarded backlog updates");
                }
                Err(err) => {
                    warn!(%err, "backlog drain failed");
                    break;
                }
            }
        }
    }

    pub async fn handle_update(&mut self, update: Update) {
        if let Some(message) = update.message {
            self.handle_message(message).await;
        } else if let Some(callback) = update.callback_query {
            self.handle_callback(callback).await;
        }
    }

    async fn handle_message(&mut self, message: Message) {
        if !message.new_chat_members.is_empty() {
            if message
                .new_chat_members
                .iter()
                .any(|member| member.id == self.me.id)
            {
                self.welcome(&message).await;
            }
            return;
        }
        let Some(text) = message.text.as_deref() else {
            return;
        };
        if let Some((command, args)) = parse_command(text, self.me.username.as_deref()) {
            match command {
                "start" => self.start(&message).await,
                "help" => self.help(&message).await,
                "promo" => self.promo(&message, args).await,
                "t" => self.play(&message, Team::Terrorists).await,
                "ct" => self.play(&message, Team::CounterTerrorists).await,
                "stats" => self.stats(&message).await,
                "top" => self.top(&message).await,
                "open" => self.case_menu(&message).await,
                _ => {}
            }
            return;
        }
        match text {
            texts::BTN_PLAY => self.team_menu(&message).await,
            texts::BTN_TEAM_T => self.team_button(&message, Team::Terrorists).await,
            texts::BTN_TEAM_CT => self.team_button(&message, Team::CounterTerrorists).await,
            texts::BTN_BACK => self.back(&message).await,
            texts::BTN_STATS => self.stats(&message).await,
            texts::BTN_TOP => self.top(&message).await,
            texts::BTN_CASES => self.case_menu(&message).await,
            texts::BTN_HELP => self.help(&message).await,
            _ => {}
        }
    }

    async fn handle_callback(&mut self, callback: CallbackQuery) {
        let Some(data) = callback.data.as_deref() else {
            return;
        };
        if let Some(case_id) = data.strip_prefix("case_") {
            self.case_preview(&callback, case_id).await;
        } else if let Some(case_id) = data.strip_prefix("open_") {
            self.case_open(&callback, case_id).await;
        } else if data == "back_to_main" {
            self.back_to_main(&callback).await;
        } else {
            debug!(data, "unhandled callback");
        }
    }

    /// Greets a chat the bot was just added to with the command guide.
    async fn welcome(&self, message: &Message) {
        info!(chat = message.chat.id, "joined a new chat");
        let markup = ui::main_menu();
        if let Err(err) = self
            .telegram
            .send_message(&SendMessage {
                chat_id: message.chat.id,
                text: &texts::welcome_text(&self.config.game),
                parse_mode: Some(PARSE_MODE_HTML),
                reply_to_message_id: Some(message.message_id),
                reply_markup: Some(&markup),
            })
            .await
        {
            error!(chat = message.chat.id, %err, "welcome failed");
        }
    }

    async fn start(&self, message: &Message) {
        if message.chat.kind == ChatKind::Private {
            self.send_text(message.chat.id, texts::PRIVATE_REDIRECT, None, None)
                .await;
            return;
        }
        let markup = ui::main_menu();
        self.send_text(
            message.chat.id,
            texts::START_BANNER,
            Some(PARSE_MODE_HTML),
            Some(&markup),
        )
        .await;
    }

    /// Posts the command guide, then sweeps it so the chat is not left
    /// with a wall of text.
    async fn help(&self, message: &Message) {
        if !is_group(&message.chat) {
            return;
        }
        self.discard_trigger(message).await;
        let markup = ui::main_menu();
        self.send_ephemeral(
            message.chat.id,
            &texts::help_text(&self.config.game),
            Some(PARSE_MODE_HTML),
            Some(&markup),
            self.config.help_notice_secs,
        )
        .await;
    }

    async fn promo(&mut self, message: &Message, args: &str) {
        if message.chat.kind == ChatKind::Private {
            self.send_text(message.chat.id, texts::PROMO_PRIVATE, None, None)
                .await;
            return;
        }
        let Some(from) = message.from.as_ref() else {
            return;
        };
        let Some(code) = args.split_whitespace().next() else {
            self.reply(message, texts::PROMO_USAGE).await;
            return;
        };
        let code = code.to_uppercase();
        let user_key = from.id.to_string();
        match self
            .ledger
            .redeem(&code, &user_key, Local::now().date_naive())
        {
            Ok(redemption) => {
                let mut document = self.store.load();
                let record = document.player_mut(&message.chat.id.to_string(), &user_key);
                record.points = record.points.saturating_add(redemption.points);
                document.promo_uses = Some(self.ledger.entries().clone());
                self.store.save(&document);
                info!(
                    chat = message.chat.id,
                    user = from.id,
                    %code,
                    points = redemption.points,
                    "promo redeemed"
                );
                self.reply(
                    message,
                    &texts::promo_success(redemption.points, redemption.remaining),
                )
                .await;
            }
            Err(err) => self.reply(message, texts::promo_reply(&err)).await,
        }
    }

    /// The play button swaps the main keyboard for the team choice.
    async fn team_menu(&self, message: &Message) {
        if !is_group(&message.chat) {
            return;
        }
        self.discard_trigger(message).await;
        let markup = ui::choice_menu();
        self.send_text(message.chat.id, texts::CHOOSE_TEAM, None, Some(&markup))
            .await;
    }

    /// Keyboard team pick: same as `/t` and `/ct` except the pressed
    /// button message is cleaned up first.
    async fn team_button(&mut self, message: &Message, team: Team) {
        if !is_group(&message.chat) {
            return;
        }
        self.discard_trigger(message).await;
        self.play(message, team).await;
    }

    async fn back(&self, message: &Message) {
        if !is_group(&message.chat) {
            return;
        }
        self.discard_trigger(message).await;
        let markup = ui::main_menu();
        self.send_text(message.chat.id, texts::MAIN_MENU, None, Some(&markup))
            .await;
    }

    /// Resolves one match: gate on the cooldown, roll the outcome, persist,
    /// report. The cooldown notice is ephemeral and consumes nothing, so a
    /// blocked attempt leaves no trace in the ledger.
    async fn play(&mut self, message: &Message, team: Team) {
        if !is_group(&message.chat) {
            return;
        }
        let Some(from) = message.from.as_ref() else {
            return;
        };
        let chat_key = message.chat.id.to_string();
        let user_key = from.id.to_string();

        let mut document = self.store.load();
        let record = document.player_mut(&chat_key, &user_key);
        record.username = Some(
            from.username
                .clone()
                .unwrap_or_else(|| from.first_name.clone()),
        );

        let now = Local::now().naive_local();
        let last_play = match record.last_play_at() {
            Ok(last_play) => last_play,
            Err(err) => {
                // A corrupt stamp must not lock the player out.
                error!(chat = %chat_key, user = %user_key, %err, "cooldown check failed");
                None
            }
        };
        if let Readiness::Waiting(remaining) =
            cooldown::check(last_play, now, self.config.game.cooldown())
        {
            let markup = ui::main_menu();
            self.send_ephemeral(
                message.chat.id,
                &texts::cooldown_notice(remaining),
                None,
                Some(&markup),
                self.config.cooldown_notice_secs,
            )
            .await;
            return;
        }

        let outcome = matchplay::resolve(record, &self.config.game, now, &mut self.rng);
        let snapshot = record.clone();
        self.store.save(&document);

        let metric = self.config.game.rank_metric;
        let standing = self.ranks.resolve(metric.progress(&snapshot));
        let outcome_line = match outcome {
            MatchOutcome::Win { gained } => {
                texts::win_report(texts::win_phrase(team, &mut self.rng), gained, standing.rank)
            }
            MatchOutcome::Loss { lost } => {
                texts::loss_report(texts::lose_phrase(&mut self.rng), lost)
            }
            MatchOutcome::Draw => texts::draw_report(texts::draw_phrase(&mut self.rng)),
        };
        info!(
            chat = %chat_key,
            user = %user_key,
            ?team,
            ?outcome,
            points = snapshot.points,
            "match resolved"
        );
        let markup = ui::main_menu();
        self.send_text(
            message.chat.id,
            &texts::match_report(
                &outcome_line,
                &standing,
                snapshot.points,
                snapshot.wins,
                texts::metric_unit(metric),
            ),
            None,
            Some(&markup),
        )
        .await;
    }

    async fn stats(&self, message: &Message) {
        if !is_group(&message.chat) {
            return;
        }
        self.discard_trigger(message).await;
        let Some(from) = message.from.as_ref() else {
            return;
        };
        let document = self.store.load();
        let markup = ui::main_menu();
        let Some(record) =
            document.player(&message.chat.id.to_string(), &from.id.to_string())
        else {
            self.send_text(message.chat.id, texts::NO_GAMES_SELF, None, Some(&markup))
                .await;
            return;
        };

        let cooldown_line = match record.last_play_at() {
            Err(_) => texts::COOLDOWN_UNKNOWN.to_string(),
            Ok(last_play) => match cooldown::check(
                last_play,
                Local::now().naive_local(),
                self.config.game.cooldown(),
            ) {
                Readiness::Waiting(remaining) => texts::stats_cooldown(remaining),
                Readiness::Ready => texts::CAN_PLAY_NOW.to_string(),
            },
        };
        let metric = self.config.game.rank_metric;
        let standing = self.ranks.resolve(metric.progress(record));
        self.send_text(
            message.chat.id,
            &texts::stats_text(
                &standing,
                record.points,
                record.wins,
                texts::metric_unit(metric),
                &cooldown_line,
            ),
            Some(PARSE_MODE_HTML),
            Some(&markup),
        )
        .await;
    }

    async fn top(&mut self, message: &Message) {
        if !is_group(&message.chat) {
            return;
        }
        self.discard_trigger(message).await;
        let document = self.store.load();
        let markup = ui::main_menu();
        let players = document
            .chat(&message.chat.id.to_string())
            .map(|chat| &chat.players)
            .filter(|players| !players.is_empty());
        let Some(players) = players else {
            self.send_text(message.chat.id, texts::NO_GAMES_CHAT, None, Some(&markup))
                .await;
            return;
        };

        let metric = self.config.game.rank_metric;
        let mut rows: Vec<(&String, &PlayerRecord)> = players.iter().collect();
        rows.sort_by(|a, b| sort_key(metric, b.1).cmp(&sort_key(metric, a.1)));
        rows.truncate(self.config.game.top_size);

        let mut text = texts::top_header(texts::top_team_tag(&mut self.rng));
        for (position, (user_id, record)) in rows.iter().enumerate() {
            let name = self.display_name(message.chat.id, user_id, record).await;
            let standing = self.ranks.resolve(metric.progress(record));
            text.push_str(&texts::top_row(
                position + 1,
                &name,
                record.points,
                record.wins,
                standing.rank,
            ));
        }
        self.send_text(message.chat.id, &text, Some(PARSE_MODE_HTML), Some(&markup))
            .await;
    }

    /// Leaderboard display name: live lookup first, then the name cached
    /// at match time, then an id-based placeholder.
    async fn display_name(&self, chat_id: i64, user_id: &str, record: &PlayerRecord) -> String {
        if let Ok(parsed) = user_id.parse::<i64>() {
            match self.telegram.get_chat_member(chat_id, parsed).await {
                Ok(member) => return member.user.username.unwrap_or(member.user.first_name),
                Err(err) => {
                    error!(chat = chat_id, user = %user_id, %err, "member lookup failed");
                }
            }
        }
        record
            .username
            .clone()
            .unwrap_or_else(|| texts::fallback_player_name(user_id))
    }

    async fn case_menu(&self, message: &Message) {
        if !is_group(&message.chat) {
            return;
        }
        self.discard_trigger(message).await;
        let markup = ui::cases_menu(&self.catalog);
        self.send_text(
            message.chat.id,
            texts::CASES_HEADER,
            Some(PARSE_MODE_HTML),
            Some(&markup),
        )
        .await;
    }

    /// First phase of an opening: swap the case list for a preview card
    /// with the confirm button. Nothing is charged yet.
    async fn case_preview(&self, callback: &CallbackQuery, case_id: &str) {
        let Some(menu_message) = callback.message.as_ref() else {
            debug!(callback = %callback.id, "callback without message");
            return;
        };
        let chat_key = menu_message.chat.id.to_string();
        let user_key = callback.from.id.to_string();

        let document = self.store.load();
        let case = match cases::validate(&self.catalog, case_id, document.player(&chat_key, &user_key))
        {
            Ok(case) => case,
            Err(err) => {
                self.acknowledge(callback, Some(&texts::case_toast(&err)))
                    .await;
                return;
            }
        };

        self.discard_trigger(menu_message).await;
        let markup = ui::open_button(&case.id);
        self.send_photo_or_text(
            menu_message.chat.id,
            &case.image,
            &texts::case_preview_caption(&case.name, case.price),
            None,
            Some(&markup),
        )
        .await;
        self.acknowledge(callback, None).await;
    }

    /// Second phase: re-validate, take the stake, then roll the drop. The
    /// stake is persisted before the roll, so a crash in between costs the
    /// player the case price but never duplicates a reward.
    async fn case_open(&mut self, callback: &CallbackQuery, case_id: &str) {
        let Some(preview_message) = callback.message.as_ref() else {
            debug!(callback = %callback.id, "callback without message");
            return;
        };
        let chat_id = preview_message.chat.id;
        let chat_key = chat_id.to_string();
        let user_key = callback.from.id.to_string();

        let mut document = self.store.load();
        // The balance may have moved since the preview was shown.
        let case = match cases::validate(&self.catalog, case_id, document.player(&chat_key, &user_key))
        {
            Ok(case) => case,
            Err(err) => {
                self.acknowledge(callback, Some(&texts::case_toast(&err)))
                    .await;
                return;
            }
        };

        self.discard_trigger(preview_message).await;

        if let Err(err) = cases::charge(document.player_mut(&chat_key, &user_key), case) {
            self.acknowledge(callback, Some(&texts::case_toast(&err)))
                .await;
            return;
        }
        self.store.save(&document);

        let opening = match cases::draw(&self.catalog, case, &mut self.rng) {
            Ok(opening) => opening,
            Err(err) => {
                // The stake stays spent; the catalog needs fixing.
                error!(case = %case.id, "case resolved to an empty pool");
                self.acknowledge(callback, Some(&texts::case_toast(&err)))
                    .await;
                return;
            }
        };
        let record = document.player_mut(&chat_key, &user_key);
        cases::award(record, opening.skin);
        let balance = record.points;
        self.store.save(&document);

        info!(
            chat = chat_id,
            user = %user_key,
            case = %case.id,
            skin = %opening.name,
            balance,
            "case opened"
        );
        self.send_photo_or_text(
            chat_id,
            &opening.skin.image,
            &texts::drop_caption(
                opening.name,
                opening.skin.rarity.as_str(),
                opening.skin.price,
                case.price,
                balance,
            ),
            Some(PARSE_MODE_HTML),
            None,
        )
        .await;
        self.acknowledge(callback, None).await;
    }

    async fn back_to_main(&self, callback: &CallbackQuery) {
        let Some(menu_message) = callback.message.as_ref() else {
            debug!(callback = %callback.id, "callback without message");
            return;
        };
        self.discard_trigger(menu_message).await;
        let markup = ui::main_menu();
        self.send_text(menu_message.chat.id, texts::MAIN_MENU, None, Some(&markup))
            .await;
        self.acknowledge(callback, None).await;
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
        reply_markup: Option<&ReplyMarkup>,
    ) {
        let request = SendMessage {
            chat_id,
            text,
            parse_mode,
            reply_to_message_id: None,
            reply_markup,
        };
        if let Err(err) = self.telegram.send_message(&request).await {
            error!(chat = chat_id, %err, "send failed");
        }
    }

    /// Sends a message scheduled to disappear after `ttl_secs`. The sweep
    /// is only queued when the send went through.
    async fn send_ephemeral(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
        reply_markup: Option<&ReplyMarkup>,
        ttl_secs: u64,
    ) {
        let request = SendMessage {
            chat_id,
            text,
            parse_mode,
            reply_to_message_id: None,
            reply_markup,
        };
        match self.telegram.send_message(&request).await {
            Ok(sent) => self.sweeper.schedule(
                chat_id,
                sent.message_id,
                StdDuration::from_secs(ttl_secs),
            ),
            Err(err) => error!(chat = chat_id, %err, "send failed"),
        }
    }

    async fn reply(&self, message: &Message, text: &str) {
        let request = SendMessage {
            chat_id: message.chat.id,
            text,
            parse_mode: None,
            reply_to_message_id: Some(message.message_id),
            reply_markup: None,
        };
        if let Err(err) = self.telegram.send_message(&request).await {
            error!(chat = message.chat.id, %err, "reply failed");
        }
    }

    /// Sends a photo, falling back to a plain message with the caption
    /// when Telegram rejects the image.
    async fn send_photo_or_text(
        &self,
        chat_id: i64,
        photo: &str,
        caption: &str,
        parse_mode: Option<&str>,
        reply_markup: Option<&ReplyMarkup>,
    ) {
        let request = SendPhoto {
            chat_id,
            photo,
            caption,
            parse_mode,
            reply_markup,
        };
        if let Err(err) = self.telegram.send_photo(&request).await {
            error!(chat = chat_id, %err, "photo send failed, falling back to text");
            self.send_text(chat_id, caption, parse_mode, reply_markup)
                .await;
        }
    }

    /// Deletes the message that triggered a menu action. Failures are
    /// expected here, the bot may lack delete rights.
    async fn discard_trigger(&self, message: &Message) {
        if let Err(err) = self
            .telegram
            .delete_message(message.chat.id, message.message_id)
            .await
        {
            debug!(chat = message.chat.id, %err, "trigger delete failed");
        }
    }

    async fn acknowledge(&self, callback: &CallbackQuery, text: Option<&str>) {
        if let Err(err) = self.telegram.answer_callback_query(&callback.id, text).await {
            debug!(callback = %callback.id, %err, "callback answer failed");
        }
    }
}
