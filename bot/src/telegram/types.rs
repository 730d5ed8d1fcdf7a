//! Wire types for the handful of Bot API methods the bot uses. Inbound
//! structs keep only the fields the handlers read; everything else is
//! ignored at deserialization.

use serde::{Deserialize, Serialize};

pub const PARSE_MODE_HTML: &str = "HTML";

/// Envelope every Bot API response arrives in.
#[derive(Clone, Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub new_chat_members: Vec<User>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatMember {
    pub user: User,
}

#[derive(Clone, Debug, Serialize)]
pub struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<&'a ReplyMarkup>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SendPhoto<'a> {
    pub chat_id: i64,
    /// HTTP URL of the image; Telegram fetches it server-side.
    pub photo: &'a str,
    pub caption: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<&'a ReplyMarkup>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeleteMessage {
    pub chat_id: i64,
    pub message_id: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnswerCallbackQuery<'a> {
    pub callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GetChatMember {
    pub chat_id: i64,
    pub user_id: i64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    Inline(InlineKeyboardMarkup),
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_parses_group_message() {
        let raw = r#"{
            "update_id": 712,
            "message": {
                "message_id": 10,
                "date": 1748400000,
                "chat": {"id": -100123, "type": "supergroup", "title": "CS чат"},
                "from": {"id": 42, "is_bot": false, "first_name": "Вася", "username": "vasya"},
                "text": "/t@rank_bot"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.kind, ChatKind::Supergroup);
        assert_eq!(message.text.as_deref(), Some("/t@rank_bot"));
        assert_eq!(message.from.unwrap().username.as_deref(), Some("vasya"));
        assert!(message.new_chat_members.is_empty());
    }

    #[test]
    fn test_unseen_chat_kind_degrades() {
        let chat: Chat = serde_json::from_str(r#"{"id": 1, "type": "forum"}"#).unwrap();
        assert_eq!(chat.kind, ChatKind::Unknown);
    }

    #[test]
    fn test_send_message_omits_unset_options() {
        let payload = SendMessage {
            chat_id: -100123,
            text: "Главное меню:",
            parse_mode: None,
            reply_to_message_id: None,
            reply_markup: None,
        };
        let encoded = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({"chat_id": -100123, "text": "Главное меню:"})
        );
    }

    #[test]
    fn test_reply_markup_serializes_flat() {
        let markup = ReplyMarkup::Inline(InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: "🔓 Открыть кейс".to_string(),
                callback_data: "open_weapon_case".to_string(),
            }]],
        });
        let encoded = serde_json::to_value(&markup).unwrap();
        assert_eq!(
            encoded["inline_keyboard"][0][0]["callback_data"],
            "open_weapon_case"
        );
    }
}
