//! Minimal Telegram Bot API client: JSON over HTTPS, one method per
//! endpoint the bot actually calls.

pub mod types;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use types::{
    AnswerCallbackQuery, ApiResponse, ChatMember, DeleteMessage, GetChatMember, GetUpdates,
    Message, SendMessage, SendPhoto, Update, User,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("api error: {description}")]
    Api { description: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Bot API client bound to one token. Cheap to clone; the underlying HTTP
/// client pools connections.
#[derive(Clone)]
pub struct Telegram {
    http: reqwest::Client,
    base: Url,
}

impl Telegram {
    pub fn new(token: &str) -> Result<Self> {
        let base = Url::parse(&format!("https://api.telegram.org/bot{token}/"))?;
        Ok(Self::with_base(base))
    }

    /// Points the client at an alternate API root, e.g. a self-hosted
    /// bot-api server. `base` must already contain the `bot<token>/`
    /// segment and a trailing slash.
    pub fn with_base(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    async fn call<P, T>(&self, method: &str, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base.join(method)?;
        let response: ApiResponse<T> = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await?
            .json()
            .await?;
        if response.ok {
            response.result.ok_or_else(|| Error::Api {
                description: "ok response without result".to_string(),
            })
        } else {
            Err(Error::Api {
                description: response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }

    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-polls for updates. `timeout` of zero returns whatever is
    /// queued right now.
    pub async fn get_updates(&self, offset: Option<i64>, timeout: u64) -> Result<Vec<Update>> {
        self.call("getUpdates", &GetUpdates { offset, timeout })
            .await
    }

    pub async fn send_message(&self, message: &SendMessage<'_>) -> Result<Message> {
        self.call("sendMessage", message).await
    }

    pub async fn send_photo(&self, photo: &SendPhoto<'_>) -> Result<Message> {
        self.call("sendPhoto", photo).await
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool> {
        self.call(
            "deleteMessage",
            &DeleteMessage {
                chat_id,
                message_id,
            },
        )
        .await
    }

    pub async fn answer_callback_query(&self, id: &str, text: Option<&str>) -> Result<bool> {
        self.call(
            "answerCallbackQuery",
            &AnswerCallbackQuery {
                callback_query_id: id,
                text,
            },
        )
        .await
    }

    pub async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember> {
        self.call("getChatMember", &GetChatMember { chat_id, user_id })
            .await
    }
}
