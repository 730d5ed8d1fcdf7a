//! Telegram front-end for the clutch match game. The binary wires a
//! long-poll loop to [`handlers::App`], which drives the engine crates and
//! persists everything through [`store::Store`].

pub mod config;
pub use config::BotConfig;
pub mod handlers;
pub use handlers::App;
pub mod store;
pub use store::{ChatLedger, Document, Store};
pub mod sweeper;
pub use sweeper::Sweeper;
pub mod telegram;
pub mod texts;
pub mod ui;
