//! Delayed deletion of ephemeral messages (cooldown notices, help). A
//! handler schedules a sweep and moves on; the worker sleeps out the delay
//! and issues the delete. Dropping the [`Sweeper`] cancels everything
//! still pending.

use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::telegram::Telegram;

struct Sweep {
    chat_id: i64,
    message_id: i64,
    delay: Duration,
}

pub struct Sweeper {
    tx: mpsc::UnboundedSender<Sweep>,
}

impl Sweeper {
    /// Spawns the worker task and returns the handle to schedule sweeps
    /// through.
    pub fn start(telegram: Telegram) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Sweep>();
        let worker = tokio::spawn(async move {
            let mut pending = FuturesUnordered::new();
            loop {
                tokio::select! {
                    request = rx.recv() => match request {
                        Some(sweep) => pending.push(run(telegram.clone(), sweep)),
                        None => break,
                    },
                    Some(()) = pending.next(), if !pending.is_empty() => {}
                }
            }
        });
        (Self { tx }, worker)
    }

    /// Queues `message_id` for deletion after `delay`. Never blocks.
    pub fn schedule(&self, chat_id: i64, message_id: i64, delay: Duration) {
        let _ = self.tx.send(Sweep {
            chat_id,
            message_id,
            delay,
        });
    }
}

async fn run(telegram: Telegram, sweep: Sweep) {
    tokio::time::sleep(sweep.delay).await;
    // The message may already be gone; that is the desired end state.
    if let Err(err) = telegram
        .delete_message(sweep.chat_id, sweep.message_id)
        .await
    {
        debug!(
            chat = sweep.chat_id,
            message = sweep.message_id,
            %err,
            "delayed delete failed"
        );
    }
}
