//! Telegram long-poll transport.

use std::{collections::VecDeque, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::{
    payloads::GetUpdatesSetters,
    prelude::*,
    types::{ChatId, Update, UpdateKind},
};
use tracing::{debug, info, warn};
use weather_core::{ChatTransport, InboundEvent, OutboundMessage};

/// Server-side wait per `getUpdates` call; must stay below the HTTP client timeout.
const POLL_TIMEOUT_SECS: u32 = 10;
const RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct TelegramTransport {
    bot: Bot,
    offset: i32,
    pending: VecDeque<InboundEvent>,
}

impl TelegramTransport {
    /// Create the client and verify the token with `getMe`.
    pub async fn connect(token: &str) -> Result<Self> {
        let bot = Bot::new(token);
        let me = bot.get_me().await.context("Failed to authorize with Telegram")?;

        info!(
            username = me.user.username.as_deref().unwrap_or_default(),
            "Authorized on account"
        );

        Ok(Self { bot, offset: 0, pending: VecDeque::new() })
    }

    async fn poll(&mut self) -> Result<()> {
        let updates = self
            .bot
            .get_updates()
            .offset(self.offset)
            .timeout(POLL_TIMEOUT_SECS)
            .await
            .context("getUpdates failed")?;

        debug!(count = updates.len(), offset = self.offset, "polled updates");

        self.offset = absorb_batch(self.offset, &updates, &mut self.pending);
        Ok(())
    }
}

/// Queue the batch's events and return the offset for the next poll. The offset never decreases.
fn absorb_batch(offset: i32, updates: &[Update], pending: &mut VecDeque<InboundEvent>) -> i32 {
    updates.iter().fold(offset, |offset, update| {
        if let Some(event) = to_event(update) {
            pending.push_back(event);
        }
        next_offset(update).max(offset)
    })
}

fn next_offset(update: &Update) -> i32 {
    i32::try_from(update.id.0).unwrap_or(i32::MAX).saturating_add(1)
}

/// Only message updates become events; edits, callbacks and the rest are dropped.
fn to_event(update: &Update) -> Option<InboundEvent> {
    match &update.kind {
        UpdateKind::Message(msg) => Some(InboundEvent {
            chat_id: msg.chat.id.0,
            text: msg.text().map(str::to_owned),
        }),
        _ => None,
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn next_event(&mut self) -> Option<InboundEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            if let Err(err) = self.poll().await {
                warn!(error = %format!("{err:#}"), "polling failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        self.bot
            .send_message(ChatId(message.chat_id), message.text.as_str())
            .await
            .with_context(|| format!("sendMessage to chat {} failed", message.chat_id))?;
        Ok(())
    }
}
