use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{info, warn};

use common::{Error, Notifier, Result};

/// How much of a sent message is echoed into the log.
const LOG_PREVIEW_CHARS: usize = 120;

/// Pushes signal alerts through the Telegram Bot API.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self { bot: Bot::new(token) }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, channel_id: &str, text: &str) -> Result<()> {
        let recipient = recipient_for(channel_id);

        if let Err(e) = self.bot.send_message(recipient, text).await {
            warn!(chat_id = %channel_id, error = %e, "Failed to send Telegram alert");
            return Err(Error::Notify(e.to_string()));
        }

        info!(chat_id = %channel_id, text = %preview(text), "Telegram alert sent");
        Ok(())
    }
}

/// Numeric ids (including negative group ids) are chats; anything else is
/// treated as a public channel username such as `@raketradar`.
pub fn recipient_for(channel_id: &str) -> Recipient {
    match channel_id.trim().parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(channel_id.trim().to_string()),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}
