use crate::domain::model::{DeliveryError, FormattedMessage};
use crate::domain::ports::MessageSink;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use teloxide::RequestError;

/// Sends rendered messages to a Telegram chat.
#[derive(Clone)]
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSink for TelegramSink {
    async fn send(&self, chat_id: i64, message: &FormattedMessage) -> Result<(), DeliveryError> {
        self.bot
            .send_message(ChatId(chat_id), message.text.as_str())
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::ChannelRejected {
                reason: rejection_reason(&e),
            })
    }
}

/// Network errors print the request URL, which embeds the bot token.
fn rejection_reason(err: &RequestError) -> String {
    match err {
        RequestError::Network(_) => "network error while contacting Telegram".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::ApiError;

    #[test]
    fn test_api_rejection_keeps_telegram_reason() {
        let reason = rejection_reason(&RequestError::Api(ApiError::BotBlocked));
        assert!(reason.contains("blocked"));
    }
}
