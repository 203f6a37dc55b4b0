use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ThreadId};
use thiserror::Error;

use crate::reminder::OwnerId;
use crate::scheduling::ReminderDeliveryChannel;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Telegram rejected the reminder for chat {owner}: {source}")]
    Telegram {
        owner: OwnerId,
        #[source]
        source: teloxide::RequestError,
    },
}

pub struct TelegramDeliveryChannel {
    bot: Bot,
}

impl TelegramDeliveryChannel {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReminderDeliveryChannel for TelegramDeliveryChannel {
    async fn send_reminder(
        &self,
        owner: OwnerId,
        thread_id: Option<i32>,
        message: &str,
    ) -> anyhow::Result<()> {
        let mut request = self.bot.send_message(ChatId::from(owner), message);
        if let Some(thread_id) = thread_id {
            request = request.message_thread_id(ThreadId(MessageId(thread_id)));
        }

        request
            .await
            .map_err(|source| DeliveryError::Telegram { owner, source })?;

        Ok(())
    }
}

impl From<OwnerId> for ChatId {
    fn from(owner: OwnerId) -> Self {
        ChatId(owner.0)
    }
}

impl From<ChatId> for OwnerId {
    fn from(chat_id: ChatId) -> Self {
        OwnerId(chat_id.0)
    }
}
