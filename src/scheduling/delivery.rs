use async_trait::async_trait;

use crate::reminder::OwnerId;

/// Where fired reminders go. One attempt per fired reminder, no retries.
#[async_trait]
pub trait ReminderDeliveryChannel: Send + Sync + 'static {
    /// `thread_id` is the topic inside the owner's chat, if the reminder was
    /// created in one.
    async fn send_reminder(
        &self,
        owner: OwnerId,
        thread_id: Option<i32>,
        message: &str,
    ) -> anyhow::Result<()>;
}
