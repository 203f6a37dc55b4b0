use dptree::case;
use teloxide::dispatching::UpdateHandler;
use teloxide::filter_command;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::reminder::{OwnerId, Reminder};
use crate::storage::StorageError;

use super::util::{InChat, MESSAGE_LIMIT, split_into_messages, try_get_message_from_query};
use super::{GlobalCommand, GlobalDialogue, HandlerReminderStorageType, HandlerResult};

const DELETE_PREFIX: &str = "delete_";
pub(super) const DELETED_TEXT: &str = "✅ Reminder deleted.";
pub(super) const STALE_DELETE_TEXT: &str = "❌ Failed to delete reminder. Please try again.";

/// Position of the reminder picked from the delete menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct DeleteIndex(usize);

fn parse_delete_data(data: &str) -> Option<DeleteIndex> {
    data.strip_prefix(DELETE_PREFIX)?
        .parse()
        .ok()
        .map(DeleteIndex)
}

async fn list_reminders(
    storage: HandlerReminderStorageType,
    bot: Bot,
    msg: Message,
) -> HandlerResult {
    let reminders = storage
        .get_all_owner_reminders(OwnerId::from(msg.chat.id))
        .await;

    for text in display_reminders(&reminders) {
        bot.send_message(msg.chat.id, text)
            .await
            .in_chat(msg.chat.id)?;
    }

    Ok(())
}

/// Numbered reminder list, split into as many messages as Telegram needs.
fn display_reminders(reminders: &[Reminder]) -> Vec<String> {
    if reminders.is_empty() {
        return vec!["You don't have any reminders set up.".to_string()];
    }

    let entries = reminders.iter().enumerate().map(|(i, reminder)| {
        format!(
            "{}. \"{}\"\n   ⏰ {} at {}",
            i + 1,
            reminder.message,
            reminder.describe(),
            reminder.time
        )
    });

    split_into_messages(
        std::iter::once("📝 Your reminders:".to_string()).chain(entries),
        "\n\n",
        MESSAGE_LIMIT,
    )
}

async fn show_delete_menu(
    storage: HandlerReminderStorageType,
    bot: Bot,
    msg: Message,
) -> HandlerResult {
    let reminders = storage
        .get_all_owner_reminders(OwnerId::from(msg.chat.id))
        .await;

    if reminders.is_empty() {
        bot.send_message(msg.chat.id, "You don't have any reminders to delete.")
            .await
            .in_chat(msg.chat.id)?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Select a reminder to delete:")
        .reply_markup(delete_keyboard(&reminders))
        .await
        .in_chat(msg.chat.id)?;

    Ok(())
}

fn delete_keyboard(reminders: &[Reminder]) -> InlineKeyboardMarkup {
    let rows = reminders.iter().enumerate().map(|(i, reminder)| {
        let label = format!("{}. \"{}\" ({})", i + 1, reminder.message, reminder.describe());
        vec![InlineKeyboardButton::callback(
            label,
            format!("{DELETE_PREFIX}{i}"),
        )]
    });

    InlineKeyboardMarkup::new(rows)
}

async fn delete_reminder(
    DeleteIndex(index): DeleteIndex,
    storage: HandlerReminderStorageType,
    dialogue: GlobalDialogue,
    bot: Bot,
    query: CallbackQuery,
) -> HandlerResult {
    let chat_id = dialogue.chat_id();
    bot.answer_callback_query(query.id.clone())
        .await
        .in_chat(chat_id)?;

    let result_text = match storage.delete(OwnerId::from(chat_id), index).await {
        Ok(reminder) => {
            log::info!("Chat {chat_id} deleted reminder \"{}\"", reminder.message);
            DELETED_TEXT
        }
        Err(error @ StorageError::IndexOutOfRange { .. }) => {
            log::info!("Chat {chat_id} tried a stale delete: {error}");
            STALE_DELETE_TEXT
        }
        Err(error) => {
            log::error!("Failed to persist deletion for chat {chat_id}: {error}");
            "⚠️ The reminder was removed, but I could not save the change."
        }
    };

    // The menu may be too old to edit, the outcome is sent as a new message then.
    if let Some(message) = try_get_message_from_query(&query) {
        match bot.edit_message_text(chat_id, message.id, result_text).await {
            Ok(_) => return Ok(()),
            Err(error) => log::warn!("Failed to edit delete menu in chat {chat_id}: {error}"),
        }
    }
    bot.send_message(chat_id, result_text)
        .await
        .in_chat(chat_id)?;

    Ok(())
}

pub(super) fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(
            Update::filter_message().branch(
                filter_command::<GlobalCommand, _>()
                    .branch(case![GlobalCommand::List].endpoint(list_reminders))
                    .branch(case![GlobalCommand::Delete].endpoint(show_delete_menu)),
            ),
        )
        .branch(
            Update::filter_callback_query()
                .filter_map(|query: CallbackQuery| query.data.as_deref().and_then(parse_delete_data))
                .endpoint(delete_reminder),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::DayCode;
    use crate::test_utils::{custom_days_reminder, everyday_reminder, one_time_reminder};

    #[test]
    fn parses_delete_callback_data() {
        assert_eq!(parse_delete_data("delete_0"), Some(DeleteIndex(0)));
        assert_eq!(parse_delete_data("delete_12"), Some(DeleteIndex(12)));
        assert_eq!(parse_delete_data("delete_"), None);
        assert_eq!(parse_delete_data("delete_-1"), None);
        assert_eq!(parse_delete_data("one_time"), None);
    }

    #[test]
    fn lists_reminders_in_order() {
        let reminders = vec![
            one_time_reminder("Buy milk", 2025, 3, 15, 11, 50),
            custom_days_reminder("Gym", &[DayCode::Monday, DayCode::Friday], 18, 30),
        ];

        assert_eq!(
            display_reminders(&reminders),
            ["📝 Your reminders:\n\n\
             1. \"Buy milk\"\n   ⏰ on 2025-03-15 at 11:50\n\n\
             2. \"Gym\"\n   ⏰ every Monday, Friday at 18:30"]
        );
    }

    #[test]
    fn empty_list_has_its_own_text() {
        assert_eq!(display_reminders(&[]), ["You don't have any reminders set up."]);
    }

    #[test]
    fn long_list_is_split_between_messages() {
        let reminders = (0..60)
            .map(|i| everyday_reminder(&format!("{i} {}", "long text ".repeat(20)), 9, 0))
            .collect::<Vec<_>>();

        let messages = display_reminders(&reminders);

        assert!(messages.len() > 1);
        assert!(messages.iter().all(|m| m.encode_utf16().count() <= MESSAGE_LIMIT));
        assert!(messages[0].starts_with("📝 Your reminders:\n\n1. "));
        assert!(messages.last().unwrap().contains("60. \"59 "));
    }

    #[test]
    fn delete_menu_has_one_button_per_reminder() {
        let reminders = vec![
            everyday_reminder("Stretch", 9, 0),
            everyday_reminder("Water", 12, 0),
        ];

        let keyboard = delete_keyboard(&reminders);

        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert_eq!(keyboard.inline_keyboard[1][0].text, "2. \"Water\" (every day)");
    }
}
