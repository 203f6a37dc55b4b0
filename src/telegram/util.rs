use teloxide::Bot;
use teloxide::payloads::EditMessageReplyMarkupSetters;
use teloxide::prelude::*;
use teloxide::sugar::bot::BotMessagesExt;
use teloxide::types::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, MaybeInaccessibleMessage, Message,
    MessageId, ThreadId,
};
use thiserror::Error;

use crate::dialogue::Prompt;

/// Telegram rejects texts longer than this many UTF-16 code units.
pub const MESSAGE_LIMIT: usize = 4096;

/// Handler failure tagged with the chat that should be told about it.
#[derive(Debug, Error)]
#[error("failed to handle an update in chat {chat_id}: {error:#}")]
pub struct ChatHandlerError {
    pub chat_id: ChatId,
    error: anyhow::Error,
}

pub trait InChat<T> {
    fn in_chat(self, chat_id: ChatId) -> anyhow::Result<T>;
}

impl<T, E: Into<anyhow::Error>> InChat<T> for Result<T, E> {
    fn in_chat(self, chat_id: ChatId) -> anyhow::Result<T> {
        self.map_err(|error| {
            ChatHandlerError {
                chat_id,
                error: error.into(),
            }
            .into()
        })
    }
}

pub fn try_get_message_from_query(query: &CallbackQuery) -> Option<&Message> {
    query.message.as_ref().and_then(|msg| match msg {
        MaybeInaccessibleMessage::Inaccessible(_) => None,
        MaybeInaccessibleMessage::Regular(message) => Some(message.as_ref()),
    })
}

pub async fn clear_message_buttons(bot: &Bot, message: &Message) -> anyhow::Result<()> {
    bot.edit_reply_markup(message)
        .reply_markup(InlineKeyboardMarkup::default())
        .await?;

    Ok(())
}

/// Forum topic the message was posted in.
pub fn topic_of(message: &Message) -> Option<i32> {
    if !message.is_topic_message {
        return None;
    }
    message.thread_id.map(|ThreadId(MessageId(id))| id)
}

/// Commands are routed by their own handlers, never fed into a dialogue.
pub fn is_command(message: &Message) -> bool {
    message.text().is_some_and(|text| text.starts_with('/'))
}

pub async fn send_prompt(bot: &Bot, chat_id: ChatId, prompt: Prompt) -> anyhow::Result<()> {
    let request = bot.send_message(chat_id, prompt.text);
    if prompt.options.is_empty() {
        request.await?;
    } else {
        request.reply_markup(prompt_keyboard(&prompt.options)).await?;
    }

    Ok(())
}

/// Joins `parts` with `separator` into as few messages as fit in `limit`.
/// A part that is too long on its own is cut at character boundaries.
pub fn split_into_messages<I>(parts: I, separator: &str, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut messages = Vec::new();
    let mut current = String::new();

    for part in parts.into_iter().flat_map(|part| cut_to_limit(part, limit)) {
        if !current.is_empty()
            && utf16_len(&current) + utf16_len(separator) + utf16_len(&part) > limit
        {
            messages.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str(separator);
        }
        current.push_str(&part);
    }

    if !current.is_empty() {
        messages.push(current);
    }
    messages
}

fn cut_to_limit(part: String, limit: usize) -> Vec<String> {
    if utf16_len(&part) <= limit {
        return vec![part];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_len = 0;
    for c in part.chars() {
        if piece_len + c.len_utf16() > limit {
            pieces.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece.push(c);
        piece_len += c.len_utf16();
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn prompt_keyboard(options: &[crate::dialogue::PromptOption]) -> InlineKeyboardMarkup {
    let row = options
        .iter()
        .map(|option| InlineKeyboardButton::callback(option.label, option.data))
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(vec![row])
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;
    use crate::dialogue::{CreateReminderState, DAILY, ONE_TIME};

    #[test]
    fn prompt_options_become_one_row_of_callback_buttons() {
        let state = CreateReminderState::AwaitingScheduleType {
            message: "Buy milk".to_string(),
        };

        let keyboard = prompt_keyboard(&state.prompt().options);

        assert_eq!(keyboard.inline_keyboard.len(), 1);
        let buttons = &keyboard.inline_keyboard[0];
        assert_eq!(buttons[0].text, "Specific day");
        assert_eq!(
            buttons[0].kind,
            InlineKeyboardButtonKind::CallbackData(ONE_TIME.to_string())
        );
        assert_eq!(
            buttons[1].kind,
            InlineKeyboardButtonKind::CallbackData(DAILY.to_string())
        );
    }

    #[test]
    fn short_parts_share_one_message() {
        let parts = ["header".to_string(), "a".to_string(), "b".to_string()];

        assert_eq!(split_into_messages(parts, "\n\n", 100), ["header\n\na\n\nb"]);
    }

    #[test]
    fn parts_move_to_the_next_message_at_the_limit() {
        let parts = ["aaaa".to_string(), "bbbb".to_string(), "cc".to_string()];

        assert_eq!(split_into_messages(parts, "\n", 9), ["aaaa\nbbbb", "cc"]);
    }

    #[test]
    fn long_reminder_list_fits_telegram_limit() {
        let parts = (0..300).map(|i| format!("{i}. \"{}\"", "x".repeat(40)));

        let messages = split_into_messages(parts, "\n\n", MESSAGE_LIMIT);

        assert!(messages.len() > 1);
        assert!(messages.iter().all(|m| utf16_len(m) <= MESSAGE_LIMIT));
        assert!(messages[0].starts_with("0. "));
        assert!(messages.last().unwrap().contains("299. "));
    }

    #[test]
    fn oversized_part_is_cut_on_character_boundaries() {
        let part = "🦀".repeat(3000);

        let messages = split_into_messages([part], "\n", MESSAGE_LIMIT);

        assert_eq!(messages.len(), 2);
        assert_eq!(utf16_len(&messages[0]), MESSAGE_LIMIT);
        assert_eq!(messages.concat(), "🦀".repeat(3000));
    }

    #[test]
    fn tagged_error_keeps_its_chat() {
        let error = Err::<(), _>(anyhow::anyhow!("boom"))
            .in_chat(ChatId(7))
            .unwrap_err();

        let tagged = error.downcast_ref::<ChatHandlerError>().unwrap();
        assert_eq!(tagged.chat_id, ChatId(7));
        assert!(error.to_string().contains("boom"));
    }
}
