use dptree::case;
use teloxide::dispatching::UpdateHandler;
use teloxide::filter_command;
use teloxide::prelude::*;

use crate::dialogue::{CreateReminderState, DialogueInput, Step};
use crate::reminder::{OwnerId, Reminder};

use super::util::{
    InChat, clear_message_buttons, is_command, send_prompt, topic_of, try_get_message_from_query,
};
use super::{
    GlobalCommand, GlobalDialogue, GlobalState, HandlerClockType, HandlerReminderStorageType,
    HandlerResult,
};

pub(super) const NOT_SAVED_TEXT: &str = "⚠️ Your reminder is active, but I could not save it to disk. \
It will be lost if I restart.";

async fn create_reminder_start(bot: Bot, dialogue: GlobalDialogue, msg: Message) -> HandlerResult {
    let (state, prompt) = CreateReminderState::start();

    send_prompt(&bot, msg.chat.id, prompt)
        .await
        .in_chat(msg.chat.id)?;
    dialogue
        .update(GlobalState::CreatingReminder(state))
        .await
        .in_chat(msg.chat.id)?;

    Ok(())
}

async fn receive_text(
    bot: Bot,
    dialogue: GlobalDialogue,
    state: CreateReminderState,
    storage: HandlerReminderStorageType,
    clock: HandlerClockType,
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send me a text message.")
            .await
            .in_chat(msg.chat.id)?;
        send_prompt(&bot, msg.chat.id, state.prompt())
            .await
            .in_chat(msg.chat.id)?;
        return Ok(());
    };

    let step = state.advance(DialogueInput::Text(text), clock.now());
    apply_step(&bot, &dialogue, &storage, step, topic_of(&msg))
        .await
        .in_chat(msg.chat.id)
}

async fn receive_choice(
    bot: Bot,
    dialogue: GlobalDialogue,
    state: CreateReminderState,
    storage: HandlerReminderStorageType,
    clock: HandlerClockType,
    query: CallbackQuery,
) -> HandlerResult {
    let chat_id = dialogue.chat_id();
    bot.answer_callback_query(query.id.clone())
        .await
        .in_chat(chat_id)?;

    let message = try_get_message_from_query(&query);
    if let Some(message) = message {
        if let Err(error) = clear_message_buttons(&bot, message).await {
            log::warn!("Failed to clear buttons in chat {chat_id}: {error:#}");
        }
    }

    let data = query.data.as_deref().unwrap_or_default();
    let step = state.advance(DialogueInput::Choice(data), clock.now());
    apply_step(&bot, &dialogue, &storage, step, message.and_then(topic_of))
        .await
        .in_chat(chat_id)
}

async fn apply_step(
    bot: &Bot,
    dialogue: &GlobalDialogue,
    storage: &HandlerReminderStorageType,
    step: Step,
    topic: Option<i32>,
) -> anyhow::Result<()> {
    match step {
        Step::Continue { state, prompt } => {
            send_prompt(bot, dialogue.chat_id(), prompt).await?;
            dialogue
                .update(GlobalState::CreatingReminder(state))
                .await?;
        }
        Step::Retry { prompt, .. } => {
            send_prompt(bot, dialogue.chat_id(), prompt).await?;
        }
        Step::Complete(reminder) => {
            dialogue.exit().await?;
            let reminder = Reminder {
                thread_id: topic,
                ..reminder
            };
            commit_reminder(bot, dialogue.chat_id(), storage, reminder).await?;
        }
    }

    Ok(())
}

async fn commit_reminder(
    bot: &Bot,
    chat_id: ChatId,
    storage: &HandlerReminderStorageType,
    reminder: Reminder,
) -> anyhow::Result<()> {
    let confirmation = confirmation_text(&reminder);

    match storage.insert(OwnerId::from(chat_id), reminder).await {
        Ok(count) => {
            log::info!("Chat {chat_id} added a reminder, {count} in total");
            bot.send_message(chat_id, confirmation).await?;
        }
        Err(error) => {
            log::error!("Failed to save reminder for chat {chat_id}: {error}");
            bot.send_message(chat_id, NOT_SAVED_TEXT).await?;
        }
    }

    Ok(())
}

fn confirmation_text(reminder: &Reminder) -> String {
    format!(
        "✅ Reminder added successfully!\n\nI'll remind you: \"{}\"\n⏰ {} at {}",
        reminder.message,
        reminder.describe(),
        reminder.time
    )
}

pub(super) fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(
            Update::filter_message().branch(
                filter_command::<GlobalCommand, _>()
                    .branch(case![GlobalCommand::Add].endpoint(create_reminder_start)),
            ),
        )
        .branch(
            case![GlobalState::CreatingReminder(state)]
                .branch(
                    Update::filter_message()
                        .filter(|msg: Message| !is_command(&msg))
                        .endpoint(receive_text),
                )
                .branch(Update::filter_callback_query().endpoint(receive_choice)),
        )
}
