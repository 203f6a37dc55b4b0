mod create_reminder;
mod delivery_channel;
mod edit_reminders;
mod util;


pub use delivery_channel::TelegramDeliveryChannel;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use dptree::case;
use teloxide::dispatching::UpdateHandler;
use teloxide::error_handlers::ErrorHandler;
use teloxide::types::{KeyboardButton, KeyboardMarkup};
use teloxide::utils::command::BotCommands;
use teloxide::{dispatching::dialogue, prelude::*};

use crate::dialogue::{CreateReminderState, ExpiringStorage};
use crate::scheduling::Clock;
use crate::storage::ReminderStorage;

use util::{ChatHandlerError, InChat};

type GlobalDialogue = Dialogue<GlobalState, ExpiringStorage<GlobalState>>;
type HandlerResult = anyhow::Result<()>;
type HandlerReminderStorageType = Arc<dyn ReminderStorage>;
type HandlerClockType = Arc<dyn Clock>;

#[derive(Default, Clone, Debug, PartialEq, Eq)]
enum GlobalState {
    #[default]
    Idle,
    CreatingReminder(CreateReminderState),
}

const WELCOME_TEXT: &str = "Welcome to your personal Reminder Bot! 🎯
I can help you remember your tasks and send you daily reminders.
Use the buttons below or these commands:
• Add a new reminder: /add
• See all your reminders: /list
• Remove a reminder: /delete
Let's get started!";

const SOMETHING_WENT_WRONG_TEXT: &str =
    "Sorry, something went wrong. Please try again or start over with /start.";
const CANCELLED_TEXT: &str = "Operation cancelled.";
const INVALID_STATE_TEXT: &str =
    "Unable to handle the message. Please try again or use /cancel to stop current operation.";

pub struct TelegramInteractionInterface;
impl TelegramInteractionInterface {
    /// Runs the dispatcher until Ctrl-C is received.
    pub async fn start(
        bot: Bot,
        reminder_storage: HandlerReminderStorageType,
        clock: HandlerClockType,
        session_timeout: Duration,
    ) {
        log::info!("Starting Telegram interaction interface");

        if let Err(error) = bot.set_my_commands(GlobalCommand::bot_commands()).await {
            log::warn!("Failed to register bot commands: {error}");
        }

        Dispatcher::builder(bot.clone(), schema())
            .dependencies(dptree::deps![
                ExpiringStorage::<GlobalState>::new(session_timeout),
                reminder_storage,
                clock
            ])
            .error_handler(Arc::new(ApologizingErrorHandler { bot }))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await
    }
}

fn schema() -> UpdateHandler<anyhow::Error> {
    let cancel_handler = Update::filter_message().branch(
        teloxide::filter_command::<GlobalCommand, _>()
            .branch(case![GlobalCommand::Cancel].endpoint(cancel))
            .branch(case![GlobalCommand::Start].endpoint(start)),
    );

    let invalid_state_handler = Update::filter_message().branch(dptree::endpoint(invalid_state));

    let invalid_callback_handler =
        Update::filter_callback_query().branch(dptree::endpoint(invalid_query));

    dialogue::enter::<Update, ExpiringStorage<GlobalState>, GlobalState, _>()
        .branch(cancel_handler)
        .branch(edit_reminders::schema())
        .branch(create_reminder::schema())
        .branch(invalid_state_handler)
        .branch(invalid_callback_handler)
}

/// Logs handler failures and apologizes to the chat the failure happened in.
struct ApologizingErrorHandler {
    bot: Bot,
}

impl ErrorHandler<anyhow::Error> for ApologizingErrorHandler {
    fn handle_error(
        self: Arc<Self>,
        error: anyhow::Error,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>> {
        Box::pin(async move {
            log::error!("Error while handling an update: {error:#}");

            let Some(chat_id) = chat_to_notify(&error) else {
                return;
            };
            if let Err(reply_error) = self
                .bot
                .send_message(chat_id, SOMETHING_WENT_WRONG_TEXT)
                .await
            {
                log::error!("Failed to report the error to chat {chat_id}: {reply_error}");
            }
        })
    }
}

fn chat_to_notify(error: &anyhow::Error) -> Option<ChatId> {
    error
        .downcast_ref::<ChatHandlerError>()
        .map(|tagged| tagged.chat_id)
}

async fn start(bot: Bot, msg: Message) -> HandlerResult {
    let keyboard = KeyboardMarkup::new(vec![
        vec![KeyboardButton::new("/add")],
        vec![KeyboardButton::new("/list")],
        vec![KeyboardButton::new("/delete")],
    ]);

    bot.send_message(msg.chat.id, WELCOME_TEXT)
        .reply_markup(keyboard)
        .await
        .in_chat(msg.chat.id)?;

    Ok(())
}

async fn cancel(bot: Bot, dialogue: GlobalDialogue, msg: Message) -> HandlerResult {
    dialogue.exit().await.in_chat(msg.chat.id)?;
    bot.send_message(msg.chat.id, CANCELLED_TEXT)
        .await
        .in_chat(msg.chat.id)?;
    Ok(())
}

async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, INVALID_STATE_TEXT)
        .await
        .in_chat(msg.chat.id)?;
    Ok(())
}

async fn invalid_query(bot: Bot, dialogue: GlobalDialogue, query: CallbackQuery) -> HandlerResult {
    let chat_id = dialogue.chat_id();
    bot.answer_callback_query(query.id).await.in_chat(chat_id)?;
    bot.send_message(
        chat_id,
        "Unable to handle the query result. Please try again or use /cancel to stop current operation.",
    )
    .await
    .in_chat(chat_id)?;

    Ok(())
}

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
enum GlobalCommand {
    #[command(description = "show the welcome message.")]
    Start,
    #[command(description = "add a new reminder.")]
    Add,
    #[command(description = "list your reminders.")]
    List,
    #[command(description = "delete a reminder.")]
    Delete,
    #[command(description = "cancel the current operation.")]
    Cancel,
}
