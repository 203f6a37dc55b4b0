use std::sync::Arc;
use std::time::Duration;

use teloxide::dptree::deps;
use teloxide::types::ChatId;
use teloxide_tests::{MockBot, MockCallbackQuery, MockMessageText, mock_bot::DistributionKey};

use crate::dialogue::{CreateReminderState, ExpiringStorage};
use crate::reminder::{OwnerId, Reminder};
use crate::scheduling::Clock;
use crate::storage::{InMemoryTaskPersistence, ReminderStorage, TaskMap, TaskStore};
use crate::telegram::{GlobalState, schema};
use crate::test_utils::{FixedClock, at};

const SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub type TestStore = Arc<TaskStore<InMemoryTaskPersistence>>;

/// Chat every mock update is sent from.
pub fn chat_id() -> ChatId {
    MockMessageText::new().chat.id
}

pub fn owner() -> OwnerId {
    OwnerId::from(chat_id())
}

pub async fn store(reminders: Vec<Reminder>) -> TestStore {
    let tasks = if reminders.is_empty() {
        TaskMap::new()
    } else {
        TaskMap::from([(owner(), reminders)])
    };
    Arc::new(TaskStore::open(InMemoryTaskPersistence::with_tasks(tasks)).await)
}

/// Bot running the full dispatcher schema on 2025-03-10 08:00.
pub fn bot(msg_text: &str, store: &TestStore) -> MockBot<anyhow::Error, DistributionKey> {
    let storage: Arc<dyn ReminderStorage> = store.clone();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(at(2025, 3, 10, 8, 0)));

    let mut bot = MockBot::new(MockMessageText::new().text(msg_text), schema());
    bot.dependencies(deps![
        ExpiringStorage::<GlobalState>::new(SESSION_TIMEOUT),
        storage,
        clock
    ]);

    bot
}

/// Texts the bot sent or edited while handling the current update.
pub async fn dispatch(bot: &mut MockBot<anyhow::Error, DistributionKey>) -> Vec<String> {
    bot.dispatch().await;

    let responses = bot.get_responses();
    responses
        .sent_messages
        .iter()
        .filter_map(|message| message.text())
        .chain(
            responses
                .edited_messages_text
                .iter()
                .filter_map(|edited| edited.message.text()),
        )
        .map(str::to_string)
        .collect()
}

pub async fn send_text(bot: &mut MockBot<anyhow::Error, DistributionKey>, text: &str) -> Vec<String> {
    bot.update(MockMessageText::new().text(text));
    dispatch(bot).await
}

pub async fn press(bot: &mut MockBot<anyhow::Error, DistributionKey>, data: &str) -> Vec<String> {
    bot.update(MockCallbackQuery::new().data(data));
    dispatch(bot).await
}

pub fn prompt_for(state: CreateReminderState) -> String {
    state.prompt().text
}
