use crate::storage::ReminderStorage;
use crate::telegram::edit_reminders::{DELETED_TEXT, STALE_DELETE_TEXT};
use crate::test_utils::everyday_reminder;

use super::test_utils::*;

async fn messages(store: &TestStore) -> Vec<String> {
    store
        .get_all_owner_reminders(owner())
        .await
        .into_iter()
        .map(|reminder| reminder.message)
        .collect()
}

#[tokio::test]
async fn list_shows_reminders_in_order() {
    let store = store(vec![
        everyday_reminder("Stretch", 9, 0),
        everyday_reminder("Water", 12, 0),
    ])
    .await;
    let mut bot = bot("/list", &store);

    assert_eq!(
        dispatch(&mut bot).await,
        ["📝 Your reminders:\n\n\
          1. \"Stretch\"\n   ⏰ every day at 09:00\n\n\
          2. \"Water\"\n   ⏰ every day at 12:00"]
    );
}

#[tokio::test]
async fn delete_button_removes_the_reminder_at_its_position() {
    let store = store(vec![
        everyday_reminder("Stretch", 9, 0),
        everyday_reminder("Water", 12, 0),
    ])
    .await;
    let mut bot = bot("/delete", &store);
    assert_eq!(dispatch(&mut bot).await, ["Select a reminder to delete:"]);

    assert_eq!(press(&mut bot, "delete_0").await, [DELETED_TEXT]);

    assert_eq!(messages(&store).await, ["Water"]);
    assert_eq!(store.persistence().save_count(), 1);
}

#[tokio::test]
async fn stale_delete_button_changes_nothing() {
    let store = store(vec![everyday_reminder("Stretch", 9, 0)]).await;
    let mut bot = bot("/delete", &store);
    dispatch(&mut bot).await;

    assert_eq!(press(&mut bot, "delete_0").await, [DELETED_TEXT]);
    // Same menu pressed again, the list is now empty.
    assert_eq!(press(&mut bot, "delete_0").await, [STALE_DELETE_TEXT]);
    assert_eq!(press(&mut bot, "delete_7").await, [STALE_DELETE_TEXT]);

    assert!(messages(&store).await.is_empty());
    assert_eq!(store.persistence().save_count(), 1);
}

#[tokio::test]
async fn delete_without_reminders_says_so() {
    let store = store(vec![]).await;
    let mut bot = bot("/delete", &store);

    assert_eq!(
        dispatch(&mut bot).await,
        ["You don't have any reminders to delete."]
    );
}
