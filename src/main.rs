mod appsettings;
mod dialogue;
mod reminder;
mod scheduling;
mod storage;
mod telegram;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use appsettings::AppSettings;
use scheduling::{DueReminderEvaluator, EvaluatorWorker, LocalClock};
use storage::{JsonFileTaskPersistence, TaskStore};
use telegram::{TelegramDeliveryChannel, TelegramInteractionInterface};
use teloxide::Bot;

const WORKER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let settings = AppSettings::load()?;
    log::info!("Using task store at {}", settings.storage.path.display());

    let store = Arc::new(TaskStore::open(JsonFileTaskPersistence::new(&settings.storage.path)).await);
    let bot = Bot::new(&settings.telegram.token);

    let evaluator = DueReminderEvaluator::new(
        store.clone(),
        Arc::new(TelegramDeliveryChannel::new(bot.clone())),
    );
    let worker = EvaluatorWorker::start(
        evaluator,
        LocalClock,
        settings.scheduler.first_tick_delay(),
        settings.scheduler.interval(),
    );

    TelegramInteractionInterface::start(
        bot,
        store,
        Arc::new(LocalClock),
        settings.dialogue.session_timeout(),
    )
    .await;

    log::info!("Shutting down");
    worker.stop(WORKER_STOP_TIMEOUT).await;

    Ok(())
}
