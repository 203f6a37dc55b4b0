use std::path::PathBuf;
use std::time::Duration;

use anyhow::ensure;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct TelegramSettings {
    pub token: String,
}

#[derive(Deserialize, Debug)]
pub struct StorageSettings {
    pub path: PathBuf,
}

#[derive(Deserialize, Debug)]
pub struct SchedulerSettings {
    pub interval_secs: u64,
    pub first_tick_delay_secs: u64,
}

impl SchedulerSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn first_tick_delay(&self) -> Duration {
        Duration::from_secs(self.first_tick_delay_secs)
    }
}

#[derive(Deserialize, Debug)]
pub struct DialogueSettings {
    pub session_timeout_secs: u64,
}

impl DialogueSettings {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    pub telegram: TelegramSettings,
    pub storage: StorageSettings,
    pub scheduler: SchedulerSettings,
    pub dialogue: DialogueSettings,
}

impl AppSettings {
    /// Reads defaults, then `appsettings.*`, then `appsettings.local.*`, then
    /// `APP_` environment variables (e.g. `APP_TELEGRAM__TOKEN`).
    pub fn load() -> anyhow::Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = Self::from_builder(builder)?;
        settings.validate()?;
        Ok(settings)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("storage.path", "data/tasks.json")?
            .set_default("scheduler.interval_secs", 60_i64)?
            .set_default("scheduler.first_tick_delay_secs", 1_i64)?
            .set_default("dialogue.session_timeout_secs", 1800_i64)?
            .build()?
            .try_deserialize()
    }

    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.telegram.token.trim().is_empty(),
            "telegram.token must be set"
        );
        ensure!(
            self.scheduler.interval_secs > 0,
            "scheduler.interval_secs must be greater than zero"
        );
        ensure!(
            self.dialogue.session_timeout_secs > 0,
            "dialogue.session_timeout_secs must be greater than zero"
        );
        Ok(())
    }
}
