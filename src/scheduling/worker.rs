use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::due::Clock;
use super::evaluator::DueReminderEvaluator;

/// Background task invoking the evaluator on a fixed interval.
pub struct EvaluatorWorker {
    task_handle: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl EvaluatorWorker {
    /// Starts ticking `first_tick_delay` from now, then every `interval`.
    /// `interval` must be non-zero.
    pub fn start(
        evaluator: DueReminderEvaluator,
        clock: impl Clock,
        first_tick_delay: Duration,
        interval: Duration,
    ) -> Self {
        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();

        let task_handle = tokio::spawn(async move {
            Self::run(
                task_cancellation_token,
                evaluator,
                clock,
                first_tick_delay,
                interval,
            )
            .await
        });

        log::info!(
            "Reminder evaluator started, checking every {}s",
            interval.as_secs()
        );

        Self {
            task_handle,
            cancellation_token,
        }
    }

    pub async fn stop(self, timeout: Duration) {
        self.cancellation_token.cancel();
        if time::timeout(timeout, self.task_handle).await.is_err() {
            log::warn!("Reminder evaluator did not stop within {timeout:?}");
        }
    }

    async fn run(
        cancellation_token: CancellationToken,
        evaluator: DueReminderEvaluator,
        clock: impl Clock,
        first_tick_delay: Duration,
        interval: Duration,
    ) {
        let mut ticker = time::interval_at(Instant::now() + first_tick_delay, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_evaluated_minute = None;

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    log::info!("Reminder evaluator stopped.");
                    break;
                },
                _ = ticker.tick() => {
                    let now = clock.now();
                    let minute = minute_of(now);
                    if last_evaluated_minute == Some(minute) {
                        log::debug!("Minute {} was already evaluated, skipping tick", minute.format("%H:%M"));
                        continue;
                    }

                    last_evaluated_minute = Some(minute);
                    evaluator.run_tick(now).await;
                }
            }
        }
    }
}

fn minute_of(now: NaiveDateTime) -> NaiveDateTime {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
