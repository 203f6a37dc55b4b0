mod delivery;
mod due;
mod evaluator;
mod worker;

pub use delivery::ReminderDeliveryChannel;
pub use due::{Clock, LocalClock};
pub use evaluator::DueReminderEvaluator;
pub use worker::EvaluatorWorker;
