
use chrono::NaiveDateTime;

use crate::reminder::parse::{self, ValidationError};
use crate::reminder::{Frequency, Reminder, ReminderFireTime, Schedule};

pub const ONE_TIME: &str = "one_time";
pub const DAILY: &str = "daily";
pub const EVERYDAY: &str = "everyday";
pub const CUSTOM: &str = "custom";

const MESSAGE_PROMPT: &str =
    "Let's add a new reminder! First, what would you like me to remind you about?";
const SCHEDULE_TYPE_PROMPT: &str =
    "Great! Now, do you want this to be a one-time reminder or a recurring one?";
const DATE_PROMPT: &str = "Please enter the due date in YYYY-MM-DD format (e.g., 2025-03-15).";
const FREQUENCY_PROMPT: &str = "How often should I remind you?";
const CUSTOM_DAYS_PROMPT: &str = "Please enter the first two letters of each day you want reminders, separated by commas (e.g., Mo,Tu,Fr for Monday, Tuesday, Friday).\n\nOptions: Mo, Tu, We, Th, Fr, Sa, Su";
const TIME_PROMPT: &str = "Please enter the time for your reminder in HH:MM format (e.g., 11:50).";

const USE_BUTTONS_HINT: &str = "Please choose one of the options below.";
const TYPE_ANSWER_HINT: &str = "Please type your answer as a message.";

/// Data collected so far by the reminder creation dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateReminderState {
    AwaitingMessage,
    AwaitingScheduleType { message: String },
    AwaitingDate { message: String },
    AwaitingFrequency { message: String },
    AwaitingCustomDays { message: String },
    AwaitingTime { message: String, schedule: Schedule },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueInput<'a> {
    Text(&'a str),
    /// Data of a pressed option button.
    Choice(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOption {
    pub label: &'static str,
    pub data: &'static str,
}

/// What to say to the user next, and which options to offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub options: Vec<PromptOption>,
}

impl Prompt {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    fn with_options(text: impl Into<String>, options: &[PromptOption]) -> Self {
        Self {
            text: text.into(),
            options: options.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue {
        state: CreateReminderState,
        prompt: Prompt,
    },
    /// The input was rejected. The state is unchanged.
    Retry {
        state: CreateReminderState,
        prompt: Prompt,
    },
    Complete(Reminder),
}

const SCHEDULE_TYPE_OPTIONS: [PromptOption; 2] = [
    PromptOption {
        label: "Specific day",
        data: ONE_TIME,
    },
    PromptOption {
        label: "Daily reminder",
        data: DAILY,
    },
];

const FREQUENCY_OPTIONS: [PromptOption; 2] = [
    PromptOption {
        label: "Everyday",
        data: EVERYDAY,
    },
    PromptOption {
        label: "Custom",
        data: CUSTOM,
    },
];

impl CreateReminderState {
    pub fn start() -> (Self, Prompt) {
        let state = Self::AwaitingMessage;
        let prompt = state.prompt();
        (state, prompt)
    }

    pub fn prompt(&self) -> Prompt {
        match self {
            Self::AwaitingMessage => Prompt::text(MESSAGE_PROMPT),
            Self::AwaitingScheduleType { .. } => {
                Prompt::with_options(SCHEDULE_TYPE_PROMPT, &SCHEDULE_TYPE_OPTIONS)
            }
            Self::AwaitingDate { .. } => Prompt::text(DATE_PROMPT),
            Self::AwaitingFrequency { .. } => {
                Prompt::with_options(FREQUENCY_PROMPT, &FREQUENCY_OPTIONS)
            }
            Self::AwaitingCustomDays { .. } => Prompt::text(CUSTOM_DAYS_PROMPT),
            Self::AwaitingTime { .. } => Prompt::text(TIME_PROMPT),
        }
    }

    fn expects_choice(&self) -> bool {
        matches!(
            self,
            Self::AwaitingScheduleType { .. } | Self::AwaitingFrequency { .. }
        )
    }

    /// Feeds one user input into the dialogue. `now` is the local time the
    /// input arrived at, used to reject dates and times already in the past.
    pub fn advance(self, input: DialogueInput<'_>, now: NaiveDateTime) -> Step {
        match (self, input) {
            (Self::AwaitingMessage, DialogueInput::Text(text)) => match parse::parse_message(text)
            {
                Ok(message) => Self::AwaitingScheduleType { message }.into_continue(),
                Err(error) => Self::AwaitingMessage.retry_with(error),
            },
            (Self::AwaitingScheduleType { message }, DialogueInput::Choice(ONE_TIME)) => {
                Self::AwaitingDate { message }.into_continue()
            }
            (Self::AwaitingScheduleType { message }, DialogueInput::Choice(DAILY)) => {
                Self::AwaitingFrequency { message }.into_continue()
            }
            (Self::AwaitingDate { message }, DialogueInput::Text(text)) => {
                match parse::parse_date(text.trim()) {
                    Ok(date) if date < now.date() => {
                        Self::AwaitingDate { message }.retry_with(ValidationError::DateInPast(date))
                    }
                    Ok(date) => Self::AwaitingTime {
                        message,
                        schedule: Schedule::OneTime { date },
                    }
                    .into_continue(),
                    Err(error) => Self::AwaitingDate { message }.retry_with(error),
                }
            }
            (Self::AwaitingFrequency { message }, DialogueInput::Choice(EVERYDAY)) => {
                Self::AwaitingTime {
                    message,
                    schedule: Schedule::Recurring {
                        frequency: Frequency::Everyday,
                    },
                }
                .into_continue()
            }
            (Self::AwaitingFrequency { message }, DialogueInput::Choice(CUSTOM)) => {
                Self::AwaitingCustomDays { message }.into_continue()
            }
            (Self::AwaitingCustomDays { message }, DialogueInput::Text(text)) => {
                match parse::parse_days(text) {
                    Ok(days) => Self::AwaitingTime {
                        message,
                        schedule: Schedule::Recurring {
                            frequency: Frequency::CustomDays { days },
                        },
                    }
                    .into_continue(),
                    Err(error) => Self::AwaitingCustomDays { message }.retry_with(error),
                }
            }
            (Self::AwaitingTime { message, schedule }, DialogueInput::Text(text)) => {
                match parse::parse_time(text.trim()) {
                    Ok(time) if already_passed(&schedule, time, now) => {
                        Self::AwaitingTime { message, schedule }
                            .retry_with(ValidationError::TimeInPast(time))
                    }
                    Ok(time) => Step::Complete(Reminder {
                        message,
                        schedule,
                        time,
                        thread_id: None,
                    }),
                    Err(error) => Self::AwaitingTime { message, schedule }.retry_with(error),
                }
            }
            (state, _) => {
                let hint = if state.expects_choice() {
                    USE_BUTTONS_HINT
                } else {
                    TYPE_ANSWER_HINT
                };
                state.retry_with(hint)
            }
        }
    }

    fn into_continue(self) -> Step {
        let prompt = self.prompt();
        Step::Continue {
            state: self,
            prompt,
        }
    }

    fn retry_with(self, reason: impl ToString) -> Step {
        let own_prompt = self.prompt();
        let prompt = Prompt {
            text: format!("{}\n\n{}", reason.to_string(), own_prompt.text),
            options: own_prompt.options,
        };

        Step::Retry {
            state: self,
            prompt,
        }
    }
}

/// A one-time reminder for today whose minute is already over could never fire.
fn already_passed(schedule: &Schedule, time: ReminderFireTime, now: NaiveDateTime) -> bool {
    match schedule {
        Schedule::OneTime { date } => {
            *date == now.date() && time < ReminderFireTime::new(now.time())
        }
        Schedule::Recurring { .. } => false,
    }
}
