mod machine;
mod session_storage;

pub use machine::{
    CUSTOM, CreateReminderState, DAILY, DialogueInput, EVERYDAY, ONE_TIME, Prompt, PromptOption,
    Step,
};
pub use session_storage::ExpiringStorage;
