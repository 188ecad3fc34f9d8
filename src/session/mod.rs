//! Wizard sessions: per-user progress through the ten wizard steps.

mod store;
mod types;

pub use store::{create_session_store, SessionStore};
pub use types::{
    PromptSet, Session, SessionError, SessionResult, SessionStats, SessionUpdate, FIRST_STEP,
    LAST_STEP,
};
