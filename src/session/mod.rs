//! Session module - role-tagged messages and conversation history
//!
//! Finsight keeps no server-side session state. A [`Conversation`] is created
//! for each analysis session, extended after every successful turn, and handed
//! back to whoever drives the session (CLI loop or HTTP client).

mod types;

pub use types::{Conversation, Message, Role};
