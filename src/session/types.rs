//! Conversation types for Finsight
//!
//! This module defines the role-tagged messages sent to the LLM and the
//! [`Conversation`] value that carries them between turns.

use serde::{Deserialize, Serialize};

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The text content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message.
    ///
    /// # Example
    /// ```
    /// use finsight::session::{Message, Role};
    ///
    /// let msg = Message::user("How much did I spend on food?");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
        }
    }

    /// Create a new system message.
    ///
    /// System messages establish the persona and instructions.
    pub fn system(content: &str) -> Self {
        Self {
            role: Role::System,
            content: content.to_string(),
        }
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompts and instructions
    System,
    /// Messages from the user
    User,
    /// Messages from the AI assistant
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// An ordered, append-only chat history.
///
/// The LLM backend keeps no state between calls, so every follow-up replays
/// the whole history. Appends consume the conversation and hand back the
/// extended value: whoever holds a `Conversation` owns it exclusively, and
/// message order is never changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with a single system message.
    ///
    /// # Example
    /// ```
    /// use finsight::session::{Conversation, Role};
    ///
    /// let conv = Conversation::start("You are a financial advisor.")
    ///     .append_user("Summarize my statement")
    ///     .append_assistant("You spent 1200 on rent.");
    /// assert_eq!(conv.len(), 3);
    /// assert_eq!(conv.messages()[0].role, Role::System);
    /// ```
    pub fn start(system_prompt: &str) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Wrap an existing, already ordered message sequence.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Append a user turn.
    pub fn append_user(self, text: &str) -> Self {
        self.append(Message::user(text))
    }

    /// Append an assistant turn.
    pub fn append_assistant(self, text: &str) -> Self {
        self.append(Message::assistant(text))
    }

    /// Append an arbitrary message.
    pub fn append(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Borrow the messages in turn order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Copy the history into the list sent with the next LLM request.
    pub fn to_message_list(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Consume the conversation, returning its messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if no message has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self::from_messages(messages)
    }
}
