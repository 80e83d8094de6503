//! Finsight - bank statement analysis and financial advice from an LLM

pub mod advisor;
pub mod config;
pub mod documents;
pub mod error;
pub mod providers;
pub mod report;
#[cfg(feature = "server")]
pub mod server;
pub mod session;
pub mod utils;

pub use advisor::{
    Advisor, AdvisorSettings, ExpenseMap, FinancialSummary, NumericMode, TokenBudgeter,
};
pub use config::Config;
pub use error::{ErrorKind, FinsightError, ProviderError, Result};
pub use providers::{ChatOptions, Credentials, LLMProvider, LLMResponse, OpenAIProvider, Usage};
pub use session::{Conversation, Message, Role};
