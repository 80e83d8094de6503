//! Utils module - logging setup and string helpers

pub mod logging;
pub mod string;
