//! Utility modules.

pub mod time;

pub use time::{format_unix_seconds, GeneralizedTime};
