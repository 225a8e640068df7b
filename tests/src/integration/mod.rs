//! Cross-component transfer flows.

pub mod flows;
