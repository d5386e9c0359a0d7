//! Cross-module scenarios and shared test doubles

pub mod support;
