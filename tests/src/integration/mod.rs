//! Cross-crate integration flows.

pub mod fixtures;

mod calculator;
mod flows;
