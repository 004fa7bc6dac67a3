//! End-to-end tests for the category analyzer, its narrator and failure modes

pub mod analyzer_test;
pub mod error_scenarios;
pub mod narrator_test;
