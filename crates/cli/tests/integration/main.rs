//! CLI integration tests.

mod common;
mod launch_tests;
mod target_tests;
