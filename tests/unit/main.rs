//! Table-driven unit tests over the public API.

mod config_tests;
mod parse_tests;
