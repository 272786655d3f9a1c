//! Property tests for parsing, similarity and diffing.

mod determinism_tests;
mod roundtrip_tests;
