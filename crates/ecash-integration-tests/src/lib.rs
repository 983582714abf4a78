//! Integration test crate for the ecash core.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end flows across the crypto, types and mint crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p ecash-integration-tests
//! ```
