//! Integration tests for Meridian Market.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p meridian-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Full checkout runs from empty state to submitted order
//! - `guest_migration` - Guest session lifecycle and guest-to-user migration
//! - `progress_restore` - Saved checkout progress across app restarts
//!
//! The tests drive the real state machine and services against in-memory
//! boundary fakes; nothing here needs a database or network.
