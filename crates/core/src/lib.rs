//! Meridian Core - Shared types library.
//!
//! This crate provides common types used across all Meridian components:
//! - `checkout` - Client-side checkout orchestration library
//! - `server` - Order creation and payment reconciliation backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, addresses, payment
//!   methods, guest identities, and order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
