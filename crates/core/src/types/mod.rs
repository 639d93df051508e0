//! Core types for Meridian Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod guest;
pub mod id;
pub mod order;
pub mod payment;
pub mod status;

pub use address::Address;
pub use guest::GuestId;
pub use id::*;
pub use order::{CartLine, Order, OrderDraft, amount_in_minor_units};
pub use payment::{AccountType, PaymentMethodKind, PaymentMethodRef, Platform};
pub use status::*;
