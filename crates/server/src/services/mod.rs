//! Business logic services for the server.
//!
//! # Services
//!
//! - `orders` - Order creation and payment intent reconciliation
//! - `guest` - Guest session registration and guest-to-user migration

pub mod guest;
pub mod orders;

pub use guest::{GuestService, GuestServiceError};
pub use orders::{CreatedOrder, OrderError, OrderService};
