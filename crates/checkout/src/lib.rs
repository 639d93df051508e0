//! Meridian checkout orchestration library.
//!
//! This crate holds the client-side half of the order flow: a pure checkout
//! state machine, the address defaulting policy, guest-to-user identity
//! migration, and order submission against a server boundary.
//!
//! # Architecture
//!
//! The state machine never performs I/O. Asynchronous operations (address
//! fetch, guest session creation, order submission) live behind the traits
//! in [`boundary`]; their results are fed back into the machine as ordinary
//! actions, keeping the reducer pure and the effect boundary narrow.
//!
//! Every collaborator is injected through a constructor rather than looked
//! up ambiently, so each piece is testable with in-memory fakes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod boundary;
pub mod defaults;
pub mod error;
pub mod guest;
pub mod payment_methods;
pub mod progress;
pub mod state;
pub mod submit;

pub use boundary::{
    AddressStore, BoundaryError, IdentityBoundary, MigrationReport, OrderBoundary,
    OrderConfirmation,
};
pub use defaults::seed_default_addresses;
pub use error::{GuestError, SubmissionError, ValidationError, ValidationField};
pub use guest::{GuestIdentityMigrator, GuestSessionStore, MigrationOutcome};
pub use payment_methods::available_payment_methods;
pub use progress::{SavedProgress, restore, snapshot};
pub use state::{BillingChoice, CheckoutAction, CheckoutMachine, CheckoutState, reduce};
pub use submit::OrderSubmissionService;
