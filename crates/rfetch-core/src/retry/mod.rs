//! Adaptive retry controller.
//!
//! After every failed read the fetch loop reports the failure and the offset
//! it happened at; the controller answers with a [`Decision`]. Repeated
//! failures at one offset escalate through a fixed ladder of remedies
//! ([`Strategy`]): retry as-is, reopen the connection, shrink the chunk size,
//! lengthen the wait, and finally give up. Any successful read resets the
//! ladder.
//!
//! The controller is plain data: it never sleeps, never touches a connection
//! or a file, and can be driven from tests without a network stack.

mod controller;
mod decision;
mod settings;
mod strategy;

pub use controller::RetryController;
pub use decision::{Decision, RetryPlan};
pub use settings::RetrySettings;
pub use strategy::Strategy;
