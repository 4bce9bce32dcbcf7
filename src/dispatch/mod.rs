//! # Dispatch
//!
//! The calling convention shared by every backend adapter:
//! `Payload -> Dispatcher::predict -> Prediction`.

pub mod dispatcher;
pub mod payload;

pub use dispatcher::Dispatcher;
pub use payload::{Payload, Prediction};
