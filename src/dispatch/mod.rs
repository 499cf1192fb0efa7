//! Command dispatch: from sampled buttons to exactly one robot action
//!
//! - [`Dispatcher`]: ordered (button, action) table with a stop fallback
//! - [`CaptureSequence`]: the blocking capture-and-announce action
//! - [`Controller`]: the polling loop tying remote, drive and capture together

mod action;
mod capture;
mod controller;
mod table;

pub use action::Action;
#[cfg(test)]
pub use capture::OnFailure;
pub use capture::{CaptureSequence, FailurePolicy};
pub use controller::Controller;
pub use table::Dispatcher;
