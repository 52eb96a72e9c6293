//! warpscale-engine: drives a scale request against a control plane.
//!
//! # Flow
//!
//! ```text
//! args ──► resolve targets ─┐
//!      └─► parse bounds ────┴─► fetch deployment ─► preconditions
//!                                  ─► build spec ─► apply ─► verify (poll)
//! ```
//!
//! Verification re-fetches the deployment every `poll_interval` until the
//! reported instance counts satisfy the spec, or `verify_timeout` elapses
//! on a monotonic clock. It can be cancelled through a shutdown watch.

pub mod apply;
pub mod error;
pub mod scale;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use apply::apply_scale;
pub use error::{ApplyError, LookupError, PreconditionError, ScaleError, VerifyError};
pub use scale::{ScaleOptions, ScaleOutcome, Scaler};
pub use verify::{is_converged, verify_scale, Timer, TokioTimer, VerificationOutcome, VerifyOptions};
