//! warpscale-state: local standalone control plane.
//!
//! Backed by [redb](https://docs.rs/redb). Stores deployment records and
//! answers scale requests the way a hosted platform would: plan limits are
//! enforced and reported as rejection codes, accepted specs are realized
//! immediately in the stored scale snapshot.
//!
//! Deployments are JSON-serialized into redb's `&[u8]` value columns,
//! keyed by deployment id. The `StateStore` is `Clone` + `Send` + `Sync`
//! (backed by `Arc<Database>`).

pub mod error;
pub mod plane;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use plane::{LocalControlPlane, PlanLimits};
pub use store::StateStore;
