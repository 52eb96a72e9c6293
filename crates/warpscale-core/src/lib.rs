//! warpscale-core: types and pure parsing for deployment scale requests.
//!
//! A scale request is a raw positional argument list
//! (`<targets> [min] [max]`) that resolves into a [`ScaleSpec`]: one
//! [`ScaleRange`] per datacenter or region. Everything in this crate is
//! synchronous and side-effect free apart from reading a config file.
//!
//! # Components
//!
//! - **`target`**: Target Resolver (`sfo,bru`, `all`, `sfo1`)
//! - **`bounds`**: Bound Parser (`min`/`max`, numeric or `auto`)
//! - **`spec`**: Scale Spec Builder
//! - **`args`**: runs the resolver and the parser over one argument list
//! - **`plane`**: the `ControlPlane` collaborator trait
//! - **`config`**: `warpscale.toml` client configuration

pub mod args;
pub mod bounds;
pub mod config;
pub mod error;
pub mod plane;
pub mod spec;
pub mod target;
pub mod types;

pub use args::{parse_scale_args, ScaleArgs};
pub use config::ClientConfig;
pub use error::{ArgsError, BoundError, TargetError};
pub use plane::{ControlPlane, ControlPlaneError};
pub use spec::ScaleSpec;
pub use target::{resolve_targets, RegionCatalog};
pub use types::*;
