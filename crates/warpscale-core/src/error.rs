//! Input-shape errors for scale arguments.
//!
//! All of these are detected before any control-plane call and are
//! permanent: retrying the same arguments fails the same way.

use thiserror::Error;

use crate::types::Bound;

/// Errors from resolving the target token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("missing region or datacenter to scale")]
    Missing,

    #[error("`all` cannot be combined with other regions or datacenters")]
    InvalidAllForScale,

    #[error("invalid region or datacenter \"{0}\"")]
    InvalidRegionOrDCForScale(String),
}

/// Errors from parsing `min`/`max`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundError {
    #[error("invalid <min> \"{0}\": expected a non-negative integer or `auto`")]
    InvalidMinForScale(String),

    #[error("invalid <max> \"{0}\": expected a positive integer or `auto`")]
    InvalidMaxForScale(String),

    #[error("<max> is required when <min> is {min}")]
    InvalidArgsForMinMaxScale { min: Bound },
}

/// Any failure turning a raw argument list into targets and bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Bound(#[from] BoundError),

    #[error("too many arguments: expected `<targets> [min] [max]`, got {count}")]
    TooManyArgsForScale { count: usize },
}
