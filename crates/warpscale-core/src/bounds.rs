//! Bound Parser: `min` and `max` tokens.
//!
//! `min` defaults to `0` and `max` to `1`. A `min` of `auto` has no sensible
//! default `max`, so one must be given. The `min <= max` relation is left to
//! the control plane, which knows the plan limits `auto` resolves against.

use crate::error::BoundError;
use crate::types::{Bound, ScaleRange};

pub const DEFAULT_MIN: u32 = 0;
pub const DEFAULT_MAX: u32 = 1;

/// Parse the optional `min` and `max` tokens into a range.
pub fn parse_bounds(min: Option<&str>, max: Option<&str>) -> Result<ScaleRange, BoundError> {
    let min = parse_min(min)?;
    let max = parse_max(max, min)?;
    Ok(ScaleRange::new(min, max))
}

pub fn parse_min(raw: Option<&str>) -> Result<Bound, BoundError> {
    let Some(raw) = raw else {
        return Ok(Bound::Count(DEFAULT_MIN));
    };

    parse_bound(raw).ok_or_else(|| BoundError::InvalidMinForScale(raw.to_string()))
}

pub fn parse_max(raw: Option<&str>, min: Bound) -> Result<Bound, BoundError> {
    let Some(raw) = raw else {
        return match min {
            Bound::Auto => Err(BoundError::InvalidArgsForMinMaxScale { min }),
            Bound::Count(_) => Ok(Bound::Count(DEFAULT_MAX)),
        };
    };

    match parse_bound(raw) {
        Some(Bound::Count(0)) | None => Err(BoundError::InvalidMaxForScale(raw.to_string())),
        Some(bound) => Ok(bound),
    }
}

fn parse_bound(raw: &str) -> Option<Bound> {
    if raw == Bound::AUTO {
        return Some(Bound::Auto);
    }
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().map(Bound::Count)
}
