//! Positional scale arguments: `<targets> [min] [max]`.

use crate::bounds::parse_bounds;
use crate::error::{ArgsError, TargetError};
use crate::spec::ScaleSpec;
use crate::target::{resolve_targets, RegionCatalog};
use crate::types::{ScaleRange, Target};

/// Validated targets and bounds for one scale request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleArgs {
    pub targets: Vec<Target>,
    pub range: ScaleRange,
}

impl ScaleArgs {
    pub fn to_spec(&self) -> ScaleSpec {
        ScaleSpec::build(&self.targets, self.range)
    }
}

/// Run the Target Resolver and the Bound Parser over the arguments that
/// follow the deployment identifier. Both must succeed.
pub fn parse_scale_args<S: AsRef<str>>(
    args: &[S],
    catalog: &RegionCatalog,
) -> Result<ScaleArgs, ArgsError> {
    if args.len() > 3 {
        return Err(ArgsError::TooManyArgsForScale { count: args.len() });
    }

    let token = args.first().ok_or(TargetError::Missing)?;
    let targets = resolve_targets(token.as_ref(), catalog)?;

    let min = args.get(1).map(AsRef::as_ref);
    let max = args.get(2).map(AsRef::as_ref);
    let range = parse_bounds(min, max)?;

    Ok(ScaleArgs { targets, range })
}
