//! Scale Spec Builder: the request body sent to the control plane.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::types::{ScaleRange, Target};

/// Target → range mapping for one scale request.
///
/// Built once from resolved targets and a single range; there are no
/// mutating accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaleSpec(BTreeMap<Target, ScaleRange>);

impl ScaleSpec {
    /// Associate every target with the same range.
    pub fn build(targets: &[Target], range: ScaleRange) -> Self {
        Self(targets.iter().map(|t| (t.clone(), range)).collect())
    }

    pub fn get(&self, target: &Target) -> Option<&ScaleRange> {
        self.0.get(target)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Target, ScaleRange> {
        self.0.iter()
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ScaleSpec {
    type Item = (&'a Target, &'a ScaleRange);
    type IntoIter = btree_map::Iter<'a, Target, ScaleRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Target, ScaleRange)> for ScaleSpec {
    fn from_iter<I: IntoIterator<Item = (Target, ScaleRange)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bound;

    #[test]
    fn every_target_gets_the_range() {
        let targets = vec![Target::from("sfo"), Target::from("all-but-sfo")];
        let range = ScaleRange::new(Bound::Count(0), Bound::Count(1));
        let spec = ScaleSpec::build(&targets, range);

        assert_eq!(spec.len(), 2);
        for target in &targets {
            assert_eq!(spec.get(target), Some(&range));
        }
    }

    #[test]
    fn serializes_as_wire_body() {
        let spec = ScaleSpec::build(
            &[Target::from("sfo1"), Target::from("bru")],
            ScaleRange::new(Bound::Count(0), Bound::Auto),
        );
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "bru": { "min": 0, "max": "auto" },
                "sfo1": { "min": 0, "max": "auto" },
            })
        );

        let back: ScaleSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn empty_targets_build_empty_spec() {
        let spec = ScaleSpec::build(&[], ScaleRange::new(Bound::Auto, Bound::Auto));
        assert!(spec.is_empty());
    }
}
