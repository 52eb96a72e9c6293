//! Target Resolver: turns the target token into validated targets.
//!
//! The token is a comma-separated list of region codes (`sfo`),
//! datacenter codes (`sfo1`, a region code plus an index), or the single
//! literal `all`.

use regex::Regex;

use crate::error::TargetError;
use crate::types::Target;

/// The set of region codes a target may refer to.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<String>,
    /// Matches a known region code with an optional datacenter index.
    code_re: Regex,
}

impl RegionCatalog {
    pub const DEFAULT_REGIONS: &'static [&'static str] = &["bru", "gru", "hnd", "iad", "sfo"];

    pub fn new<I, S>(regions: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut regions: Vec<String> = regions
            .into_iter()
            .map(|r| r.as_ref().trim().to_ascii_lowercase())
            .filter(|r| !r.is_empty())
            .collect();
        regions.sort();
        regions.dedup();

        let alternatives = regions
            .iter()
            .map(|r| regex::escape(r))
            .collect::<Vec<_>>()
            .join("|");
        let code_re = Regex::new(&format!(r"^(?:{alternatives})\d*$"))?;

        Ok(Self { regions, code_re })
    }

    pub fn with_defaults() -> Result<Self, regex::Error> {
        Self::new(Self::DEFAULT_REGIONS)
    }

    /// Known region codes, sorted.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Whether `code` (already lowercased) is a known region or one of
    /// its datacenters.
    pub fn is_known(&self, code: &str) -> bool {
        !self.regions.is_empty() && self.code_re.is_match(code)
    }
}

/// Resolve a target token into an ordered, deduplicated list of targets.
pub fn resolve_targets(token: &str, catalog: &RegionCatalog) -> Result<Vec<Target>, TargetError> {
    let items: Vec<&str> = token.split(',').map(str::trim).collect();

    let is_all = |item: &&str| item.eq_ignore_ascii_case(Target::ALL);
    if items.iter().any(is_all) && !items.iter().all(is_all) {
        return Err(TargetError::InvalidAllForScale);
    }

    let mut targets = Vec::with_capacity(items.len());
    for item in items {
        let code = item.to_ascii_lowercase();
        let target = if code == Target::ALL {
            Target::All
        } else if catalog.is_known(&code) {
            Target::Region(code)
        } else {
            return Err(TargetError::InvalidRegionOrDCForScale(item.to_string()));
        };

        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RegionCatalog {
        RegionCatalog::with_defaults().unwrap()
    }

    #[test]
    fn resolves_regions_and_datacenters() {
        let targets = resolve_targets("sfo,bru1", &catalog()).unwrap();
        assert_eq!(
            targets,
            vec![
                Target::Region("sfo".to_string()),
                Target::Region("bru1".to_string()),
            ]
        );
    }

    #[test]
    fn resolves_all_alone() {
        assert_eq!(resolve_targets("all", &catalog()).unwrap(), vec![Target::All]);
        assert_eq!(resolve_targets("all,ALL", &catalog()).unwrap(), vec![Target::All]);
    }

    #[test]
    fn all_with_other_targets_is_rejected() {
        let err = resolve_targets("all,sfo", &catalog()).unwrap_err();
        assert_eq!(err, TargetError::InvalidAllForScale);

        // Reported even when the other token is itself invalid.
        let err = resolve_targets("nowhere,all", &catalog()).unwrap_err();
        assert_eq!(err, TargetError::InvalidAllForScale);
    }

    #[test]
    fn unknown_code_carries_raw_token() {
        let err = resolve_targets("sfo,Mars9", &catalog()).unwrap_err();
        assert_eq!(err, TargetError::InvalidRegionOrDCForScale("Mars9".to_string()));
    }

    #[test]
    fn malformed_codes_are_rejected() {
        for token in ["sfo-1", "1sfo", "sf", "", "sfo,"] {
            assert!(
                matches!(
                    resolve_targets(token, &catalog()),
                    Err(TargetError::InvalidRegionOrDCForScale(_))
                ),
                "{token:?} should be rejected"
            );
        }
    }

    #[test]
    fn deduplicates_and_lowercases() {
        let targets = resolve_targets("SFO, sfo ,iad", &catalog()).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0], Target::Region("sfo".to_string()));
        assert_eq!(targets[1], Target::Region("iad".to_string()));
    }

    #[test]
    fn custom_catalog_limits_codes() {
        let catalog = RegionCatalog::new(["fra", " FRA ", "lhr"]).unwrap();
        assert_eq!(catalog.regions(), ["fra", "lhr"]);
        assert!(resolve_targets("fra2", &catalog).is_ok());
        assert!(resolve_targets("sfo", &catalog).is_err());
    }

    #[test]
    fn empty_catalog_knows_nothing() {
        let catalog = RegionCatalog::new(Vec::<String>::new()).unwrap();
        assert!(!catalog.is_known("1"));
        assert!(resolve_targets("all", &catalog).is_ok());
    }
}
