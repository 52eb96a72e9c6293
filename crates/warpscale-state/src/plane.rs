//! Local control plane: answers scale requests from the state store.
//!
//! # Evaluation order
//!
//! ```text
//! deployment missing                    → NotFound
//! min > 0, min scale slots unsupported  → not_supported_min_scale_slots
//! min > plan.max_min_instances          → forbidden_min_instances (limit)
//! max > plan.max_max_instances          → forbidden_max_instances (limit)
//! resolved min > resolved max           → invalid_min_max_relation
//! ```
//!
//! `auto` resolves to `0` for `min` and to the plan ceiling for `max`.
//! Accepted specs are realized immediately: `all` expands to every region in
//! the catalog plus every region or datacenter the deployment already
//! reports, and each target's snapshot gets the requested bounds with
//! `current` set to the concrete `min` (or the previous count, clamped to
//! the resolved max, for `auto`).

use std::collections::BTreeSet;

use tracing::{debug, info};

use warpscale_core::plane::codes;
use warpscale_core::*;

use crate::store::StateStore;

/// Instance limits of the plan the local control plane simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    /// Highest concrete `min` allowed.
    pub max_min_instances: u32,
    /// Highest concrete `max` allowed.
    pub max_max_instances: u32,
    /// Whether non-zero minimum instance counts are supported.
    pub min_scale_slots: bool,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            max_min_instances: 10,
            max_max_instances: 10,
            min_scale_slots: true,
        }
    }
}

/// `ControlPlane` backed by a local `StateStore`.
#[derive(Clone)]
pub struct LocalControlPlane {
    store: StateStore,
    limits: PlanLimits,
    catalog: RegionCatalog,
}

impl LocalControlPlane {
    pub fn new(store: StateStore, limits: PlanLimits, catalog: RegionCatalog) -> Self {
        Self {
            store,
            limits,
            catalog,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn limits(&self) -> PlanLimits {
        self.limits
    }

    /// Check `range` against the plan; returns `(min, max)` with `auto`
    /// resolved.
    fn evaluate(&self, range: &ScaleRange) -> Result<(u32, u32), ControlPlaneError> {
        let limits = &self.limits;

        if let Bound::Count(min) = range.min {
            if min > 0 && !limits.min_scale_slots {
                return Err(ControlPlaneError::rejected(
                    codes::NOT_SUPPORTED_MIN_SCALE_SLOTS,
                    "non-zero minimum instances are not supported",
                    None,
                ));
            }
            if min > limits.max_min_instances {
                return Err(ControlPlaneError::rejected(
                    codes::FORBIDDEN_MIN_INSTANCES,
                    format!("min {min} exceeds the plan limit"),
                    Some(limits.max_min_instances),
                ));
            }
        }

        if let Bound::Count(max) = range.max
            && max > limits.max_max_instances
        {
            return Err(ControlPlaneError::rejected(
                codes::FORBIDDEN_MAX_INSTANCES,
                format!("max {max} exceeds the plan limit"),
                Some(limits.max_max_instances),
            ));
        }

        let min = range.min.count().unwrap_or(0);
        let max = range.max.count().unwrap_or(limits.max_max_instances);
        if min > max {
            return Err(ControlPlaneError::rejected(
                codes::INVALID_MIN_MAX_RELATION,
                format!("min {min} is greater than max {max}"),
                None,
            ));
        }

        Ok((min, max))
    }

    fn realize(
        &self,
        deployment: &mut Deployment,
        target: &Target,
        range: &ScaleRange,
        (min, max): (u32, u32),
    ) {
        let keys: BTreeSet<String> = match target {
            Target::All => self
                .catalog
                .regions()
                .iter()
                .chain(deployment.scale.keys())
                .cloned()
                .collect(),
            Target::Region(code) => BTreeSet::from([code.clone()]),
        };

        for code in keys {
            let previous = deployment.scale.get(&code).map_or(0, |s| s.current);
            let current = match range.min {
                Bound::Count(n) => n,
                Bound::Auto => previous.clamp(min, max),
            };
            debug!(deployment = %deployment.id, region = %code, current, "scale realized");
            deployment.scale.insert(
                code,
                ScaleSnapshot {
                    min: range.min,
                    max: range.max,
                    current,
                },
            );
        }
    }
}

impl ControlPlane for LocalControlPlane {
    async fn get_deployment(&self, id_or_host: &str) -> Result<Deployment, ControlPlaneError> {
        self.store
            .find_deployment(id_or_host)?
            .ok_or_else(|| ControlPlaneError::NotFound(id_or_host.to_string()))
    }

    async fn update_scale(
        &self,
        deployment_id: &str,
        spec: &ScaleSpec,
    ) -> Result<ScaleSpec, ControlPlaneError> {
        let updated = self.store.modify_deployment(deployment_id, |deployment| {
            let resolved = spec
                .iter()
                .map(|(target, range)| self.evaluate(range).map(|r| (target, range, r)))
                .collect::<Result<Vec<_>, _>>()?;

            for (target, range, bounds) in resolved {
                self.realize(deployment, target, range, bounds);
            }
            Ok::<_, ControlPlaneError>(())
        })?;

        match updated {
            Some(()) => {
                info!(deployment = %deployment_id, targets = spec.len(), "scale applied");
                Ok(spec.clone())
            }
            None => Err(ControlPlaneError::NotFound(deployment_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn plane(limits: PlanLimits) -> LocalControlPlane {
        let store = StateStore::open_in_memory().unwrap();
        store
            .put_deployment(&Deployment {
                id: "dpl_api".to_string(),
                url: "https://api-x1y2.example.sh".to_string(),
                deployment_type: DeploymentType::Npm,
                state: DeploymentState::Ready,
                scale: BTreeMap::new(),
            })
            .unwrap();
        let catalog = RegionCatalog::new(["sfo", "bru"]).unwrap();
        LocalControlPlane::new(store, limits, catalog)
    }

    fn spec(target: &str, min: Bound, max: Bound) -> ScaleSpec {
        ScaleSpec::build(&[Target::from(target)], ScaleRange::new(min, max))
    }

    fn rejection_code(err: ControlPlaneError) -> (String, Option<u32>) {
        match err {
            ControlPlaneError::Rejected { code, limit, .. } => (code, limit),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn realizes_concrete_min() {
        let plane = plane(PlanLimits::default());
        let requested = spec("sfo1", Bound::Count(2), Bound::Count(4));

        let accepted = plane.update_scale("dpl_api", &requested).await.unwrap();
        assert_eq!(accepted, requested);

        let deployment = plane.get_deployment("dpl_api").await.unwrap();
        assert_eq!(
            deployment.scale["sfo1"],
            ScaleSnapshot {
                min: Bound::Count(2),
                max: Bound::Count(4),
                current: 2
            }
        );
    }

    #[tokio::test]
    async fn all_expands_to_catalog() {
        let plane = plane(PlanLimits::default());
        plane
            .update_scale("dpl_api", &spec("all", Bound::Auto, Bound::Auto))
            .await
            .unwrap();

        let deployment = plane.get_deployment("api-x1y2.example.sh").await.unwrap();
        let regions: Vec<&str> = deployment.scale.keys().map(String::as_str).collect();
        assert_eq!(regions, ["bru", "sfo"]);
        assert!(deployment.scale.values().all(|s| s.current == 0));
    }

    #[tokio::test]
    async fn all_covers_previously_scaled_datacenters() {
        let plane = plane(PlanLimits::default());
        plane
            .update_scale("dpl_api", &spec("sfo1", Bound::Count(1), Bound::Count(2)))
            .await
            .unwrap();
        plane
            .update_scale("dpl_api", &spec("all", Bound::Count(2), Bound::Count(4)))
            .await
            .unwrap();

        let deployment = plane.get_deployment("dpl_api").await.unwrap();
        let regions: Vec<&str> = deployment.scale.keys().map(String::as_str).collect();
        assert_eq!(regions, ["bru", "sfo", "sfo1"]);
        assert!(deployment.scale.values().all(|s| s.current == 2));
    }

    #[tokio::test]
    async fn auto_min_keeps_previous_count_within_max() {
        let plane = plane(PlanLimits::default());
        plane
            .update_scale("dpl_api", &spec("sfo", Bound::Count(5), Bound::Count(5)))
            .await
            .unwrap();
        plane
            .update_scale("dpl_api", &spec("sfo", Bound::Auto, Bound::Count(3)))
            .await
            .unwrap();

        let deployment = plane.get_deployment("dpl_api").await.unwrap();
        assert_eq!(deployment.scale["sfo"].current, 3);
    }

    #[tokio::test]
    async fn plan_limits_are_enforced() {
        let limits = PlanLimits {
            max_min_instances: 2,
            max_max_instances: 4,
            min_scale_slots: true,
        };
        let plane = plane(limits);

        let err = plane
            .update_scale("dpl_api", &spec("sfo", Bound::Count(3), Bound::Count(4)))
            .await
            .unwrap_err();
        assert_eq!(
            rejection_code(err),
            (codes::FORBIDDEN_MIN_INSTANCES.to_string(), Some(2))
        );

        let err = plane
            .update_scale("dpl_api", &spec("sfo", Bound::Count(1), Bound::Count(9)))
            .await
            .unwrap_err();
        assert_eq!(
            rejection_code(err),
            (codes::FORBIDDEN_MAX_INSTANCES.to_string(), Some(4))
        );
    }

    #[tokio::test]
    async fn inverted_relation_after_auto_resolution() {
        let plane = plane(PlanLimits::default());

        let err = plane
            .update_scale("dpl_api", &spec("sfo", Bound::Count(3), Bound::Count(1)))
            .await
            .unwrap_err();
        assert_eq!(rejection_code(err).0, codes::INVALID_MIN_MAX_RELATION);

        // `auto` max resolves to the plan ceiling (10), so 3 is fine.
        assert!(
            plane
                .update_scale("dpl_api", &spec("sfo", Bound::Count(3), Bound::Auto))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn min_scale_slots_unsupported() {
        let plane = plane(PlanLimits {
            min_scale_slots: false,
            ..PlanLimits::default()
        });

        let err = plane
            .update_scale("dpl_api", &spec("sfo", Bound::Count(1), Bound::Count(2)))
            .await
            .unwrap_err();
        assert_eq!(rejection_code(err).0, codes::NOT_SUPPORTED_MIN_SCALE_SLOTS);

        assert!(
            plane
                .update_scale("dpl_api", &spec("sfo", Bound::Count(0), Bound::Count(2)))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn rejected_spec_leaves_state_untouched() {
        let plane = plane(PlanLimits::default());
        let _ = plane
            .update_scale("dpl_api", &spec("sfo", Bound::Count(3), Bound::Count(1)))
            .await;

        let deployment = plane.get_deployment("dpl_api").await.unwrap();
        assert!(deployment.scale.is_empty());
    }

    #[tokio::test]
    async fn unknown_deployment() {
        let plane = plane(PlanLimits::default());

        assert_eq!(
            plane.get_deployment("nope").await.unwrap_err(),
            ControlPlaneError::NotFound("nope".to_string())
        );
        assert_eq!(
            plane
                .update_scale("nope", &spec("sfo", Bound::Auto, Bound::Auto))
                .await
                .unwrap_err(),
            ControlPlaneError::NotFound("nope".to_string())
        );
    }
}
