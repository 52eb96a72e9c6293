//! Test doubles for the control plane and the clock.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use warpscale_core::*;

use crate::verify::Timer;

/// Scripted control plane.
///
/// Each `get_deployment` pops the next scale snapshot from `snapshots`
/// (repeating the last one when exhausted).
pub struct MockPlane {
    deployment: Deployment,
    snapshots: Mutex<VecDeque<BTreeMap<String, ScaleSnapshot>>>,
    rejection: Option<ControlPlaneError>,
    /// Fetches after this many never complete.
    hang_after: Option<usize>,
    pub fetches: AtomicUsize,
    pub updates: AtomicUsize,
}

impl MockPlane {
    pub fn new(deployment: Deployment) -> Self {
        Self {
            deployment,
            snapshots: Mutex::new(VecDeque::new()),
            rejection: None,
            hang_after: None,
            fetches: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn with_snapshots(self, snapshots: Vec<BTreeMap<String, ScaleSnapshot>>) -> Self {
        *self.snapshots.lock().unwrap() = snapshots.into();
        self
    }

    pub fn rejecting(mut self, err: ControlPlaneError) -> Self {
        self.rejection = Some(err);
        self
    }

    pub fn hang_after(mut self, fetches: usize) -> Self {
        self.hang_after = Some(fetches);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl ControlPlane for MockPlane {
    async fn get_deployment(&self, id_or_host: &str) -> Result<Deployment, ControlPlaneError> {
        let seen = self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.hang_after.is_some_and(|n| seen >= n) {
            std::future::pending::<()>().await;
        }
        if id_or_host != self.deployment.id && id_or_host != self.deployment.host() {
            return Err(ControlPlaneError::NotFound(id_or_host.to_string()));
        }

        let mut deployment = self.deployment.clone();
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.len() > 1 {
            deployment.scale = snapshots.pop_front().unwrap_or_default();
        } else if let Some(last) = snapshots.front() {
            deployment.scale = last.clone();
        }
        Ok(deployment)
    }

    async fn update_scale(
        &self,
        _deployment_id: &str,
        spec: &ScaleSpec,
    ) -> Result<ScaleSpec, ControlPlaneError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        match &self.rejection {
            Some(err) => Err(err.clone()),
            None => Ok(spec.clone()),
        }
    }
}

/// Clock that only moves when slept on.
pub struct ManualTimer {
    start: Instant,
    elapsed: Mutex<Duration>,
    pub sleeps: AtomicUsize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: AtomicUsize::new(0),
        }
    }

    pub fn sleep_count(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        *self.elapsed.lock().unwrap() += duration;
    }
}

pub fn deployment(deployment_type: DeploymentType) -> Deployment {
    Deployment {
        id: "dpl_api".to_string(),
        url: "https://api-x1y2.example.sh".to_string(),
        deployment_type,
        state: DeploymentState::Ready,
        scale: BTreeMap::new(),
    }
}

pub fn snapshot(entries: &[(&str, u32)]) -> BTreeMap<String, ScaleSnapshot> {
    entries
        .iter()
        .map(|(code, current)| {
            (
                code.to_string(),
                ScaleSnapshot {
                    min: Bound::Count(*current),
                    max: Bound::Auto,
                    current: *current,
                },
            )
        })
        .collect()
}
