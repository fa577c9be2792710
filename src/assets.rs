//! Asset loading gate
//!
//! The frame loop must not start until every sprite has decoded. The gate
//! tracks the outstanding images and moves through
//! `Loading -> Ready -> Running`, or to `Failed` on an error or timeout.
//! A failed gate can be retried, which starts a fresh `Loading` round.
//! Every event carries the round it belongs to; events from an earlier
//! round are dropped.

use crate::consts::ASSET_LOAD_TIMEOUT_MS;
use crate::error::{CannonError, Result};

/// Sprites the cannon needs before it can be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    CannonBase,
    CannonBody,
    Projectile,
}

impl AssetId {
    pub const ALL: [AssetId; 3] = [AssetId::CannonBase, AssetId::CannonBody, AssetId::Projectile];

    pub fn url(&self) -> &'static str {
        match self {
            AssetId::CannonBase => "images/cannon_base.png",
            AssetId::CannonBody => "images/cannon_body.png",
            AssetId::Projectile => "images/projectile.png",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssetId::CannonBase => "cannon_base",
            AssetId::CannonBody => "cannon_body",
            AssetId::Projectile => "projectile",
        }
    }
}

/// Gate phase
#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    /// Waiting on images
    Loading,
    /// Every image decoded, loop not yet started
    Ready,
    /// Frame loop scheduled
    Running,
    /// Gave up; `retry` goes back to `Loading`
    Failed(CannonError),
}

impl GateState {
    fn name(&self) -> &'static str {
        match self {
            GateState::Loading => "Loading",
            GateState::Ready => "Ready",
            GateState::Running => "Running",
            GateState::Failed(_) => "Failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetGate {
    state: GateState,
    loaded: [bool; AssetId::ALL.len()],
    started_ms: f64,
    timeout_ms: f64,
    attempts: u32,
}

impl AssetGate {
    /// Begin loading at `now_ms`
    pub fn new(now_ms: f64) -> Self {
        Self::with_timeout(now_ms, ASSET_LOAD_TIMEOUT_MS)
    }

    pub fn with_timeout(now_ms: f64, timeout_ms: f64) -> Self {
        Self {
            state: GateState::Loading,
            loaded: [false; AssetId::ALL.len()],
            started_ms: now_ms,
            timeout_ms,
            attempts: 1,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == GateState::Running
    }

    /// Number of load rounds so far (1 for the first)
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn pending(&self) -> usize {
        self.loaded.iter().filter(|done| !**done).count()
    }

    fn slot(asset: AssetId) -> usize {
        match asset {
            AssetId::CannonBase => 0,
            AssetId::CannonBody => 1,
            AssetId::Projectile => 2,
        }
    }

    /// Look up an asset by name (as used in element ids and logs)
    pub fn asset_by_name(name: &str) -> Result<AssetId> {
        AssetId::ALL
            .into_iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| CannonError::UnknownAsset(name.to_string()))
    }

    /// Whether an event from load round `attempt` still applies
    fn is_current(&self, attempt: u32) -> bool {
        attempt == self.attempts && self.state == GateState::Loading
    }

    /// Record a decoded image from round `attempt`. Events that arrive after
    /// the gate left `Loading`, or from an earlier round, are ignored.
    pub fn asset_loaded(&mut self, attempt: u32, asset: AssetId) -> &GateState {
        if !self.is_current(attempt) {
            log::debug!(
                "Ignoring late load of {} (round {}, gate {} round {})",
                asset.name(),
                attempt,
                self.state.name(),
                self.attempts
            );
            return &self.state;
        }
        self.loaded[Self::slot(asset)] = true;
        log::debug!("Loaded {} ({} pending)", asset.name(), self.pending());
        if self.pending() == 0 {
            log::info!("All assets ready");
            self.state = GateState::Ready;
        }
        &self.state
    }

    /// Record a failed image load from round `attempt`
    pub fn asset_failed(
        &mut self,
        attempt: u32,
        asset: AssetId,
        reason: impl Into<String>,
    ) -> &GateState {
        if self.is_current(attempt) {
            let err = CannonError::AssetLoad {
                name: asset.name().to_string(),
                reason: reason.into(),
            };
            log::error!("{}", err);
            self.state = GateState::Failed(err);
        }
        &self.state
    }

    /// Fail the gate if round `attempt` has taken longer than the timeout
    pub fn poll(&mut self, attempt: u32, now_ms: f64) -> &GateState {
        let elapsed_ms = now_ms - self.started_ms;
        if self.is_current(attempt) && elapsed_ms >= self.timeout_ms {
            let err = CannonError::AssetTimeout {
                elapsed_ms,
                pending: self.pending(),
            };
            log::error!("{}", err);
            self.state = GateState::Failed(err);
        }
        &self.state
    }

    /// `Ready -> Running`
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            GateState::Ready => {
                self.state = GateState::Running;
                log::info!("Frame loop starting");
                Ok(())
            }
            ref other => Err(CannonError::InvalidTransition {
                from: other.name(),
                to: "Running",
            }),
        }
    }

    /// `Failed -> Loading`, forgetting everything loaded so far
    pub fn retry(&mut self, now_ms: f64) -> Result<()> {
        match self.state {
            GateState::Failed(_) => {
                self.state = GateState::Loading;
                self.loaded = [false; AssetId::ALL.len()];
                self.started_ms = now_ms;
                self.attempts += 1;
                log::info!("Retrying asset load (attempt {})", self.attempts);
                Ok(())
            }
            ref other => Err(CannonError::InvalidTransition {
                from: other.name(),
                to: "Loading",
            }),
        }
    }
}
