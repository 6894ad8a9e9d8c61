//! Host-facing engine.
//!
//! [`Engine`] owns the snapshot, the resolver, and the profile source, and
//! exposes the three calls a host hook needs:
//!
//! - [`tick`](Engine::tick) once per frame: gate, refresh, and profile sync
//! - [`resolve`](Engine::resolve) at the action-invocation interception point
//! - [`on_action_used`](Engine::on_action_used) after the real invocation
//!
//! Nothing here propagates errors out of `resolve`. Profile failures are
//! logged and leave the engine without a profile, which resolves every press
//! to identity.
use std::sync::Arc;

use combo_core::{
    ActionId, ActionResolver, ComboError, Decision, JobId, ObjectId, Observer, ProfileSource,
    ResolverDiagnostics, SnapshotDiagnostics, WorldRules, WorldSnapshot,
};
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::gate::{UpdateGate, UpdateSkipReason};

/// Result of one [`Engine::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Updated,
    Skipped(UpdateSkipReason),
}

impl TickOutcome {
    pub fn is_updated(self) -> bool {
        matches!(self, Self::Updated)
    }
}

pub struct Engine<S, C = SystemClock> {
    config: RuntimeConfig,
    snapshot: WorldSnapshot,
    resolver: ActionResolver,
    source: S,
    clock: C,
    gate: UpdateGate,
    /// Job and level the current profile (or failed attempt) was built for.
    profile_key: Option<(JobId, u8)>,
    last_skip: Option<UpdateSkipReason>,
}

impl<S: ProfileSource> Engine<S> {
    /// Create a new engine builder
    pub fn builder(observer: impl Observer + 'static, source: S) -> EngineBuilder<S> {
        EngineBuilder::new(observer, source)
    }
}

impl<S: ProfileSource, C: Clock> Engine<S, C> {
    // ========================================================================
    // Tick
    // ========================================================================

    /// Runs the update gate and, if it passes, refreshes the snapshot and
    /// rebuilds the profile when the player's job or level changed.
    pub fn tick(&mut self) -> TickOutcome {
        if let Err(reason) = self.gate.check(self.snapshot.observer()) {
            if self.last_skip != Some(reason) {
                debug!(target: "combo::engine", reason = %reason, "tick skipped");
            }
            self.last_skip = Some(reason);
            return TickOutcome::Skipped(reason);
        }
        self.last_skip = None;

        self.snapshot.update();
        self.sync_profile();
        trace!(
            target: "combo::engine",
            tick = %self.snapshot.tick(),
            in_combat = self.snapshot.in_combat(),
            "snapshot updated"
        );
        TickOutcome::Updated
    }

    fn sync_profile(&mut self) {
        let Some(player) = self.snapshot.player() else {
            return;
        };
        let key = (player.job, player.level);
        if self.profile_key == Some(key) {
            return;
        }
        self.profile_key = Some(key);

        let (job, level) = key;
        match self.activate(job, level) {
            Ok(()) => info!(
                target: "combo::engine",
                job = %job,
                level,
                profile = self.resolver.profile().map_or("", |p| p.name()),
                anchors = self.snapshot.anchors().len(),
                "profile activated"
            ),
            Err(err) => warn!(
                target: "combo::engine",
                job = %job,
                level,
                code = err.error_code(),
                severity = err.severity().as_str(),
                error = %err,
                "no profile active"
            ),
        }
    }

    /// Builds and installs the profile for `job` at `level`, replacing the
    /// current one. On failure the engine is left without a profile.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::UnknownJob`] when the source has no profile for the
    /// job, [`RuntimeError::Profile`] when building or installing it fails.
    pub fn activate(&mut self, job: JobId, level: u8) -> Result<()> {
        let profile = match self.source.build_profile(job, level) {
            Some(Ok(profile)) => profile,
            Some(Err(source)) => {
                self.resolver.clear(&mut self.snapshot);
                return Err(RuntimeError::Profile { job, level, source });
            }
            None => {
                self.resolver.clear(&mut self.snapshot);
                return Err(RuntimeError::UnknownJob { job, level });
            }
        };

        if let Err(source) = self.resolver.install(profile, &mut self.snapshot) {
            self.resolver.clear(&mut self.snapshot);
            return Err(RuntimeError::Profile { job, level, source });
        }
        Ok(())
    }

    /// Forces a profile rebuild on the next updating tick.
    pub fn reload_profile(&mut self) {
        self.profile_key = None;
    }

    // ========================================================================
    // Interception
    // ========================================================================

    pub fn resolve(&mut self, pressed: ActionId, current_target: Option<ObjectId>) -> Decision {
        let now = self.clock.now();
        let opener_was_active = self.resolver.opener().is_active();

        let decision = self
            .resolver
            .resolve(&self.snapshot, pressed, current_target, now);

        if opener_was_active && !self.resolver.opener().is_active() {
            info!(target: "combo::engine", "opener timed out");
        }
        if decision.is_none() {
            trace!(target: "combo::engine", pressed = %pressed, "identity");
        } else {
            debug!(
                target: "combo::engine",
                tick = %self.snapshot.tick(),
                pressed = %pressed,
                decision = %decision,
                "resolved"
            );
        }
        decision
    }

    pub fn on_action_used(&mut self, success: bool, action: ActionId) {
        let now = self.clock.now();
        let opener_was_active = self.resolver.opener().is_active();

        self.resolver
            .on_action_used(&mut self.snapshot, success, action, now);

        trace!(target: "combo::engine", action = %action, success, "action used");
        if opener_was_active && !self.resolver.opener().is_active() {
            info!(target: "combo::engine", "opener finished");
        }
    }

    /// Arms the active profile's opener. Returns false when it has none.
    pub fn arm_opener(&mut self) -> bool {
        let armed = self.resolver.arm_opener(self.clock.now());
        match self.resolver.opener().opener() {
            Some(opener) if armed => info!(
                target: "combo::engine",
                opener = opener.name(),
                steps = opener.len(),
                "opener armed"
            ),
            _ => debug!(target: "combo::engine", "no opener to arm"),
        }
        armed
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &WorldSnapshot {
        &self.snapshot
    }

    pub fn resolver(&self) -> &ActionResolver {
        &self.resolver
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn active_job(&self) -> Option<JobId> {
        self.resolver.job()
    }

    pub fn diagnostics(&self) -> EngineDiagnostics {
        EngineDiagnostics {
            snapshot: self.snapshot.diagnostics(),
            resolver: self.resolver.diagnostics(self.clock.now()),
            profile_key: self.profile_key,
            last_skip: self.last_skip,
        }
    }
}

/// Read-only projection of engine state for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineDiagnostics {
    pub snapshot: SnapshotDiagnostics,
    pub resolver: ResolverDiagnostics,
    pub profile_key: Option<(JobId, u8)>,
    pub last_skip: Option<UpdateSkipReason>,
}

/// Builder for [`Engine`].
#[must_use]
pub struct EngineBuilder<S, C = SystemClock> {
    snapshot: WorldSnapshot,
    source: S,
    clock: C,
    config: RuntimeConfig,
    rules: Option<Arc<WorldRules>>,
}

impl<S: ProfileSource> EngineBuilder<S> {
    fn new(observer: impl Observer + 'static, source: S) -> Self {
        Self {
            snapshot: WorldSnapshot::new(observer),
            source,
            clock: SystemClock::new(),
            config: RuntimeConfig::default(),
            rules: None,
        }
    }
}

impl<S: ProfileSource, C: Clock> EngineBuilder<S, C> {
    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Shared job-to-role table for role buckets.
    pub fn world_rules(mut self, rules: Arc<WorldRules>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Replace the time source
    pub fn clock<C2: Clock>(self, clock: C2) -> EngineBuilder<S, C2> {
        EngineBuilder {
            snapshot: self.snapshot,
            source: self.source,
            clock,
            config: self.config,
            rules: self.rules,
        }
    }

    pub fn build(self) -> Engine<S, C> {
        let mut snapshot = self.snapshot.with_config(self.config.engine);
        if let Some(rules) = self.rules {
            snapshot = snapshot.with_rules(rules);
        }
        Engine {
            config: self.config,
            snapshot,
            resolver: ActionResolver::new(self.config.engine),
            source: self.source,
            clock: self.clock,
            gate: UpdateGate::new(self.config.non_combat_interval),
            profile_key: None,
            last_skip: None,
        }
    }
}
