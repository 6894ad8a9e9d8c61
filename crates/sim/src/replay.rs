//! Scenario replay through a real [`Engine`].
use std::fmt;
use std::sync::Arc;

use combo_core::{ActionId, Decision, FixtureObserver, ObjectId, Tick, Timestamp, WorldRules};
use combo_jobs::JobCatalog;
use combo_runtime::{
    Clock, Engine, EngineDiagnostics, ManualClock, RuntimeConfig, TickOutcome,
};
use tracing::{debug, info, warn};

use crate::scenario::Scenario;

/// One press and what the engine made of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PressReport {
    pub frame: usize,
    pub tick: Tick,
    pub pressed: ActionId,
    pub target: Option<ObjectId>,
    pub decision: Decision,
    /// Action handed back to the host.
    pub performed: ActionId,
    pub success: bool,
    pub expected: Option<ActionId>,
}

impl PressReport {
    pub fn met_expectation(&self) -> bool {
        self.expected.is_none_or(|expected| expected == self.performed)
    }
}

impl fmt::Display for PressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {:>3} {:>5} press {:>6} -> {:>6}  {}",
            self.frame, self.tick, self.pressed, self.performed, self.decision
        )?;
        if !self.success {
            f.write_str("  (failed)")?;
        }
        match self.expected {
            Some(expected) if expected != self.performed => {
                write!(f, "  MISMATCH expected {expected}")
            }
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameReport {
    pub index: usize,
    pub at: Timestamp,
    pub outcome: TickOutcome,
    pub presses: Vec<PressReport>,
}

#[derive(Clone, Debug)]
pub struct ReplayReport {
    pub name: String,
    pub frames: Vec<FrameReport>,
    pub diagnostics: EngineDiagnostics,
}

impl ReplayReport {
    pub fn presses(&self) -> impl Iterator<Item = &PressReport> {
        self.frames.iter().flat_map(|f| f.presses.iter())
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &PressReport> {
        self.presses().filter(|p| !p.met_expectation())
    }

    pub fn passed(&self) -> bool {
        self.mismatches().next().is_none()
    }
}

/// Replays `scenario` from a clock at zero, using the bundled job catalog.
pub fn replay(scenario: &Scenario, config: RuntimeConfig, rules: Arc<WorldRules>) -> ReplayReport {
    let observer = FixtureObserver::new(scenario.initial_world());
    let world = observer.handle();
    let clock = ManualClock::new(0);
    let mut engine = Engine::builder(observer, JobCatalog::new())
        .config(config)
        .world_rules(rules)
        .clock(clock.clone())
        .build();

    info!(
        target: "combo::sim",
        scenario = %scenario.name,
        frames = scenario.frames.len(),
        "replay started"
    );

    let mut frames = Vec::with_capacity(scenario.frames.len());
    for (index, frame) in scenario.frames.iter().enumerate() {
        clock.advance(frame.advance_ms.unwrap_or(scenario.frame_ms));
        if !frame.edits.is_empty() {
            world.edit(|w| frame.edits.iter().for_each(|edit| edit.apply(w)));
            debug!(target: "combo::sim", frame = index, edits = frame.edits.len(), "world edited");
        }

        let outcome = engine.tick();
        if index == 0 && scenario.opener && !engine.arm_opener() {
            warn!(target: "combo::sim", "scenario requests an opener but the profile has none");
        }

        let mut presses = Vec::with_capacity(frame.presses.len());
        for press in &frame.presses {
            let target = press.target.or_else(|| engine.snapshot().hard_target());
            let decision = engine.resolve(press.action, target);
            let performed = decision.action_or(press.action);
            engine.on_action_used(press.success, performed);

            let report = PressReport {
                frame: index,
                tick: engine.snapshot().tick(),
                pressed: press.action,
                target,
                decision,
                performed,
                success: press.success,
                expected: press.expect,
            };
            if !report.met_expectation() {
                warn!(
                    target: "combo::sim",
                    frame = index,
                    pressed = %press.action,
                    performed = %performed,
                    "unexpected substitution"
                );
            }
            presses.push(report);
        }

        frames.push(FrameReport {
            index,
            at: clock.now(),
            outcome,
            presses,
        });
    }

    ReplayReport {
        name: scenario.name.clone(),
        frames,
        diagnostics: engine.diagnostics(),
    }
}
