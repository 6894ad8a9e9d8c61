//! Per-press orchestration.
//!
//! [`ActionResolver`] owns the active [`JobProfile`] and turns one press into
//! one [`Decision`]:
//!
//! 1. Presses that are neither anchors nor retrace-eligible pass through.
//! 2. A forced target is computed for the pressed action. Out of combat this
//!    target override is the whole decision.
//! 3. In combat, an anchor press asks the armed opener first, then the
//!    anchor's rule (primary lane), then the rule's secondary pass.
//! 4. A retrace-eligible replacement gets its own forced target.
//!
//! Confirmed action use flows back through
//! [`on_action_used`](ActionResolver::on_action_used), which is the only
//! place sequences advance.
use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::decision::Decision;
use crate::error::ProfileError;
use crate::opener::OpenerExecutor;
use crate::profile::JobProfile;
use crate::retrace::auto_target;
use crate::rule::Suggestion;
use crate::snapshot::WorldSnapshot;
use crate::types::{ActionId, JobId, Lane, ObjectId, Tick, Timestamp};

/// Suggestion computed for one anchor during the memo's tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Memo {
    anchor: ActionId,
    suggestion: Suggestion,
    source: ResolutionSource,
}

/// Where the last anchor resolution came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionSource {
    #[default]
    Identity,
    Opener,
    Rule,
    Secondary,
}

#[derive(Clone, Copy, Debug, Default)]
struct LastResolution {
    anchor: Option<ActionId>,
    suggestion: Option<Suggestion>,
    source: ResolutionSource,
    decision: Decision,
}

#[derive(Debug)]
pub struct ActionResolver {
    config: EngineConfig,
    profile: Option<JobProfile>,
    opener: OpenerExecutor,
    pending_secondary: Option<ActionId>,
    last_secondary_fire: Option<Timestamp>,
    memo_tick: Tick,
    memo: ArrayVec<Memo, { EngineConfig::MAX_ANCHORS }>,
    last: LastResolution,
}

impl ActionResolver {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            profile: None,
            opener: OpenerExecutor::new(),
            pending_secondary: None,
            last_secondary_fire: None,
            memo_tick: Tick::ZERO,
            memo: ArrayVec::new(),
            last: LastResolution::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profile(&self) -> Option<&JobProfile> {
        self.profile.as_ref()
    }

    // ========================================================================
    // Profile lifecycle
    // ========================================================================

    /// Activates `profile`, discarding the previous one and all carried state.
    ///
    /// The snapshot's tracked cooldowns, debuff mappings, and anchors are
    /// replaced and its derived caches dropped.
    ///
    /// # Errors
    ///
    /// Propagates snapshot configuration errors. Profiles built through
    /// [`ProfileBuilder`](crate::profile::ProfileBuilder) are already within
    /// capacity.
    pub fn install(&mut self, mut profile: JobProfile, snapshot: &mut WorldSnapshot) -> Result<(), ProfileError> {
        self.clear(snapshot);

        snapshot.configure_cooldowns(profile.cooldowns())?;
        for mapping in profile.debuffs() {
            snapshot.configure_debuff(mapping.clone())?;
        }
        snapshot.configure_anchors(profile.anchors())?;

        for rule in profile.rules_mut() {
            rule.reset();
        }
        self.opener.install(profile.opener().cloned());
        self.profile = Some(profile);
        Ok(())
    }

    /// Drops the active profile and every piece of state derived from it.
    pub fn clear(&mut self, snapshot: &mut WorldSnapshot) {
        self.profile = None;
        self.opener.install(None);
        self.pending_secondary = None;
        self.last_secondary_fire = None;
        self.memo.clear();
        self.last = LastResolution::default();
        snapshot.clear_tracking();
    }

    pub fn job(&self) -> Option<JobId> {
        self.profile.as_ref().map(JobProfile::job)
    }

    pub fn is_anchor(&self, action: ActionId) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|p| p.anchors().contains(&action))
    }

    /// Arms the installed opener. Returns false when the profile has none.
    pub fn arm_opener(&mut self, now: Timestamp) -> bool {
        self.memo.clear();
        self.opener.start(now, self.config.opener_timeout_ms)
    }

    pub fn opener(&self) -> &OpenerExecutor {
        &self.opener
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolves one press.
    ///
    /// The rule outcome for each anchor is computed once per tick and reused
    /// until the next action-use feedback, so repeated presses within a tick
    /// get the same decision whatever else was pressed in between.
    pub fn resolve(
        &mut self,
        snapshot: &WorldSnapshot,
        pressed: ActionId,
        current_target: Option<ObjectId>,
        now: Timestamp,
    ) -> Decision {
        if self.memo_tick != snapshot.tick() {
            self.memo.clear();
            self.memo_tick = snapshot.tick();
        }

        let Some(profile) = self.profile.as_mut() else {
            return Decision::NONE;
        };
        let is_anchor = profile.anchors().contains(&pressed);
        if !is_anchor && !profile.retrace().contains(pressed) {
            return Decision::NONE;
        }

        let mut forced = auto_target(snapshot, pressed, profile.retrace(), current_target);
        if !snapshot.in_combat() || !is_anchor {
            return Decision::compose(pressed, None, current_target, forced);
        }

        let (suggestion, source) = match self.memo.iter().find(|m| m.anchor == pressed) {
            Some(memo) => (memo.suggestion, memo.source),
            None => {
                self.opener.expire(now);
                let (suggestion, source) = match self.opener.next_step() {
                    Some(step) => (Suggestion::new(step.action, step.lane), ResolutionSource::Opener),
                    None => {
                        let throttle_open = self.last_secondary_fire.is_none_or(|at| {
                            now.since(at) >= u64::from(self.config.secondary_throttle_ms)
                        });
                        match profile.rule_for_mut(pressed) {
                            Some(rule) => {
                                let primary = rule.evaluate(snapshot, pressed, now);
                                if primary.action != pressed {
                                    (primary, ResolutionSource::Rule)
                                } else if throttle_open
                                    && let Some(secondary) = rule.evaluate_secondary(snapshot, pressed, now)
                                {
                                    (secondary, ResolutionSource::Secondary)
                                } else {
                                    (primary, ResolutionSource::Identity)
                                }
                            }
                            None => (Suggestion::identity(pressed), ResolutionSource::Identity),
                        }
                    }
                };
                // one entry per anchor, so the table never outgrows the profile
                let _ = self.memo.try_push(Memo {
                    anchor: pressed,
                    suggestion,
                    source,
                });
                (suggestion, source)
            }
        };

        let replacement = suggestion.action;
        if replacement != pressed && profile.retrace().contains(replacement) {
            forced = auto_target(snapshot, replacement, profile.retrace(), current_target);
        }
        if suggestion.lane == Lane::Secondary && replacement != pressed {
            self.pending_secondary = Some(replacement);
        }

        let decision = Decision::compose(pressed, Some(replacement), current_target, forced);
        self.last = LastResolution {
            anchor: Some(pressed),
            suggestion: Some(suggestion),
            source,
            decision,
        };
        decision
    }

    // ========================================================================
    // Feedback
    // ========================================================================

    /// Feeds back the action the host actually performed.
    ///
    /// Marks it just-used on the snapshot for the rest of the tick, advances
    /// every sequence and the opener, and starts the secondary throttle when
    /// a suggested secondary action went through.
    pub fn on_action_used(
        &mut self,
        snapshot: &mut WorldSnapshot,
        success: bool,
        action: ActionId,
        now: Timestamp,
    ) {
        snapshot.mark_action_used(action);
        self.memo.clear();

        if let Some(profile) = self.profile.as_mut() {
            for rule in profile.rules_mut() {
                rule.on_action_used(success, action, snapshot, now);
            }
        }
        self.opener.on_action_used(success, action, now);

        if success && self.pending_secondary == Some(action) {
            self.pending_secondary = None;
            self.last_secondary_fire = Some(now);
        }
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    pub fn diagnostics(&self, now: Timestamp) -> ResolverDiagnostics {
        let throttle = u64::from(self.config.secondary_throttle_ms);
        let secondary_throttle_remaining_ms = self
            .last_secondary_fire
            .map_or(0, |at| throttle.saturating_sub(now.since(at)));
        ResolverDiagnostics {
            job: self.job(),
            profile: self.profile.as_ref().map(JobProfile::name),
            rule_count: self.profile.as_ref().map_or(0, |p| p.rules().len()),
            last_anchor: self.last.anchor,
            last_suggestion: self.last.suggestion,
            last_source: self.last.source,
            last_decision: self.last.decision,
            pending_secondary: self.pending_secondary,
            secondary_throttle_remaining_ms,
            opener_progress: self.opener.progress(),
        }
    }
}

/// Read-only projection of resolver state for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolverDiagnostics {
    pub job: Option<JobId>,
    pub profile: Option<&'static str>,
    pub rule_count: usize,
    pub last_anchor: Option<ActionId>,
    pub last_suggestion: Option<Suggestion>,
    pub last_source: ResolutionSource,
    pub last_decision: Decision,
    pub pending_secondary: Option<ActionId>,
    pub secondary_throttle_remaining_ms: u64,
    pub opener_progress: Option<(usize, usize)>,
}
