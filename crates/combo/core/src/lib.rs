//! Deterministic action-substitution core shared by every host integration.
//!
//! `combo-core` turns a press of an "anchor" action into a single
//! [`Decision`]: which action to actually perform and which target to direct it
//! at. Everything here is synchronous and allocation-free on the resolution path:
//!
//! - [`snapshot::WorldSnapshot`] is refreshed once per tick from an [`Observer`]
//!   and caches derived queries (readiness, debuff refresh, party ranking)
//! - [`rule::Rule`] evaluates condition-gated entries, [`sequence::Sequence`]
//!   state machines, and anchor branches with debounce windows
//! - [`retrace`] picks auto-targets from ranked candidate lists
//! - [`resolver::ActionResolver`] ties them together per press and feeds
//!   confirmed action use back into every sequence
//!
//! Logging, clocks, and profile switching live in `combo-runtime`.
pub mod candidates;
pub mod condition;
pub mod config;
pub mod decision;
pub mod error;
pub mod observer;
pub mod opener;
pub mod profile;
pub mod resolver;
pub mod retrace;
pub mod rule;
pub mod sequence;
pub mod snapshot;
pub mod types;

pub use candidates::{Candidate, CandidateList, RoleBuckets, TopTwo};
pub use condition::Condition;
pub use config::EngineConfig;
pub use decision::{Decision, DecisionKind};
pub use error::{CapacityKind, ComboError, ErrorSeverity, ProfileError};
pub use observer::{
    CharacterState, CombatFlags, FixtureHandle, FixtureObserver, Gauge, GaugeCheck, HostFlags,
    Observer, PartyList, PartyMember, PlayerState, SageGauge, Targets, WhiteMageGauge,
    WorldFixture,
};
pub use opener::{Opener, OpenerExecutor, OpenerStep};
pub use profile::{DebuffMapping, JobProfile, ProfileBuilder, ProfileSource};
pub use resolver::{ActionResolver, ResolutionSource, ResolverDiagnostics};
pub use retrace::{RetraceClass, RetraceTable, auto_target};
pub use rule::{
    AnchorBranch, CompiledAction, Debounce, EntryBody, EntryOrder, Rule, RuleBuilder, Suggestion,
};
pub use sequence::{Advance, Sequence, SequenceStep, SequenceTransition};
pub use snapshot::{CooldownView, SnapshotDiagnostics, WorldRules, WorldSnapshot};
pub use types::{ActionId, JobId, Lane, ObjectId, Position, Role, StatusId, Tick, Timestamp};
