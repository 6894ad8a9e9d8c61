//! White Mage.
//!
//! Three anchors: the Stone/Glare line (single target), the Holy line (area),
//! and Raise. Rules are rebuilt per level so every anchor and DoT reflects the
//! current progression step.
use combo_core::{
    ActionId, CompiledAction, Condition, GaugeCheck, JobId, JobProfile, ProfileError, RetraceTable,
    Rule, RuleBuilder, Sequence, SequenceStep, StatusId, WhiteMageGauge,
};

pub const JOB: JobId = JobId(24);
pub const NAME: &str = "White Mage";

pub mod ids {
    use combo_core::ActionId;

    // damage
    pub const STONE_I: ActionId = ActionId(119);
    pub const STONE_II: ActionId = ActionId(127);
    pub const STONE_III: ActionId = ActionId(3568);
    pub const STONE_IV: ActionId = ActionId(7431);
    pub const GLARE_I: ActionId = ActionId(16533);
    pub const GLARE_III: ActionId = ActionId(25859);
    pub const GLARE_IV: ActionId = ActionId(37009);
    pub const AERO: ActionId = ActionId(121);
    pub const AERO_II: ActionId = ActionId(132);
    pub const DIA: ActionId = ActionId(16532);
    pub const HOLY: ActionId = ActionId(139);
    pub const HOLY_III: ActionId = ActionId(25860);
    pub const AFFLATUS_MISERY: ActionId = ActionId(16535);
    pub const AFFLATUS_RAPTURE: ActionId = ActionId(16534);

    // cooldowns
    pub const ASSIZE: ActionId = ActionId(3571);
    pub const PRESENCE_OF_MIND: ActionId = ActionId(136);
    pub const LUCID_DREAMING: ActionId = ActionId(7562);
    pub const SWIFTCAST: ActionId = ActionId(7561);
    pub const THIN_AIR: ActionId = ActionId(7430);

    // healing and utility
    pub const RAISE: ActionId = ActionId(125);
    pub const CURE: ActionId = ActionId(120);
    pub const CURE_II: ActionId = ActionId(135);
    pub const CURE_III: ActionId = ActionId(131);
    pub const REGEN: ActionId = ActionId(137);
    pub const AFFLATUS_SOLACE: ActionId = ActionId(16531);
    pub const DIVINE_BENISON: ActionId = ActionId(7432);
    pub const AQUAVEIL: ActionId = ActionId(25861);
    pub const TETRAGRAMMATON: ActionId = ActionId(3570);
    pub const BENEDICTION: ActionId = ActionId(140);
    pub const ESUNA: ActionId = ActionId(7568);
}

pub mod status {
    use combo_core::StatusId;

    pub const AERO: StatusId = StatusId(143);
    pub const AERO_II: StatusId = StatusId(144);
    pub const DIA: StatusId = StatusId(1871);
    pub const SACRED_SIGHT: StatusId = StatusId(3879);
}

const DOT_REFRESH_MS: u32 = 3_000;
const LUCID_MP_THRESHOLD: u32 = 7_000;
const RAISE_DEBOUNCE_MS: u32 = 3_000;

// ============================================================================
// Level progression
// ============================================================================

pub fn stone_glare(level: u8) -> ActionId {
    match level {
        82.. => ids::GLARE_III,
        72.. => ids::GLARE_I,
        64.. => ids::STONE_IV,
        54.. => ids::STONE_III,
        18.. => ids::STONE_II,
        _ => ids::STONE_I,
    }
}

pub fn holy(level: u8) -> ActionId {
    if level >= 82 { ids::HOLY_III } else { ids::HOLY }
}

/// DoT action and the status it applies.
pub fn aero_dia(level: u8) -> (ActionId, StatusId) {
    match level {
        72.. => (ids::DIA, status::DIA),
        46.. => (ids::AERO_II, status::AERO_II),
        _ => (ids::AERO, status::AERO),
    }
}

// ============================================================================
// Profile
// ============================================================================

/// # Errors
///
/// Only fails if the rule set outgrows an engine capacity.
pub fn profile(level: u8) -> Result<JobProfile, ProfileError> {
    let (dot, dot_status) = aero_dia(level);

    JobProfile::builder(JOB, NAME)
        .level(level)
        .rule(single_target(stone_glare(level), dot))
        .rule(area(holy(level)))
        .rule(swift_raise())
        .track_cooldowns(&[
            ids::ASSIZE,
            ids::PRESENCE_OF_MIND,
            ids::LUCID_DREAMING,
            ids::SWIFTCAST,
            ids::THIN_AIR,
        ])
        .debuff(dot, &[dot_status])
        .retrace(retrace())
        .build()
}

fn retrace() -> Result<RetraceTable, ProfileError> {
    RetraceTable::new()
        .heal(&[
            ids::CURE,
            ids::CURE_II,
            ids::CURE_III,
            ids::REGEN,
            ids::AFFLATUS_SOLACE,
            ids::DIVINE_BENISON,
            ids::AQUAVEIL,
            ids::TETRAGRAMMATON,
            ids::BENEDICTION,
        ])?
        .cleanse(&[ids::ESUNA])?
        .revive(&[ids::RAISE])
}

fn single_target(anchor: ActionId, dot: ActionId) -> Result<Rule, ProfileError> {
    let builder = lily_actions(Rule::builder(anchor)).entry(
        CompiledAction::primary(dot).when(Condition::DebuffNeedsRefresh {
            action: dot,
            threshold_ms: DOT_REFRESH_MS,
        }),
    );
    damage_cooldowns(builder).build()
}

fn area(anchor: ActionId) -> Result<Rule, ProfileError> {
    damage_cooldowns(lily_actions(Rule::builder(anchor))).build()
}

fn swift_raise() -> Result<Rule, ProfileError> {
    let swift_thin_raise = Sequence::from_steps([
        SequenceStep::secondary(ids::SWIFTCAST),
        SequenceStep::secondary(ids::THIN_AIR),
        SequenceStep::primary(ids::RAISE),
    ])?;
    let thin_raise = Sequence::from_steps([
        SequenceStep::secondary(ids::THIN_AIR),
        SequenceStep::primary(ids::RAISE),
    ])?;

    Rule::builder(ids::RAISE)
        .entry(
            CompiledAction::sequence(swift_thin_raise)
                .when(
                    Condition::AnyPartyDead
                        & Condition::ActionReady(ids::SWIFTCAST)
                        & Condition::ActionReady(ids::THIN_AIR),
                )
                .debounce_ms(RAISE_DEBOUNCE_MS),
        )
        .entry(
            CompiledAction::sequence(thin_raise)
                .when(Condition::AnyPartyDead & Condition::ActionReady(ids::THIN_AIR))
                .debounce_ms(RAISE_DEBOUNCE_MS),
        )
        .build()
}

fn lily_actions(builder: RuleBuilder) -> RuleBuilder {
    builder
        .entry(
            CompiledAction::primary(ids::AFFLATUS_MISERY)
                .when(Condition::Gauge(GaugeCheck::BloodLilyBloomed)),
        )
        .entry(CompiledAction::primary(ids::AFFLATUS_RAPTURE).when(
            Condition::Gauge(GaugeCheck::LiliesAtLeast(3))
                | Condition::Gauge(GaugeCheck::LilyOvercapWithin(
                    WhiteMageGauge::OVERCAP_SOON_MS,
                )),
        ))
}

fn damage_cooldowns(builder: RuleBuilder) -> RuleBuilder {
    builder
        .entry(
            CompiledAction::primary(ids::GLARE_IV)
                .when(Condition::PlayerHasStatus(status::SACRED_SIGHT)),
        )
        .entry(CompiledAction::secondary(ids::ASSIZE).when(Condition::ActionReady(ids::ASSIZE)))
        .entry(
            CompiledAction::secondary(ids::PRESENCE_OF_MIND)
                .when(Condition::ActionReady(ids::PRESENCE_OF_MIND)),
        )
        .entry(
            CompiledAction::secondary(ids::LUCID_DREAMING).when(
                Condition::ResourceAtMost(LUCID_MP_THRESHOLD)
                    & Condition::ActionReady(ids::LUCID_DREAMING),
            ),
        )
}
