//! Sage.
//!
//! Dosis and Dyskrasia share one rule so the Eukrasia refresh can branch on
//! the pressed anchor. Egeiro gets its own rule with a Swiftcast lead-in.
use combo_core::{
    ActionId, AnchorBranch, CompiledAction, Condition, GaugeCheck, JobId, JobProfile, Opener,
    ProfileError, RetraceTable, Rule, SageGauge, Sequence, SequenceStep, StatusId,
};

pub const JOB: JobId = JobId(40);
pub const NAME: &str = "Sage";

pub mod ids {
    use combo_core::ActionId;

    pub const DOSIS: ActionId = ActionId(24283);
    pub const DOSIS_II: ActionId = ActionId(24306);
    pub const DOSIS_III: ActionId = ActionId(24312);
    pub const EUKRASIAN_DOSIS: ActionId = ActionId(24293);
    pub const EUKRASIAN_DOSIS_II: ActionId = ActionId(24308);
    pub const EUKRASIAN_DOSIS_III: ActionId = ActionId(24314);
    pub const PHLEGMA: ActionId = ActionId(24289);
    pub const PHLEGMA_II: ActionId = ActionId(24307);
    pub const PHLEGMA_III: ActionId = ActionId(24313);
    pub const TOXIKON: ActionId = ActionId(24304);
    pub const TOXIKON_II: ActionId = ActionId(24316);
    pub const DYSKRASIA: ActionId = ActionId(24297);
    pub const DYSKRASIA_II: ActionId = ActionId(24315);
    pub const EUKRASIAN_DYSKRASIA: ActionId = ActionId(37032);
    pub const EUKRASIA: ActionId = ActionId(24290);
    pub const PSYCHE: ActionId = ActionId(37033);

    pub const LUCID_DREAMING: ActionId = ActionId(7562);
    pub const SWIFTCAST: ActionId = ActionId(7561);

    pub const DIAGNOSIS: ActionId = ActionId(24284);
    pub const EUKRASIAN_DIAGNOSIS: ActionId = ActionId(24291);
    pub const DRUOCHOLE: ActionId = ActionId(24296);
    pub const TAUROCHOLE: ActionId = ActionId(24303);
    pub const HAIMA: ActionId = ActionId(24305);
    pub const KRASIS: ActionId = ActionId(24317);
    pub const EGEIRO: ActionId = ActionId(24287);
}

pub mod status {
    use combo_core::StatusId;

    pub const EUKRASIA: StatusId = StatusId(2606);
    pub const EUKRASIAN_DOSIS: StatusId = StatusId(2614);
    pub const EUKRASIAN_DOSIS_II: StatusId = StatusId(2615);
    pub const EUKRASIAN_DOSIS_III: StatusId = StatusId(2616);
    pub const EUKRASIAN_DYSKRASIA: StatusId = StatusId(3897);
}

const DOT_REFRESH_MS: u32 = 5_000;
const DOT_DEBOUNCE_MS: u32 = 1_000;
const PHLEGMA_CHARGE_WINDOW_MS: u32 = 40_000;
const LUCID_MP_THRESHOLD: u32 = 7_000;

// ============================================================================
// Level progression
// ============================================================================

pub fn dosis(level: u8) -> ActionId {
    match level {
        82.. => ids::DOSIS_III,
        72.. => ids::DOSIS_II,
        _ => ids::DOSIS,
    }
}

pub fn eukrasian_dosis(level: u8) -> ActionId {
    match level {
        82.. => ids::EUKRASIAN_DOSIS_III,
        72.. => ids::EUKRASIAN_DOSIS_II,
        _ => ids::EUKRASIAN_DOSIS,
    }
}

pub fn phlegma(level: u8) -> ActionId {
    match level {
        82.. => ids::PHLEGMA_III,
        72.. => ids::PHLEGMA_II,
        _ => ids::PHLEGMA,
    }
}

pub fn dyskrasia(level: u8) -> Option<ActionId> {
    match level {
        82.. => Some(ids::DYSKRASIA_II),
        46.. => Some(ids::DYSKRASIA),
        _ => None,
    }
}

pub fn eukrasian_dyskrasia(level: u8) -> Option<ActionId> {
    (level >= 82).then_some(ids::EUKRASIAN_DYSKRASIA)
}

pub fn toxikon(level: u8) -> Option<ActionId> {
    match level {
        82.. => Some(ids::TOXIKON_II),
        66.. => Some(ids::TOXIKON),
        _ => None,
    }
}

/// Any Eukrasian Dosis rank counts as the DoT being up.
const DOSIS_STATUSES: [StatusId; 3] = [
    status::EUKRASIAN_DOSIS,
    status::EUKRASIAN_DOSIS_II,
    status::EUKRASIAN_DOSIS_III,
];

// ============================================================================
// Profile
// ============================================================================

/// # Errors
///
/// Only fails if the rule set outgrows an engine capacity.
pub fn profile(level: u8) -> Result<JobProfile, ProfileError> {
    let dot = eukrasian_dosis(level);
    let mut builder = JobProfile::builder(JOB, NAME)
        .level(level)
        .rule(damage(level))
        .rule(egeiro())
        .track_cooldowns(&[
            ids::SWIFTCAST,
            ids::LUCID_DREAMING,
            ids::PSYCHE,
            phlegma(level),
        ])
        .debuff(dot, &DOSIS_STATUSES)
        .retrace(retrace());

    if let Some(aoe_dot) = eukrasian_dyskrasia(level) {
        builder = builder.debuff(aoe_dot, &[status::EUKRASIAN_DYSKRASIA]);
    }
    if level >= 92 {
        builder = builder.opener(toxikon_opener());
    }
    builder.build()
}

fn retrace() -> Result<RetraceTable, ProfileError> {
    RetraceTable::new()
        .heal(&[
            ids::DIAGNOSIS,
            ids::EUKRASIAN_DIAGNOSIS,
            ids::DRUOCHOLE,
            ids::TAUROCHOLE,
            ids::HAIMA,
            ids::KRASIS,
        ])?
        .revive(&[ids::EGEIRO])
}

fn damage(level: u8) -> Result<Rule, ProfileError> {
    let st = dosis(level);
    let mut rule = Rule::builder(st);
    if let Some(aoe) = dyskrasia(level) {
        rule = rule.also_anchor(aoe);
    }

    rule = rule.entry(
        CompiledAction::secondary(ids::DRUOCHOLE).when(
            Condition::Gauge(GaugeCheck::AddersgallAtLeast(3))
                | Condition::Gauge(GaugeCheck::AddersgallOvercapWithin(
                    SageGauge::OVERCAP_SOON_MS,
                )),
        ),
    );

    if level >= 30 {
        let dot = eukrasian_dosis(level);
        let mut refresh = Condition::AnchorIs(st)
            & Condition::DebuffNeedsRefresh {
                action: dot,
                threshold_ms: DOT_REFRESH_MS,
            };
        let mut branch = AnchorBranch::new().on(st, eukrasia_into(dot))?;

        if let (Some(aoe), Some(aoe_dot)) = (dyskrasia(level), eukrasian_dyskrasia(level)) {
            refresh = refresh
                | (Condition::AnchorIs(aoe)
                    & Condition::DebuffNeedsRefresh {
                        action: aoe_dot,
                        threshold_ms: DOT_REFRESH_MS,
                    });
            branch = branch.on(aoe, eukrasia_into(aoe_dot))?;
        }

        rule = rule.entry(
            CompiledAction::branch(branch)
                .when(refresh)
                .debounce_ms(DOT_DEBOUNCE_MS)
                .per_anchor(),
        );
    }

    rule = rule
        .entry(CompiledAction::secondary(ids::PSYCHE).when(Condition::ActionReady(ids::PSYCHE)))
        .entry(CompiledAction::primary(phlegma(level)).when(
            Condition::CooldownWithin {
                action: phlegma(level),
                ms: PHLEGMA_CHARGE_WINDOW_MS,
            } & Condition::HasTarget,
        ));

    if let Some(toxikon) = toxikon(level) {
        rule = rule.entry(
            CompiledAction::primary(toxikon).when(
                Condition::AnchorIs(st)
                    & Condition::Moving
                    & Condition::Gauge(GaugeCheck::AdderstingAtLeast(1))
                    & !Condition::PlayerHasStatus(status::EUKRASIA),
            ),
        );
    }

    rule.entry(lucid()).build()
}

fn egeiro() -> Result<Rule, ProfileError> {
    let swift_egeiro = Sequence::from_steps([
        SequenceStep::secondary(ids::SWIFTCAST),
        SequenceStep::primary(ids::EGEIRO),
    ])?;

    Rule::builder(ids::EGEIRO)
        .entry(
            CompiledAction::sequence(swift_egeiro)
                .when(Condition::AnyPartyDead & Condition::ActionReady(ids::SWIFTCAST)),
        )
        .entry(
            CompiledAction::primary(ids::EGEIRO)
                .when(Condition::AnyPartyDead & Condition::ActionReady(ids::EGEIRO)),
        )
        .entry(lucid())
        .build()
}

fn lucid() -> CompiledAction {
    CompiledAction::secondary(ids::LUCID_DREAMING).when(
        Condition::ResourceAtMost(LUCID_MP_THRESHOLD)
            & Condition::ActionReady(ids::LUCID_DREAMING),
    )
}

fn eukrasia_into(dot: ActionId) -> Sequence {
    Sequence::two_step_guaranteed(ids::EUKRASIA, dot)
}

/// Level 92+ Toxikon opener.
pub fn toxikon_opener() -> Opener {
    let mut opener = Opener::new("toxikon")
        .primary(ids::EUKRASIA)
        .primary(ids::TOXIKON)
        .primary(ids::EUKRASIAN_DOSIS_III);
    for _ in 0..3 {
        opener = opener.primary(ids::DOSIS_III);
    }
    opener = opener.primary(ids::PHLEGMA_III).primary(ids::PHLEGMA_III);
    for _ in 0..4 {
        opener = opener.primary(ids::DOSIS_III);
    }
    opener = opener
        .primary(ids::EUKRASIA)
        .primary(ids::EUKRASIAN_DOSIS_III);
    for _ in 0..3 {
        opener = opener.primary(ids::DOSIS_III);
    }
    opener
}
