//! End-to-end resolution scenarios driven through a fixture observer.
use combo_core::{
    ActionId, ActionResolver, Advance, CompiledAction, Condition, DecisionKind, EngineConfig,
    FixtureHandle, FixtureObserver, JobId, JobProfile, Lane, ObjectId, PlayerState, Rule,
    Sequence, SequenceStep, StatusId, Suggestion, Targets, Timestamp, WorldFixture, WorldSnapshot,
};

const ANCHOR: ActionId = ActionId(100);
const PREP: ActionId = ActionId(50);
const APPLY: ActionId = ActionId(60);
const DEBUFF: StatusId = StatusId(500);
const PLAYER: ObjectId = ObjectId(1);
const ENEMY: ObjectId = ObjectId(99);

fn world() -> WorldFixture {
    WorldFixture {
        player: Some(PlayerState {
            id: PLAYER,
            level: 90,
            hp: 100,
            max_hp: 100,
            mp: 10_000,
            max_mp: 10_000,
            alive: true,
            ..PlayerState::default()
        }),
        targets: Targets {
            hard: Some(ENEMY),
            ..Targets::default()
        },
        ..WorldFixture::default()
    }
    .in_combat()
}

fn dot_rule() -> Rule {
    let sequence = Sequence::from_steps([
        SequenceStep::secondary(PREP),
        SequenceStep::primary(APPLY).then(Advance::Terminal),
    ])
    .unwrap();
    Rule::builder(ANCHOR)
        .entry(CompiledAction::sequence(sequence).when(Condition::DebuffNeedsRefresh {
            action: APPLY,
            threshold_ms: 0,
        }))
        .build()
        .unwrap()
}

fn profile() -> JobProfile {
    JobProfile::builder(JobId(40), "scenario")
        .level(90)
        .rule(Ok(dot_rule()))
        .debuff(APPLY, &[DEBUFF])
        .build()
        .unwrap()
}

fn setup() -> (ActionResolver, WorldSnapshot, FixtureHandle) {
    let observer = FixtureObserver::new(world());
    let handle = observer.handle();
    let mut snapshot = WorldSnapshot::new(observer);
    snapshot.update();
    let mut resolver = ActionResolver::new(EngineConfig::default());
    resolver.install(profile(), &mut snapshot).unwrap();
    (resolver, snapshot, handle)
}

#[test]
fn prep_then_apply_then_identity() {
    let (_, mut snapshot, handle) = setup();
    let mut rule = dot_rule();
    let mut now = Timestamp::from_millis(1_000);

    // tick 1: debuff missing
    assert_eq!(
        rule.evaluate(&snapshot, ANCHOR, now),
        Suggestion::new(PREP, Lane::Secondary)
    );
    rule.on_action_used(true, PREP, &snapshot, now);

    // tick 2: still missing
    snapshot.update();
    now = now.add_millis(100);
    assert_eq!(
        rule.evaluate(&snapshot, ANCHOR, now),
        Suggestion::new(APPLY, Lane::Primary)
    );
    rule.on_action_used(true, APPLY, &snapshot, now);
    let seq = match rule.entries()[0].body() {
        combo_core::EntryBody::Sequence(seq) => seq,
        _ => unreachable!(),
    };
    assert!(seq.is_complete());

    // tick 3: debuff applied
    handle.edit(|w| w.set_target_status(ENEMY, DEBUFF, 30.0));
    snapshot.update();
    now = now.add_millis(100);
    assert_eq!(rule.evaluate(&snapshot, ANCHOR, now), Suggestion::identity(ANCHOR));
}

#[test]
fn same_scenario_through_the_resolver() {
    let (mut resolver, mut snapshot, handle) = setup();
    let mut now = Timestamp::from_millis(1_000);

    let d = resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now);
    assert_eq!(d.kind(), DecisionKind::ActionOverride);
    assert_eq!(d.action(), Some(PREP));
    resolver.on_action_used(&mut snapshot, true, PREP, now);

    snapshot.update();
    now = now.add_millis(100);
    assert_eq!(resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now).action(), Some(APPLY));

    // a failed cast leaves the sequence waiting on the same step
    resolver.on_action_used(&mut snapshot, false, APPLY, now);
    snapshot.update();
    now = now.add_millis(100);
    assert_eq!(resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now).action(), Some(APPLY));

    resolver.on_action_used(&mut snapshot, true, APPLY, now);
    handle.edit(|w| w.set_target_status(ENEMY, DEBUFF, 30.0));
    snapshot.update();
    now = now.add_millis(100);
    assert!(resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now).is_none());
}

#[test]
fn repeated_resolution_is_idempotent() {
    let (mut resolver, snapshot, _) = setup();
    let now = Timestamp::from_millis(1_000);
    let first = resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now);
    let second = resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now);
    assert_eq!(first, second);
}

#[test]
fn stalled_sequence_ignores_unrelated_actions() {
    let (mut resolver, mut snapshot, _) = setup();
    let now = Timestamp::from_millis(1_000);
    resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now);
    resolver.on_action_used(&mut snapshot, true, ActionId(7), now);

    snapshot.update();
    let d = resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now.add_millis(100));
    assert_eq!(d.action(), Some(PREP));
}

#[test]
fn uninspectable_target_refreshes_conservatively() {
    let (mut resolver, mut snapshot, handle) = setup();
    handle.edit(|w| {
        w.set_target_status(ENEMY, DEBUFF, 30.0);
        w.uninspectable.push(ENEMY);
    });
    snapshot.update();
    let d = resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), Timestamp::from_millis(1_000));
    assert_eq!(d.action(), Some(PREP));
}

#[test]
fn no_target_means_no_override() {
    let (mut resolver, mut snapshot, handle) = setup();
    handle.edit(|w| w.targets = Targets::default());
    snapshot.update();
    assert!(resolver.resolve(&snapshot, ANCHOR, None, Timestamp::ZERO).is_none());
}

#[test]
fn debounce_survives_only_until_profile_switch() {
    let observer = FixtureObserver::new(world());
    let mut snapshot = WorldSnapshot::new(observer);
    snapshot.update();

    let build = || {
        JobProfile::builder(JobId(24), "debounce")
            .rule(
                Rule::builder(ANCHOR)
                    .entry(CompiledAction::primary(ActionId(5)).debounce_ms(3_000))
                    .build(),
            )
            .build()
            .unwrap()
    };
    let mut resolver = ActionResolver::new(EngineConfig::default());
    resolver.install(build(), &mut snapshot).unwrap();

    let t0 = Timestamp::from_millis(10_000);
    assert_eq!(resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), t0).action(), Some(ActionId(5)));
    snapshot.update();
    assert!(resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), t0.add_millis(10)).is_none());

    resolver.install(build(), &mut snapshot).unwrap();
    snapshot.update();
    assert_eq!(
        resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), t0.add_millis(20)).action(),
        Some(ActionId(5))
    );
}

#[test]
fn interleaved_presses_keep_the_anchor_decision_within_a_tick() {
    let observer = FixtureObserver::new(world());
    let mut snapshot = WorldSnapshot::new(observer);
    snapshot.update();

    let profile = JobProfile::builder(JobId(24), "interleaved")
        .rule(
            Rule::builder(ANCHOR)
                .entry(CompiledAction::primary(ActionId(5)).debounce_ms(3_000))
                .build(),
        )
        .build()
        .unwrap();
    let mut resolver = ActionResolver::new(EngineConfig::default());
    resolver.install(profile, &mut snapshot).unwrap();

    let now = Timestamp::from_millis(10_000);
    let first = resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now);
    assert_eq!(first.action(), Some(ActionId(5)));

    assert!(resolver.resolve(&snapshot, ActionId(4242), Some(ENEMY), now).is_none());
    assert_eq!(resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now.add_millis(5)), first);
    assert_eq!(
        resolver.resolve(&snapshot, ANCHOR, None, now.add_millis(6)).action(),
        Some(ActionId(5)),
        "another target reuses the same rule outcome"
    );

    // feedback ends the reuse: the optimistic debounce stamp now applies
    resolver.on_action_used(&mut snapshot, false, ActionId(5), now);
    assert!(resolver.resolve(&snapshot, ANCHOR, Some(ENEMY), now.add_millis(10)).is_none());
}
