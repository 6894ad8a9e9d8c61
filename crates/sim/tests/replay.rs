//! Scenario files replayed end to end through the engine.
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use combo_jobs::{sge, whm, world_rules};
use combo_runtime::{RuntimeConfig, TickOutcome, UpdateSkipReason};
use combo_sim::{ReplayReport, Scenario, replay};

fn run(scenario: &Scenario) -> ReplayReport {
    replay(scenario, RuntimeConfig::default(), Arc::new(world_rules()))
}

fn bundled(name: &str) -> Scenario {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name);
    Scenario::load(&path).unwrap()
}

#[test]
fn bundled_scenarios_meet_their_expectations() {
    for name in ["sge_dot_refresh.ron", "whm_weave.ron"] {
        let report = run(&bundled(name));
        let mismatches: Vec<String> = report.mismatches().map(ToString::to_string).collect();
        assert!(mismatches.is_empty(), "{name}: {mismatches:#?}");
        assert!(report.frames.iter().all(|f| f.outcome.is_updated()));
    }
}

#[test]
fn wrong_expectation_is_reported() {
    let mut scenario = bundled("whm_weave.ron");
    scenario.frames[0].presses[0].expect = Some(whm::ids::PRESENCE_OF_MIND);

    let report = run(&scenario);
    assert!(!report.passed());
    let mismatch = report.mismatches().next().unwrap();
    assert_eq!(mismatch.frame, 0);
    assert_eq!(mismatch.performed, whm::ids::ASSIZE);
}

#[test]
fn logged_out_frames_pass_presses_through() {
    let scenario = Scenario::parse(
        r#"(
            name: "logged out",
            frames: [(presses: [(action: 25859)]), (presses: [(action: 25859)])],
        )"#,
    )
    .unwrap();

    let report = run(&scenario);
    for frame in &report.frames {
        assert_eq!(
            frame.outcome,
            TickOutcome::Skipped(UpdateSkipReason::NotLoggedIn)
        );
        assert_eq!(frame.presses[0].performed, whm::ids::GLARE_III);
        assert!(frame.presses[0].decision.is_none());
    }
    assert_eq!(report.diagnostics.profile_key, None);
}

#[test]
fn opener_overrides_the_rules_once_armed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"(
            name: "sage opener",
            in_combat: true,
            opener: true,
            world: (
                player: Some((id: 1, level: 100, job: 40, hp: 1, max_hp: 1, mp: 10000, max_mp: 10000, alive: true)),
                targets: (hard: Some(1073741825)),
                cooldowns: [(action: 24313, remaining_ms: 60000), (action: 37033, remaining_ms: 60000)],
                target_statuses: [(target: 1073741825, status: 2616, remaining_secs: 30.0)],
            ),
            frames: [
                (presses: [(action: 24312, expect: Some(24290))]),
                (advance_ms: Some(2500), presses: [(action: 24312, expect: Some(24304))]),
            ],
        )"#
    )
    .unwrap();

    let report = run(&Scenario::load(file.path()).unwrap());
    assert!(report.passed(), "{:?}", report.mismatches().collect::<Vec<_>>());
    assert_eq!(report.presses().count(), 2);
    assert_eq!(report.diagnostics.profile_key, Some((sge::JOB, 100)));
    assert!(report.diagnostics.resolver.opener_progress.is_some());
}

#[test]
fn failed_use_keeps_the_sequence_waiting() {
    let mut scenario = bundled("sge_dot_refresh.ron");
    scenario.frames.truncate(2);
    scenario.frames[0].presses[0].success = false;
    // the refresh restarts from Eukrasia instead of moving on
    scenario.frames[1].presses[0].expect = Some(sge::ids::EUKRASIA);

    let report = run(&scenario);
    assert!(report.passed(), "{:?}", report.mismatches().collect::<Vec<_>>());
}
