#![cfg(unix)]

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use swarmrun::_internal_test_data::{fake_swarmwrapper, script_command};
use swarmrun::acceptance::{AcceptanceManifest, AcceptanceSuite};
use swarmrun::progress::DummyStageNotifier;
use swarmrun::tools::{Tool, ToolPaths};

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join(name)
}

#[test]
fn test_manifest_clusters_the_fixture() {
    let manifest = AcceptanceManifest::from_path(&shipped("acceptance.json")).unwrap();

    assert_eq!(manifest.pins, AcceptanceManifest::default().pins);
    let fixture = manifest.fixture.unwrap();
    assert_eq!(fixture.path, PathBuf::from("/usr/swarmrun/tests/test.fasta"));
    assert_eq!(fixture.sample, "test");
    assert_eq!(fixture.csv_lines, 340);
    assert_eq!(fixture.fasta_lines, 680);
}

#[test]
fn test_fixture_has_1000_unique_sequences() {
    let fasta = fs::read_to_string(shipped("test.fasta")).unwrap();
    let lines: Vec<_> = fasta.lines().collect();
    assert_eq!(lines.len(), 2000);

    let sequences: HashSet<_> = lines
        .chunks(2)
        .map(|record| {
            assert!(record[0].starts_with('>'), "{}", record[0]);
            record[1]
        })
        .collect();
    assert_eq!(sequences.len(), 1000);
}

#[test_log::test]
fn test_shipped_manifest_runs_fixture_checks() {
    let scratch = tempfile::tempdir().unwrap();
    let bin = tempfile::tempdir().unwrap();
    let wrapper = fake_swarmwrapper(bin.path(), "0.5.0", 680, 340);
    let mut tools = ToolPaths::new();
    tools.set(Tool::SwarmWrapper, script_command(&wrapper));

    let mut manifest = AcceptanceManifest::from_path(&shipped("acceptance.json")).unwrap();
    manifest.pins.retain(|pin| pin.name == "swarmwrapper");
    if let Some(fixture) = manifest.fixture.as_mut() {
        fixture.path = shipped("test.fasta");
    }

    let report = AcceptanceSuite::new(manifest, tools, scratch.path()).run(&DummyStageNotifier);

    let failed: Vec<_> = report.checks.iter().filter(|c| !c.passed).collect();
    assert!(failed.is_empty(), "{:?}", failed);
    let names: Vec<_> = report.checks.iter().map(|c| c.name.as_str()).collect();
    assert!(names.contains(&"swarmwrapper cluster"));
    assert!(names.contains(&"run-swarm wrapper"));
    assert_eq!(
        names.iter().filter(|name| name.ends_with("has 340 lines")).count(),
        2
    );
    assert_eq!(
        names.iter().filter(|name| name.ends_with("has 680 lines")).count(),
        2
    );
}
