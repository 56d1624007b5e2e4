use std::collections::HashSet;

use tsearch_stress::harness::MaxCycles;
use tsearch_stress::{StressConfig, TreeExercise};

mod common;
use common::ScriptedSource;

#[test]
fn seeded_runs_generate_identical_datasets() {
    let config = StressConfig::with_size(8192).with_seed(1234).resolve().unwrap();

    let mut fingerprints = HashSet::new();
    for _ in 0..5 {
        let mut exercise = TreeExercise::new(&config, 0).expect("dataset allocates");
        exercise.run(&MaxCycles(2)).expect("run succeeds");
        fingerprints.insert(exercise.dataset().fingerprint());
    }

    assert_eq!(fingerprints.len(), 1, "datasets diverged across runs");
}

#[test]
fn instances_get_distinct_datasets() {
    let config = StressConfig::with_size(1024).with_seed(1234).resolve().unwrap();

    let mut fingerprints = HashSet::new();
    for instance in 0..4 {
        let mut exercise = TreeExercise::new(&config, instance).expect("dataset allocates");
        exercise.run(&MaxCycles(1)).expect("run succeeds");
        fingerprints.insert(exercise.dataset().fingerprint());
    }

    assert_eq!(fingerprints.len(), 4);
}

#[test]
fn scripted_source_produces_formula_keys() {
    let mut exercise =
        TreeExercise::with_source(1024, true, ScriptedSource::new(vec![0xF123, 0x0001]), 0)
            .expect("dataset allocates");
    exercise.run(&MaxCycles(1)).expect("run succeeds");

    let keys = exercise.dataset().keys();
    assert_eq!(keys[0], 0x123 << 22);
    assert_eq!(keys[1], (1 << 22) ^ 1);
    assert_eq!(keys[2], (0x123 << 22) ^ 2);
    assert_eq!(exercise.verifier().failures(), 0);
}
