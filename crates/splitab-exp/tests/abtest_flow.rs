use std::sync::Arc;

use serde_json::{json, Value};
use splitab_core::{
    AbError, AlternativeId, ErrorInfo, ExperimentId, KeyValueStore, NoOverrides, OverrideSlots,
    SessionOverrides,
};
use splitab_exp::{AbTest, AssignmentSource};
use splitab_store::MemoryStore;

fn bg_color(store: Arc<dyn KeyValueStore>) -> AbTest {
    let mut test = AbTest::new("bg_color", ExperimentId::from_raw(1), store);
    test.define_alternatives([json!("red"), json!("blue")]);
    test.save().expect("two alternatives commit");
    test
}

fn tallies(test: &AbTest) -> Vec<(u64, u64, u64)> {
    test.alternatives()
        .iter()
        .map(|alt| {
            (
                alt.participants().unwrap(),
                alt.converted_count().unwrap(),
                alt.conversions().unwrap(),
            )
        })
        .collect()
}

#[test]
fn bg_color_scenario() {
    let test = bg_color(Arc::new(MemoryStore::new()));
    let session = SessionOverrides::new();

    assert_eq!(test.choose("user42", &session).unwrap(), &json!("blue"));
    assert_eq!(tallies(&test), vec![(0, 0, 0), (1, 0, 0)]);

    let converted = test.record_conversion("user42", &session).unwrap();
    assert_eq!(converted, AlternativeId::from_index(1));
    assert_eq!(tallies(&test), vec![(0, 0, 0), (1, 1, 1)]);

    test.record_conversion("user99", &session).unwrap();
    assert_eq!(tallies(&test), vec![(0, 0, 0), (1, 1, 1)]);
}

#[test]
fn conversion_before_participation_is_dropped() {
    let test = bg_color(Arc::new(MemoryStore::new()));
    test.record_conversion("user99", &NoOverrides).unwrap();
    assert_eq!(tallies(&test), vec![(0, 0, 0), (0, 0, 0)]);
}

#[test]
fn repeated_choose_counts_one_participant() {
    let test = bg_color(Arc::new(MemoryStore::new()));
    for _ in 0..5 {
        assert_eq!(test.choose("user42", &NoOverrides).unwrap(), &json!("blue"));
    }
    assert_eq!(test.alternatives()[1].participants().unwrap(), 1);
}

#[test]
fn forced_selection_overrides_hash_until_cleared() {
    let test = bg_color(Arc::new(MemoryStore::new()));
    let mut session = SessionOverrides::new();

    test.force_selection(Some(&json!("red")), &mut session).unwrap();
    assert_eq!(
        session.get(ExperimentId::from_raw(1)),
        Some(AlternativeId::from_index(0))
    );
    for identity in ["user42", "user99", "user7", "anyone"] {
        assert_eq!(test.choose(identity, &session).unwrap(), &json!("red"));
    }
    let preview = test.preview("user42", &session).unwrap();
    assert_eq!(preview.source, AssignmentSource::Override);

    test.force_selection(None, &mut session).unwrap();
    assert!(session.is_empty());
    assert_eq!(test.choose("user42", &session).unwrap(), &json!("blue"));
    assert_eq!(
        test.preview("user42", &session).unwrap().source,
        AssignmentSource::Hash
    );
}

#[test]
fn conversion_follows_the_override() {
    let test = bg_color(Arc::new(MemoryStore::new()));
    let mut session = SessionOverrides::new();
    test.force_selection(Some(&json!("red")), &mut session).unwrap();

    test.choose("user42", &session).unwrap();
    let id = test.record_conversion("user42", &session).unwrap();
    assert_eq!(id, AlternativeId::from_index(0));
    assert_eq!(tallies(&test), vec![(1, 1, 1), (0, 0, 0)]);
}

#[test]
fn forcing_unknown_value_fails_without_side_effects() {
    let test = bg_color(Arc::new(MemoryStore::new()));
    let mut session = SessionOverrides::new();
    let err = test
        .force_selection(Some(&json!("green")), &mut session)
        .unwrap_err();
    assert!(matches!(err, AbError::InvalidOverride(_)));
    assert_eq!(err.info().code, "splitab.override_value");
    assert!(session.is_empty());
}

#[test]
fn forcing_picks_first_matching_index() {
    let mut test = AbTest::new(
        "dupes",
        ExperimentId::from_raw(2),
        Arc::new(MemoryStore::new()),
    );
    test.define_alternatives([json!("a"), json!("b"), json!("a")]);
    test.save().unwrap();
    let mut session = SessionOverrides::new();
    test.force_selection(Some(&json!("a")), &mut session).unwrap();
    assert_eq!(
        session.get(ExperimentId::from_raw(2)),
        Some(AlternativeId::from_index(0))
    );
}

#[test]
fn definition_guard_requires_two_alternatives() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    let mut single = AbTest::new("single", ExperimentId::from_raw(3), store.clone());
    single.define_alternatives([json!("only")]);
    let err = single.save().unwrap_err();
    assert!(matches!(err, AbError::Definition(_)));
    assert_eq!(err.info().code, "splitab.definition_count");
    assert!(!single.is_committed());

    let mut undefined = AbTest::new("undefined", ExperimentId::from_raw(4), store.clone());
    assert!(matches!(undefined.save(), Err(AbError::Definition(_))));

    let mut pair = AbTest::new("pair", ExperimentId::from_raw(5), store);
    pair.define_alternatives([json!(1), json!(2)]);
    pair.save().unwrap();
    assert!(pair.is_committed());
}

#[test]
fn uncommitted_experiments_refuse_assignment() {
    let store = Arc::new(MemoryStore::new());
    let mut test = AbTest::new("draft", ExperimentId::from_raw(6), store);
    test.define_alternatives([json!("x"), json!("y")]);

    let err = test.choose("user42", &NoOverrides).unwrap_err();
    assert_eq!(err.info().code, "splitab.definition_uncommitted");
    assert!(test.record_conversion("user42", &NoOverrides).is_err());
    assert!(test.alternatives().iter().all(|alt| alt.participants().unwrap() == 0));
}

#[test]
fn empty_definition_is_a_boolean_experiment() {
    let mut test = AbTest::new(
        "flag",
        ExperimentId::from_raw(7),
        Arc::new(MemoryStore::new()),
    );
    test.define_alternatives(Vec::<Value>::new());
    test.save().unwrap();
    let values: Vec<&Value> = test.alternatives().iter().map(|alt| alt.value()).collect();
    assert_eq!(values, vec![&json!(true), &json!(false)]);
    let chosen = test.choose("user42", &NoOverrides).unwrap();
    assert!(chosen.is_boolean());
}

#[test]
fn redefinition_replaces_indices_and_requires_commit() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut test = bg_color(store);
    test.define_alternatives([json!("red"), json!("blue"), json!("green")]);
    assert!(!test.is_committed());
    test.save().unwrap();
    let ids: Vec<usize> = test.alternatives().iter().map(|alt| alt.id().index()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    // bg_color/user42 mod 3 == 1
    assert_eq!(test.choose("user42", &NoOverrides).unwrap(), &json!("blue"));
}

#[test]
fn stale_override_surfaces_out_of_range() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut test = AbTest::new("shrinking", ExperimentId::from_raw(8), store);
    test.define_alternatives([json!("a"), json!("b"), json!("c")]);
    test.save().unwrap();

    let mut session = SessionOverrides::new();
    test.force_selection(Some(&json!("c")), &mut session).unwrap();

    test.define_alternatives([json!("a"), json!("b")]);
    test.save().unwrap();
    let err = test.choose("user42", &session).unwrap_err();
    assert!(matches!(err, AbError::OutOfRange(_)));
    assert_eq!(err.info().context.get("index").map(String::as_str), Some("2"));
    assert!(test.alternatives().iter().all(|alt| alt.participants().unwrap() == 0));
}

#[test]
fn choose_never_writes_the_override() {
    let test = bg_color(Arc::new(MemoryStore::new()));
    let session = SessionOverrides::new();
    test.choose("user42", &session).unwrap();
    test.record_conversion("user42", &session).unwrap();
    assert!(session.is_empty());
}

#[test]
fn report_snapshots_tallies() {
    let test = bg_color(Arc::new(MemoryStore::new()));
    for identity in ["user42", "user99", "user7", "alice", "bob"] {
        test.choose(identity, &NoOverrides).unwrap();
    }
    test.record_conversion("user42", &NoOverrides).unwrap();
    test.record_conversion("user42", &NoOverrides).unwrap();

    let report = test.report().unwrap();
    assert_eq!(report.name, "bg_color");
    assert_eq!(report.id, ExperimentId::from_raw(1));
    assert_eq!(report.alternatives.len(), 2);
    assert_eq!(report.total_participants(), 5);
    assert_eq!(report.total_conversions(), 2);

    let blue = &report.alternatives[1];
    assert_eq!(blue.value, json!("blue"));
    assert_eq!(blue.converted, 1);
    assert_eq!(blue.conversions, 2);
    let rate = blue.conversion_rate.unwrap();
    assert!((rate - 1.0 / blue.participants as f64).abs() < 1e-12);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["alternatives"][1]["value"], json!("blue"));
}

#[test]
fn reset_clears_all_alternatives() {
    let test = bg_color(Arc::new(MemoryStore::new()));
    test.choose("user42", &NoOverrides).unwrap();
    test.record_conversion("user42", &NoOverrides).unwrap();
    test.reset().unwrap();
    assert_eq!(tallies(&test), vec![(0, 0, 0), (0, 0, 0)]);
}

struct UnavailableStore;

impl UnavailableStore {
    fn fail(key: &str) -> AbError {
        AbError::Store(ErrorInfo::new("test.unavailable", "store offline").with_context("key", key))
    }
}

impl KeyValueStore for UnavailableStore {
    fn set_add(&self, key: &str, _member: &str) -> Result<(), AbError> {
        Err(Self::fail(key))
    }

    fn set_is_member(&self, key: &str, _member: &str) -> Result<bool, AbError> {
        Err(Self::fail(key))
    }

    fn set_cardinality(&self, key: &str) -> Result<u64, AbError> {
        Err(Self::fail(key))
    }

    fn counter_increment(&self, key: &str) -> Result<u64, AbError> {
        Err(Self::fail(key))
    }

    fn counter_get(&self, key: &str) -> Result<u64, AbError> {
        Err(Self::fail(key))
    }

    fn delete(&self, key: &str) -> Result<(), AbError> {
        Err(Self::fail(key))
    }
}

#[test]
fn store_failures_propagate_unmodified() {
    let test = bg_color(Arc::new(UnavailableStore));
    let expected = UnavailableStore::fail("1:alts:1:participants");

    assert_eq!(test.choose("user42", &NoOverrides).unwrap_err(), expected);
    assert_eq!(
        test.record_conversion("user42", &NoOverrides).unwrap_err(),
        expected
    );
    assert!(matches!(test.report(), Err(AbError::Store(_))));
}
