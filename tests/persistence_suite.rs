use std::fs;

use chrono::NaiveDate;
use habit_core::errors::HabitError;
use habit_core::habit::{
    Condition, Criteria, Direction, FieldType, Habit, HabitKind, NumericSubkind, Schema,
    ScoringMode,
};
use habit_core::storage::{JsonSchemaStore, SchemaStore};
use regex::Regex;
use tempfile::TempDir;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
}

fn simple(title: &str) -> Habit {
    Habit {
        id: String::new(),
        title: title.into(),
        description: String::new(),
        habit_type: HabitKind::Simple,
        field_type: FieldType::Boolean,
        scoring_type: ScoringMode::Manual,
        direction: Direction::Neutral,
        prompt: format!("Did you complete {title} today?"),
        criteria: None,
        mini_criteria: None,
        midi_criteria: None,
        maxi_criteria: None,
    }
}

fn tier(label: &str, minutes: f64) -> Option<Criteria> {
    Some(Criteria {
        description: format!("{label} tier: at least {minutes:.1} minutes"),
        condition: Condition::GreaterThanOrEqual(minutes),
    })
}

fn exercise(tiers: [f64; 3]) -> Habit {
    Habit {
        id: String::new(),
        title: "Exercise Duration".into(),
        description: String::new(),
        habit_type: HabitKind::Elastic,
        field_type: FieldType::Numeric {
            subkind: NumericSubkind::UnsignedInt,
            unit: "minutes".into(),
            min: None,
            max: None,
        },
        scoring_type: ScoringMode::Automatic,
        direction: Direction::HigherBetter,
        prompt: "Record Exercise Duration for today".into(),
        criteria: None,
        mini_criteria: tier("Mini", tiers[0]),
        midi_criteria: tier("Midi", tiers[1]),
        maxi_criteria: tier("Maxi", tiers[2]),
    }
}

#[test]
fn saved_schema_loads_back_identically() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("nested").join("habits.json");
    let store = JsonSchemaStore::new();

    let mut schema = Schema::new(day());
    schema.upsert(simple("Drink water"));
    schema.upsert(exercise([15.0, 30.0, 60.0]));
    store.save_schema(&schema, &path).expect("save");

    let loaded = store.load_schema(&path).expect("load");
    assert_eq!(loaded, schema);
    assert_eq!(loaded.version, "1.0.0");

    let raw = fs::read_to_string(&path).expect("read back");
    assert!(raw.contains("\"habit_type\": \"elastic\""));
    assert!(raw.contains("\"mini_criteria\""));
    assert!(!raw.contains("\"criteria\": null"));
}

#[test]
fn colliding_titles_get_numbered_slugs() {
    let mut schema = Schema::new(day());
    let ids: Vec<String> = (0..3)
        .map(|_| schema.upsert(simple("Morning Walk!")).id.clone())
        .collect();
    assert_eq!(ids, vec!["morning_walk", "morning_walk_2", "morning_walk_3"]);

    let slug = Regex::new(r"^[a-z0-9]+(_[a-z0-9]+)*$").expect("regex");
    assert!(ids.iter().all(|id| slug.is_match(id)));
    assert!(schema.validate().is_ok());
}

#[test]
fn upsert_replaces_the_habit_with_the_same_id() {
    let mut schema = Schema::new(day());
    let id = schema.upsert(simple("Read")).id.clone();

    let mut renamed = simple("Read a chapter");
    renamed.id = id.clone();
    schema.upsert(renamed);

    assert_eq!(schema.habits.len(), 1);
    assert_eq!(schema.find(&id).map(|habit| habit.title.as_str()), Some("Read a chapter"));
}

#[test]
fn loading_back_fills_missing_ids_without_clashing() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("habits.json");
    fs::write(
        &path,
        r#"{
  "version": "1.0.0",
  "created_date": "2024-03-01",
  "habits": [
    { "id": "read", "title": "Read", "habit_type": "simple",
      "field_type": { "type": "boolean" }, "scoring_type": "manual" },
    { "title": "Read", "habit_type": "simple",
      "field_type": { "type": "boolean" }, "scoring_type": "manual" }
  ]
}"#,
    )
    .expect("seed");

    let store = JsonSchemaStore::new();
    let schema = store.load_schema(&path).expect("load");
    assert_eq!(schema.habits[1].id, "read_2");

    let reloaded = store.load_schema(&path).expect("reload");
    assert_eq!(reloaded, schema);
}

#[cfg(unix)]
#[test]
fn read_only_directory_still_loads_with_generated_ids() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().expect("temp dir");
    let dir = temp.path().join("locked");
    fs::create_dir(&dir).expect("create dir");
    let path = dir.join("habits.json");
    let seeded = r#"{
  "version": "1.0.0",
  "created_date": "2024-03-01",
  "habits": [
    { "title": "Morning Walk", "habit_type": "simple",
      "field_type": { "type": "boolean" }, "scoring_type": "manual" }
  ]
}"#;
    fs::write(&path, seeded).expect("seed");
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).expect("lock dir");

    // Privileged users ignore directory permissions; nothing to observe then.
    let writable = fs::write(dir.join("canary"), "").is_ok();
    if !writable {
        let schema = JsonSchemaStore::new().load_schema(&path).expect("load");
        assert_eq!(schema.habits[0].id, "morning_walk");
        assert_eq!(fs::read_to_string(&path).expect("read"), seeded);
        assert!(!dir.join("habits.json.tmp").exists());
    }

    fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).expect("unlock dir");
}

#[test]
fn misordered_tiers_are_rejected_before_writing() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("habits.json");
    let store = JsonSchemaStore::new();

    let mut good = Schema::new(day());
    good.upsert(simple("Walk"));
    store.save_schema(&good, &path).expect("save good");
    let before = fs::read_to_string(&path).expect("read");

    let mut bad = good.clone();
    bad.upsert(exercise([45.0, 30.0, 60.0]));
    match store.save_schema(&bad, &path) {
        Err(HabitError::InvalidSchema(problems)) => {
            assert_eq!(problems.len(), 1);
            assert!(problems[0].starts_with("habit `exercise_duration`"));
            assert!(problems[0].contains("mini criteria value (45.0)"));
        }
        other => panic!("expected InvalidSchema, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&path).expect("read"), before);
}

#[test]
fn missing_file_loads_as_an_empty_schema() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("absent.json");
    let schema = JsonSchemaStore::new().load_or_default(&path).expect("default");
    assert!(schema.habits.is_empty());
    assert!(!path.exists());
}

#[test]
fn corrupt_json_is_reported() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("habits.json");
    fs::write(&path, "{ not json").expect("seed");
    let err = JsonSchemaStore::new().load_schema(&path).unwrap_err();
    assert!(matches!(err, HabitError::Serde(_)));
}
