mod common;

use proptest::prelude::*;
use sheet_cleaner::classify::{DEFAULT_MIN_RATIO, auto_candidates, classify, score_column};
use sheet_cleaner::data::Value;

use common::{raw_column, table, text};

#[test]
fn mostly_dates_column_passes_default_threshold() {
    let values = vec![
        text("2024-01-05"),
        text("2024-03-12"),
        text("not a date"),
        text("2024-07-01"),
    ];
    let scored = score_column(&values, DEFAULT_MIN_RATIO);
    assert_eq!((scored.parsed, scored.total), (3, 4));
    assert_eq!(scored.ratio, 0.75);
    assert!(classify(&values, DEFAULT_MIN_RATIO));
}

#[test]
fn threshold_is_inclusive() {
    let values = vec![text("2024-01-05"), text("2024-01-06"), text("x"), text("y"), text("2024-01-07")];
    assert!(classify(&values, 0.6));
    assert!(!classify(&values, 0.61));
}

#[test]
fn empty_column_is_never_date_like() {
    assert!(!classify(&[], DEFAULT_MIN_RATIO));
    assert!(!classify(&[], 0.0));
}

#[test]
fn missing_cells_count_against_the_ratio() {
    let values = vec![text("05/01/2024"), Value::Missing];
    let scored = score_column(&values, DEFAULT_MIN_RATIO);
    assert_eq!(scored.ratio, 0.5);
    assert!(!scored.is_date_like);
}

#[test]
fn numeric_cells_do_not_count_as_dates() {
    let values = vec![Value::Integer(20240105), Value::Float(45296.0)];
    assert!(!classify(&values, 0.1));
}

#[test]
fn auto_candidates_skip_numeric_columns() {
    let data = table(vec![
        raw_column("id", &["1", "2", "3", "4"]),
        raw_column("when", &["05/01/2024", "06/01/2024", "", "07/01/2024"]),
        raw_column("score", &["1.5", "", "2", "3"]),
        raw_column("active", &["true", "false", "true", "true"]),
        raw_column("label", &["a", "b", "3", "d"]),
    ]);
    assert_eq!(auto_candidates(&data), vec!["when", "label"]);
}

fn cell_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Missing),
        (1u32..=28, 1u32..=12, 1990i32..2040)
            .prop_map(|(d, m, y)| Value::Text(format!("{d:02}/{m:02}/{y}"))),
        "[a-z ]{0,12}".prop_map(Value::Text),
        any::<i64>().prop_map(Value::Integer),
    ]
}

proptest! {
    #[test]
    fn classification_is_deterministic(values in prop::collection::vec(cell_strategy(), 0..40), ratio in 0.0f64..=1.0) {
        prop_assert_eq!(classify(&values, ratio), classify(&values, ratio));
        prop_assert_eq!(score_column(&values, ratio), score_column(&values, ratio));
    }

    #[test]
    fn raising_the_threshold_never_turns_false_into_true(
        values in prop::collection::vec(cell_strategy(), 0..40),
        low in 0.0f64..=1.0,
        high in 0.0f64..=1.0,
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        if classify(&values, high) {
            prop_assert!(classify(&values, low));
        }
    }
}
