mod common;

use proptest::prelude::*;
use sheet_cleaner::data::Value;
use sheet_cleaner::error::ConversionError;
use sheet_cleaner::io_utils::{DecodeOptions, decode_delimited};
use sheet_cleaner::normalize::{NormalizeOptions, normalize_dates, normalize_dates_with};
use sheet_cleaner::table::{Column, Table};

use common::{names, raw_column, table, text};

fn orders() -> Table {
    table(vec![
        raw_column("id", &["1", "2", "3", "4"]),
        raw_column(
            "ordered",
            &["2024-01-05", "2024-03-12", "not a date", "2024-07-01"],
        ),
        raw_column("shipped", &["03/04/2024", "15/06/2024", "", "01/01/2025"]),
        raw_column("note", &["fast", "slow", "fast", "n/a"]),
    ])
}

#[test]
fn auto_mode_converts_detected_columns_in_table_order() {
    let input = orders();
    let (output, report) = normalize_dates(&input, None);

    assert!(report.auto_detected);
    assert_eq!(report.handled_columns(), vec!["ordered", "shipped"]);
    assert_eq!(
        output.column("ordered").unwrap().values(),
        &[
            text("2024-01-05"),
            text("2024-03-12"),
            Value::Missing,
            text("2024-07-01")
        ]
    );
    assert_eq!(
        output.column("shipped").unwrap().values(),
        &[
            text("2024-04-03"),
            text("2024-06-15"),
            Value::Missing,
            text("2025-01-01")
        ]
    );
    assert_eq!(output.column("id"), input.column("id"));
    assert_eq!(output.column("note"), input.column("note"));
}

#[test]
fn report_counts_blanked_cells() {
    let (_, report) = normalize_dates(&orders(), None);
    let ordered = &report.handled[0];
    assert_eq!((ordered.converted, ordered.blanked), (3, 1));
    // The empty cell in "shipped" was already missing, so nothing was lost.
    let shipped = &report.handled[1];
    assert_eq!((shipped.converted, shipped.blanked), (3, 0));
    assert_eq!(report.blanked_cells(), 1);
}

#[test]
fn input_table_is_left_untouched() {
    let input = orders();
    let snapshot = input.clone();
    let _ = normalize_dates(&input, None);
    assert_eq!(input, snapshot);
}

#[test]
fn empty_selection_behaves_like_no_selection() {
    let input = orders();
    let empty: Vec<String> = Vec::new();
    assert_eq!(normalize_dates(&input, Some(empty.as_slice())), normalize_dates(&input, None));
}

#[test]
fn explicit_selection_overrides_detection() {
    let input = orders();
    let selected = names(&["note", "ordered"]);
    let (output, report) = normalize_dates(&input, Some(selected.as_slice()));

    assert!(!report.auto_detected);
    assert_eq!(report.handled_columns(), vec!["note", "ordered"]);
    assert!(output.column("note").unwrap().values().iter().all(Value::is_missing));
    // Not selected, so left as text even though it looks like dates.
    assert_eq!(output.column("shipped"), input.column("shipped"));
}

#[test]
fn explicit_selection_can_target_numeric_columns() {
    let (output, report) = normalize_dates(&orders(), Some(names(&["id"]).as_slice()));
    assert_eq!(report.handled_columns(), vec!["id"]);
    assert!(output.column("id").unwrap().values().iter().all(Value::is_missing));
}

#[test]
fn unknown_selected_names_are_skipped_silently() {
    let (output, report) = normalize_dates(&orders(), Some(names(&["missing", "ordered"]).as_slice()));
    assert_eq!(report.handled_columns(), vec!["ordered"]);
    assert_eq!(
        report.skipped,
        vec![ConversionError::UnknownColumn("missing".to_string())]
    );
    assert_eq!(output.column_names(), orders().column_names());
}

#[test]
fn incompatible_column_is_skipped_and_others_continue() {
    let input = table(vec![
        raw_column("flag", &["true", "", "false"]),
        raw_column("when", &["05/01/2024", "06/01/2024", "07/01/2024"]),
    ]);
    let (output, report) = normalize_dates(&input, Some(names(&["flag", "when"]).as_slice()));

    assert_eq!(report.handled_columns(), vec!["when"]);
    assert!(matches!(
        report.skipped.as_slice(),
        [ConversionError::Incompatible { column, .. }] if column == "flag"
    ));
    assert_eq!(output.column("flag"), input.column("flag"));
    assert_eq!(
        output.column("when").unwrap().values()[0],
        text("2024-01-05")
    );
}

#[test]
fn stray_boolean_in_delimited_date_column_is_blanked() {
    let bytes = b"due\n2024-01-05\n2024-02-01\n2024-03-01\ntrue\n";
    let input = decode_delimited(bytes, &DecodeOptions::default(), b',').unwrap();

    for selected in [None, Some(names(&["due"]))] {
        let (output, report) = normalize_dates(&input, selected.as_deref());
        assert_eq!(report.handled_columns(), vec!["due"]);
        assert!(report.skipped.is_empty());
        assert_eq!(
            output.column("due").unwrap().values(),
            &[
                text("2024-01-05"),
                text("2024-02-01"),
                text("2024-03-01"),
                Value::Missing
            ]
        );
    }
}

#[test]
fn columns_are_converted_independently() {
    let input = orders();
    let (both, _) = normalize_dates(&input, Some(names(&["ordered", "shipped"]).as_slice()));
    let (alone, _) = normalize_dates(&input, Some(names(&["ordered"]).as_slice()));
    assert_eq!(both.column("ordered"), alone.column("ordered"));
}

#[test]
fn threshold_option_controls_auto_detection() {
    let strict = NormalizeOptions { min_ratio: 0.8 };
    let (_, report) = normalize_dates_with(&orders(), None, &strict);
    assert!(report.handled_columns().is_empty());
}

#[test]
fn spreadsheet_date_cells_are_rendered_canonically() {
    let day = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let input = table(vec![Column::new(
        "booked",
        vec![
            Value::Date(day),
            Value::DateTime(day.and_hms_opt(13, 45, 0).unwrap()),
            text("1 March 2024"),
        ],
    )]);
    let (output, report) = normalize_dates(&input, None);
    assert_eq!(report.handled_columns(), vec!["booked"]);
    assert_eq!(
        output.column("booked").unwrap().values(),
        &[text("2024-02-29"), text("2024-02-29"), text("2024-03-01")]
    );
}

#[test]
fn empty_table_yields_empty_report() {
    let (output, report) = normalize_dates(&Table::default(), None);
    assert_eq!(output.column_count(), 0);
    assert!(report.handled.is_empty());
    assert!(report.skipped.is_empty());
}

proptest! {
    #[test]
    fn normalizing_canonical_dates_is_idempotent(
        days in prop::collection::vec((1u32..=28, 1u32..=12, 1900i32..2100), 1..30)
    ) {
        let values = days
            .iter()
            .map(|(d, m, y)| Value::Text(format!("{y:04}-{m:02}-{d:02}")))
            .collect::<Vec<_>>();
        let input = table(vec![Column::new("d", values)]);
        let selected = names(&["d"]);
        let (once, _) = normalize_dates(&input, Some(selected.as_slice()));
        let (twice, _) = normalize_dates(&once, Some(selected.as_slice()));
        prop_assert_eq!(&once, &input);
        prop_assert_eq!(&twice, &once);
    }
}
