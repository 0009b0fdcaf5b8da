//! Integration tests for LedgerLens.

use std::io::Write;
use tempfile::NamedTempFile;

use ledgerlens::export::{self, column_widths};
use rust_xlsxwriter::{Format, Workbook};
use ledgerlens::{
    ColumnKind, ComparisonOp, DataType, DatePolicy, ExportFormat, FilterCondition, FilterError,
    FilterSet, LedgerConfig, LedgerError, Session, Value,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

const LEDGER: &str = "supplier,department,lpo_date,grn_date,ordered_qty,received_qty\n\
                      Acme,Stores,2024-01-10,2024-01-05,50,60\n\
                      Acme,Stores,2024-01-12,2024-01-12,150,150\n\
                      Acme,Works,2024-02-01,2024-02-10,120,100\n\
                      Globex,Works,2024-02-15,2024-02-20,200,200\n\
                      Globex,Stores,2024-03-01,,80,\n\
                      Initech,Works,2024-03-05,2024-03-04,90,95\n";

fn open_ledger() -> (NamedTempFile, Session) {
    let file = create_test_file(LEDGER);
    let session = Session::open(file.path()).expect("Load failed");
    (file, session)
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_csv_metadata() {
    let (_file, session) = open_ledger();
    let source = session.source();

    assert_eq!(source.row_count, 6);
    assert_eq!(source.column_count, 6);
    assert_eq!(source.format, "csv");
    assert!(source.hash.starts_with("sha256:"));
    assert!(source.path.is_some());
}

#[test]
fn test_load_tsv_auto_detect_and_trimmed_headers() {
    let content = " supplier \tlpo_date\n\
                   Acme\t2024-01-05\n\
                   Globex\t2024-01-06\n";
    let file = create_test_file(content);
    let session = Session::open(file.path()).expect("Load failed");

    assert_eq!(session.source().format, "tsv");
    assert_eq!(session.dataset().headers()[0], "supplier");
}

#[test]
fn test_missing_values_load_as_null() {
    let content = "supplier,qty\nAcme,NA\nGlobex,n/a\nInitech,\nUmbrella,5\n";
    let file = create_test_file(content);
    let session = Session::open(file.path()).expect("Load failed");

    let nulls = session.dataset().column_values(1).filter(|v| v.is_null()).count();
    assert_eq!(nulls, 3);
    assert_eq!(session.profile().columns[1].null_count, 3);
}

#[test]
fn test_duplicate_headers_fail_to_load() {
    let file = create_test_file("qty,qty\n1,2\n");
    let err = Session::open(file.path()).err().expect("should fail");
    assert!(matches!(err, LedgerError::DuplicateColumn(name) if name == "qty"));
}

#[test]
fn test_header_only_fails_to_load() {
    let file = create_test_file("supplier,qty\n");
    assert!(matches!(
        Session::open(file.path()),
        Err(LedgerError::EmptyData(_))
    ));
}

/// A first sheet laid out like the purchase ledger workbook: quantities as
/// numbers, one date column as date-formatted serials and one as text.
fn write_ledger_workbook(path: &std::path::Path) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();

    let headers = [" Supplier ", "lpo_date", "grn_date", "ordered_qty", "received_qty"];
    for (col, name) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }

    // 45301 = 2024-01-10, 45296 = 2024-01-05, 45311 = 2024-01-20
    let rows = [
        ("Acme", 45301.0, "2024-01-05", 50.0, 60.0),
        ("Acme", 45301.0, "2024-01-10", 50.0, 50.0),
        ("Globex", 45296.0, "2024-01-20", 50.0, 40.0),
    ];
    for (idx, (supplier, lpo, grn, ordered, received)) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, *supplier).unwrap();
        sheet.write_number_with_format(row, 1, *lpo, &date_format).unwrap();
        sheet.write_string(row, 2, *grn).unwrap();
        sheet.write_number(row, 3, *ordered).unwrap();
        sheet.write_number(row, 4, *received).unwrap();
    }
    workbook.save(path).unwrap();
}

#[test]
fn test_load_workbook_first_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.xlsx");
    write_ledger_workbook(&path);

    let session = Session::open(&path).expect("workbook load failed");
    assert_eq!(session.source().format, "xlsx");
    assert_eq!(session.source().row_count, 3);
    assert_eq!(session.dataset().headers()[0], "Supplier");

    let lpo = session.profile().get_column("lpo_date").unwrap();
    assert_eq!(lpo.data_type, DataType::Date);
    let grn = session.profile().get_column("grn_date").unwrap();
    assert_eq!(grn.data_type, DataType::Date);
    assert_eq!(
        session.profile().get_column("ordered_qty").unwrap().data_type,
        DataType::Numeric
    );

    let summary = session.reconciliation();
    let dates = summary.dates.unwrap();
    assert_eq!((dates.compared, dates.late), (3, 1));
    let qty = summary.quantities.unwrap();
    assert_eq!((qty.over_received, qty.matched, qty.under_received), (1, 1, 1));
}

#[test]
fn test_corrupt_workbook_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.xlsx");
    std::fs::write(&path, b"PK\x03\x04").unwrap();

    assert!(matches!(
        Session::open(&path),
        Err(LedgerError::Workbook(_))
    ));
}

#[test]
fn test_xlsx_export_reloads() {
    let (_file, mut session) = open_ledger();
    session
        .apply(FilterSet::new().with(FilterCondition::equals("supplier", "Acme")))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("filtered_data.xlsx");
    export::save(&session.annotated_view().unwrap(), ExportFormat::Xlsx, &path).unwrap();

    let reloaded = Session::open(&path).unwrap();
    assert_eq!(reloaded.dataset().row_count(), 3);
    assert_eq!(
        reloaded.dataset().headers().last().map(String::as_str),
        Some("qty_status")
    );
    assert_eq!(
        reloaded.dataset().value(0, "date_status"),
        Some(&Value::text("late"))
    );
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(
        Session::open("/nonexistent/ledger.csv"),
        Err(LedgerError::Io { .. })
    ));
}

// =============================================================================
// Profiling
// =============================================================================

#[test]
fn test_profile_column_kinds() {
    let (_file, session) = open_ledger();
    let profile = session.profile();

    let supplier = profile.get_column("supplier").unwrap();
    assert_eq!(supplier.kind, ColumnKind::Categorical);
    assert_eq!(
        supplier.categories.as_deref(),
        Some(&[Value::text("Acme"), Value::text("Globex"), Value::text("Initech")][..])
    );

    let grn = profile.get_column("grn_date").unwrap();
    assert_eq!(grn.data_type, DataType::Date);
    assert_eq!(grn.null_count, 1);

    let qty = profile.get_column("ordered_qty").unwrap();
    assert_eq!(qty.data_type, DataType::Numeric);
    assert_eq!(qty.numeric_range, Some((50.0, 200.0)));
}

#[test]
fn test_high_cardinality_column_not_categorical() {
    let mut content = String::from("invoice,amount\n");
    for i in 0..30 {
        content.push_str(&format!("INV-{:04},{}\n", i, i * 10));
    }
    let file = create_test_file(&content);
    let session = Session::open(file.path()).unwrap();

    assert_eq!(session.profile().columns[0].kind, ColumnKind::Text);
    assert_eq!(session.profile().columns[1].kind, ColumnKind::Numeric);
    assert_eq!(session.profile().categorical_columns().count(), 0);
}

// =============================================================================
// Filtering
// =============================================================================

#[test]
fn test_supplier_then_quantity() {
    let (_file, mut session) = open_ledger();
    let filters = FilterSet::new()
        .with(FilterCondition::equals("supplier", "Acme"))
        .with(FilterCondition::compare("ordered_qty", ComparisonOp::Gt, "100"));

    let report = session.apply(filters).unwrap();
    assert_eq!(report.stats().matched_rows, 2);
    assert_eq!(report.stats().excluded_rows, 4);

    let view = session.view().unwrap();
    for row in 0..view.row_count() {
        assert_eq!(view.value(row, "supplier"), Some(&Value::text("Acme")));
        assert!(view.value(row, "ordered_qty").unwrap().as_number().unwrap() > 100.0);
    }
}

#[test]
fn test_textual_conditions() {
    let (_file, mut session) = open_ledger();
    let filters: FilterSet = [
        "department=Works",
        "received_qty < @ordered_qty",
        "lpo_date=2024-01-01..2024-12-31",
    ]
    .iter()
    .map(|s| s.parse::<FilterCondition>().unwrap())
    .collect();

    let report = session.apply(filters).unwrap();
    assert_eq!(report.stats().matched_rows, 1);
    assert_eq!(
        session.view().unwrap().value(0, "received_qty"),
        Some(&Value::Number(100.0))
    );
}

#[test]
fn test_all_on_every_categorical_column_is_noop() {
    let (_file, mut session) = open_ledger();
    let filters: FilterSet = session
        .profile()
        .categorical_columns()
        .map(|c| FilterCondition::all(c.name.clone()))
        .collect();
    assert!(!filters.is_empty());

    session.apply(filters).unwrap();
    assert_eq!(session.view().unwrap(), session.dataset());
}

#[test]
fn test_date_range_inclusive_on_both_ends() {
    let (_file, mut session) = open_ledger();
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();
    let end = chrono::NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
    let filters = FilterSet::new().with(FilterCondition::date_range("lpo_date", start, end));

    let report = session.apply(filters).unwrap();
    assert_eq!(report.stats().matched_rows, 3);
}

#[test]
fn test_string_fallback_against_numeric_column() {
    let (_file, mut session) = open_ledger();
    let filters =
        FilterSet::new().with(FilterCondition::compare("ordered_qty", ComparisonOp::Ge, "abc"));

    let report = session.apply(filters).unwrap();
    // Digits sort before letters, so no rendered number is >= "abc"
    assert!(report.outcome.is_empty());
}

#[test]
fn test_no_rows_matched() {
    let (_file, mut session) = open_ledger();
    let filters = FilterSet::new().with(FilterCondition::equals("supplier", "Umbrella"));

    let report = session.apply(filters).unwrap();
    assert!(report.outcome.is_empty());
    assert_eq!(report.stats().matched_rows, 0);
    assert_eq!(report.reconciliation.total_rows, 0);
}

#[test]
fn test_invalid_filters_leave_view_unfiltered() {
    let (_file, mut session) = open_ledger();

    let filters = FilterSet::new()
        .with(FilterCondition::compare("ordered_qty", ComparisonOp::Gt, "10"))
        .with(FilterCondition::equals("warehouse", "North"));

    let err = session.apply(filters).unwrap_err();
    assert_eq!(err, FilterError::UnknownColumn("warehouse".to_string()));
    assert_eq!(session.view().unwrap().row_count(), 6);

    assert!(matches!(
        "ordered_qty => 10".parse::<FilterCondition>(),
        Err(FilterError::UnsupportedOperator(_))
    ));
}

// =============================================================================
// Reconciliation
// =============================================================================

#[test]
fn test_reconciliation_over_full_ledger() {
    let (_file, session) = open_ledger();
    let summary = session.reconciliation();

    assert_eq!(summary.total_rows, 6);
    let dates = summary.dates.unwrap();
    assert_eq!(dates.compared, 5);
    assert_eq!(dates.late, 2);
    assert_eq!(dates.valid, 3);
    assert_eq!(dates.valid + dates.late, dates.compared);

    let qty = summary.quantities.unwrap();
    assert_eq!(qty.compared, 5);
    assert_eq!(qty.matched, 2);
    assert_eq!(qty.over_received, 2);
    assert_eq!(qty.under_received, 1);
}

#[test]
fn test_reconciliation_follows_filters() {
    let (_file, mut session) = open_ledger();
    let report = session
        .apply(FilterSet::new().with(FilterCondition::equals("supplier", "Globex")))
        .unwrap();

    let dates = report.reconciliation.dates.unwrap();
    assert_eq!(report.reconciliation.total_rows, 2);
    assert_eq!(dates.compared, 1);
    assert_eq!(dates.late, 0);
}

#[test]
fn test_lenient_policy_from_config_file() {
    let config_file = create_test_file(r#"{"date_policy": "lenient"}"#);
    let config = LedgerConfig::from_file(config_file.path()).unwrap();
    assert_eq!(config.date_policy, DatePolicy::Lenient);

    let data = create_test_file(LEDGER);
    let session = Session::open_with_config(data.path(), config).unwrap();
    let dates = session.reconciliation().dates.unwrap();
    assert_eq!(dates.early, 2);
    assert_eq!(dates.late, 0);
    assert_eq!(dates.valid, 5);
}

#[test]
fn test_custom_column_names_discovered() {
    let content = "Vendor,PO Date,Receipt Date,Qty Ordered,Qty Received\n\
                   Acme,2024-01-10,2024-01-11,5,5\n";
    let file = create_test_file(content);
    let mut config = LedgerConfig::default();
    config.conventions.order_date = "po_date".to_string();
    config.conventions.receipt_date = "receipt_date".to_string();

    let session = Session::open_with_config(file.path(), config).unwrap();
    let summary = session.reconciliation();
    assert_eq!(summary.dates.unwrap().valid, 1);
    // Quantity columns do not follow the configured names
    assert!(summary.quantities.is_none());
}

#[test]
fn test_breakdown_by_department() {
    let (_file, session) = open_ledger();
    let breakdown = session.breakdown("department").unwrap();

    let labels: Vec<String> = breakdown.groups.iter().map(|g| g.value.to_string()).collect();
    assert_eq!(labels, vec!["Stores", "Works"]);
    assert_eq!(breakdown.groups[0].summary.total_rows, 3);
    assert_eq!(breakdown.groups[1].summary.dates.unwrap().late, 1);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_export_annotated_view_to_file() {
    let (_file, mut session) = open_ledger();
    session
        .apply(FilterSet::new().with(FilterCondition::equals("supplier", "Acme")))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered_data.tsv");
    let annotated = session.annotated_view().unwrap();
    export::save(&annotated, ExportFormat::Tsv, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "supplier\tdepartment\tlpo_date\tgrn_date\tordered_qty\treceived_qty\tdate_status\tqty_status"
    );
    assert_eq!(
        lines.next().unwrap(),
        "Acme\tStores\t2024-01-10\t2024-01-05\t50\t60\tlate\tover_received"
    );
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn test_export_json_records() {
    let (_file, session) = open_ledger();
    let bytes = session.export(ExportFormat::Json).unwrap();
    let records: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(records.as_array().unwrap().len(), 6);
    assert_eq!(records[4]["grn_date"], serde_json::Value::Null);
    assert_eq!(records[4]["date_status"], "not_applicable");
    assert_eq!(records[0]["ordered_qty"], 50.0);
}

#[test]
fn test_export_keeps_part_codes_verbatim() {
    let file = create_test_file(
        "part_code,ordered_qty\n000452,5\n5E3,7\n12345678901234567891,1\n",
    );
    let session = Session::open(file.path()).unwrap();
    let csv = String::from_utf8(export::to_bytes(session.dataset(), ExportFormat::Csv).unwrap())
        .unwrap();

    assert_eq!(
        csv,
        "part_code,ordered_qty\n000452,5\n5E3,7\n12345678901234567891,1\n"
    );
    assert_eq!(
        session.profile().get_column("part_code").unwrap().data_type,
        DataType::Text
    );
}

#[test]
fn test_column_widths_for_preview() {
    let (_file, session) = open_ledger();
    let widths = column_widths(session.dataset());
    // "supplier" header (8) is wider than any value; dates are 10 wide
    assert_eq!(widths[0], 10);
    assert_eq!(widths[2], 12);
}

// =============================================================================
// Refresh
// =============================================================================

#[test]
fn test_refresh_picks_up_new_rows() {
    let mut file = create_test_file(LEDGER);
    let mut session = Session::open(file.path()).unwrap();
    session
        .apply(FilterSet::new().with(FilterCondition::equals("supplier", "Initech")))
        .unwrap();
    assert_eq!(session.view().unwrap().row_count(), 1);

    file.write_all(b"Initech,Stores,2024-04-01,2024-04-02,10,10\n")
        .unwrap();
    file.flush().unwrap();

    let report = session.refresh().unwrap();
    assert!(report.changed);
    assert!(report.filters_kept);
    assert_eq!(report.source.row_count, 7);
    assert_eq!(session.view().unwrap().row_count(), 2);
}
