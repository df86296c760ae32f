//! Integration tests for spoolbook.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Reader};
use tempfile::TempDir;

use spoolbook::input::read_workbook;
use spoolbook::spool::view;
use spoolbook::{
    convert_batch, read_table, BatchOptions, BatchReport, ClassificationKey, ColumnLayout,
    ColumnPolicy, Consolidator, CsvSink, ItemOutcome, LedgerLayout, SpoolConfig, SpoolParser,
    SpoolbookError, TableSink, Table, XlsxSink, write_partitions,
};

/// Helper to write a file with given bytes into a directory.
fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Spool Conversion
// =============================================================================

#[test]
fn test_convert_continuation_lines() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "ETAT.hpspool", b"ALPHA 1 2 3\n   4 5\n");

    let conversion = SpoolParser::new()
        .convert(&input, dir.path().join("ETAT.xlsx"))
        .expect("Conversion failed");

    let (table, _) = read_workbook(&conversion.output).unwrap();
    assert_eq!(
        table.headers,
        strings(&["Column_1", "Column_2", "Column_3", "Column_4", "Column_5", "Column_6"])
    );
    assert_eq!(table.rows, vec![strings(&["ALPHA", "1", "2", "3", "4", "5"])]);
    assert_eq!(conversion.source.format, "spool");
    assert!(conversion.source.hash.starts_with("sha256:"));
}

#[test]
fn test_convert_strips_control_sequences() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        dir.path(),
        "colored.hpspool",
        b"\x0c\x1b[1mTOTAL\x1b[0m 42\r\n\x1b[2J\n  \x1b[31m7\x1b[0m\n",
    );

    let conversion = SpoolParser::new()
        .convert(&input, dir.path().join("colored.xlsx"))
        .unwrap();

    assert_eq!(conversion.table.rows, vec![strings(&["TOTAL", "42", "7"])]);
}

#[test]
fn test_form_feed_only_is_no_data() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "blank.hpspool", b"\x0c\n");
    let output = dir.path().join("blank.xlsx");

    let err = SpoolParser::new().convert(&input, &output).unwrap_err();

    match err {
        SpoolbookError::NoDataFound { path } => assert_eq!(path, Some(input)),
        other => panic!("Expected NoDataFound, got {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn test_missing_source_is_not_found() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.txt");
    let output = dir.path().join("out").join("missing.xlsx");

    let err = SpoolParser::new().convert(&missing, &output).unwrap_err();

    assert!(matches!(err, SpoolbookError::SourceNotFound { ref path } if *path == missing));
    assert!(!output.exists());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_first_record_fixes_width() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "wide.hpspool", b"A B C\nD E F G H\nI\n");

    let conversion = SpoolParser::new()
        .convert(&input, dir.path().join("wide.xlsx"))
        .unwrap();

    let (table, _) = read_workbook(&conversion.output).unwrap();
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.rows[1], strings(&["D", "E", "F"]));
    assert_eq!(table.rows[2], strings(&["I", "", ""]));
}

#[test]
fn test_widest_policy_keeps_all_fields() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "wide.hpspool", b"A B C\nD E F G H\n");
    let parser =
        SpoolParser::with_config(SpoolConfig::default().with_column_policy(ColumnPolicy::Widest));

    let conversion = parser.convert(&input, dir.path().join("wide.xlsx")).unwrap();

    assert_eq!(conversion.table.column_count(), 5);
    assert_eq!(conversion.table.rows[0], strings(&["A", "B", "C", "", ""]));
}

#[test]
fn test_output_extension_forced_and_directory_created() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "report.hpspool", b"X 1\n");
    let requested = dir.path().join("nested").join("deeper").join("out.txt");

    let conversion = SpoolParser::new().convert(&input, &requested).unwrap();

    let expected = dir.path().join("nested").join("deeper").join("out.xlsx");
    assert_eq!(conversion.output, expected);
    assert!(expected.exists());
    assert!(!requested.exists());
}

#[test]
fn test_convert_twice_overwrites_with_same_rows() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "twice.hpspool", b"R1 a b\n  c\nR2 d e\n");
    let output = dir.path().join("twice.xlsx");
    let parser = SpoolParser::new();

    parser.convert(&input, &output).unwrap();
    let (first, _) = read_workbook(&output).unwrap();
    parser.convert(&input, &output).unwrap();
    let (second, _) = read_workbook(&output).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.row_count(), 2);
}

#[test]
fn test_convert_to_csv_sink() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "plain.hpspool", b"A B\nC D\n");

    let conversion = SpoolParser::new()
        .convert_with(&input, dir.path().join("plain.out"), &CsvSink::new())
        .unwrap();

    assert_eq!(conversion.output, dir.path().join("plain.csv"));
    let text = fs::read_to_string(&conversion.output).unwrap();
    assert_eq!(text, "Column_1,Column_2\nA,B\nC,D\n");
}

#[test]
fn test_view_lists_visible_lines() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "view.hpspool", b"\x0cHEADER\n\n  DETAIL 1\r\n");

    let listing = view(&input).unwrap();

    assert_eq!(listing.total_lines, 3);
    assert_eq!(listing.lines.len(), 2);
    assert_eq!(listing.lines[0].number, 1);
    assert_eq!(listing.lines[0].text, "HEADER");
    assert_eq!(listing.lines[1].number, 3);
    assert_eq!(listing.lines[1].text, "  DETAIL 1");
}

// =============================================================================
// Batch Conversion
// =============================================================================

#[test]
fn test_batch_records_each_outcome() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.hpspool", b"A 1\n");
    write_file(dir.path(), "b.hpspool", b"\x0c\n");
    write_file(dir.path(), "c.hpspool", b"C 3 4\n");
    write_file(dir.path(), "notes.txt", b"ignored\n");
    let out_dir = dir.path().join("xlsx");

    let report = convert_batch(
        dir.path(),
        "*.hpspool",
        &out_dir,
        &SpoolParser::new(),
        &BatchOptions::default(),
    )
    .unwrap();

    assert_eq!(report.items.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(out_dir.join("a.xlsx").exists());
    assert!(!out_dir.join("b.xlsx").exists());
    assert!(out_dir.join("c.xlsx").exists());

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.source, dir.path().join("b.hpspool"));
    match &failure.outcome {
        ItemOutcome::Failed { reason } => assert!(reason.contains("No data found")),
        other => panic!("Expected failure, got {:?}", other),
    }
}

#[test]
fn test_batch_fail_fast_stops() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.hpspool", b"\x0c\n");
    write_file(dir.path(), "b.hpspool", b"B 2\n");
    let out_dir = dir.path().join("xlsx");

    let err = convert_batch(
        dir.path(),
        "*.hpspool",
        &out_dir,
        &SpoolParser::new(),
        &BatchOptions { fail_fast: true },
    )
    .unwrap_err();

    assert!(matches!(err, SpoolbookError::NoDataFound { .. }));
    assert!(!out_dir.join("b.xlsx").exists());
}

#[test]
fn test_batch_without_matches_is_empty_data() {
    let dir = TempDir::new().unwrap();

    let err = convert_batch(
        dir.path(),
        "*.hpspool",
        dir.path().join("xlsx"),
        &SpoolParser::new(),
        &BatchOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, SpoolbookError::EmptyData(_)));
}

#[test]
fn test_batch_report_saves_as_json() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "a.hpspool", b"A 1\n");
    let report = convert_batch(
        dir.path(),
        "*.hpspool",
        dir.path().join("xlsx"),
        &SpoolParser::new(),
        &BatchOptions::default(),
    )
    .unwrap();
    let report_path = dir.path().join("reports").join("batch.json");

    report.save(&report_path).unwrap();

    let loaded: BatchReport =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(loaded.items, report.items);
}

// =============================================================================
// Consolidation
// =============================================================================

#[test]
fn test_consolidate_csv_exports() {
    let dir = TempDir::new().unwrap();
    let a = write_file(dir.path(), "a.csv", b"id,amount\n1,10\n2,20\n");
    let b = write_file(dir.path(), "b.csv", b"amount;id;note\n30;3;late\n");
    let c = write_file(dir.path(), "c.csv", b"other,stuff\nx,y\n");

    let result = Consolidator::new()
        .consolidate(&[a, b, c], |p: &Path| read_table(p))
        .unwrap();

    assert_eq!(result.table.headers, strings(&["id", "amount", "Source_File"]));
    assert_eq!(result.table.rows[2], strings(&["3", "30", "b.csv"]));
    assert_eq!(result.report.succeeded(), 2);
    assert_eq!(result.report.failed(), 1);
}

#[test]
fn test_consolidate_workbooks() {
    let dir = TempDir::new().unwrap();
    let sink = XlsxSink::new();
    let first = Table::new(strings(&["Police", "Prime"]), vec![strings(&["P1", "100"])]);
    let second = Table::new(strings(&["Prime", "Police"]), vec![strings(&["250", "P2"])]);
    let a = sink.write(&first, &dir.path().join("jan.xlsx")).unwrap();
    let b = sink.write(&second, &dir.path().join("feb.xlsx")).unwrap();

    let result = Consolidator::new()
        .consolidate(&[a, b], |p: &Path| read_workbook(p))
        .unwrap();

    let out = CsvSink::new()
        .write(&result.table, &dir.path().join("consolidated.csv"))
        .unwrap();
    let text = fs::read_to_string(out).unwrap();
    assert_eq!(text, "Police,Prime,Source_File\nP1,100,jan.xlsx\nP2,250,feb.xlsx\n");
}

#[test]
fn test_consolidate_latin1_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "legacy.csv", b"id,libelle\n1,caf\xe9\n");

    let (table, _) = read_table(&path).unwrap();

    assert_eq!(table.get(0, 1), Some("café"));
}

#[test]
fn test_consolidate_ledgers_sorted() {
    let dir = TempDir::new().unwrap();
    let q1 = write_file(
        dir.path(),
        "1T23_IntegrationComptable.csv",
        b"20/02/2023  REF002 AFF1 411000 C1 VENTE 202302  VT 0042 1,000.00 T001 OP1 D V\n",
    );
    let q2 = write_file(
        dir.path(),
        "2T23_IntegrationComptable.csv",
        b"05/01/2023  REF001 AFF2 401000 C2 ACHAT 202301  AC 0007 75.5 T002 OP2 C V\n",
    );
    let layout = LedgerLayout::integration();

    let mut result = Consolidator::new()
        .with_source_column(None)
        .consolidate(&[q1, q2], |p: &Path| layout.read_file(p))
        .unwrap();
    layout.sort(&mut result.table);

    let table = &result.table;
    assert_eq!(table.column_count(), 16);
    assert_eq!(table.column_by_name("DATE").unwrap(), vec!["2023-01-05", "2023-02-20"]);
    assert_eq!(table.column_by_name("MONTANT").unwrap(), vec!["75.5", "1000"]);
    assert_eq!(table.column_by_name("TRIMESTRE").unwrap(), vec!["2T23", "1T23"]);
    assert_eq!(
        table.column_by_name("SOURCE_FILE").unwrap(),
        vec!["2T23_IntegrationComptable.csv", "1T23_IntegrationComptable.csv"]
    );
}

// =============================================================================
// Partitioning
// =============================================================================

#[test]
fn test_partition_writes_one_workbook_per_branch() {
    let dir = TempDir::new().unwrap();
    let a = write_file(dir.path(), "a.csv", b"SINISTRE,CLefCat\nS1,31\nS2,52\n");
    let b = write_file(dir.path(), "b.csv", b"SINISTRE,CLefCat\nS3,3B\nS4,\n");

    let consolidation = Consolidator::new()
        .with_source_column(None)
        .consolidate(&[a, b], |p: &Path| read_table(p))
        .unwrap();
    let key = ClassificationKey::branch();
    let mut table = consolidation.table;
    key.derive(&mut table).unwrap();
    let partitions = key.partition(&table).unwrap();

    let out_dir = dir.path().join("output_files");
    let written = write_partitions(&partitions, &out_dir, "branch", &XlsxSink::new()).unwrap();

    assert_eq!(written, vec![out_dir.join("branch_3.xlsx"), out_dir.join("branch_5.xlsx")]);

    let workbook = open_workbook_auto(&written[0]).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["branch_3".to_string()]);
    let (branch3, _) = read_workbook(&written[0]).unwrap();
    assert_eq!(branch3.headers, strings(&["SINISTRE", "CLefCat", "Cbranche"]));
    assert_eq!(branch3.column_by_name("SINISTRE").unwrap(), vec!["S1", "S3"]);
}

#[test]
fn test_partition_finds_key_column_in_later_files() {
    let dir = TempDir::new().unwrap();
    let a = write_file(dir.path(), "a.csv", b"SINISTRE,MONTANT\nS1,10\n");
    let b = write_file(dir.path(), "b.csv", b"SINISTRE,CLefCat\nS2,31\n");

    let consolidation = Consolidator::new()
        .with_source_column(None)
        .with_column_layout(ColumnLayout::Union)
        .consolidate(&[a, b], |p: &Path| read_table(p))
        .unwrap();
    assert_eq!(consolidation.table.headers, strings(&["SINISTRE", "MONTANT", "CLefCat"]));

    let partitions = ClassificationKey::branch().partition(&consolidation.table).unwrap();

    let keys: Vec<_> = partitions.keys().cloned().collect();
    assert_eq!(keys, vec!["3"]);
    assert_eq!(partitions["3"].column_by_name("SINISTRE").unwrap(), vec!["S2"]);
    assert_eq!(partitions["3"].column_by_name("MONTANT").unwrap(), vec![""]);
}

#[test]
fn test_partition_splits_large_sheets() {
    let dir = TempDir::new().unwrap();
    let rows = (0..5).map(|i| vec![format!("S{}", i), "1".to_string()]).collect();
    let table = Table::new(strings(&["SINISTRE", "CLefCat"]), rows);
    let partitions = ClassificationKey::branch().partition(&table).unwrap();
    let sink = XlsxSink::new().with_max_rows_per_sheet(2);

    let written = write_partitions(&partitions, dir.path(), "branch", &sink).unwrap();

    let workbook = open_workbook_auto(&written[0]).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![
            "branch_1_part_1".to_string(),
            "branch_1_part_2".to_string(),
            "branch_1_part_3".to_string(),
        ]
    );
}
