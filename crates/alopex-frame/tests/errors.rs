use std::path::Path;

use alopex_frame::io::{CsvFormat, CsvReadOptions};
use alopex_frame::{column_of, Column, Frame, FrameError, FrameReader, ReadOptions, SupportedFormat};

fn df() -> Frame {
    Frame::new(vec![
        column_of("a", vec![1_i64, 2]),
        column_of("s", vec!["x", "y"]),
    ])
    .unwrap()
}

#[test]
fn column_not_found_is_reported() {
    let err = df().column("missing").unwrap_err();
    assert!(matches!(err, FrameError::ColumnNotFound { .. }));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn schema_mismatch_duplicate_column_name() {
    let err = Frame::new(vec![column_of("a", vec![1_i64]), column_of("a", vec![2_i64])])
        .unwrap_err();
    assert!(matches!(err, FrameError::SchemaMismatch { .. }));
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn schema_mismatch_length_mismatch() {
    let err = Frame::new(vec![column_of("a", vec![1_i64, 2]), column_of("b", vec![10_i64])])
        .unwrap_err();
    assert!(matches!(err, FrameError::SchemaMismatch { .. }));
}

#[test]
fn type_mismatch_for_non_numeric_mean() {
    let err = df().column("s").unwrap().mean(false).unwrap_err();
    assert!(matches!(err, FrameError::TypeMismatch { .. }));
    let msg = err.to_string();
    assert!(msg.contains("expected"));
    assert!(msg.contains("Number"));
    assert!(msg.contains("Utf8"));
}

#[test]
fn row_accessor_type_mismatch() {
    let err = df().add("bad", |r| r.i64("s")).unwrap_err();
    assert!(matches!(err, FrameError::TypeMismatch { .. }));
}

#[test]
fn failed_cast_names_the_column() {
    let err = df().cast(&["s"]).to(alopex_frame::DataType::Int64).unwrap_err();
    match err {
        FrameError::TypeMismatch { column, .. } => assert_eq!(column.as_deref(), Some("s")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn move_to_out_of_range_is_invalid() {
    let err = df().move_to(5, &["a"]).unwrap_err();
    assert!(matches!(err, FrameError::InvalidOperation { .. }));
}

#[test]
fn group_of_unknown_column_fails() {
    let err = df().group(&["nope"]).into_group("g").unwrap_err();
    assert!(matches!(err, FrameError::ColumnNotFound { .. }));
}

#[test]
fn writing_groups_to_csv_is_rejected() {
    let frame = Frame::new(vec![Column::group("g", df())]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = alopex_frame::io::write_csv(dir.path().join("g.csv"), &frame).unwrap_err();
    assert!(matches!(err, FrameError::InvalidOperation { .. }));
}

#[test]
fn configuration_error_for_invalid_csv_quote() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();

    let format = CsvFormat::new(CsvReadOptions::default().with_quote_char(Some(b'\0')));
    let err = format.read_file(&path, &[]).unwrap_err();
    assert!(matches!(err, FrameError::Configuration { .. }));
    assert!(err.to_string().contains("quote"));
}

#[test]
fn zero_look_ahead_is_rejected() {
    let err = FrameReader::builtin(ReadOptions::default().with_look_ahead_limit(0)).unwrap_err();
    assert!(matches!(err, FrameError::Configuration { .. }));
}

#[test]
fn unsupported_protocol() {
    let err = FrameReader::default()
        .read_path("ftp://example.com/data.csv", &[])
        .unwrap_err();
    assert!(matches!(err, FrameError::InvalidProtocol { .. }));
    assert!(err.to_string().contains("ftp://example.com/data.csv"));

    let err = FrameReader::default()
        .read_path("ftp://example.com/data", &[])
        .unwrap_err();
    assert!(matches!(err, FrameError::InvalidProtocol { .. }));

    let err = FrameReader::default()
        .read_file(Path::new("notes.txt"), &[])
        .unwrap_err();
    assert!(matches!(err, FrameError::UnknownFormat { .. }));
}
