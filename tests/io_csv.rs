//! Source loading: delimited text and spreadsheets.
#![cfg(feature = "io-csv")]

use anyhow::Result;
use encoding_rs::SHIFT_JIS;
use importprep::export::render_csv;
use importprep::io::file_stem;
use importprep::testing::*;
use importprep::*;

fn load(name: &str, bytes: &[u8]) -> importprep::Result<LoadedSource> {
    load_source(name, bytes, &LoadOptions::default())
}

#[test]
fn loads_utf8_csv_with_inferred_types() -> Result<()> {
    let source = load("listing.csv", sample_listing_csv().as_bytes())?;
    assert_eq!(source.name, "listing.csv");
    assert_eq!(source.stem, "listing");
    assert_eq!(source.table, sample_listing());
    Ok(())
}

#[test]
fn shift_jis_csv_falls_back() -> Result<()> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(sample_listing_csv());
    assert!(!had_errors);
    let source = load("listing.csv", &bytes)?;
    assert_eq!(source.table, sample_listing());
    Ok(())
}

#[test]
fn utf8_bom_is_not_part_of_the_first_header() -> Result<()> {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(sample_listing_csv().as_bytes());
    let source = load("listing.csv", &bytes)?;
    assert_eq!(source.table.columns()[0], "content.id");
    Ok(())
}

#[test]
fn undecodable_bytes_fail() {
    let err = load("broken.csv", b"a,b\n\x82\xff,1\n").unwrap_err();
    assert!(matches!(err, PrepError::SourceLoad { ref name, .. } if name == "broken.csv"));
    assert!(err.to_string().contains("neither UTF-8 nor Shift_JIS"));
}

#[test]
fn blank_and_repeated_headers_are_renamed() -> Result<()> {
    let source = load("h.csv", b"a,,a,a\n1,2,3,4\n")?;
    assert_columns(&source.table, &["a", "Unnamed: 1", "a.1", "a.2"]);
    Ok(())
}

#[test]
fn short_records_are_padded() -> Result<()> {
    let source = load("short.csv", b"a,b,c\n1\n2,x\n")?;
    assert_row(
        &source.table,
        0,
        &[("a", 1i64.into()), ("b", Value::Null), ("c", Value::Null)],
    );
    assert_eq!(source.table.get(1, "b"), Some(&Value::text("x")));
    Ok(())
}

#[test]
fn long_records_are_rejected() {
    let err = load("long.csv", b"a,b\n1,2,3\n").unwrap_err();
    assert!(err.to_string().contains("has 3 fields but the header has 2"));
}

#[test]
fn empty_input_has_no_columns() {
    let err = load("empty.csv", b"").unwrap_err();
    assert!(matches!(err, PrepError::SourceLoad { .. }));
}

#[test]
fn inference_can_be_turned_off() -> Result<()> {
    let options = LoadOptions { infer_types: false };
    let source = load_source("listing.csv", sample_listing_csv().as_bytes(), &options)?;
    assert_eq!(source.table.get(0, "content.price"), Some(&Value::text("1200")));
    assert_eq!(source.table.get(0, "memo"), Some(&Value::Null));
    Ok(())
}

#[test]
fn boolean_columns() -> Result<()> {
    let source = load("flags.csv", b"flag,mixed\nTRUE,true\nfalse,1\n")?;
    assert_eq!(source.table.get(0, "flag"), Some(&Value::Boolean(true)));
    assert_eq!(source.table.get(1, "flag"), Some(&Value::Boolean(false)));
    assert_eq!(source.table.get(1, "mixed"), Some(&Value::text("1")));
    Ok(())
}

#[test]
fn long_integer_ids_keep_every_digit() -> Result<()> {
    let source = load("ids.csv", b"id,small\n9007199254740993,1\n1234567890123456789,2\n")?;
    assert_eq!(source.table.get(0, "id"), Some(&Value::text("9007199254740993")));
    assert_eq!(source.table.get(1, "small"), Some(&Value::Number(2.0)));

    let text = render_csv(&annotate(source.table, &ColumnSchema::new()), LineEnding::Lf)?;
    assert!(text.contains("\"9007199254740993\",\"1\""));
    assert!(text.contains("\"1234567890123456789\",\"2\""));
    Ok(())
}

#[test]
fn one_oversized_integer_keeps_the_whole_column_text() -> Result<()> {
    let source = load("codes.csv", b"code\n42\n-9223372036854775808\n")?;
    assert_eq!(source.table.get(0, "code"), Some(&Value::text("42")));
    assert_eq!(
        source.table.get(1, "code"),
        Some(&Value::text("-9223372036854775808"))
    );
    Ok(())
}

#[test]
fn tab_separated() -> Result<()> {
    let source = load("members.tsv", "番号\t氏名\n1\t山田, 太郎\n".as_bytes())?;
    assert_columns(&source.table, &["番号", "氏名"]);
    assert_eq!(source.table.get(0, "氏名"), Some(&Value::text("山田, 太郎")));
    Ok(())
}

#[test]
fn unsupported_extension() {
    let err = load("report.pdf", b"%PDF").unwrap_err();
    assert!(matches!(err, PrepError::SourceLoad { .. }));
    assert!(SourceFormat::from_filename("noext").is_none());
    assert_eq!(
        SourceFormat::from_filename("Book.XLSX"),
        Some(SourceFormat::Spreadsheet)
    );
}

#[test]
fn stems_drop_only_the_last_extension() {
    assert_eq!(file_stem("会員.2024.xlsx"), "会員.2024");
    assert_eq!(file_stem("uploads/list.csv"), "list");
}
