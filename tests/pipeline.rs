//! End-to-end runs.
#![cfg(feature = "io-csv")]

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use encoding_rs::SHIFT_JIS;
use importprep::testing::*;
use importprep::*;

fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap()
}

fn settings_for(reg: &TempRegistry) -> Settings {
    let mut settings = Settings::default();
    settings.registry.path = reg.path().to_path_buf();
    settings
}

fn exported(outcome: RunOutcome) -> Result<ExportArtifact> {
    match outcome {
        RunOutcome::Exported(artifact) => Ok(artifact),
        RunOutcome::NothingSelected => bail!("nothing was exported"),
    }
}

#[test]
fn listing_to_shift_jis() -> Result<()> {
    let reg = TempRegistry::utf8(sample_registry())?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let ctx = RunContext::new(EncodingPolicy::shift_jis())
        .select(["content.id", "content.price", "content.status"])
        .replace("content.status", "チェック可");

    let artifact = exported(pipeline.run_at("listing.csv", sample_listing_csv().as_bytes(), &ctx, at())?)?;
    assert_eq!(artifact.filename, "インポート用_listing_20250102_030405_Shift-JIS.csv");
    assert_eq!(artifact.mime_type, "text/csv;charset=shift_jis");
    assert_eq!(artifact.data_rows, 3);

    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(&artifact.bytes);
    assert!(!had_errors);
    assert_eq!(
        text,
        "\
\"content.id\",\"content.price\",\"content.status\"
\"string\",\"number\",\"string\"
\"A-001\",\"1200\",\"チェック可\"
\"A-002\",\"1800\",\"チェック可\"
\"A-003\",\"650.5\",\"チェック可\"
"
    );
    Ok(())
}

#[test]
fn missing_registry_still_exports() -> Result<()> {
    let reg = TempRegistry::missing()?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let ctx = RunContext::new(EncodingPolicy::utf8(false)).select(["content.price", "memo"]);

    let artifact = exported(pipeline.run_at("listing.csv", sample_listing_csv().as_bytes(), &ctx, at())?)?;
    let text = String::from_utf8(artifact.bytes)?;
    assert_eq!(text.lines().nth(1), Some("\"string\",\"string\""));
    assert!(pipeline.resolver().resolve().is_fallback());
    Ok(())
}

#[test]
fn no_selection_means_every_column() -> Result<()> {
    let reg = TempRegistry::missing()?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let ctx = RunContext::new(EncodingPolicy::utf8(true));

    let artifact = exported(pipeline.run_at("listing.csv", sample_listing_csv().as_bytes(), &ctx, at())?)?;
    assert!(artifact.filename.ends_with("_UTF-8_BOM付き.csv"));
    let text = std::str::from_utf8(&artifact.bytes[3..])?;
    assert_eq!(
        text.lines().next(),
        Some("\"content.id\",\"content.title\",\"content.price\",\"content.status\",\"memo\"")
    );
    assert_eq!(text.lines().count(), 5);
    Ok(())
}

#[test]
fn empty_selection_produces_nothing() -> Result<()> {
    let reg = TempRegistry::missing()?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let ctx = RunContext::new(EncodingPolicy::shift_jis()).select(Vec::<String>::new());

    let outcome = pipeline.run_at("listing.csv", sample_listing_csv().as_bytes(), &ctx, at())?;
    assert_eq!(outcome, RunOutcome::NothingSelected);
    Ok(())
}

#[test]
fn bare_rule_uses_the_preset_default() -> Result<()> {
    let reg = TempRegistry::missing()?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let mut ctx = RunContext::new(EncodingPolicy::utf8(false)).select(["content.id"]);
    ctx.rules.push("content.id".parse::<ReplacementRule>()?);

    let doc = pipeline
        .transform(&sample_listing(), &ctx)?
        .expect("one column selected");
    assert_eq!(doc.row_count(), 4);
    assert_eq!(doc.annotation_row(), [Value::text("string")]);
    assert!(doc.data_rows().iter().all(|row| row[0] == Value::text("納品可")));
    Ok(())
}

#[test]
fn invalid_rule_is_reported_before_loading() -> Result<()> {
    let reg = TempRegistry::missing()?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let ctx = RunContext::new(EncodingPolicy::shift_jis()).replace("content.status", "公開");

    let err = pipeline.run_at("broken.csv", b"\x82\xff", &ctx, at()).unwrap_err();
    assert!(matches!(err, PrepError::InvalidRule { .. }));
    Ok(())
}

#[test]
fn unknown_selected_column() -> Result<()> {
    let reg = TempRegistry::missing()?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let ctx = RunContext::new(EncodingPolicy::shift_jis()).select(["content.id", "nope"]);

    let err = pipeline
        .run_at("listing.csv", sample_listing_csv().as_bytes(), &ctx, at())
        .unwrap_err();
    assert!(matches!(err, PrepError::Table(TableError::UnknownColumn(ref c)) if c == "nope"));
    Ok(())
}

#[test]
fn unencodable_cell_fails_the_run() -> Result<()> {
    let reg = TempRegistry::missing()?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let ctx = RunContext::new(EncodingPolicy::shift_jis());

    let err = pipeline
        .run_at("menu.csv", "品名\nすし🍣\n".as_bytes(), &ctx, at())
        .unwrap_err();
    assert!(matches!(err, PrepError::Encode(ref e) if e.character == '🍣' && e.line == 3));

    let utf8 = RunContext::new(EncodingPolicy::utf8(false));
    assert!(pipeline.run_at("menu.csv", "品名\nすし🍣\n".as_bytes(), &utf8, at()).is_ok());
    Ok(())
}

#[test]
fn shift_jis_registry_types_the_annotation_row() -> Result<()> {
    let reg = TempRegistry::shift_jis(sample_registry())?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let ctx = RunContext::new(EncodingPolicy::utf8(false)).select(["content.price"]);

    let doc = pipeline
        .transform(&sample_listing(), &ctx)?
        .expect("one column selected");
    assert_eq!(doc.annotation_row(), [Value::text("number")]);
    Ok(())
}

#[test]
fn one_pipeline_serves_a_batch() -> Result<()> {
    let reg = TempRegistry::utf8(sample_registry())?;
    let pipeline = Pipeline::new(&settings_for(&reg));
    let ctx = RunContext::new(EncodingPolicy::utf8(false)).select(["content.price"]);

    let first = exported(pipeline.run_at("a.csv", sample_listing_csv().as_bytes(), &ctx, at())?)?;
    std::fs::remove_file(reg.path())?;
    let second = exported(pipeline.run_at("b.csv", sample_listing_csv().as_bytes(), &ctx, at())?)?;

    assert_eq!(first.bytes, second.bytes);
    assert_ne!(first.filename, second.filename);
    Ok(())
}

#[test]
fn crlf_from_settings() -> Result<()> {
    let reg = TempRegistry::missing()?;
    let mut settings = settings_for(&reg);
    settings.output.line_ending = LineEnding::Crlf;
    settings.output.filename_prefix = "取込".to_owned();
    let pipeline = Pipeline::new(&settings);
    let ctx = RunContext::new(EncodingPolicy::utf8(false)).select(["content.id"]);

    let artifact = exported(pipeline.run_at("listing.csv", sample_listing_csv().as_bytes(), &ctx, at())?)?;
    assert!(artifact.filename.starts_with("取込_listing_"));
    assert!(String::from_utf8(artifact.bytes)?.starts_with("\"content.id\"\r\n"));
    Ok(())
}
