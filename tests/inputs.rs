//! Batch input expansion.

use anyhow::Result;
use importprep::io::glob::{expand_glob, expand_inputs, is_pattern};
use importprep::testing::TempDirPath;
use std::path::PathBuf;

#[test]
fn patterns_expand_to_sorted_files() -> Result<()> {
    let dir = TempDirPath::new()?;
    for name in ["b.csv", "a.csv", "notes.txt"] {
        std::fs::write(dir.file_path(name), "x\n")?;
    }
    std::fs::create_dir(dir.file_path("dir.csv"))?;

    let pattern = format!("{}/*.csv", dir.path().display());
    let files = expand_glob(&pattern)?;
    assert_eq!(files, [dir.file_path("a.csv"), dir.file_path("b.csv")]);
    Ok(())
}

#[test]
fn plain_paths_pass_through_in_order() -> Result<()> {
    let dir = TempDirPath::new()?;
    std::fs::write(dir.file_path("one.xlsx"), "x")?;

    let pattern = format!("{}/*.xlsx", dir.path().display());
    let inputs = ["missing.csv".to_owned(), pattern];
    let paths = expand_inputs(&inputs)?;
    assert_eq!(paths, [PathBuf::from("missing.csv"), dir.file_path("one.xlsx")]);
    Ok(())
}

#[test]
fn pattern_without_matches_is_an_error() -> Result<()> {
    let dir = TempDirPath::new()?;
    let pattern = format!("{}/*.tsv", dir.path().display());
    assert!(expand_inputs(&[pattern]).is_err());
    assert!(expand_glob(&format!("{}/*.tsv", dir.path().display()))?.is_empty());
    Ok(())
}

#[test]
fn detects_metacharacters() {
    assert!(is_pattern("uploads/*.csv"));
    assert!(is_pattern("file?.xlsx"));
    assert!(!is_pattern("会員一覧.csv"));
}
