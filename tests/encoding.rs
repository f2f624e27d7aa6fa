//! Encoding detection and strict encoding.

use anyhow::Result;
use encoding_rs::{SHIFT_JIS, UTF_8, UTF_16LE};
use importprep::encoding::{decode_strict, encode_strict};
use importprep::*;

#[test]
fn detects_utf8_and_shift_jis() {
    let text = "|項目|項目名|型|\n| 1 | 会員番号 | string |\n";
    assert_eq!(detect_encoding(text.as_bytes()), UTF_8);

    let (sjis, _, _) = SHIFT_JIS.encode(text);
    assert_eq!(detect_encoding(&sjis), SHIFT_JIS);
}

#[test]
fn bom_decides_first() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("名前".as_bytes());
    assert_eq!(detect_encoding(&bytes), UTF_8);
    assert_eq!(detect_encoding(&[0xFF, 0xFE, b'a', 0]), UTF_16LE);
}

#[test]
fn ascii_is_utf8() {
    assert_eq!(detect_encoding(b"| 1 | id | string |"), UTF_8);
    assert_eq!(detect_encoding(b""), UTF_8);
}

#[test]
fn decode_strict_drops_a_matching_bom() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"abc");
    assert_eq!(decode_strict(&bytes, UTF_8).as_deref(), Some("abc"));
    assert_eq!(decode_strict(&[0x82], SHIFT_JIS), None);
}

#[test]
fn encode_strict_shift_jis() -> Result<()> {
    let bytes = encode_strict("\"会員\",\"ｶﾅ\"\n", OutputEncoding::ShiftJis)?;
    let (decoded, had_errors) = SHIFT_JIS.decode_without_bom_handling(&bytes);
    assert!(!had_errors);
    assert_eq!(decoded, "\"会員\",\"ｶﾅ\"\n");
    Ok(())
}

#[test]
fn encode_strict_reports_first_unmappable_character() {
    let err = encode_strict("a\nb\nc 😀 d 🍣", OutputEncoding::ShiftJis).unwrap_err();
    assert_eq!(err.character, '😀');
    assert_eq!(err.line, 3);
    assert_eq!(err.encoding, "Shift-JIS");
}

#[test]
fn encode_strict_utf8_is_identity() -> Result<()> {
    let text = "🍣,会員";
    assert_eq!(encode_strict(text, OutputEncoding::Utf8)?, text.as_bytes());
    Ok(())
}

#[test]
fn output_encoding_serde_names() -> Result<()> {
    assert_eq!(serde_json::to_string(&OutputEncoding::Utf8)?, "\"utf-8\"");
    assert_eq!(serde_json::to_string(&OutputEncoding::ShiftJis)?, "\"shift_jis\"");
    let parsed: OutputEncoding = serde_json::from_str("\"shift_jis\"")?;
    assert_eq!(parsed, OutputEncoding::ShiftJis);
    Ok(())
}

#[test]
fn default_policy_is_shift_jis() {
    let policy = EncodingPolicy::default();
    assert_eq!(policy.encoding(), OutputEncoding::ShiftJis);
    assert!(!policy.writes_bom());
}

#[test]
fn shift_jis_output_covers_nec_row_13() -> Result<()> {
    assert_eq!(encode_strict("①", OutputEncoding::ShiftJis)?, [0x87, 0x40]);
    assert_eq!(encode_strict("Ⅰ", OutputEncoding::ShiftJis)?, [0x87, 0x54]);
    assert_eq!(encode_strict("㈱", OutputEncoding::ShiftJis)?, [0x87, 0x8A]);
    Ok(())
}
