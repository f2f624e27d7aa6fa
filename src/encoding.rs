//! Character encodings: input detection and output policy.
//!
//! Detection is a best guess used to decode the schema registry. It prefers,
//! in order:
//! 1. a byte-order mark,
//! 2. strict UTF-8,
//! 3. strict Shift_JIS (the WHATWG variant, a superset of cp932),
//! 4. strict EUC-JP,
//! 5. windows-1252, which accepts any byte sequence.
//!
//! Output is limited to the two encodings the downstream importer accepts,
//! see [`OutputEncoding`] and [`EncodingPolicy`].

use encoding_rs::{EUC_JP, Encoding, EncoderResult, SHIFT_JIS, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The 3-byte UTF-8 byte-order mark.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Guess the character encoding of `bytes`.
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((enc, _)) = Encoding::for_bom(bytes) {
        return enc;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    for candidate in [SHIFT_JIS, EUC_JP] {
        if candidate
            .decode_without_bom_handling_and_without_replacement(bytes)
            .is_some()
        {
            return candidate;
        }
    }
    WINDOWS_1252
}

/// Decode `bytes` with `encoding`, failing on any malformed sequence.
///
/// A leading BOM for `encoding` is skipped.
#[must_use]
pub fn decode_strict<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    let body = match Encoding::for_bom(bytes) {
        Some((enc, len)) if enc == encoding => &bytes[len..],
        _ => bytes,
    };
    encoding.decode_without_bom_handling_and_without_replacement(body)
}

/// Character encodings accepted for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputEncoding {
    #[serde(rename = "utf-8", alias = "utf8", alias = "UTF-8")]
    Utf8,
    #[serde(rename = "shift_jis", alias = "shift-jis", alias = "sjis", alias = "Shift-JIS")]
    ShiftJis,
}

impl OutputEncoding {
    /// Machine identifier, also used in the MIME charset parameter.
    #[must_use]
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::ShiftJis => "shift_jis",
        }
    }

    /// Human-readable label used in output file names.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::ShiftJis => "Shift-JIS",
        }
    }

    #[must_use]
    pub fn codec(self) -> &'static Encoding {
        match self {
            Self::Utf8 => UTF_8,
            Self::ShiftJis => SHIFT_JIS,
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Error for an encoding name outside [`OutputEncoding`].
#[derive(Debug, Clone, Error)]
#[error("unsupported output encoding: {0} (expected utf-8 or shift_jis)")]
pub struct UnknownEncoding(pub String);

impl FromStr for OutputEncoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "utf_8" | "utf8" => Ok(Self::Utf8),
            "shift_jis" | "sjis" | "cp932" | "windows_31j" => Ok(Self::ShiftJis),
            _ => Err(UnknownEncoding(s.to_owned())),
        }
    }
}

/// Output encoding plus the BOM flag.
///
/// The BOM flag is only kept for UTF-8; constructing a policy for any other
/// encoding forces it off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingPolicy {
    encoding: OutputEncoding,
    add_bom: bool,
}

impl EncodingPolicy {
    #[must_use]
    pub fn new(encoding: OutputEncoding, add_bom: bool) -> Self {
        Self {
            encoding,
            add_bom: add_bom && encoding == OutputEncoding::Utf8,
        }
    }

    #[must_use]
    pub fn utf8(add_bom: bool) -> Self {
        Self::new(OutputEncoding::Utf8, add_bom)
    }

    #[must_use]
    pub fn shift_jis() -> Self {
        Self::new(OutputEncoding::ShiftJis, false)
    }

    #[must_use]
    pub fn encoding(&self) -> OutputEncoding {
        self.encoding
    }

    /// Whether the serialized bytes start with [`UTF8_BOM`].
    #[must_use]
    pub fn writes_bom(&self) -> bool {
        self.add_bom
    }

    /// `text/csv;charset=<identifier>`.
    #[must_use]
    pub fn mime_type(&self) -> String {
        format!("text/csv;charset={}", self.encoding.identifier())
    }
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self::shift_jis()
    }
}

/// A character could not be represented in the target encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("character {character:?} on line {line} cannot be encoded as {encoding}")]
pub struct EncodeError {
    pub character: char,
    /// 1-based line of the serialized text.
    pub line: usize,
    pub encoding: &'static str,
}

/// Encode `text` with `encoding`, refusing to substitute unmappable characters.
///
/// # Errors
/// Returns [`EncodeError`] for the first character `encoding` cannot represent.
pub fn encode_strict(text: &str, encoding: OutputEncoding) -> Result<Vec<u8>, EncodeError> {
    let codec = encoding.codec();
    if codec == UTF_8 {
        return Ok(text.as_bytes().to_vec());
    }

    let mut encoder = codec.new_encoder();
    let mut out = Vec::with_capacity(
        encoder
            .max_buffer_length_from_utf8_without_replacement(text.len())
            .unwrap_or(text.len() * 2),
    );
    let mut consumed = 0usize;
    loop {
        let rest = &text[consumed..];
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
        consumed += read;
        match result {
            EncoderResult::InputEmpty => return Ok(out),
            EncoderResult::OutputFull => out.reserve((text.len() - consumed).max(16) * 2),
            EncoderResult::Unmappable(character) => {
                return Err(EncodeError {
                    character,
                    line: text[..consumed].matches('\n').count() + 1,
                    encoding: encoding.label(),
                });
            }
        }
    }
}
