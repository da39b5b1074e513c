//! Run-Length Encoding
//!
//! Toy compression for repetitive string values. A run is written as
//! `MARKER count MARKER char`; runs shorter than `MIN_RUN` are copied verbatim
//! unless they consist of the marker itself, which is always run-encoded so the
//! decoder never mistakes literal text for a run header.

use crate::error::{Result, SyncError};

/// Delimiter for encoded runs.
pub const RUN_MARKER: char = '\u{1}';

/// Shortest run worth encoding.
pub const MIN_RUN: usize = 4;

/// Encodes `input`, returning `None` when the encoded form is not shorter.
pub fn compress(input: &str) -> Option<String> {
    let encoded = encode(input);
    if encoded.chars().count() < input.chars().count() {
        Some(encoded)
    } else {
        None
    }
}

/// Run-length encodes `input` unconditionally.
pub fn encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let mut run = 1usize;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }

        if run >= MIN_RUN || c == RUN_MARKER {
            out.push(RUN_MARKER);
            out.push_str(&run.to_string());
            out.push(RUN_MARKER);
            out.push(c);
        } else {
            out.extend(std::iter::repeat(c).take(run));
        }
    }

    out
}

/// Reverses [`encode`].
pub fn decompress(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != RUN_MARKER {
            out.push(c);
            continue;
        }

        let mut digits = String::new();
        loop {
            match chars.next() {
                Some(RUN_MARKER) => break,
                Some(d) if d.is_ascii_digit() => digits.push(d),
                Some(other) => {
                    return Err(SyncError::Codec(format!(
                        "unexpected '{}' in run length",
                        other.escape_debug()
                    )))
                }
                None => return Err(SyncError::Codec("truncated run header".to_string())),
            }
        }

        let run: usize = digits
            .parse()
            .map_err(|_| SyncError::Codec(format!("invalid run length '{}'", digits)))?;
        let repeated = chars
            .next()
            .ok_or_else(|| SyncError::Codec("run missing character".to_string()))?;
        out.extend(std::iter::repeat(repeated).take(run));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_repetitive_string() {
        let input = "aaaaaaaaaabbbbbbbbbbcc";
        let compressed = compress(input).unwrap();
        assert!(compressed.len() < input.len());
        assert_eq!(decompress(&compressed).unwrap(), input);
    }

    #[test]
    fn test_compress_skips_non_repetitive_string() {
        assert!(compress("abcdefg").is_none());
        assert!(compress("").is_none());
    }

    #[test]
    fn test_short_runs_stay_literal() {
        assert_eq!(encode("aabbb"), "aabbb");
    }

    #[test]
    fn test_digits_in_text_survive() {
        let input = "level 1111111 reached 42";
        assert_eq!(decompress(&encode(input)).unwrap(), input);
    }

    #[test]
    fn test_marker_character_is_escaped() {
        let input = format!("x{}y", RUN_MARKER);
        let encoded = encode(&input);
        assert_eq!(encoded, format!("x{m}1{m}{m}y", m = RUN_MARKER));
        assert_eq!(decompress(&encoded).unwrap(), input);
    }

    #[test]
    fn test_multibyte_runs() {
        let input = "🐉🐉🐉🐉🐉🐉 ééééé";
        assert_eq!(decompress(&encode(input)).unwrap(), input);
    }

    #[test]
    fn test_decompress_rejects_truncated_header() {
        let bad = format!("{}12", RUN_MARKER);
        assert!(matches!(decompress(&bad), Err(SyncError::Codec(_))));
    }

    #[test]
    fn test_decompress_rejects_missing_character() {
        let bad = format!("{m}5{m}", m = RUN_MARKER);
        assert!(matches!(decompress(&bad), Err(SyncError::Codec(_))));
    }
}
