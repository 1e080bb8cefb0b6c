//! Parsing of permitted codepoint lists
use write_fonts::read::collections::IntSet;

use crate::Error;

/// The characters a trial font keeps when no list is given: basic Latin
/// letters, digits, common punctuation and curly quotes.
pub const DEFAULT_UNICODES: &str =
    "U+0020-0039, U+003A-005A, U+0061-007A, U+2018-201D, U+005B, U+005D";

/// Parse a comma-separated list of hex codepoints or inclusive hex ranges.
///
/// Each entry is either a single codepoint (`0041`) or a range (`0041-005A`),
/// optionally prefixed with `U+`. Whitespace is ignored, as are empty entries,
/// so `"U+0041-0043, 0061,"` yields `{A, B, C, a}`.
///
/// Values are not checked against the Unicode scalar range.
pub fn parse_unicodes(unicode_str: &str) -> Result<IntSet<u32>, Error> {
    let mut result = IntSet::empty();
    for raw in unicode_str.split(',') {
        let token: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let token = strip_unicode_prefix(&token);
        if token.is_empty() {
            continue;
        }
        if let Some((start, end)) = token.split_once('-') {
            let start = parse_hex(strip_unicode_prefix(start))?;
            let end = parse_hex(strip_unicode_prefix(end))?;
            if start > end {
                return Err(Error::InvalidUnicodeRange { start, end });
            }
            result.insert_range(start..=end);
        } else {
            result.insert(parse_hex(token)?);
        }
    }
    Ok(result)
}

/// Parse a single `U+`-prefixed codepoint literal, as used for the replacer.
pub(crate) fn parse_codepoint_literal(literal: &str) -> Option<u32> {
    let hex = literal.trim().strip_prefix("U+")?;
    u32::from_str_radix(hex, 16).ok()
}

fn strip_unicode_prefix(token: &str) -> &str {
    token
        .strip_prefix("U+")
        .or_else(|| token.strip_prefix("u+"))
        .unwrap_or(token)
}

fn parse_hex(token: &str) -> Result<u32, Error> {
    // from_str_radix tolerates a leading '+', which is not a hex digit
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidUnicode(token.to_owned()));
    }
    u32::from_str_radix(token, 16).map_err(|_| Error::InvalidUnicode(token.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(set: &IntSet<u32>) -> Vec<u32> {
        set.iter().collect()
    }

    #[test]
    fn single_range() {
        let output = parse_unicodes("0041-0043").unwrap();
        assert_eq!(collect(&output), vec![0x41, 0x42, 0x43]);
    }

    #[test]
    fn prefixes_and_whitespace() {
        let output = parse_unicodes("U+0041, 0043").unwrap();
        assert_eq!(collect(&output), vec![0x41, 0x43]);

        let output = parse_unicodes(" u+61 ,U+0062 - 0063 ").unwrap();
        assert_eq!(collect(&output), vec![0x61, 0x62, 0x63]);

        let output = parse_unicodes("U+0041-U+0042").unwrap();
        assert_eq!(collect(&output), vec![0x41, 0x42]);
    }

    #[test]
    fn order_does_not_matter() {
        let forward = parse_unicodes("0020-0039, 005B, 2018-201D, 0061-007A").unwrap();
        let backward = parse_unicodes("0061-007A, 2018-201D, 005B, 0020-0039").unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn overlapping_entries_are_merged() {
        let output = parse_unicodes("0041-0045, 0043, 0044-0046").unwrap();
        assert_eq!(output.len(), 6);
    }

    #[test]
    fn default_set() {
        let output = parse_unicodes(DEFAULT_UNICODES).unwrap();
        assert!(output.contains(0x20));
        assert!(output.contains(u32::from('Z')));
        assert!(output.contains(u32::from('[')));
        assert!(output.contains(u32::from(']')));
        assert!(output.contains(0x201D));
        assert!(!output.contains(u32::from('\\')));
        assert!(!output.contains(u32::from('_')));
        assert!(!output.contains(u32::from('é')));
        // 0x20..=0x5A, 0x61..=0x7A, 0x2018..=0x201D, '[' and ']'
        assert_eq!(output.len(), 59 + 26 + 6 + 2);
    }

    #[test]
    fn empty_entries_are_skipped() {
        assert!(parse_unicodes("").unwrap().is_empty());
        assert_eq!(parse_unicodes("41,,42,").unwrap().len(), 2);
    }

    #[test]
    fn invalid_hex() {
        assert!(matches!(
            parse_unicodes("0041, 00G1"),
            Err(Error::InvalidUnicode(token)) if token == "00G1"
        ));
        assert!(matches!(
            parse_unicodes("0041-"),
            Err(Error::InvalidUnicode(_))
        ));
        assert!(matches!(
            parse_unicodes("+41"),
            Err(Error::InvalidUnicode(_))
        ));
        assert!(matches!(
            parse_unicodes("41-42-43"),
            Err(Error::InvalidUnicode(_))
        ));
    }

    #[test]
    fn inverted_range() {
        assert!(matches!(
            parse_unicodes("005A-0041"),
            Err(Error::InvalidUnicodeRange {
                start: 0x5A,
                end: 0x41
            })
        ));
    }

    #[test]
    fn no_upper_bound() {
        let output = parse_unicodes("110000").unwrap();
        assert!(output.contains(0x110000));
    }

    #[test]
    fn codepoint_literal() {
        assert_eq!(parse_codepoint_literal("U+0058"), Some(0x58));
        assert_eq!(parse_codepoint_literal("U+zz"), None);
        assert_eq!(parse_codepoint_literal("X"), None);
    }
}
