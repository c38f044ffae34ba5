//! Percent-encoding for URL path segments and query components.
//!
//! Only the pieces the router needs: segment encoding keeps the RFC 3986
//! unreserved set, query encoding additionally keeps `,` and `:` so values
//! such as `mapCenter=12.500000,-3.250000` stay readable.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PercentDecodeError {
    #[error("invalid percent escape at byte {offset}")]
    InvalidEscape { offset: usize },
    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn encode_with(input: &str, keep: impl Fn(u8) -> bool) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        if keep(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
    }
    out
}

/// Encodes a single path segment. `/` is always escaped.
pub fn encode_segment(input: &str) -> String {
    encode_with(input, is_unreserved)
}

/// Encodes a query key or value.
pub fn encode_query_component(input: &str) -> String {
    encode_with(input, |b| is_unreserved(b) || b == b',' || b == b':')
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn decode_bytes(input: &[u8], plus_as_space: bool) -> Result<String, PercentDecodeError> {
    let mut out: Vec<u8> = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'%' => {
                let hi = input.get(i + 1).copied().and_then(hex_value);
                let lo = input.get(i + 2).copied().and_then(hex_value);
                let (Some(hi), Some(lo)) = (hi, lo) else {
                    return Err(PercentDecodeError::InvalidEscape { offset: i });
                };
                out.push((hi << 4) | lo);
                i += 3;
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| PercentDecodeError::InvalidUtf8)
}

/// Decodes a path segment. `+` is kept literally.
pub fn decode_segment(input: &str) -> Result<String, PercentDecodeError> {
    decode_bytes(input.as_bytes(), false)
}

/// Decodes a query key or value (`application/x-www-form-urlencoded` style).
pub fn decode_query_component(input: &str) -> Result<String, PercentDecodeError> {
    decode_bytes(input.as_bytes(), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_encoding_escapes_reserved_bytes() {
        assert_eq!(encode_segment("sentinel-2-l2a"), "sentinel-2-l2a");
        assert_eq!(encode_segment("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_segment("été"), "%C3%A9t%C3%A9");
    }

    #[test]
    fn query_encoding_keeps_commas() {
        assert_eq!(
            encode_query_component("12.500000,-3.250000"),
            "12.500000,-3.250000"
        );
        assert_eq!(encode_query_component("a&b=c"), "a%26b%3Dc");
    }

    #[test]
    fn decodes_escapes_and_multibyte() {
        assert_eq!(decode_segment("a%20b%2fc").unwrap(), "a b/c");
        assert_eq!(decode_segment("%C3%A9t%C3%A9").unwrap(), "été");
        assert_eq!(decode_segment("a+b").unwrap(), "a+b");
        assert_eq!(decode_query_component("a+b").unwrap(), "a b");
    }

    #[test]
    fn rejects_truncated_escape() {
        assert_eq!(
            decode_segment("abc%2"),
            Err(PercentDecodeError::InvalidEscape { offset: 3 })
        );
        assert_eq!(
            decode_segment("%zz"),
            Err(PercentDecodeError::InvalidEscape { offset: 0 })
        );
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(decode_segment("%FF"), Err(PercentDecodeError::InvalidUtf8));
    }
}
