//! # shc:/ URI Transform and Chunker
//!
//! QR numeric mode stores digit pairs far more densely than byte mode stores
//! ASCII, so the token is re-encoded before presentation: every character
//! `c` becomes the two-digit decimal value `code_point(c) - 45`. The token
//! alphabet (base64url plus `.`) occupies ASCII 45..=125, which maps onto
//! `00..=80` — always exactly two digits.
//!
//! A digit string that exceeds one QR code's comfortable capacity is split
//! into ordered, labeled chunks: `shc:/<index>/<total>/<segment>`.

use shc_core::UriError;

/// Maximum digits carried by a single chunk when the caller does not pick a
/// chunk count.
pub const MAX_CHUNK_SIZE: usize = 1191;

const SCHEME: &str = "shc:/";

/// Lowest token character code the digit mapping accepts (`-`).
const CODE_OFFSET: u32 = 45;
/// Highest token character code the digit mapping accepts (`}`).
const CODE_MAX: u32 = 125;

/// A token rendered as its QR numeric-mode digit string.
///
/// Holds only the digit string — no ownership of payload or key. Validation
/// happens at construction: every token character must sit in the mappable
/// range `45..=125`, which any token produced by this stack does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShcUri {
    digits: String,
}

impl ShcUri {
    /// Build the digit string for a rendered token.
    ///
    /// # Errors
    ///
    /// Returns `UriError::EncodingRange` if any character falls outside
    /// `45..=125`. For input from [`crate::SmartHealthCard::render`] this is
    /// unreachable; hitting it means the token came from a broken encoder.
    pub fn new(token: &str) -> Result<Self, UriError> {
        let mut digits = String::with_capacity(token.len() * 2);
        for (index, ch) in token.chars().enumerate() {
            let code = ch as u32;
            if !(CODE_OFFSET..=CODE_MAX).contains(&code) {
                return Err(UriError::EncodingRange { ch, index });
            }
            let value = (code - CODE_OFFSET) as u8;
            digits.push(char::from(b'0' + value / 10));
            digits.push(char::from(b'0' + value % 10));
        }
        Ok(Self { digits })
    }

    /// The full digit string, without the `shc:/` scheme.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Split into ordered chunk URIs.
    ///
    /// With `count = None` the chunk count defaults to
    /// `ceil(digits / MAX_CHUNK_SIZE)`. Each chunk carries
    /// `ceil(digits / count)` digits except possibly the last, which is
    /// shorter when the division is uneven. The iterator is lazy, finite,
    /// and restartable — call `chunks` again for a fresh pass.
    ///
    /// # Errors
    ///
    /// Returns `UriError::InvalidChunkCount` when the requested count is
    /// zero or exceeds the digit-string length.
    pub fn chunks(&self, count: Option<usize>) -> Result<Chunks<'_>, UriError> {
        let digits = self.digits.len();
        let count = count.unwrap_or_else(|| digits.div_ceil(MAX_CHUNK_SIZE));
        if count == 0 || count > digits {
            return Err(UriError::InvalidChunkCount {
                requested: count,
                digits,
            });
        }
        Ok(Chunks {
            digits: &self.digits,
            chunk_size: digits.div_ceil(count),
            count,
            index: 0,
        })
    }
}

impl std::fmt::Display for ShcUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{SCHEME}{}", self.digits)
    }
}

/// Iterator over the chunk URIs of a [`ShcUri`]. Indices are 1-based in the
/// rendered form: `shc:/<index>/<total>/<segment>`.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    digits: &'a str,
    chunk_size: usize,
    count: usize,
    index: usize,
}

impl Iterator for Chunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.index >= self.count {
            return None;
        }
        let start = (self.index * self.chunk_size).min(self.digits.len());
        let end = ((self.index + 1) * self.chunk_size).min(self.digits.len());
        self.index += 1;
        Some(format!(
            "{SCHEME}{}/{}/{}",
            self.index,
            self.count,
            &self.digits[start..end]
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

/// Invert the digit mapping: a digit string back to the token characters.
///
/// # Errors
///
/// Returns `UriError::Malformed` for odd length or non-digit characters,
/// and `UriError::EncodingRange` for a pair whose value exceeds 80 (which
/// would decode outside the token alphabet).
pub fn decode_digits(digits: &str) -> Result<String, UriError> {
    let bytes = digits.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(UriError::Malformed(format!(
            "digit string length {} is odd",
            bytes.len()
        )));
    }
    let mut token = String::with_capacity(bytes.len() / 2);
    for (pair_index, pair) in bytes.chunks_exact(2).enumerate() {
        if !pair[0].is_ascii_digit() || !pair[1].is_ascii_digit() {
            return Err(UriError::Malformed(format!(
                "non-digit character in pair at index {pair_index}"
            )));
        }
        let value = u32::from(pair[0] - b'0') * 10 + u32::from(pair[1] - b'0');
        let code = value + CODE_OFFSET;
        if code > CODE_MAX {
            return Err(UriError::EncodingRange {
                ch: char::from_u32(code).unwrap_or('\u{fffd}'),
                index: pair_index,
            });
        }
        // code is in 45..=125, always a valid ASCII char.
        token.push(char::from(code as u8));
    }
    Ok(token)
}

/// Reassemble a token from one or more `shc:/` URIs.
///
/// Accepts either a single unchunked URI (`shc:/<digits>`) or a complete
/// chunk set (`shc:/<i>/<n>/<digits>` in any order). The chunk set must be
/// consistent: every URI states the same total, the total equals the number
/// of URIs given, and indices `1..=n` each appear exactly once.
///
/// # Errors
///
/// Returns `UriError::Malformed` for scheme/shape/consistency violations,
/// plus everything [`decode_digits`] can return.
pub fn assemble(uris: &[&str]) -> Result<String, UriError> {
    if uris.is_empty() {
        return Err(UriError::Malformed("no uris given".into()));
    }

    let mut parts: Vec<(usize, usize, &str)> = Vec::with_capacity(uris.len());
    for uri in uris {
        let rest = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| UriError::Malformed(format!("missing {SCHEME} scheme: {uri}")))?;
        match rest.split('/').collect::<Vec<_>>()[..] {
            [digits] => parts.push((1, 1, digits)),
            [index, total, digits] => {
                let index: usize = index
                    .parse()
                    .map_err(|_| UriError::Malformed(format!("bad chunk index: {uri}")))?;
                let total: usize = total
                    .parse()
                    .map_err(|_| UriError::Malformed(format!("bad chunk total: {uri}")))?;
                parts.push((index, total, digits));
            }
            _ => return Err(UriError::Malformed(format!("unrecognized uri shape: {uri}"))),
        }
    }

    let total = parts[0].1;
    if total != uris.len() || parts.iter().any(|&(_, t, _)| t != total) {
        return Err(UriError::Malformed(format!(
            "chunk totals disagree with the {} uris given",
            uris.len()
        )));
    }

    parts.sort_by_key(|&(index, _, _)| index);
    for (expected, &(index, _, _)) in (1..=total).zip(&parts) {
        if index != expected {
            return Err(UriError::Malformed(format!(
                "chunk indices are not exactly 1..={total}"
            )));
        }
    }

    let digits: String = parts.iter().map(|&(_, _, d)| d).collect();
    decode_digits(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_mapping() {
        // '-' is 45 → "00", '.' is 46 → "01", 'A' is 65 → "20".
        let uri = ShcUri::new("-.A").unwrap();
        assert_eq!(uri.digits(), "000120");
    }

    #[test]
    fn test_display_is_single_uri() {
        let uri = ShcUri::new("AZ").unwrap();
        assert_eq!(uri.to_string(), format!("shc:/{}", uri.digits()));
    }

    #[test]
    fn test_rejects_out_of_range_character() {
        match ShcUri::new("AB CD") {
            Err(UriError::EncodingRange { ch, index }) => {
                assert_eq!(ch, ' ');
                assert_eq!(index, 2);
            }
            other => panic!("expected EncodingRange, got {other:?}"),
        }
        assert!(ShcUri::new("caf\u{00e9}").is_err());
    }

    #[test]
    fn test_single_chunk() {
        let uri = ShcUri::new("ABCD").unwrap();
        let chunks: Vec<String> = uri.chunks(Some(1)).unwrap().collect();
        assert_eq!(chunks, vec![format!("shc:/1/1/{}", uri.digits())]);
    }

    #[test]
    fn test_default_chunking_small_token_is_one_chunk() {
        let uri = ShcUri::new("ABCD").unwrap();
        let chunks: Vec<String> = uri.chunks(None).unwrap().collect();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_default_chunking_2500_digits() {
        // 1250 token chars → 2500 digits → ceil(2500/1191) = 3 chunks of
        // ceil(2500/3) = 834, 834, and 832 digits.
        let token = "A".repeat(1250);
        let uri = ShcUri::new(&token).unwrap();
        assert_eq!(uri.digits().len(), 2500);

        let chunks: Vec<String> = uri.chunks(None).unwrap().collect();
        assert_eq!(chunks.len(), 3);

        let segments: Vec<&str> = chunks
            .iter()
            .map(|c| c.rsplit('/').next().unwrap())
            .collect();
        assert_eq!(segments[0].len(), 834);
        assert_eq!(segments[1].len(), 834);
        assert_eq!(segments[2].len(), 832);
        assert!(chunks[0].starts_with("shc:/1/3/"));
        assert!(chunks[1].starts_with("shc:/2/3/"));
        assert!(chunks[2].starts_with("shc:/3/3/"));
    }

    #[test]
    fn test_chunk_reconstruction() {
        let token = "Nq".repeat(300);
        let uri = ShcUri::new(&token).unwrap();
        for count in [1, 2, 3, 7] {
            let chunks: Vec<String> = uri.chunks(Some(count)).unwrap().collect();
            assert_eq!(chunks.len(), count);
            let rebuilt: String = chunks
                .iter()
                .map(|c| c.rsplit('/').next().unwrap())
                .collect();
            assert_eq!(rebuilt, uri.digits());
        }
    }

    #[test]
    fn test_chunks_is_restartable() {
        let uri = ShcUri::new(&"A".repeat(100)).unwrap();
        let first: Vec<String> = uri.chunks(Some(3)).unwrap().collect();
        let second: Vec<String> = uri.chunks(Some(3)).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_chunks_exact_size() {
        let uri = ShcUri::new(&"A".repeat(100)).unwrap();
        let chunks = uri.chunks(Some(4)).unwrap();
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn test_rejects_zero_chunks() {
        let uri = ShcUri::new("ABCD").unwrap();
        assert!(matches!(
            uri.chunks(Some(0)),
            Err(UriError::InvalidChunkCount { requested: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_more_chunks_than_digits() {
        let uri = ShcUri::new("AB").unwrap(); // 4 digits
        assert!(matches!(
            uri.chunks(Some(5)),
            Err(UriError::InvalidChunkCount {
                requested: 5,
                digits: 4
            })
        ));
        assert!(uri.chunks(Some(4)).is_ok());
    }

    #[test]
    fn test_decode_digits_inverts_mapping() {
        let token = "eyJhbGciOiJFUzI1NiJ9.payload-seg_ment.sig";
        let uri = ShcUri::new(token).unwrap();
        assert_eq!(decode_digits(uri.digits()).unwrap(), token);
    }

    #[test]
    fn test_decode_digits_rejects_odd_length() {
        assert!(matches!(
            decode_digits("123"),
            Err(UriError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_digits_rejects_non_digits() {
        assert!(matches!(
            decode_digits("12a4"),
            Err(UriError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_digits_rejects_value_above_80() {
        // 81 would decode to ASCII 126, outside the token alphabet.
        assert!(matches!(
            decode_digits("81"),
            Err(UriError::EncodingRange { .. })
        ));
        assert_eq!(decode_digits("80").unwrap(), "}");
    }

    #[test]
    fn test_assemble_single_uri() {
        let token = "ABCdef123-_.";
        let uri = ShcUri::new(token).unwrap();
        assert_eq!(assemble(&[&uri.to_string()]).unwrap(), token);
    }

    #[test]
    fn test_assemble_chunked_out_of_order() {
        let token = "Xy".repeat(50);
        let uri = ShcUri::new(&token).unwrap();
        let chunks: Vec<String> = uri.chunks(Some(3)).unwrap().collect();
        let shuffled: Vec<&str> = vec![&chunks[2], &chunks[0], &chunks[1]];
        assert_eq!(assemble(&shuffled).unwrap(), token);
    }

    #[test]
    fn test_assemble_rejects_incomplete_set() {
        let uri = ShcUri::new(&"A".repeat(50)).unwrap();
        let chunks: Vec<String> = uri.chunks(Some(3)).unwrap().collect();
        let partial: Vec<&str> = vec![&chunks[0], &chunks[2]];
        assert!(matches!(
            assemble(&partial),
            Err(UriError::Malformed(_))
        ));
    }

    #[test]
    fn test_assemble_rejects_duplicate_index() {
        let uri = ShcUri::new(&"A".repeat(50)).unwrap();
        let chunks: Vec<String> = uri.chunks(Some(2)).unwrap().collect();
        let duplicated: Vec<&str> = vec![&chunks[0], &chunks[0]];
        assert!(matches!(
            assemble(&duplicated),
            Err(UriError::Malformed(_))
        ));
    }

    #[test]
    fn test_assemble_rejects_wrong_scheme() {
        assert!(matches!(
            assemble(&["https://example.org/000102"]),
            Err(UriError::Malformed(_))
        ));
    }

    #[test]
    fn test_assemble_rejects_empty_input() {
        assert!(matches!(assemble(&[]), Err(UriError::Malformed(_))));
    }
}
