//! Binary-to-text codec for key material.
//!
//! Every 3 input bytes become 4 characters of `A-Z a-z 0-9 + /`, and the
//! output is padded with `=` to a multiple of 4. Decoding is permissive: it
//! stops at the first character outside the alphabet (`=` included) and
//! returns the bytes recovered so far, so trailing newlines or garbage never
//! cause an error.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const PAD: char = '=';

/// Returns the length of the encoding of `n` bytes.
pub const fn encoded_len(n: usize) -> usize {
    (n + 2) / 3 * 4
}

/// Encodes `bytes` as padded text.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(bytes.len()));
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);
        let sextets = [
            b0 >> 2,
            ((b0 & 0x03) << 4) | (b1 >> 4),
            ((b1 & 0x0f) << 2) | (b2 >> 6),
            b2 & 0x3f,
        ];
        // n bytes carry n + 1 significant sextets.
        for (i, s) in sextets.iter().enumerate() {
            if i <= chunk.len() {
                out.push(ALPHABET[*s as usize] as char);
            } else {
                out.push(PAD);
            }
        }
    }
    out
}

/// Decodes text produced by [`encode`].
///
/// Decoding stops at the first character that is not in the alphabet. A
/// final group of 2 or 3 characters yields 1 or 2 bytes; a lone character
/// carries less than a byte and yields nothing.
pub fn decode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() / 4 * 3);
    let mut group = [0u8; 4];
    let mut filled = 0;
    for s in text.bytes().map_while(sextet) {
        group[filled] = s;
        filled += 1;
        if filled == 4 {
            out.extend_from_slice(&join(&group));
            filled = 0;
        }
    }
    if filled > 1 {
        group[filled..].fill(0);
        out.extend_from_slice(&join(&group)[..filled - 1]);
    }
    out
}

fn sextet(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a' + 26),
        b'0'..=b'9' => Some(c - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

fn join(group: &[u8; 4]) -> [u8; 3] {
    [
        (group[0] << 2) | (group[1] >> 4),
        (group[1] << 4) | (group[2] >> 2),
        (group[2] << 6) | group[3],
    ]
}
