//! Locality-sensitive fingerprint of source text.
//!
//! Implements the Nilsimsa digest: every byte trigram inside a sliding
//! five-byte window is hashed into one of 256 buckets, and the digest bit for a
//! bucket is set when its count exceeds the mean. Texts that differ only in a
//! few characters end up sharing most bits, so small whitespace or punctuation
//! changes often produce the same digest.
//!
//! Collisions between different texts are accepted: they make those texts
//! share a cache entry.

use std::fmt;

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Bucket permutation table, generated once at compile time.
const TRAN: [u8; 256] = build_tran();

const fn build_tran() -> [u8; 256] {
    let mut tran = [0u8; 256];
    let mut j: usize = 0;
    let mut i = 0;
    while i < 256 {
        j = (j * 53 + 1) & 255;
        j += j;
        if j > 255 {
            j -= 255;
        }
        // On a clash, bump j and rescan from index 1; index 0 is not rechecked.
        let mut k = 0;
        while k < i {
            if j == tran[k] as usize {
                j = (j + 1) & 255;
                k = 0;
            }
            k += 1;
        }
        tran[i] = j as u8;
        i += 1;
    }
    tran
}

fn tran_hash(a: u8, b: u8, c: u8, n: u8) -> usize {
    let x = TRAN[(a.wrapping_add(n)) as usize] as usize;
    let y = TRAN[b as usize] as usize * (2 * n as usize + 1);
    let z = TRAN[(c ^ TRAN[n as usize]) as usize] as usize;
    ((x ^ y) + z) & 255
}

/// A 256-bit Nilsimsa digest, rendered as 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; DIGEST_LEN]);

impl Fingerprint {
    /// Compute the fingerprint of UTF-8 text.
    pub fn of(text: &str) -> Self {
        let mut acc = [0u32; 256];
        // Most recent byte first.
        let mut window: [u8; 4] = [0; 4];
        let mut seen: usize = 0;

        for &c in text.as_bytes() {
            if seen > 1 {
                acc[tran_hash(c, window[0], window[1], 0)] += 1;
            }
            if seen > 2 {
                acc[tran_hash(c, window[0], window[2], 1)] += 1;
                acc[tran_hash(c, window[1], window[2], 2)] += 1;
            }
            if seen > 3 {
                acc[tran_hash(c, window[0], window[3], 3)] += 1;
                acc[tran_hash(c, window[1], window[3], 4)] += 1;
                acc[tran_hash(c, window[2], window[3], 5)] += 1;
                acc[tran_hash(window[3], window[0], c, 6)] += 1;
                acc[tran_hash(window[3], window[2], c, 7)] += 1;
            }

            window = [c, window[0], window[1], window[2]];
            seen += 1;
        }

        let trigrams: u64 = match seen {
            3 => 1,
            4 => 4,
            n if n > 4 => 8 * n as u64 - 28,
            _ => 0,
        };

        // Bucket i lands in byte i / 8; bytes are emitted most significant first.
        let mut digest = [0u8; DIGEST_LEN];
        for (i, &count) in acc.iter().enumerate() {
            if u64::from(count) * 256 > trigrams {
                digest[DIGEST_LEN - 1 - (i >> 3)] |= 1 << (i & 7);
            }
        }

        Self(digest)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Hex form, as stored in `original_text_hash` columns.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a stored hex fingerprint.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let digest: [u8; DIGEST_LEN] = bytes.try_into().ok()?;
        Some(Self(digest))
    }

    /// Number of equal bits between two digests (0..=256).
    pub fn similarity(&self, other: &Self) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (!(a ^ b)).count_ones())
            .sum()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tran_table_is_a_permutation() {
        let mut seen = [false; 256];
        for &b in TRAN.iter() {
            assert!(!seen[b as usize], "duplicate entry {b:#04x}");
            seen[b as usize] = true;
        }
        assert_eq!(&TRAN[..8], &[0x02, 0xd6, 0x9e, 0x6f, 0xf9, 0x1d, 0x04, 0xab]);
    }

    #[test]
    fn deterministic_and_fixed_length() {
        let a = Fingerprint::of("The quick brown fox jumps over the lazy dog");
        let b = Fingerprint::of("The quick brown fox jumps over the lazy dog");
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn short_inputs_produce_empty_digest() {
        assert_eq!(Fingerprint::of("").to_hex(), "0".repeat(64));
        assert_eq!(Fingerprint::of("ab").to_hex(), "0".repeat(64));
    }

    #[test]
    fn near_duplicates_are_closer_than_unrelated_text() {
        let base = Fingerprint::of("Google translation that you did not know about");
        let near = Fingerprint::of("Google translation that you did not know about!");
        let far = Fingerprint::of("A completely different sentence about the weather today");

        assert!(base.similarity(&near) > base.similarity(&far));
        assert!(base.similarity(&near) > 200);
    }

    #[test]
    fn different_texts_differ() {
        assert_ne!(
            Fingerprint::of("Hello, world. How are you?"),
            Fingerprint::of("Goodbye, moon. Where did you go?")
        );
    }

    #[test]
    fn hex_roundtrip() {
        let fp = Fingerprint::of("여러분이 몰랐던 구글 번역기");
        assert_eq!(Fingerprint::from_hex(&fp.to_hex()), Some(fp));
        assert_eq!(Fingerprint::from_hex("zz"), None);
        assert_eq!(Fingerprint::from_hex("abcd"), None);
    }
}
