//! 32-bit murmurhash2 rendered in base36.
//!
//! The digests match the ones produced by the JavaScript `@emotion/hash`
//! family of helpers, so short class names stay stable when the same styles
//! are compiled by a JavaScript toolchain.

const M: u32 = 0x5bd1_e995;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Raw murmurhash2 over the UTF-8 bytes of the input.
pub fn murmur2(input: &[u8], seed: u32) -> u32 {
  let mut h = seed ^ (input.len() as u32);

  let mut chunks = input.chunks_exact(4);
  for chunk in &mut chunks {
    let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    k = k.wrapping_mul(M);
    k ^= k >> 24;
    k = k.wrapping_mul(M);
    h = h.wrapping_mul(M) ^ k;
  }

  let tail = chunks.remainder();
  if !tail.is_empty() {
    for (index, byte) in tail.iter().enumerate() {
      h ^= u32::from(*byte) << (8 * index);
    }
    h = h.wrapping_mul(M);
  }

  h ^= h >> 13;
  h = h.wrapping_mul(M);
  h ^ (h >> 15)
}

pub fn hash(key: &str) -> String {
  hash_with_seed(key, 0)
}

pub fn hash_with_seed(key: &str, seed: u32) -> String {
  to_base36(murmur2(key.as_bytes(), seed))
}

/// The first `len` base36 digits of [`hash`]. Shorter digests are returned as is.
pub fn short_hash(key: &str, len: usize) -> String {
  let mut digest = hash(key);
  digest.truncate(len);
  digest
}

fn to_base36(mut value: u32) -> String {
  if value == 0 {
    return "0".to_string();
  }

  let mut digits = Vec::with_capacity(7);
  while value > 0 {
    digits.push(char::from(BASE36_DIGITS[(value % 36) as usize]));
    value /= 36;
  }

  digits.into_iter().rev().collect()
}
