//! CRC-32 token signatures.
//!
//! The host compares signatures of a token range across compiles to
//! detect whether that part of a program changed. The checksum covers
//! each token's text with one space between consecutive tokens, so
//! whitespace and comment edits do not change it.

use crate::{TokenIdx, TokenList};

/// IEEE 802.3 polynomial, reflected.
const POLY: u32 = 0xEDB8_8320;

const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ POLY } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

#[inline]
fn update(mut crc: u32, bytes: &[u8]) -> u32 {
    for &b in bytes {
        crc = TABLE[((crc ^ u32::from(b)) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc
}

/// CRC-32 of a byte string.
pub fn crc32(bytes: &[u8]) -> u32 {
    !update(!0, bytes)
}

/// Signature of the tokens from `first` to `last`, both included.
///
/// Walks the `next` links; if `last` is never reached the signature
/// covers everything up to the end sentinel.
pub fn token_signature(list: &TokenList, first: TokenIdx, last: TokenIdx) -> u32 {
    let mut crc = !0;
    let mut current = Some(first);
    let mut started = false;
    while let Some(idx) = current {
        if started {
            crc = update(crc, b" ");
        }
        crc = update(crc, list.text(idx).as_bytes());
        started = true;
        if idx == last {
            break;
        }
        current = list.next(idx);
    }
    !crc
}

#[cfg(test)]
mod tests;
