//! Fixed capacity bitstring, gzip compressed and base64url encoded.

use std::io::{Read, Write};

use bit_vec::BitVec;
use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use flate2::{bufread::GzDecoder, write::GzEncoder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BitstringError {
    #[error("Bitstring encoding error: `{0}`")]
    Base64Encoding(ct_codecs::Error),
    #[error("Bitstring decoding error: `{0}`")]
    Base64Decoding(ct_codecs::Error),
    #[error("Bitstring compression error: `{0}`")]
    Compression(std::io::Error),
    #[error("Bitstring decompression error: `{0}`")]
    Decompression(std::io::Error),
    #[error("Index `{index}` out of bounds for bitstring of {len} bits")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("Bitstring capacity must be a positive multiple of 8, got {0}")]
    InvalidCapacity(usize),
    #[error("Bitstring exceeds {max_bits} bits")]
    TooLarge { max_bits: usize },
}

/// An all-zero list of `capacity` bits.
pub fn generate_empty(capacity: usize) -> Result<String, BitstringError> {
    if capacity == 0 || capacity % 8 != 0 {
        return Err(BitstringError::InvalidCapacity(capacity));
    }

    encode(&BitVec::from_elem(capacity, false))
}

pub fn encode(bits: &BitVec) -> Result<String, BitstringError> {
    let compressed = gzip_compress(&bits.to_bytes()).map_err(BitstringError::Compression)?;

    Base64UrlSafeNoPadding::encode_to_string(compressed).map_err(BitstringError::Base64Encoding)
}

/// Decodes a list of at most `max_bits` bits; larger lists are rejected without
/// inflating them fully.
pub fn decode(encoded: &str, max_bits: usize) -> Result<BitVec, BitstringError> {
    let compressed = Base64UrlSafeNoPadding::decode_to_vec(encoded, None)
        .map_err(BitstringError::Base64Decoding)?;
    let bytes = gzip_decompress(&compressed, max_bits.div_ceil(8))?;
    if bytes.len() * 8 > max_bits {
        return Err(BitstringError::TooLarge { max_bits });
    }

    Ok(BitVec::from_bytes(&bytes))
}

pub fn get_bit(encoded: &str, index: usize, max_bits: usize) -> Result<bool, BitstringError> {
    let bits = decode(encoded, max_bits)?;

    bits.get(index).ok_or(BitstringError::IndexOutOfBounds {
        index,
        len: bits.len(),
    })
}

/// Returns the re-encoded list with bit `index` set to `value`.
pub fn set_bit(
    encoded: &str,
    index: usize,
    value: bool,
    max_bits: usize,
) -> Result<String, BitstringError> {
    let mut bits = decode(encoded, max_bits)?;
    if index >= bits.len() {
        return Err(BitstringError::IndexOutOfBounds {
            index,
            len: bits.len(),
        });
    }

    bits.set(index, value);
    encode(&bits)
}

fn gzip_compress(input: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = GzEncoder::new(Vec::new(), Default::default());
    encoder.write_all(input)?;
    encoder.finish()
}

/// Inflates at most one byte past `max_bytes`, enough to tell that the input is too large.
fn gzip_decompress(input: &[u8], max_bytes: usize) -> Result<Vec<u8>, BitstringError> {
    let mut result = Vec::new();
    GzDecoder::new(input)
        .take(max_bytes as u64 + 1)
        .read_to_end(&mut result)
        .map_err(BitstringError::Decompression)?;
    Ok(result)
}
