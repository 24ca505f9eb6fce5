//! The decompress/compress pipelines.
//!
//! Decode order: XOR -> URL-safe base64 decode -> inflate -> lossy UTF-8.
//! Encode order is the exact mirror.

use std::io::{Read, Write};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, ZlibEncoder};
use flate2::{Compression as Level, GzBuilder};

use crate::constants::{Compression, GZIP_MAGIC};
use crate::error::CompressionError;
use crate::xor::xor_in_place;

/// URL-safe alphabet, padded on encode, padding optional on decode.
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes bytes with the URL-safe base64 alphabet.
pub fn encode_base64(data: &[u8]) -> String {
    URL_SAFE.encode(data)
}

/// Decodes URL-safe base64 text. Padding is optional.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, CompressionError> {
    Ok(URL_SAFE.decode(text.trim_end_matches('\0'))?)
}

/// Inflates `raw` according to `compression`.
///
/// [`Compression::Auto`] sniffs the gzip magic and falls back to zlib.
pub fn inflate(raw: &[u8], compression: Compression) -> Result<Vec<u8>, CompressionError> {
    let mut out = Vec::with_capacity(raw.len() * 4);
    let kind = match compression {
        Compression::Auto if raw.starts_with(&GZIP_MAGIC) => Compression::Gzip,
        Compression::Auto => Compression::Zlib,
        other => other,
    };
    tracing::trace!(requested = compression.as_str(), detected = kind.as_str(), "inflate");
    let result = match kind {
        Compression::None => {
            out.extend_from_slice(raw);
            Ok(0)
        }
        Compression::Zlib | Compression::Auto => ZlibDecoder::new(raw).read_to_end(&mut out),
        Compression::Gzip => GzDecoder::new(raw).read_to_end(&mut out),
        Compression::Deflate => DeflateDecoder::new(raw).read_to_end(&mut out),
    };
    result.map_err(|source| CompressionError::Inflate {
        kind: kind.as_str(),
        source,
    })?;
    Ok(out)
}

/// Compresses `data` according to `compression`.
///
/// gzip output carries a zero modification time so identical input always
/// produces identical bytes.
pub fn deflate(data: &[u8], compression: Compression) -> Result<Vec<u8>, CompressionError> {
    let err = |source| CompressionError::Deflate {
        kind: compression.as_str(),
        source,
    };
    match compression {
        Compression::None => Ok(data.to_vec()),
        Compression::Zlib | Compression::Auto => {
            let mut enc = ZlibEncoder::new(Vec::new(), Level::default());
            enc.write_all(data).map_err(err)?;
            enc.finish().map_err(err)
        }
        Compression::Gzip => {
            let mut enc = GzBuilder::new().mtime(0).write(Vec::new(), Level::default());
            enc.write_all(data).map_err(err)?;
            enc.finish().map_err(err)
        }
        Compression::Deflate => {
            let mut enc = DeflateEncoder::new(Vec::new(), Level::default());
            enc.write_all(data).map_err(err)?;
            enc.finish().map_err(err)
        }
    }
}

/// Runs the full decode pipeline over raw bytes (e.g. a file's contents).
pub fn decompress_bytes(
    data: &[u8],
    xor_key: Option<&[u8]>,
    compression: Compression,
) -> Result<String, CompressionError> {
    let mut bytes = data.to_vec();
    if let Some(key) = xor_key {
        xor_in_place(&mut bytes, key);
    }
    // Game files occasionally carry trailing NUL padding after the base64 text.
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    let raw = URL_SAFE.decode(&bytes)?;
    let inflated = inflate(&raw, compression)?;
    Ok(String::from_utf8_lossy(&inflated).into_owned())
}

/// Runs the full decode pipeline over a wire string.
pub fn decompress(
    data: &str,
    xor_key: Option<&[u8]>,
    compression: Compression,
) -> Result<String, CompressionError> {
    decompress_bytes(data.as_bytes(), xor_key, compression)
}

/// Runs the full encode pipeline, returning raw bytes.
pub fn compress_bytes(
    data: &str,
    xor_key: Option<&[u8]>,
    compression: Compression,
) -> Result<Vec<u8>, CompressionError> {
    let packed = deflate(data.as_bytes(), compression)?;
    let mut bytes = URL_SAFE.encode(packed).into_bytes();
    if let Some(key) = xor_key {
        xor_in_place(&mut bytes, key);
    }
    Ok(bytes)
}

/// Runs the full encode pipeline, returning a wire string.
///
/// Fails with [`CompressionError::NonUtf8Output`] when the XOR key maps the
/// base64 text outside of UTF-8; use [`compress_bytes`] for such keys.
pub fn compress(
    data: &str,
    xor_key: Option<&[u8]>,
    compression: Compression,
) -> Result<String, CompressionError> {
    let bytes = compress_bytes(data, xor_key, compression)?;
    String::from_utf8(bytes).map_err(|_| CompressionError::NonUtf8Output)
}
