//! Reversible string envelopes for save files and level strings.
//!
//! A wire string is produced by compressing UTF-8 text, encoding the result
//! with the URL-safe base64 alphabet, and finally XOR-ing the base64 bytes
//! with a repeating key. Decoding runs the exact mirror of that pipeline.
//!
//! # Overview
//!
//! - [`decompress`] / [`compress`] - the full envelope over strings
//! - [`decompress_bytes`] / [`compress_bytes`] - the same over raw file bytes
//! - [`xor`] / [`xor_in_place`] - the repeating-key obfuscation step
//! - [`encode_base64`] / [`decode_base64`] - the base64 step on its own
//!
//! # Example
//!
//! ```
//! use gdform_compression::{compress, decompress, Compression};
//!
//! let packed = compress("1,1,2,15,3,15;", Some(b"\x0b"), Compression::Gzip).unwrap();
//! let text = decompress(&packed, Some(b"\x0b"), Compression::Gzip).unwrap();
//! assert_eq!(text, "1,1,2,15,3,15;");
//! ```

mod constants;
mod envelope;
mod error;
mod xor;

pub use constants::{Compression, GZIP_MAGIC, SAVE_XOR_KEY};
pub use envelope::{
    compress, compress_bytes, decode_base64, decompress, decompress_bytes, deflate,
    encode_base64, inflate,
};
pub use error::CompressionError;
pub use xor::{xor, xor_in_place};
