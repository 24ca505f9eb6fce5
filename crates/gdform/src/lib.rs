//! Schema-driven codecs for Geometry Dash save files and level data.
//!
//! Every wire format in the game is one of a few shapes: plist XML with a
//! compact tag set, flat separator-delimited records (keyed or positional),
//! and a gzip/zlib + base64 + XOR envelope around either. This crate provides
//! those shapes as generic, table-driven codecs and builds the concrete
//! formats on top of them.
//!
//! # Layers
//!
//! - [`casting`] - primitive string casters and the "serialize any value" entry point
//! - [`plist`] - plist element trees to [`Value`]s and back
//! - [`serialization`] - token, list, dict and record codecs plus file resources
//! - [`formats`] - HSV, colors, objects, level strings and local level saves
//!
//! Encoding options travel explicitly as [`CodecOptions`].
//!
//! # Example
//!
//! ```
//! use gdform::formats::GameObject;
//! use gdform::CodecOptions;
//!
//! let object = GameObject::decode("1,1,2,15,3,15,57,4.7;").unwrap();
//! assert_eq!(object.groups(), [4, 7]);
//! assert_eq!(
//!     object.encode(&CodecOptions::default()).unwrap(),
//!     "1,1,2,15,3,15,57,4.7;"
//! );
//! ```

pub mod casting;
mod error;
pub mod formats;
mod options;
pub mod plist;
pub mod serialization;
mod value;

pub use error::CodecError;
pub use gdform_compression::Compression;
pub use options::CodecOptions;
pub use value::{CustomValue, Key, Map, Value};
