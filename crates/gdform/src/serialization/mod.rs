//! Generic codecs over delimited token streams and plist nodes.
//!
//! The layers build on each other:
//!
//! - [`tokens`] splits and joins flat strings
//! - [`Caster`] and [`FunctionTable`] convert single values per key
//! - [`ListCodec`] decodes separator-delimited sequences
//! - [`DictCodec`] decodes alternating key/value streams (or plist pairs)
//! - [`RecordCodec`] derives a strict keyed or positional codec from a
//!   [`RecordSchema`]
//! - [`resource`] composes codecs with compression, delimiters, files and
//!   lazily decoded nested content

mod caster;
mod dict;
mod list;
mod record;
pub mod resource;
pub mod tokens;

pub use caster::{Caster, DecodeFn, EncodeFn, FunctionTable, Kwargs};
pub use dict::DictCodec;
pub use list::ListCodec;
pub use resource::DecodedText;
pub use record::{
    Field, FieldType, Record, RecordCodec, RecordMode, RecordSchema, RecordSchemaBuilder,
    RecordType, TrimRule,
};
pub use tokens::Delimiter;
