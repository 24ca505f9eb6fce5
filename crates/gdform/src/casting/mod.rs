//! Bidirectional string casters for primitive wire values.

mod error;
mod primitives;
mod registry;

pub use error::CastError;
pub use primitives::{
    decode_base64_text, decode_bool, decode_float, decode_int, decode_int_list, decode_str_list,
    encode_base64_text, encode_bool, encode_float, encode_int, encode_list, normalize_key,
    serialize,
};
pub use registry::{CasterRegistry, CustomCastFn};
