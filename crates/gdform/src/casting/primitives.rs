//! String <-> primitive conversions.

use gdform_compression::{decode_base64, encode_base64};

use super::CastError;
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::value::{Key, Value};

/// Booleans travel as integers: `0` is false, any other integer is true.
pub fn decode_bool(s: &str) -> Result<bool, CastError> {
    s.trim()
        .parse::<i64>()
        .map(|n| n != 0)
        .map_err(|_| CastError::InvalidBool(s.to_owned()))
}

pub fn encode_bool(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

pub fn decode_int(s: &str) -> Result<i64, CastError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| CastError::InvalidInt(s.to_owned()))
}

pub fn encode_int(n: i64) -> String {
    n.to_string()
}

pub fn decode_float(s: &str) -> Result<f64, CastError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| CastError::InvalidFloat(s.to_owned()))
}

/// Formats a float for the wire.
///
/// Without a configured precision the shortest round-trip form is used,
/// which prints integral values without a decimal point (`2.0` -> `2`).
/// With a precision the value is rounded to that many decimals and trailing
/// zeros and a trailing decimal point are stripped.
///
/// ```
/// use gdform::casting::encode_float;
/// use gdform::CodecOptions;
///
/// let plain = CodecOptions::default();
/// assert_eq!(encode_float(2.0, &plain), "2");
/// assert_eq!(encode_float(0.25, &plain), "0.25");
///
/// let fixed = CodecOptions::default().with_float_precision(Some(2));
/// assert_eq!(encode_float(1.005_1, &fixed), "1.01");
/// assert_eq!(encode_float(3.10, &fixed), "3.1");
/// assert_eq!(encode_float(7.0, &fixed), "7");
/// ```
pub fn encode_float(value: f64, options: &CodecOptions) -> String {
    let mut out = match options.float_precision {
        None => format!("{value}"),
        Some(precision) => {
            let fixed = format!("{value:.precision$}");
            if fixed.contains('.') {
                fixed
                    .trim_end_matches('0')
                    .trim_end_matches('.')
                    .to_owned()
            } else {
                fixed
            }
        }
    };
    if out == "-0" {
        out.truncate(0);
        out.push('0');
    }
    out
}

/// Decodes URL-safe base64 text into a string, replacing invalid UTF-8.
pub fn decode_base64_text(s: &str) -> Result<String, CastError> {
    let bytes = decode_base64(s)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn encode_base64_text(s: &str) -> String {
    encode_base64(s.as_bytes())
}

/// All-digit keys become integer keys; anything else stays a string key.
pub fn normalize_key(s: &str) -> Key {
    Key::parse(s)
}

/// Splits a secondary list such as `1.4.17`. An empty string is an empty list.
pub fn decode_str_list(s: &str, separator: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split(separator).map(str::to_owned).collect()
}

pub fn decode_int_list(s: &str, separator: &str) -> Result<Vec<i64>, CastError> {
    decode_str_list(s, separator)
        .iter()
        .map(|item| decode_int(item))
        .collect()
}

/// Serializes each item and joins them with `separator`.
pub fn encode_list(
    items: &[Value],
    separator: &str,
    options: &CodecOptions,
) -> Result<String, CodecError> {
    let parts = items
        .iter()
        .map(|item| serialize(item, options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(separator))
}

/// Serializes any value to its wire string.
///
/// Dispatch order: string, none (empty string), bool, float, int, then
/// custom values through the registry or their own [`to_wire`]. Lists,
/// dicts and custom values without a string form are rejected with
/// [`CastError::UnsupportedType`] unless `string_fallback` is enabled.
///
/// [`to_wire`]: crate::CustomValue::to_wire
pub fn serialize(value: &Value, options: &CodecOptions) -> Result<String, CodecError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        Value::None => Ok(String::new()),
        Value::Bool(b) => Ok(encode_bool(*b).to_owned()),
        Value::Float(x) => Ok(encode_float(*x, options)),
        Value::Int(n) => Ok(encode_int(*n)),
        Value::Custom(custom) => {
            if let Some(cast) = options.casters.get(custom.type_name()) {
                return cast(custom.as_ref(), options);
            }
            match custom.to_wire(options) {
                Some(result) => result,
                None => fallback(value, options),
            }
        }
        Value::List(_) | Value::Dict(_) => fallback(value, options),
    }
}

fn fallback(value: &Value, options: &CodecOptions) -> Result<String, CodecError> {
    if options.string_fallback {
        Ok(value.to_string())
    } else {
        Err(CastError::UnsupportedType(value.type_name().to_owned()).into())
    }
}
