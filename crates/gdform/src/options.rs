//! Formatting options threaded through every encode call.
//!
//! Options are passed by reference down the call chain instead of living in
//! process-wide state, so concurrent encodes with different settings never
//! observe each other.

use serde::{Deserialize, Serialize};

use crate::casting::{CasterRegistry, CustomCastFn};

/// Encode-time options.
///
/// # Example
///
/// ```
/// use gdform::CodecOptions;
///
/// let options = CodecOptions::from_json(r#"{ "float_precision": 3 }"#).unwrap();
/// assert_eq!(options.float_precision, Some(3));
/// assert!(!options.skip_defaults);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Fixed number of decimals for floats. `None` writes the shortest
    /// round-trip form, with integral values printed without a decimal point.
    pub float_precision: Option<usize>,
    /// Serialize otherwise unsupported values through their generic string form.
    pub string_fallback: bool,
    /// Omit keyed pairs whose value equals the key's declared default.
    pub skip_defaults: bool,
    /// Encoders for custom value types, looked up by type name.
    #[serde(skip)]
    pub casters: CasterRegistry,
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn with_float_precision(mut self, precision: Option<usize>) -> Self {
        self.float_precision = precision;
        self
    }

    pub fn with_string_fallback(mut self, enabled: bool) -> Self {
        self.string_fallback = enabled;
        self
    }

    pub fn with_skip_defaults(mut self, enabled: bool) -> Self {
        self.skip_defaults = enabled;
        self
    }

    pub fn with_caster(mut self, type_name: &'static str, cast: CustomCastFn) -> Self {
        self.casters.register(type_name, cast);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_skips_registry() {
        let options = CodecOptions::new()
            .with_float_precision(Some(2))
            .with_skip_defaults(true);
        let text = options.to_json().unwrap();
        assert_eq!(
            text,
            r#"{"float_precision":2,"string_fallback":false,"skip_defaults":true}"#
        );
        let back = CodecOptions::from_json(&text).unwrap();
        assert_eq!(back.float_precision, Some(2));
        assert!(back.skip_defaults);
        assert!(back.casters.is_empty());
    }

    #[test]
    fn empty_json_is_default() {
        let options = CodecOptions::from_json("{}").unwrap();
        assert_eq!(options.float_precision, None);
        assert!(!options.string_fallback);
    }
}
