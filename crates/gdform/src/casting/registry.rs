//! Registered encoders for custom value types.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::value::CustomValue;

/// Encoder for one custom type.
pub type CustomCastFn =
    Arc<dyn Fn(&dyn CustomValue, &CodecOptions) -> Result<String, CodecError> + Send + Sync>;

/// Custom-type encoders keyed by [`CustomValue::type_name`].
///
/// A registered encoder takes precedence over the value's own
/// [`CustomValue::to_wire`].
#[derive(Clone, Default)]
pub struct CasterRegistry {
    casters: IndexMap<&'static str, CustomCastFn>,
}

impl CasterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: &'static str, cast: CustomCastFn) {
        self.casters.insert(type_name, cast);
    }

    pub fn get(&self, type_name: &str) -> Option<&CustomCastFn> {
        self.casters.get(type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.casters.is_empty()
    }
}

impl fmt::Debug for CasterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.casters.keys()).finish()
    }
}
