//! Declarative record codecs.
//!
//! A [`RecordSchema`] lists a record's fields in wire order together with
//! their type, wire key, default and optional custom casters. A
//! [`RecordCodec`] derived from it decodes either positionally (token `i`
//! belongs to field `i`) or by key (alternating key/value tokens, unknown keys
//! rejected).

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::caster::{Caster, DecodeFn, EncodeFn, FunctionTable, Kwargs};
use super::dict::DictCodec;
use super::tokens::{self, Delimiter};
use crate::casting::{serialize, CastError};
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::value::{CustomValue, Key, Value};

/// Field name -> value, in the order fields were decoded or set.
pub type Record = IndexMap<String, Value>;

/// Declared field type. Selects the default caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Str,
    Base64Text,
    Any,
}

impl FieldType {
    fn caster(self) -> Caster {
        match self {
            FieldType::Bool => Caster::bool(),
            FieldType::Int => Caster::int(),
            FieldType::Float => Caster::float(),
            FieldType::Str => Caster::string(),
            FieldType::Base64Text => Caster::base64_text(),
            FieldType::Any => Caster::identity(),
        }
    }
}

/// One field of a [`RecordSchema`].
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    key: Option<String>,
    ty: FieldType,
    caster: Caster,
    default: Option<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            key: None,
            ty,
            caster: ty.caster(),
            default: None,
        }
    }

    /// Wire key alias. Defaults to the field name.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.caster = self.caster.with_default(value.clone());
        self.default = Some(value);
        self
    }

    pub fn decoder(mut self, decode: DecodeFn) -> Self {
        self.caster = self.caster.with_decoder(decode);
        self
    }

    pub fn encoder(mut self, encode: EncodeFn) -> Self {
        self.caster = self.caster.with_encoder(encode);
        self
    }

    /// Replaces both directions. A default declared later still applies.
    pub fn caster(mut self, caster: Caster) -> Self {
        self.caster = caster;
        if let Some(default) = &self.default {
            self.caster = self.caster.with_default(default.clone());
        }
        self
    }

    /// Keyword arguments forwarded from the call site to this field's caster.
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.caster = self.caster.with_params(params);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    pub fn ty(&self) -> FieldType {
        self.ty
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Decides whether a trailing positional field may be dropped on encode.
///
/// Evaluated from the last field backward; trimming stops at the first field
/// the rule rejects.
#[derive(Clone)]
pub struct TrimRule(Arc<dyn Fn(&Field, Option<&Value>) -> bool + Send + Sync>);

impl TrimRule {
    pub fn new<F>(rule: F) -> Self
    where
        F: Fn(&Field, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(rule))
    }

    /// Absent, `None` or equal to the field's declared default.
    pub fn defaults() -> Self {
        Self::new(|field, value| match value {
            None | Some(Value::None) => true,
            Some(v) => field.default_value() == Some(v),
        })
    }

    pub fn matches(&self, field: &Field, value: Option<&Value>) -> bool {
        (self.0)(field, value)
    }
}

impl fmt::Debug for TrimRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TrimRule")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordMode {
    /// Field identity is the token position.
    Positional,
    /// Alternating wire key / value tokens.
    Keyed,
}

#[derive(Debug, Clone)]
pub struct RecordSchema {
    type_name: String,
    mode: RecordMode,
    separator: String,
    fields: Vec<Field>,
    trim: Option<TrimRule>,
    delimiter: Option<Delimiter>,
}

impl RecordSchema {
    pub fn builder(type_name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            schema: RecordSchema {
                type_name: type_name.into(),
                mode: RecordMode::Keyed,
                separator: ",".to_owned(),
                fields: Vec::new(),
                trim: None,
                delimiter: None,
            },
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn mode(&self) -> RecordMode {
        self.mode
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

#[derive(Debug)]
pub struct RecordSchemaBuilder {
    schema: RecordSchema,
}

impl RecordSchemaBuilder {
    pub fn positional(mut self, separator: impl Into<String>) -> Self {
        self.schema.mode = RecordMode::Positional;
        self.schema.separator = separator.into();
        self
    }

    pub fn keyed(mut self, separator: impl Into<String>) -> Self {
        self.schema.mode = RecordMode::Keyed;
        self.schema.separator = separator.into();
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.schema.fields.push(field);
        self
    }

    /// Positional mode only: drop trailing fields the rule accepts.
    pub fn trim_trailing(mut self, rule: TrimRule) -> Self {
        self.schema.trim = Some(rule);
        self
    }

    pub fn delimited(mut self, delimiter: Delimiter) -> Self {
        self.schema.delimiter = Some(delimiter);
        self
    }

    pub fn build(self) -> RecordSchema {
        self.schema
    }
}

/// Codec derived from a [`RecordSchema`].
#[derive(Debug, Clone)]
pub struct RecordCodec {
    schema: RecordSchema,
    table: FunctionTable,
    by_key: IndexMap<String, usize>,
    by_name: IndexMap<String, usize>,
}

impl RecordCodec {
    pub fn new(schema: RecordSchema) -> Self {
        let mut table = FunctionTable::new();
        let mut by_key = IndexMap::with_capacity(schema.fields.len());
        let mut by_name = IndexMap::with_capacity(schema.fields.len());
        for (i, field) in schema.fields.iter().enumerate() {
            table.insert(Key::Str(field.wire_key().to_owned()), field.caster.clone());
            by_key.insert(field.wire_key().to_owned(), i);
            by_name.insert(field.name.clone(), i);
        }
        Self {
            schema,
            table,
            by_key,
            by_name,
        }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// The derived wire-key -> caster table.
    pub fn table(&self) -> &FunctionTable {
        &self.table
    }

    /// A strict [`DictCodec`] over wire keys equivalent to this record's
    /// keyed form.
    pub fn as_dict_codec(&self) -> DictCodec {
        let mut codec = DictCodec::new(self.schema.separator.clone(), self.table.clone())
            .named(self.schema.type_name.clone())
            .strict();
        if let Some(delimiter) = &self.schema.delimiter {
            codec = codec.delimited(delimiter.clone());
        }
        codec
    }

    fn type_name(&self) -> &str {
        &self.schema.type_name
    }

    fn decode_field(&self, field: &Field, raw: &str, kwargs: &Kwargs) -> Result<Value, CodecError> {
        field
            .caster
            .decode(Value::Str(raw.to_owned()), kwargs)
            .map_err(|e| e.context(self.type_name(), field.name.clone()))
    }

    fn encode_field(
        &self,
        field: &Field,
        value: &Value,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<Option<String>, CodecError> {
        let encoded = field
            .caster
            .encode(value, options, kwargs)
            .and_then(|v| v.map(|v| serialize(&v, options)).transpose())
            .map_err(|e| e.context(self.type_name(), field.name.clone()))?;
        Ok(encoded)
    }

    /// A copy of `record` with every absent field that declares a default
    /// filled in. Decoded records stay sparse so that re-encoding writes
    /// exactly the fields that were on the wire.
    pub fn with_defaults(&self, record: &Record) -> Record {
        let mut filled = record.clone();
        for field in &self.schema.fields {
            if let Some(default) = &field.default {
                if !filled.contains_key(&field.name) {
                    filled.insert(field.name.clone(), default.clone());
                }
            }
        }
        filled
    }

    fn present<'a>(record: &'a Record, field: &Field) -> Option<&'a Value> {
        record.get(&field.name).filter(|v| !v.is_none())
    }

    pub fn decode(&self, s: &str, kwargs: &Kwargs) -> Result<Record, CodecError> {
        let body = match &self.schema.delimiter {
            Some(delimiter) => delimiter.strip(s)?,
            None => s,
        };
        self.decode_tokens(&tokens::split(body, &self.schema.separator, false), kwargs)
    }

    pub fn decode_tokens<S: AsRef<str>>(
        &self,
        tokens: &[S],
        kwargs: &Kwargs,
    ) -> Result<Record, CodecError> {
        let fields = &self.schema.fields;
        let mut record = Record::with_capacity(fields.len());
        match self.schema.mode {
            RecordMode::Positional => {
                if tokens.len() > fields.len() {
                    return Err(CodecError::TooManyTokens {
                        type_name: self.type_name().to_owned(),
                        expected: fields.len(),
                        found: tokens.len(),
                    });
                }
                for (field, token) in fields.iter().zip(tokens) {
                    let value = self.decode_field(field, token.as_ref(), kwargs)?;
                    record.insert(field.name.clone(), value);
                }
            }
            RecordMode::Keyed => {
                for (key, raw) in tokens::split_pairs(tokens)? {
                    let index = *self.by_key.get(key).ok_or_else(|| CodecError::UnknownKey {
                        type_name: self.type_name().to_owned(),
                        key: key.to_owned(),
                    })?;
                    let field = &fields[index];
                    let value = self.decode_field(field, raw, kwargs)?;
                    record.insert(field.name.clone(), value);
                }
            }
        }
        Ok(record)
    }

    pub fn encode(
        &self,
        record: &Record,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<String, CodecError> {
        let joined = tokens::join(
            &self.encode_tokens(record, options, kwargs)?,
            &self.schema.separator,
            false,
        );
        Ok(match &self.schema.delimiter {
            Some(delimiter) => delimiter.wrap(&joined),
            None => joined,
        })
    }

    pub fn encode_tokens(
        &self,
        record: &Record,
        options: &CodecOptions,
        kwargs: &Kwargs,
    ) -> Result<Vec<String>, CodecError> {
        if let Some(name) = record.keys().find(|name| !self.by_name.contains_key(*name)) {
            return Err(CodecError::UnknownField {
                type_name: self.type_name().to_owned(),
                field: name.clone(),
            });
        }
        let fields = &self.schema.fields;
        let mut out = Vec::with_capacity(fields.len() * 2);
        match self.schema.mode {
            RecordMode::Positional => {
                // Nothing is written past the last present field.
                let mut end = fields
                    .iter()
                    .rposition(|field| Self::present(record, field).is_some())
                    .map_or(0, |i| i + 1);
                if let Some(rule) = &self.schema.trim {
                    while end > 0 {
                        let field = &fields[end - 1];
                        if !rule.matches(field, record.get(&field.name)) {
                            break;
                        }
                        end -= 1;
                    }
                }
                for field in &fields[..end] {
                    let value = Self::present(record, field)
                        .or(field.default.as_ref())
                        .ok_or_else(|| CodecError::MissingField {
                            type_name: self.type_name().to_owned(),
                            field: field.name.clone(),
                        })?;
                    let token = self.encode_field(field, value, options, kwargs)?;
                    out.push(token.unwrap_or_default());
                }
            }
            RecordMode::Keyed => {
                for field in fields {
                    let Some(value) = record.get(&field.name) else {
                        continue;
                    };
                    if options.skip_defaults && field.caster.is_default(value) {
                        continue;
                    }
                    if let Some(token) = self.encode_field(field, value, options, kwargs)? {
                        out.push(field.wire_key().to_owned());
                        out.push(token);
                    }
                }
            }
        }
        Ok(out)
    }

    /// The field's value, or its declared default when absent.
    pub fn get<'a>(&'a self, record: &'a Record, name: &str) -> Result<&'a Value, CodecError> {
        let declared = self
            .by_name
            .get(name)
            .and_then(|&i| self.schema.fields[i].default.as_ref());
        record
            .get(name)
            .filter(|v| !v.is_none())
            .or(declared)
            .ok_or_else(|| CodecError::MissingField {
                type_name: self.type_name().to_owned(),
                field: name.to_owned(),
            })
    }

    fn get_as<'a, T>(
        &'a self,
        record: &'a Record,
        name: &str,
        expected: &'static str,
        cast: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, CodecError> {
        let value = self.get(record, name)?;
        cast(value).ok_or_else(|| {
            CodecError::from(CastError::UnexpectedKind {
                expected,
                found: value.type_name(),
            })
            .context(self.type_name(), name)
        })
    }

    pub fn get_bool(&self, record: &Record, name: &str) -> Result<bool, CodecError> {
        self.get_as(record, name, "bool", Value::as_bool)
    }

    pub fn get_int(&self, record: &Record, name: &str) -> Result<i64, CodecError> {
        self.get_as(record, name, "int", Value::as_int)
    }

    pub fn get_float(&self, record: &Record, name: &str) -> Result<f64, CodecError> {
        self.get_as(record, name, "float", Value::as_float)
    }

    pub fn get_str(&self, record: &Record, name: &str) -> Result<String, CodecError> {
        self.get_as(record, name, "str", |v| v.as_str().map(str::to_owned))
    }
}

/// A typed struct backed by a [`RecordCodec`].
pub trait RecordType: Sized {
    fn codec() -> &'static RecordCodec;

    fn from_record(record: &Record) -> Result<Self, CodecError>;

    fn to_record(&self) -> Record;

    fn decode(s: &str) -> Result<Self, CodecError> {
        Self::decode_with(s, &Kwargs::new())
    }

    fn decode_with(s: &str, kwargs: &Kwargs) -> Result<Self, CodecError> {
        Self::from_record(&Self::codec().decode(s, kwargs)?)
    }

    fn encode(&self, options: &CodecOptions) -> Result<String, CodecError> {
        Self::codec().encode(&self.to_record(), options, &Kwargs::new())
    }

    /// A caster that stores decoded instances as [`Value::Custom`].
    fn caster() -> Caster
    where
        Self: CustomValue,
    {
        Caster::new(
            |raw, kwargs| match raw {
                Value::Str(s) => Ok(Value::custom(Self::decode_with(&s, kwargs)?)),
                custom @ Value::Custom(_) if custom.downcast_ref::<Self>().is_some() => Ok(custom),
                other => Err(CastError::UnexpectedKind {
                    expected: "str",
                    found: other.type_name(),
                }
                .into()),
            },
            |value, options, kwargs| {
                let typed = value.downcast_ref::<Self>().ok_or_else(|| {
                    CodecError::from(CastError::UnexpectedKind {
                        expected: "record",
                        found: value.type_name(),
                    })
                })?;
                let wire = Self::codec().encode(&typed.to_record(), options, kwargs)?;
                Ok(Some(Value::Str(wire)))
            },
        )
    }
}
