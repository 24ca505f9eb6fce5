//! Conversion between plist element trees and [`Value`]s.

use super::xml::{parse_document, write_document, Element};
use super::PlistError;
use crate::casting::{encode_float, serialize};
use crate::error::CodecError;
use crate::options::CodecOptions;
use crate::value::{Key, Map, Value};

/// Key of the pair that marks a mapping node as a sequence.
pub const ARRAY_SENTINEL: &str = "_isArr";
pub const PLIST_VERSION: &str = "1.0";
pub const PLIST_GJVER: &str = "2.0";

/// Reads a plist node.
pub fn read(node: &Element) -> Result<Value, PlistError> {
    match node.tag.as_str() {
        "i" => {
            let text = node.text().trim();
            text.parse::<i64>()
                .map(Value::Int)
                .map_err(|_| PlistError::InvalidNumber {
                    kind: "integer",
                    text: text.to_owned(),
                })
        }
        "r" => {
            let text = node.text().trim();
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|_| PlistError::InvalidNumber {
                    kind: "real",
                    text: text.to_owned(),
                })
        }
        "s" => Ok(Value::Str(node.text().to_owned())),
        "t" => Ok(Value::Bool(true)),
        "d" | "dict" => read_container(node),
        other => Err(PlistError::UnexpectedTag(other.to_owned())),
    }
}

fn is_sequence(children: &[Element]) -> bool {
    children.len() >= 2
        && children[0].tag == "k"
        && children[0].text() == ARRAY_SENTINEL
        && children[1].tag == "t"
}

fn read_container(node: &Element) -> Result<Value, PlistError> {
    let children = &node.children;
    if children.len() % 2 != 0 {
        return Err(PlistError::UnbalancedDict);
    }
    if is_sequence(children) {
        // Skip the sentinel pair and every `k_<i>` label.
        let items = children
            .iter()
            .skip(3)
            .step_by(2)
            .map(read)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::List(items));
    }
    let mut map = Map::with_capacity(children.len() / 2);
    for pair in children.chunks_exact(2) {
        let (key, value) = (&pair[0], &pair[1]);
        if key.tag != "k" {
            return Err(PlistError::ExpectedKey(key.tag.clone()));
        }
        map.insert(Key::Str(key.text().to_owned()), read(value)?);
    }
    Ok(Value::Dict(map))
}

/// Converts a value into an element, or `None` when the value is not written
/// at all (`None` and `false`).
///
/// Mappings and sequences use `container_tag`; their children always use `d`.
pub fn to_element(
    value: &Value,
    options: &CodecOptions,
    container_tag: &str,
) -> Result<Option<Element>, CodecError> {
    let element = match value {
        Value::None | Value::Bool(false) => return Ok(None),
        Value::Bool(true) => Element::new("t"),
        Value::Int(n) => Element::with_text("i", n.to_string()),
        Value::Float(x) => Element::with_text("r", encode_float(*x, options)),
        Value::Str(s) => Element::with_text("s", s.clone()),
        Value::Dict(map) => {
            let mut element = Element::new(container_tag);
            for (key, item) in map {
                write_entry(&mut element, &key.to_string(), item, options)?;
            }
            element
        }
        Value::List(items) => {
            let mut element = Element::new(container_tag);
            element.push(Element::with_text("k", ARRAY_SENTINEL));
            element.push(Element::new("t"));
            // Omitted items do not use up an index.
            let mut index = 0;
            for item in items {
                if let Some(child) = to_element(item, options, "d")? {
                    index += 1;
                    element.push(Element::with_text("k", format!("k_{index}")));
                    element.push(child);
                }
            }
            element
        }
        Value::Custom(_) => Element::with_text("s", serialize(value, options)?),
    };
    Ok(Some(element))
}

/// Appends `value` to `parent`; values that are not written leave it untouched.
pub fn write(parent: &mut Element, value: &Value, options: &CodecOptions) -> Result<(), CodecError> {
    if let Some(child) = to_element(value, options, "d")? {
        parent.push(child);
    }
    Ok(())
}

/// Appends a `<k>` / value pair. The key is omitted along with the value.
pub fn write_entry(
    parent: &mut Element,
    key: &str,
    value: &Value,
    options: &CodecOptions,
) -> Result<(), CodecError> {
    if let Some(child) = to_element(value, options, "d")? {
        parent.push(Element::with_text("k", key));
        parent.push(child);
    }
    Ok(())
}

/// Parses a full `<plist>` document into its top-level value.
pub fn from_str(document: &str) -> Result<Value, PlistError> {
    let root = parse_document(document)?;
    if root.tag != "plist" {
        return Err(PlistError::UnexpectedRoot(root.tag));
    }
    match root.children.as_slice() {
        [top] => read(top),
        _ => Err(PlistError::EmptyDocument),
    }
}

/// Writes a full `<plist>` document around `value`.
pub fn to_string(value: &Value, options: &CodecOptions) -> Result<String, CodecError> {
    let top = to_element(value, options, "dict")?.unwrap_or_else(|| Element::new("dict"));
    let mut root = Element::new("plist")
        .with_attr("version", PLIST_VERSION)
        .with_attr("gjver", PLIST_GJVER);
    root.push(top);
    Ok(write_document(&root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plist::parse_document;

    fn node(xml: &str) -> Element {
        parse_document(xml).unwrap()
    }

    #[test]
    fn scalar_tags() {
        assert_eq!(read(&node("<i>-12</i>")).unwrap(), Value::Int(-12));
        assert_eq!(read(&node("<r>0.5</r>")).unwrap(), Value::Float(0.5));
        assert_eq!(read(&node("<s>hi</s>")).unwrap(), Value::Str("hi".into()));
        assert_eq!(read(&node("<s />")).unwrap(), Value::Str(String::new()));
        assert_eq!(read(&node("<t />")).unwrap(), Value::Bool(true));
    }

    #[test]
    fn empty_container_is_mapping() {
        assert_eq!(read(&node("<d />")).unwrap(), Value::Dict(Map::new()));
        assert_eq!(read(&node("<dict></dict>")).unwrap(), Value::Dict(Map::new()));
    }

    #[test]
    fn sentinel_selects_sequence() {
        let xml = "<d><k>_isArr</k><t /><k>k_1</k><s>a</s><k>k_2</k><d><k>x</k><i>1</i></d></d>";
        let value = read(&node(xml)).unwrap();
        let mut inner = Map::new();
        inner.insert(Key::from("x"), Value::Int(1));
        assert_eq!(
            value,
            Value::List(vec![Value::Str("a".into()), Value::Dict(inner)])
        );
    }

    #[test]
    fn sentinel_must_come_first() {
        let xml = "<d><k>a</k><i>1</i><k>_isArr</k><t /></d>";
        assert!(matches!(read(&node(xml)).unwrap(), Value::Dict(_)));
    }

    #[test]
    fn false_and_none_are_not_written() {
        let options = CodecOptions::default();
        let mut map = Map::new();
        map.insert(Key::from("a"), Value::Bool(false));
        map.insert(Key::from("b"), Value::None);
        map.insert(Key::from("c"), Value::Bool(true));
        let element = to_element(&Value::Dict(map), &options, "d").unwrap().unwrap();
        let mut out = String::new();
        element.write_to(&mut out);
        assert_eq!(out, "<d><k>c</k><t /></d>");
    }

    #[test]
    fn integer_keys_are_written_as_text() {
        let options = CodecOptions::default();
        let mut map = Map::new();
        map.insert(Key::Int(4), Value::Float(2.0));
        let element = to_element(&Value::Dict(map), &options, "d").unwrap().unwrap();
        let mut out = String::new();
        element.write_to(&mut out);
        assert_eq!(out, "<d><k>4</k><r>2</r></d>");
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            read(&node("<d><k>a</k></d>")),
            Err(PlistError::UnbalancedDict)
        ));
        assert!(matches!(
            read(&node("<d><s>a</s><i>1</i></d>")),
            Err(PlistError::ExpectedKey(tag)) if tag == "s"
        ));
        assert!(matches!(
            read(&node("<f />")),
            Err(PlistError::UnexpectedTag(tag)) if tag == "f"
        ));
        assert!(matches!(
            read(&node("<i>x</i>")),
            Err(PlistError::InvalidNumber { kind: "integer", .. })
        ));
        assert!(matches!(from_str("<dict />"), Err(PlistError::UnexpectedRoot(_))));
        assert!(matches!(from_str("<plist />"), Err(PlistError::EmptyDocument)));
    }
}
