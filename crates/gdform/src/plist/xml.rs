//! Minimal XML element tree reader and writer.
//!
//! Supports exactly what plist documents need: elements, attributes, text,
//! the five predefined entities plus numeric character references, CDATA,
//! comments, processing instructions and a doctype, all of which but the
//! first four are skipped. Output is compact (no indentation) and
//! self-closes elements that have neither text nor children as `<tag />`.

use super::PlistError;

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>";

/// An XML element.
///
/// `text` is `None` for self-closed elements and `Some` (possibly empty) for
/// elements written with an explicit closing tag and no children, so that
/// `<s></s>` and `<s />` survive a read/write cycle unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Text content, empty when absent.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape(value, true, out);
            out.push('"');
        }
        if self.children.is_empty() && self.text.is_none() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            escape(text, false, out);
        }
        for child in &self.children {
            child.write_to(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// Writes the XML declaration followed by `root`.
pub fn write_document(root: &Element) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    root.write_to(&mut out);
    out
}

/// Parses a document and returns its root element.
pub fn parse_document(input: &str) -> Result<Element, PlistError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = XmlReader::new(input);
    reader.skip_misc()?;
    if reader.peek() != Some(b'<') {
        return Err(match reader.peek() {
            None => PlistError::UnexpectedEof,
            Some(_) => PlistError::Syntax(reader.x, "expected root element"),
        });
    }
    let root = reader.read_element()?;
    reader.skip_misc()?;
    // Game files are sometimes padded with NULs after the closing tag.
    let rest = input[reader.x..].trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if !rest.is_empty() {
        return Err(PlistError::Syntax(reader.x, "trailing content after root element"));
    }
    Ok(root)
}

fn escape(text: &str, attr: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn unescape(raw: &str, offset: usize, out: &mut String) -> Result<(), PlistError> {
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or(PlistError::Syntax(offset, "unterminated entity"))?;
        let entity = &after[..semi];
        let c = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| PlistError::InvalidEntity(entity.to_owned()))?
            }
        };
        out.push(c);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(())
}

struct XmlReader<'a> {
    data: &'a str,
    x: usize,
}

impl<'a> XmlReader<'a> {
    fn new(data: &'a str) -> Self {
        Self { data, x: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.data.as_bytes().get(self.x).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.data[self.x..].starts_with(s)
    }

    fn expect(&mut self, byte: u8, what: &'static str) -> Result<(), PlistError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.x += 1;
                Ok(())
            }
            Some(_) => Err(PlistError::Syntax(self.x, what)),
            None => Err(PlistError::UnexpectedEof),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.x += 1;
        }
    }

    /// Moves past the next occurrence of `end`.
    fn skip_past(&mut self, end: &str) -> Result<(), PlistError> {
        match self.data[self.x..].find(end) {
            Some(i) => {
                self.x += i + end.len();
                Ok(())
            }
            None => Err(PlistError::UnexpectedEof),
        }
    }

    /// Skips whitespace, comments, processing instructions and doctypes.
    fn skip_misc(&mut self) -> Result<(), PlistError> {
        loop {
            self.skip_ws();
            if self.starts_with("<?") {
                self.skip_past("?>")?;
            } else if self.starts_with("<!--") {
                self.skip_past("-->")?;
            } else if self.starts_with("<!DOCTYPE") {
                self.skip_past(">")?;
            } else {
                return Ok(());
            }
        }
    }

    fn read_name(&mut self) -> Result<String, PlistError> {
        let start = self.x;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'.') || b >= 0x80 {
                self.x += 1;
            } else {
                break;
            }
        }
        if self.x == start {
            return Err(match self.peek() {
                None => PlistError::UnexpectedEof,
                Some(_) => PlistError::Syntax(self.x, "expected a name"),
            });
        }
        Ok(self.data[start..self.x].to_owned())
    }

    fn read_attr_value(&mut self) -> Result<String, PlistError> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(PlistError::Syntax(self.x, "expected a quoted value")),
            None => return Err(PlistError::UnexpectedEof),
        };
        self.x += 1;
        let start = self.x;
        let len = self.data[start..]
            .find(quote as char)
            .ok_or(PlistError::UnexpectedEof)?;
        self.x += len + 1;
        let mut value = String::with_capacity(len);
        unescape(&self.data[start..start + len], start, &mut value)?;
        Ok(value)
    }

    fn read_element(&mut self) -> Result<Element, PlistError> {
        self.expect(b'<', "expected `<`")?;
        let mut element = Element::new(self.read_name()?);
        loop {
            self.skip_ws();
            if self.starts_with("/>") {
                self.x += 2;
                return Ok(element);
            }
            if self.peek() == Some(b'>') {
                self.x += 1;
                break;
            }
            let name = self.read_name()?;
            self.skip_ws();
            self.expect(b'=', "expected `=` after attribute name")?;
            self.skip_ws();
            let value = self.read_attr_value()?;
            element.attrs.push((name, value));
        }

        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(PlistError::UnexpectedEof),
                Some(b'<') => {
                    if self.starts_with("</") {
                        self.x += 2;
                        let name = self.read_name()?;
                        self.skip_ws();
                        self.expect(b'>', "expected `>` after closing tag")?;
                        if name != element.tag {
                            return Err(PlistError::MismatchedTag {
                                expected: element.tag,
                                found: name,
                            });
                        }
                        break;
                    } else if self.starts_with("<!--") {
                        self.skip_past("-->")?;
                    } else if self.starts_with("<![CDATA[") {
                        self.x += "<![CDATA[".len();
                        let len = self.data[self.x..]
                            .find("]]>")
                            .ok_or(PlistError::UnexpectedEof)?;
                        text.push_str(&self.data[self.x..self.x + len]);
                        self.x += len + 3;
                    } else if self.starts_with("<?") {
                        self.skip_past("?>")?;
                    } else {
                        let child = self.read_element()?;
                        element.children.push(child);
                    }
                }
                Some(_) => {
                    let start = self.x;
                    let len = self.data[start..].find('<').unwrap_or(self.data.len() - start);
                    self.x += len;
                    unescape(&self.data[start..start + len], start, &mut text)?;
                }
            }
        }
        if element.children.is_empty() || !text.trim().is_empty() {
            element.text = Some(text);
        }
        Ok(element)
    }
}
