/// First two bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Single-byte XOR key applied to game save files.
pub const SAVE_XOR_KEY: &[u8] = b"\x0b";

/// Container used for the compressed payload inside the base64 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// No compression; the base64 text carries the UTF-8 bytes directly.
    None,
    /// zlib header and adler32 trailer (RFC 1950).
    Zlib,
    /// gzip container (RFC 1952). Written with a zero modification time.
    #[default]
    Gzip,
    /// Raw deflate stream with no header (RFC 1951).
    Deflate,
    /// Accepts either a zlib or a gzip wrapped stream on decode. Encodes as zlib.
    Auto,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Zlib => "zlib",
            Compression::Gzip => "gzip",
            Compression::Deflate => "deflate",
            Compression::Auto => "auto",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Compression::None),
            "zlib" => Some(Compression::Zlib),
            "gzip" => Some(Compression::Gzip),
            "deflate" => Some(Compression::Deflate),
            "auto" => Some(Compression::Auto),
            _ => None,
        }
    }
}
