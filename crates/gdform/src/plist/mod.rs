//! Plist documents with the compact `d`/`k`/`i`/`r`/`s`/`t` tag vocabulary.
//!
//! Save files and level exports are XML property lists whose root `<plist>`
//! element wraps a single `<dict>`. Nested containers use short tags:
//!
//! | tag  | meaning                   |
//! |------|---------------------------|
//! | `d`  | nested mapping or sequence |
//! | `k`  | key                       |
//! | `i`  | integer                   |
//! | `r`  | real (float)              |
//! | `s`  | string                    |
//! | `t`  | boolean `true`            |
//!
//! Sequences are mappings whose first pair is `_isArr` -> `<t />`, followed by
//! `k_1`, `k_2`, ... entries. There is no tag for `false`: false booleans are
//! not written at all.

mod error;
mod tree;
mod xml;

pub use error::PlistError;
pub use tree::{
    from_str, read, to_element, to_string, write, write_entry, ARRAY_SENTINEL, PLIST_GJVER,
    PLIST_VERSION,
};
pub use xml::{parse_document, write_document, Element, XML_DECLARATION};
