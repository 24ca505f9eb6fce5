//! Wire types built from the generic codecs.
//!
//! | type            | form                                     |
//! |-----------------|------------------------------------------|
//! | [`Hsv`]         | positional record, `a`-separated         |
//! | [`ColorChannel`]| keyed, `_`-separated, pipe-terminated   |
//! | [`GameObject`]  | keyed, `,`-separated, `;`-terminated     |
//! | [`LevelString`] | header + objects, gzip envelope          |
//! | [`GameSave`]    | plist file, gzip + XOR, lazy level data  |

pub mod color;
mod hsv;
pub mod level;
pub mod object;
pub mod save;

pub use color::{decode_colors, encode_colors, ColorChannel};
pub use hsv::Hsv;
pub use level::{LevelString, LevelStringCodec};
pub use object::{decode_objects, encode_objects, GameObject};
pub use save::{GameSave, LOAD_CONTENT};
