//! Minimal markup event model.
//!
//! - `token`: `Token`, `Attributes` and byte spans
//! - `tokenizer`: the lenient forward-only scanner
//! - `entities`: character reference decoding

pub mod entities;
pub mod token;
pub mod tokenizer;

pub use entities::decode_entities;
pub use token::{is_void_element, Attributes, Spanned, Token};
pub use tokenizer::{tokenize, Tokenizer};
