#![allow(clippy::doc_overindented_list_items)]

mod error;
mod types;

pub mod utils;

pub use self::error::{ContentKeyError, ParseError};
pub use self::types::{CONTENT_KEY_LEN, ContentKey, KeyType};
pub use self::utils::{eq_ignore_ascii_case, normalize_kid};
