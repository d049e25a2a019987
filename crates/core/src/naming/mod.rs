//! Naming module - derives short session titles from free text.

mod session_namer;

pub use session_namer::{title_case, truncate_title, SessionNamer, MAX_TITLE_CHARS};
