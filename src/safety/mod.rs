//! Pattern-based safety classification of AI-generated replies.
//!
//! Runs before a reply is stored or shown. Stateless: every call sees only
//! the text it is given.

pub mod patterns;
pub mod scanner;
pub mod types;

pub use patterns::*;
pub use scanner::*;
pub use types::*;
