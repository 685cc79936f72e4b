//! Output formatting for CLI.

mod json;
mod text;

pub use json::{IdentityOutput, JsonFormatter};
pub use text::TextFormatter;
