//! Helpers for untrusted feed data.
//!
//! - **Text**: terminal-safe rendering of feed text (control sequence
//!   stripping, width-aware truncation)
//! - **URL validation**: refuses local and private feed locations from
//!   imported subscription lists

mod text;
mod url_validator;

pub use text::{strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url, UrlValidationError};
