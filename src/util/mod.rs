//! Utility functions shared by the feed pipeline.
//!
//! - **URL validation**: scheme and host checks for feed URLs
//! - **Text cleanup**: whitespace/control-character normalization of feed fields

mod text;
mod url_validator;

pub use text::clean_text;
pub use url_validator::{validate_url, UrlValidationError};
