//! Category color validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// `#RGB` or `#RRGGBB`, hex digits in either case.
pub const COLOR_PATTERN: &str = r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$";

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(COLOR_PATTERN).expect("valid regex"));

/// Validate that a category color is a `#RGB` or `#RRGGBB` hex code.
pub fn validate_color(color: &str) -> Result<(), CoreError> {
    if COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must be in #RGB or #RRGGBB hex format"
        )))
    }
}
