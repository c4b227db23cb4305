//! Input sanitizer run before any structured parsing.

use crate::error::SecurityError;
use crate::options::ParserOptions;

/// Returns true for C0 controls, DEL and C1 controls (U+0000–U+001F,
/// U+007F–U+009F).
#[must_use]
pub const fn is_control_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}

/// Returns true if the string contains a NUL character.
#[must_use]
pub fn has_null_bytes(input: &str) -> bool {
    input.contains('\0')
}

/// Returns true if the string contains any control character.
#[must_use]
pub fn has_control_chars(input: &str) -> bool {
    input.chars().any(is_control_char)
}

/// Checks raw input before it reaches a parser.
///
/// Checks run in a fixed order: NUL bytes (never bypassable), raw control
/// characters (unless `allow_control_chars`), then the length bound.
///
/// # Errors
///
/// Returns the first [`SecurityError`] encountered.
///
/// # Examples
///
/// ```
/// use urn_lib::{sanitize_input, ParserOptions, SecurityError};
///
/// let opts = ParserOptions::default();
/// assert_eq!(sanitize_input("isbn:0451450523", &opts), Ok("isbn:0451450523"));
/// assert_eq!(sanitize_input("a\0b", &opts), Err(SecurityError::NullByte));
/// ```
pub fn sanitize_input<'a>(
    input: &'a str,
    options: &ParserOptions,
) -> Result<&'a str, SecurityError> {
    if has_null_bytes(input) {
        return Err(SecurityError::NullByte);
    }

    let first_control = if options.allow_control_chars {
        None
    } else {
        input.chars().enumerate().find(|(_, c)| is_control_char(*c))
    };
    if let Some((position, c)) = first_control {
        return Err(SecurityError::ControlChar {
            code: u32::from(c),
            position,
        });
    }

    // Byte length is an upper bound on the character count.
    if input.len() > options.max_length {
        let actual = input.chars().count();
        if actual > options.max_length {
            return Err(SecurityError::MaxLengthExceeded {
                max: options.max_length,
                actual,
            });
        }
    }

    Ok(input)
}
