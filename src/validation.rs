//! Checks for free-text form fields.

use crate::Error;

/// Trim `value` and check that it is neither blank nor longer than `max_length` characters.
///
/// `field` names the field in the error message, e.g. "description".
pub fn required_text(field: &'static str, value: &str, max_length: usize) -> Result<String, Error> {
    let value = value.trim();

    if value.is_empty() {
        return Err(Error::EmptyField(field));
    }

    if value.chars().count() > max_length {
        return Err(Error::FieldTooLong(field, max_length));
    }

    Ok(value.to_owned())
}

/// Like [required_text] but blank text is allowed and comes back empty.
pub fn optional_text(field: &'static str, value: &str, max_length: usize) -> Result<String, Error> {
    let value = value.trim();

    if value.chars().count() > max_length {
        return Err(Error::FieldTooLong(field, max_length));
    }

    Ok(value.to_owned())
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        validation::{optional_text, required_text},
    };

    #[test]
    fn trims_whitespace() {
        assert_eq!(
            required_text("description", "  lunch ", 200),
            Ok("lunch".to_owned())
        );
    }

    #[test]
    fn rejects_blank_text() {
        assert_eq!(
            required_text("description", "   ", 200),
            Err(Error::EmptyField("description"))
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(required_text("icon", "🎯🎯", 2), Ok("🎯🎯".to_owned()));
        assert_eq!(
            required_text("icon", "🎯🎯🎯", 2),
            Err(Error::FieldTooLong("icon", 2))
        );
    }

    #[test]
    fn optional_text_allows_blank() {
        assert_eq!(optional_text("bio", "   ", 10), Ok(String::new()));
        assert_eq!(
            optional_text("bio", "x".repeat(11).as_str(), 10),
            Err(Error::FieldTooLong("bio", 10))
        );
    }
}
