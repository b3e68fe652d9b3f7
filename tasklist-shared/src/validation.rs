/// Field validation helpers
///
/// Plain predicates (`is_blank`, `has_whitespace`, ...) used by the merge
/// logic, plus `validator` custom functions used by `#[derive(Validate)]`
/// on the creation and replacement inputs.
///
/// Each custom function reports only the first rule a value breaks, with a
/// message that can be returned to clients verbatim.
///
/// # Example
///
/// ```
/// use tasklist_shared::validation::{is_valid_email, password_length_ok};
///
/// assert!(is_valid_email("amelia@email.com"));
/// assert!(!is_valid_email("amelia@email"));
/// assert!(password_length_ok("password123"));
/// ```

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors};

/// Inclusive bounds for password length, in characters
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 40;

// Local part: letters, digits, `_`, `-`, `.`; domain ends in a 2-4 char label
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w\-.]+@([\w-]+\.)+[\w-]{2,4}$").expect("Invalid email regex pattern")
});

/// True for the empty string and strings made only of whitespace
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn has_whitespace(value: &str) -> bool {
    value.chars().any(char::is_whitespace)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

pub fn password_length_ok(value: &str) -> bool {
    (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&value.chars().count())
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Username: non-blank, no whitespace
pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(failure("not_blank", "username must not be empty"));
    }
    if has_whitespace(value) {
        return Err(failure("no_whitespace", "username can not contain whitespaces"));
    }
    Ok(())
}

/// Email: non-blank, no whitespace, well-formed
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(failure("not_blank", "email must not be empty"));
    }
    if has_whitespace(value) {
        return Err(failure("no_whitespace", "email can not contain whitespaces"));
    }
    if !is_valid_email(value) {
        return Err(failure("email_syntax", "invalid email"));
    }
    Ok(())
}

/// Password: non-blank, no whitespace, 6 to 40 characters
pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(failure("not_blank", "password must not be empty"));
    }
    if has_whitespace(value) {
        return Err(failure("no_whitespace", "password can not contain whitespaces"));
    }
    if !password_length_ok(value) {
        return Err(failure("length", "password must be between 6 and 40 characters"));
    }
    Ok(())
}

/// Email supplied for authentication
pub fn validate_login_email(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(failure(
            "not_blank",
            "email must be provided for authentication",
        ));
    }
    if !is_valid_email(value) {
        return Err(failure("email_syntax", "invalid email"));
    }
    Ok(())
}

/// Flattens validation failures into client-facing messages
///
/// Messages are ordered by field name so responses are deterministic.
/// Errors without a message fall back to their code.
pub fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| (field.to_string(), errors))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", error.code),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use validator::Validate;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\t\n"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn test_has_whitespace() {
        assert!(has_whitespace("jose capo"));
        assert!(has_whitespace("tab\there"));
        assert!(!has_whitespace("JoseCapo777"));
    }

    #[test]
    fn test_email_syntax() {
        let valid = [
            "armando@email.com",
            "valid-ex.amp_le@mail.co",
            "x@sub.domain.ar",
        ];
        for email in valid {
            assert!(is_valid_email(email), "{email} should be valid");
        }

        let invalid = [
            "",
            "no-at-sign.com",
            "user@nodot",
            "user@domain.toolong",
            "user name@email.com",
            "user@@email.com",
        ];
        for email in invalid {
            assert!(!is_valid_email(email), "{email} should be invalid");
        }
    }

    #[test]
    fn test_password_length_bounds() {
        assert!(!password_length_ok("12345"));
        assert!(password_length_ok("123456"));
        assert!(password_length_ok(&"a".repeat(40)));
        assert!(!password_length_ok(&"a".repeat(41)));
    }

    #[test]
    fn test_validate_username_messages() {
        let err = validate_username(" ").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("username must not be empty"));

        let err = validate_username("jose capo").unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("username can not contain whitespaces")
        );

        assert!(validate_username("JoseCapo777").is_ok());
    }

    #[test]
    fn test_validate_password_messages() {
        let err = validate_password("short").unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("password must be between 6 and 40 characters")
        );
        assert!(validate_password("password123").is_ok());
    }

    #[test]
    fn test_messages_are_sorted_by_field() {
        let input = NewUser {
            username: "has space".to_string(),
            email: "bad".to_string(),
            password: "".to_string(),
            authority: None,
        };

        let errors = input.validate().unwrap_err();
        assert_eq!(
            messages(&errors),
            vec![
                "invalid email".to_string(),
                "password must not be empty".to_string(),
                "username can not contain whitespaces".to_string(),
            ]
        );
    }

    #[test]
    fn test_valid_new_user_passes() {
        let input = NewUser {
            username: "amelia_1990".to_string(),
            email: "amelia@email.com".to_string(),
            password: "longerPassword544".to_string(),
            authority: None,
        };
        assert!(input.validate().is_ok());
    }
}
