use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

lazy_static! {
    // rejects <, >, & and " anywhere in the value; empty input fails too
    static ref NAME_RE: Regex = Regex::new(r#"^[^<>&"]+$"#).unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn validate_name(field: &'static str, value: &str) -> Result<(), ApiError> {
    if NAME_RE.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::validation(field, "contains a forbidden character"))
    }
}

pub fn validate_mail(value: &str) -> Result<(), ApiError> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::validation(
            "mail",
            format!("{value} is not a valid email address"),
        ))
    }
}

pub fn validate_password(value: &str) -> Result<(), ApiError> {
    if value.len() >= 8 {
        Ok(())
    } else {
        Err(ApiError::validation("password", "password too short"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass() {
        for value in ["alice", "Jean-Pierre", "O'Brien", "user_42"] {
            assert!(validate_name("login", value).is_ok(), "{value} should pass");
        }
    }

    #[test]
    fn forbidden_characters_are_rejected() {
        for value in ["<script>", "a>b", "tom&jerry", "say \"hi\""] {
            let err = validate_name("firstname", value).unwrap_err();
            match err {
                ApiError::Validation { field, .. } => assert_eq!(field, "firstname"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(validate_name("login", "").is_err());
    }

    #[test]
    fn mail_syntax() {
        assert!(validate_mail("alice@example.com").is_ok());
        assert!(validate_mail("not-an-address").is_err());
        assert!(validate_mail("a@b").is_err());
        assert!(validate_mail("a b@example.com").is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
    }
}
