//! Pack code format validation.
//!
//! Pack codes identify sealed cartons and follow the format `PK-` plus
//! at least six uppercase alphanumerics, e.g. `PK-2024HSLC01`.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref PACK_CODE_RE: Regex = Regex::new(r"^PK-[A-Z0-9]{6,32}$").expect("valid regex");
}

/// Validates a pack code against the expected format.
pub fn validate_pack_code(code: &str) -> Result<(), ValidationError> {
    if PACK_CODE_RE.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("pack_code_format");
        err.message =
            Some("Pack code must match PK- followed by 6-32 uppercase alphanumerics".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_codes() {
        assert!(validate_pack_code("PK-2024HSLC01").is_ok());
        assert!(validate_pack_code("PK-ABC123").is_ok());
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        assert!(validate_pack_code("XK-2024HSLC01").is_err());
        assert!(validate_pack_code("2024HSLC01").is_err());
    }

    #[test]
    fn test_rejects_lowercase_and_short_codes() {
        assert!(validate_pack_code("PK-abc123").is_err());
        assert!(validate_pack_code("PK-A1").is_err());
    }

    #[test]
    fn test_rejects_overlong_codes() {
        let code = format!("PK-{}", "A".repeat(40));
        assert!(validate_pack_code(&code).is_err());
    }
}
