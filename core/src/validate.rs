//! Input validation run before any request is built.
//!
//! Every function is pure: it returns the input unchanged or a
//! `ValidationError` naming the offending field. Nothing here knows about
//! HTTP.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::ValidationError;

pub const LEVEL_MIN: u32 = 1;
pub const LEVEL_MAX: u32 = 12;
pub const TECHNIQUE_MIN: u32 = 1;
pub const TECHNIQUE_MAX: u32 = 200;
pub const USER_ID_MAX_LEN: usize = 128;
pub const HISTORY_LIMIT_MAX: u32 = 100;
pub const PUZZLE_LEN: usize = 81;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern compiles")
});

/// Canonical 8-4-4-4-12 hyphenated UUID, any letter case. The caller's
/// spelling is what goes on the wire.
///
/// `Uuid::try_parse` also accepts the simple, braced and URN forms; the
/// length check restricts it to the hyphenated one.
pub fn uuid<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    let invalid = || ValidationError::InvalidFormat {
        field,
        value: value.to_string(),
        expected: "UUID (xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx)",
    };
    if value.len() != 36 {
        return Err(invalid());
    }
    Uuid::try_parse(value).map(|_| value).map_err(|_| invalid())
}

/// `YYYY-MM-DD` by shape only; calendar checks are left to the backend.
pub fn date<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    if !DATE_RE.is_match(value) {
        return Err(ValidationError::InvalidFormat {
            field,
            value: value.to_string(),
            expected: "YYYY-MM-DD",
        });
    }
    Ok(value)
}

pub fn in_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<u32, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value: i64::from(value),
            min: i64::from(min),
            max: i64::from(max),
        });
    }
    Ok(value)
}

pub fn level(value: u32) -> Result<u32, ValidationError> {
    in_range("level", value, LEVEL_MIN, LEVEL_MAX)
}

pub fn technique(value: u32) -> Result<u32, ValidationError> {
    in_range("technique", value, TECHNIQUE_MIN, TECHNIQUE_MAX)
}

/// Length check in characters, not bytes.
pub fn length<'a>(
    field: &'static str,
    value: &'a str,
    min: usize,
    max: usize,
) -> Result<&'a str, ValidationError> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(ValidationError::InvalidLength {
            field,
            length,
            min,
            max,
        });
    }
    Ok(value)
}

/// 1 to 128 characters. `.` and `..` are refused: as a path segment they
/// would be collapsed by URL normalization and change the route.
pub fn user_id(value: &str) -> Result<&str, ValidationError> {
    length("userId", value, 1, USER_ID_MAX_LEN)?;
    if value == "." || value == ".." {
        return Err(ValidationError::InvalidFormat {
            field: "userId",
            value: value.to_string(),
            expected: "an identifier other than '.' or '..'",
        });
    }
    Ok(value)
}

/// An 81-cell grid: digits with `0` or `.` for empty cells.
pub fn puzzle<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    length(field, value, PUZZLE_LEN, PUZZLE_LEN)?;
    if !value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(ValidationError::InvalidFormat {
            field,
            value: value.to_string(),
            expected: "81 characters of 0-9 or '.'",
        });
    }
    Ok(value)
}

/// A bearer token must be present and non-empty.
pub fn token<'a>(value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(ValidationError::Required { field: "token" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_accepts_canonical_form_any_case() {
        assert!(uuid("id", "123e4567-e89b-12d3-a456-426614174000").is_ok());
        assert!(uuid("id", "123E4567-E89B-12D3-A456-426614174000").is_ok());
    }

    #[test]
    fn uuid_is_returned_as_written() {
        let upper = "123E4567-E89B-12D3-A456-426614174000";
        assert_eq!(uuid("id", upper), Ok(upper));
    }

    #[test]
    fn dot_segments_are_not_user_ids() {
        for bad in [".", ".."] {
            assert!(matches!(
                user_id(bad),
                Err(ValidationError::InvalidFormat { field: "userId", .. })
            ));
        }
        assert_eq!(user_id("first.last"), Ok("first.last"));
        assert_eq!(user_id("..."), Ok("..."));
    }

    #[test]
    fn uuid_empty_is_required_not_malformed() {
        assert_eq!(uuid("id", ""), Err(ValidationError::Required { field: "id" }));
    }

    #[test]
    fn uuid_rejects_malformed() {
        for bad in [
            "123",
            "123e4567-e89b-12d3-a456-42661417400",
            "123e4567-e89b-12d3-a456-42661417400g",
            "123e4567e89b12d3a456426614174000",
            "{123e4567-e89b-12d3-a456-426614174000}",
            "urn:uuid:123e4567-e89b-12d3-a456-426614174000",
        ] {
            let err = uuid("boardId", bad).unwrap_err();
            match err {
                ValidationError::InvalidFormat { field, value, .. } => {
                    assert_eq!(field, "boardId");
                    assert_eq!(value, bad);
                }
                other => panic!("{bad}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn date_shape_only() {
        assert_eq!(date("date", "2025-01-15"), Ok("2025-01-15"));
        assert!(date("date", "2025-13-45").is_ok());
        for bad in ["01-15-2025", "2025/01/15", "2025-1-15", "2025-01-15T00:00", " 2025-01-15"] {
            assert!(
                matches!(date("date", bad), Err(ValidationError::InvalidFormat { .. })),
                "{bad} should be rejected"
            );
        }
        assert_eq!(date("date", ""), Err(ValidationError::Required { field: "date" }));
    }

    #[test]
    fn date_rejects_non_ascii_digits() {
        assert!(date("date", "２０２５-01-15").is_err());
    }

    #[test]
    fn level_bounds_are_inclusive() {
        assert_eq!(level(1), Ok(1));
        assert_eq!(level(12), Ok(12));
        assert_eq!(
            level(13),
            Err(ValidationError::OutOfRange {
                field: "level",
                value: 13,
                min: 1,
                max: 12
            })
        );
        assert!(level(0).is_err());
    }

    #[test]
    fn user_id_length() {
        assert!(user_id("u").is_ok());
        assert!(user_id(&"x".repeat(128)).is_ok());
        assert!(matches!(
            user_id(&"x".repeat(129)),
            Err(ValidationError::InvalidLength { length: 129, .. })
        ));
        assert!(matches!(user_id(""), Err(ValidationError::InvalidLength { length: 0, .. })));
        assert!(user_id(&"é".repeat(128)).is_ok());
    }

    #[test]
    fn puzzle_shape() {
        let ok = "0".repeat(81);
        assert!(puzzle("original", &ok).is_ok());
        assert!(puzzle("original", &".".repeat(81)).is_ok());
        assert!(matches!(
            puzzle("original", &"0".repeat(80)),
            Err(ValidationError::InvalidLength { .. })
        ));
        let mut bad = "0".repeat(80);
        bad.push('x');
        assert!(matches!(
            puzzle("original", &bad),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert_eq!(
            puzzle("user", ""),
            Err(ValidationError::Required { field: "user" })
        );
    }

    #[test]
    fn token_must_be_non_empty() {
        assert_eq!(token(Some("t")), Ok("t"));
        assert!(token(Some("")).is_err());
        assert!(token(None).is_err());
    }
}
