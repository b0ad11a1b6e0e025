//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Derives a participant display name from an account: explicit name when
/// set, otherwise the email local part with dots turned into spaces.
pub(crate) fn derive_name(email: &str, name: Option<&str>) -> String {
    if let Some(name) = name {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let local = email.split('@').next().unwrap_or_default();
    if local.is_empty() {
        "User".to_string()
    } else {
        local.replace('.', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_name_prefers_explicit_name() {
        assert_eq!(derive_name("a@b.c", Some("Alice")), "Alice");
        assert_eq!(derive_name("a@b.c", Some("  ")), "a");
    }

    #[test]
    fn derive_name_falls_back_to_email_local_part() {
        assert_eq!(derive_name("john.doe@test.com", None), "john doe");
        assert_eq!(derive_name("@test.com", None), "User");
    }
}
