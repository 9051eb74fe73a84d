//! Payload validation for comment submissions.
//!
//! Pure functions, no side effects.  Validation is fail-fast: the first
//! offending field is reported.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::identity::Caller;

/// Maximum comment length in characters.
pub const MAX_CONTENT_LENGTH: usize = 1000;

/// A comment submission as received from the client.  The anonymous
/// identity fields are only meaningful for unauthenticated callers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPayload {
    pub content: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// A field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending payload field.
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a comment payload for the given caller.
///
/// Content must be 1-1000 characters for everyone.  Anonymous callers
/// must additionally supply a name and a well-formed email, and any
/// website they give must be an absolute URL.  For identified callers
/// the anonymous identity fields are ignored even if present.
pub fn validate(payload: &CommentPayload, caller: &Caller) -> Result<(), ValidationError> {
    validate_content(&payload.content)?;

    if caller.user_id().is_some() {
        return Ok(());
    }

    match payload.name.as_deref() {
        Some(name) if !name.trim().is_empty() => {}
        _ => {
            return Err(ValidationError::new(
                "name",
                "name is required for anonymous comments",
            ))
        }
    }

    match payload.email.as_deref() {
        Some(email) if !email.is_empty() => {
            if !is_valid_email(email) {
                return Err(ValidationError::new("email", "invalid email address"));
            }
        }
        _ => {
            return Err(ValidationError::new(
                "email",
                "email is required for anonymous comments",
            ))
        }
    }

    if let Some(website) = payload.website.as_deref() {
        if !is_absolute_url(website) {
            return Err(ValidationError::new(
                "website",
                "website must be an absolute URL",
            ));
        }
    }

    Ok(())
}

/// Validate comment content on its own (used by the edit path, where the
/// identity fields are not in play).
pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::new("content", "content must not be empty"));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(ValidationError::new(
            "content",
            format!("content exceeds {} characters", MAX_CONTENT_LENGTH),
        ));
    }
    Ok(())
}

/// Minimal address check: a non-empty local part, a single `@`, a domain
/// containing a dot, and no whitespace anywhere.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// An absolute URL with a scheme and a host.
fn is_absolute_url(website: &str) -> bool {
    match Url::parse(website) {
        Ok(url) => url.has_host(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use uuid::Uuid;

    fn identified() -> Caller {
        Caller::Identified {
            id: Uuid::new_v4(),
            role: Role::Other,
        }
    }

    fn anonymous_payload() -> CommentPayload {
        CommentPayload {
            content: "A perfectly fine comment.".into(),
            name: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            website: None,
        }
    }

    #[test]
    fn identified_needs_only_content() {
        let payload = CommentPayload {
            content: "hi".into(),
            ..Default::default()
        };
        assert!(validate(&payload, &identified()).is_ok());
    }

    #[test]
    fn empty_content_rejected() {
        let payload = CommentPayload::default();
        let err = validate(&payload, &identified()).unwrap_err();
        assert_eq!(err.field, "content");
    }

    #[test]
    fn content_length_boundaries() {
        let mut payload = anonymous_payload();

        payload.content = "x".repeat(MAX_CONTENT_LENGTH);
        assert!(validate(&payload, &Caller::Anonymous).is_ok());

        payload.content = "x".repeat(MAX_CONTENT_LENGTH + 1);
        let err = validate(&payload, &Caller::Anonymous).unwrap_err();
        assert_eq!(err.field, "content");
    }

    #[test]
    fn content_limit_counts_characters_not_bytes() {
        let mut payload = anonymous_payload();
        // 1000 three-byte characters is still 1000 characters.
        payload.content = "\u{20AC}".repeat(MAX_CONTENT_LENGTH);
        assert!(validate(&payload, &Caller::Anonymous).is_ok());
    }

    #[test]
    fn anonymous_requires_name() {
        let mut payload = anonymous_payload();
        payload.name = None;
        assert_eq!(
            validate(&payload, &Caller::Anonymous).unwrap_err().field,
            "name"
        );

        payload.name = Some("   ".into());
        assert_eq!(
            validate(&payload, &Caller::Anonymous).unwrap_err().field,
            "name"
        );
    }

    #[test]
    fn anonymous_requires_email() {
        let mut payload = anonymous_payload();
        payload.email = None;
        assert_eq!(
            validate(&payload, &Caller::Anonymous).unwrap_err().field,
            "email"
        );
    }

    #[test]
    fn bad_emails_rejected() {
        for bad in [
            "plainaddress",
            "no domain@example.com",
            "@example.com",
            "alice@example",
            "alice@exam ple.com",
            "alice@@example.com",
        ] {
            let mut payload = anonymous_payload();
            payload.email = Some(bad.into());
            assert_eq!(
                validate(&payload, &Caller::Anonymous).unwrap_err().field,
                "email",
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn good_emails_accepted() {
        for good in ["alice@example.com", "a.b+c@sub.example.org"] {
            let mut payload = anonymous_payload();
            payload.email = Some(good.into());
            assert!(
                validate(&payload, &Caller::Anonymous).is_ok(),
                "expected {good:?} to be accepted"
            );
        }
    }

    #[test]
    fn website_must_be_absolute_url() {
        let mut payload = anonymous_payload();

        payload.website = Some("https://alice.example/blog".into());
        assert!(validate(&payload, &Caller::Anonymous).is_ok());

        payload.website = Some("not a url".into());
        assert_eq!(
            validate(&payload, &Caller::Anonymous).unwrap_err().field,
            "website"
        );

        // Relative references have no host.
        payload.website = Some("/just/a/path".into());
        assert_eq!(
            validate(&payload, &Caller::Anonymous).unwrap_err().field,
            "website"
        );
    }

    #[test]
    fn missing_website_is_fine() {
        let payload = anonymous_payload();
        assert!(payload.website.is_none());
        assert!(validate(&payload, &Caller::Anonymous).is_ok());
    }

    #[test]
    fn identified_ignores_garbage_identity_fields() {
        let payload = CommentPayload {
            content: "hi".into(),
            name: None,
            email: Some("not-an-email".into()),
            website: Some("not a url".into()),
        };
        assert!(validate(&payload, &identified()).is_ok());
    }
}
