//! Content Security Policy with a per-request nonce.
//!
//! The nonce lets a template emit a small inline `<style>` block (the home
//! page intro timings) while every other inline style or script stays
//! blocked.

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::{Engine, engine::general_purpose::STANDARD};

/// A CSP nonce value (128-bit, base64-encoded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        Self(STANDARD.encode(bytes))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Build the policy for one response.
///
/// ```text
/// default-src 'none'; script-src 'self'; style-src 'self' 'nonce-…';
/// img-src 'self' data:; font-src 'self'; connect-src 'self';
/// object-src 'none'; base-uri 'self'; form-action 'self';
/// frame-ancestors 'none'
/// ```
#[must_use]
pub fn content_security_policy(nonce: &CspNonce) -> String {
    format!(
        "default-src 'none'; \
         script-src 'self'; \
         style-src 'self' 'nonce-{}'; \
         img-src 'self' data:; \
         font-src 'self'; \
         connect-src 'self'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'",
        nonce.value()
    )
}

/// Extract the nonce placed in request extensions by
/// [`security_headers_middleware`](super::security_headers_middleware).
impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!("CSP nonce not found in request extensions; inline styles will be blocked");
            Self(String::new())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonces_are_unique_and_base64() {
        let a = CspNonce::generate();
        let b = CspNonce::generate();
        assert_ne!(a, b);
        assert_eq!(a.value().len(), 24);
    }

    #[test]
    fn test_policy_embeds_nonce_for_styles_only() {
        let nonce = CspNonce("abc123==".to_string());
        let policy = content_security_policy(&nonce);
        assert!(policy.contains("style-src 'self' 'nonce-abc123=='"));
        assert!(policy.contains("script-src 'self';"));
        assert!(policy.contains("frame-ancestors 'none'"));
    }
}
