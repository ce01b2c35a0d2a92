//! CSRF protection for incoming messages.
//!
//! The client attaches the session's CSRF token to every message under
//! `ext.csrfToken` (see [`CsrfTokenAttacher`](super::CsrfTokenAttacher)).
//! The server strips the token and compares it against the session token.
//! A missing or different token rejects the message with
//! `401::Access denied`.

use crate::channel::ChannelPattern;
use conduit_core::{
    ExtKey, Extension, Hooks, Message, MessageError, Next, RequestContext, SessionProvider,
    SessionToken,
};
use serde_json::Value;
use subtle::ConstantTimeEq;

/// Rejects incoming messages whose CSRF token does not match the session.
///
/// The token field is removed from `ext` on every message, accepted or not,
/// so it never reaches subscribers.
///
/// # Example
///
/// ```rust,ignore
/// let csrf = CsrfProtection::new(ContextSession)
///     .exempt("/meta/**".parse()?);
/// pipeline.add_extension(csrf);
/// ```
pub struct CsrfProtection<P> {
    provider: P,
    key: String,
    exempt: Vec<ChannelPattern>,
}

impl<P: SessionProvider> CsrfProtection<P> {
    /// Check tokens under `ext.csrfToken` against `provider`.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            key: ExtKey::CsrfToken.as_str().to_owned(),
            exempt: Vec::new(),
        }
    }

    /// Read the token from a different ext key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Skip the check on channels matching `pattern`. The token is still stripped.
    pub fn exempt(mut self, pattern: ChannelPattern) -> Self {
        self.exempt.push(pattern);
        self
    }

    /// The ext key holding the token.
    pub fn key(&self) -> &str {
        &self.key
    }

    fn is_exempt(&self, channel: &str) -> bool {
        self.exempt.iter().any(|pattern| pattern.matches(channel))
    }

    async fn expected_token(&self, context: &RequestContext) -> Option<SessionToken> {
        match self.provider.session_token(context).await {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(%error, "session lookup failed, treating token as missing");
                None
            }
        }
    }
}

/// Compare a presented token with the session token in constant time.
///
/// Missing or empty tokens on either side never match.
pub fn tokens_match(presented: Option<&str>, expected: Option<&SessionToken>) -> bool {
    match (presented, expected) {
        (Some(presented), Some(expected)) if !presented.is_empty() && !expected.is_empty() => {
            presented.as_bytes().ct_eq(expected.as_bytes()).into()
        }
        _ => false,
    }
}

impl<P: SessionProvider> Extension for CsrfProtection<P> {
    fn hooks(&self) -> Hooks {
        Hooks::INCOMING
    }

    fn name(&self) -> &str {
        "csrf_protection"
    }

    async fn incoming(&self, mut message: Message, context: &RequestContext, next: Next) {
        let presented = message.take_ext_value(&self.key);

        if !self.is_exempt(message.channel()) {
            let expected = self.expected_token(context).await;
            if !tokens_match(presented.as_ref().and_then(Value::as_str), expected.as_ref()) {
                tracing::debug!(
                    channel = %message.channel(),
                    token_present = presented.is_some(),
                    "CSRF token mismatch"
                );
                message.set_error(MessageError::access_denied());
            }
        }

        next.resume(message);
    }
}
