//! Outgoing CSRF token attachment.

use conduit_core::{ExtKey, Extension, Hooks, Message, Next, SessionToken};
use serde_json::Value;
use std::sync::Arc;

/// Supplies the token to attach to outgoing messages.
pub trait TokenSource: Send + Sync + 'static {
    /// The current token, `None` to send the message without one.
    fn token(&self) -> Option<String>;
}

impl TokenSource for SessionToken {
    fn token(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.as_str().to_owned())
    }
}

impl TokenSource for String {
    fn token(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.clone())
    }
}

impl<T: TokenSource> TokenSource for Arc<T> {
    fn token(&self) -> Option<String> {
        T::token(self)
    }
}

/// A [`TokenSource`] backed by a closure, for tokens that rotate.
pub struct TokenFn<F>(pub F);

impl<F> TokenSource for TokenFn<F>
where
    F: Fn() -> Option<String> + Send + Sync + 'static,
{
    fn token(&self) -> Option<String> {
        (self.0)()
    }
}

/// Writes the CSRF token into `ext` before a message leaves.
///
/// This is the client-side counterpart of
/// [`CsrfProtection`](super::CsrfProtection) and uses the same key.
pub struct CsrfTokenAttacher<S> {
    source: S,
    key: String,
}

impl<S: TokenSource> CsrfTokenAttacher<S> {
    /// Attach tokens from `source` under `ext.csrfToken`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            key: ExtKey::CsrfToken.as_str().to_owned(),
        }
    }

    /// Attach under a different ext key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl<S: TokenSource> Extension for CsrfTokenAttacher<S> {
    fn hooks(&self) -> Hooks {
        Hooks::OUTGOING
    }

    fn name(&self) -> &str {
        "csrf_token_attacher"
    }

    async fn outgoing(&self, mut message: Message, next: Next) {
        if let Some(token) = self.source.token() {
            message.ext_mut().insert(self.key.clone(), Value::String(token));
        }
        next.resume(message);
    }
}
