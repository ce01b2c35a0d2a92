//! Session collaborator contract.

use crate::{context::RequestContext, error::BoxError};
use std::{fmt, future::Future, sync::Arc};

/// A session-scoped secret, stable for the lifetime of the session.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The raw token bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Whether the token is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for SessionToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Yields the session token for a request.
///
/// Implemented by the host on top of its session store. A lookup may be
/// asynchronous; errors are collaborator failures that policy extensions
/// turn into rejections.
pub trait SessionProvider: Send + Sync + 'static {
    /// The token of the session behind `context`, `None` if there is no session.
    fn session_token(
        &self,
        context: &RequestContext,
    ) -> impl Future<Output = Result<Option<SessionToken>, BoxError>> + Send;
}

impl<P: SessionProvider> SessionProvider for Arc<P> {
    async fn session_token(
        &self,
        context: &RequestContext,
    ) -> Result<Option<SessionToken>, BoxError> {
        P::session_token(self, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_token() {
        let token = SessionToken::new("hunter2");
        assert_eq!(format!("{token:?}"), "SessionToken(***)");
        assert_eq!(token.as_str(), "hunter2");
    }
}
