//! Session providers.

use conduit_core::{BoxError, RequestContext, SessionProvider, SessionToken};

/// Reads the [`SessionToken`] the transport stored in the request context.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextSession;

impl SessionProvider for ContextSession {
    async fn session_token(
        &self,
        context: &RequestContext,
    ) -> Result<Option<SessionToken>, BoxError> {
        Ok(context.get::<SessionToken>().cloned())
    }
}

/// A synchronous closure acting as a [`SessionProvider`].
pub struct SessionFn<F>(F);

/// Wrap `f` as a session provider.
///
/// ```rust
/// use conduit_core::SessionToken;
/// use conduit_std::session_fn;
///
/// #[derive(Clone)]
/// struct Cookies(Vec<(String, String)>);
///
/// let provider = session_fn(|context| {
///     let cookies = context.get::<Cookies>()?;
///     cookies
///         .0
///         .iter()
///         .find(|(name, _)| name == "_csrf_token")
///         .map(|(_, value)| SessionToken::new(value.clone()))
/// });
/// # let _ = provider;
/// ```
pub fn session_fn<F>(f: F) -> SessionFn<F>
where
    F: Fn(&RequestContext) -> Option<SessionToken> + Send + Sync + 'static,
{
    SessionFn(f)
}

impl<F> SessionProvider for SessionFn<F>
where
    F: Fn(&RequestContext) -> Option<SessionToken> + Send + Sync + 'static,
{
    async fn session_token(
        &self,
        context: &RequestContext,
    ) -> Result<Option<SessionToken>, BoxError> {
        Ok((self.0)(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_context_session() {
        let context = RequestContext::new().with(SessionToken::new("abc"));
        let token = ContextSession.session_token(&context).await.unwrap();
        assert_eq!(token, Some(SessionToken::new("abc")));

        let empty = ContextSession.session_token(&RequestContext::new()).await.unwrap();
        assert_eq!(empty, None);
    }

    #[tokio::test]
    async fn test_session_fn() {
        struct UserId(u32);

        let provider = Arc::new(session_fn(|context: &RequestContext| {
            context
                .get::<UserId>()
                .map(|user| SessionToken::new(format!("token-{}", user.0)))
        }));

        let context = RequestContext::new().with(UserId(7));
        let token = provider.session_token(&context).await.unwrap();
        assert_eq!(token, Some(SessionToken::new("token-7")));
    }
}
