//! Bayeux-style channel globs.
//!
//! - `/chat/lobby` matches exactly that channel.
//! - `/chat/*` matches one trailing segment (`/chat/lobby`, not `/chat/a/b`).
//! - `/chat/**` matches one or more trailing segments.

use conduit_core::ChannelError;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wildcard {
    None,
    One,
    Many,
}

/// A parsed channel pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPattern {
    raw: String,
    segments: Vec<String>,
    wildcard: Wildcard,
}

impl ChannelPattern {
    /// Parse a pattern.
    ///
    /// # Errors
    ///
    /// [`ChannelError::InvalidPattern`] if the pattern does not start with
    /// `/`, has an empty segment, or uses a wildcard anywhere but as the
    /// whole final segment.
    pub fn parse(pattern: &str) -> Result<Self, ChannelError> {
        let invalid = |reason| ChannelError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason,
        };

        let rest = pattern.strip_prefix('/').ok_or_else(|| invalid("must start with `/`"))?;
        let parts: Vec<&str> = rest.split('/').collect();
        let last = parts.len() - 1;

        let mut segments = Vec::with_capacity(parts.len());
        let mut wildcard = Wildcard::None;
        for (index, part) in parts.into_iter().enumerate() {
            match part {
                "" => return Err(invalid("empty segment")),
                "*" | "**" if index != last => {
                    return Err(invalid("wildcard must be the final segment"));
                }
                "*" => wildcard = Wildcard::One,
                "**" => wildcard = Wildcard::Many,
                _ if part.contains('*') => {
                    return Err(invalid("wildcard must be a whole segment"));
                }
                _ => segments.push(part.to_owned()),
            }
        }

        Ok(Self {
            raw: pattern.to_owned(),
            segments,
            wildcard,
        })
    }

    /// Whether `channel` matches this pattern.
    pub fn matches(&self, channel: &str) -> bool {
        let Some(rest) = channel.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = rest.split('/').collect();
        let fixed = self.segments.len();

        let length_ok = match self.wildcard {
            Wildcard::None => parts.len() == fixed,
            Wildcard::One => parts.len() == fixed + 1,
            Wildcard::Many => parts.len() > fixed,
        };

        length_ok
            && parts.iter().all(|part| !part.is_empty())
            && self
                .segments
                .iter()
                .zip(&parts)
                .all(|(expected, actual)| expected == actual)
    }

    /// Whether the pattern contains a wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard != Wildcard::None
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for ChannelPattern {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ChannelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> ChannelPattern {
        ChannelPattern::parse(raw).unwrap()
    }

    #[test]
    fn test_exact() {
        let p = pattern("/chat/lobby");
        assert!(!p.is_wildcard());
        assert!(p.matches("/chat/lobby"));
        assert!(!p.matches("/chat/lobby/x"));
        assert!(!p.matches("/chat"));
    }

    #[test]
    fn test_single_segment_wildcard() {
        let p = pattern("/meta/*");
        assert!(p.matches("/meta/handshake"));
        assert!(!p.matches("/meta/a/b"));
        assert!(!p.matches("/meta"));
        assert!(!p.matches("/meta/"));
    }

    #[test]
    fn test_deep_wildcard() {
        let p = pattern("/service/**");
        assert!(p.matches("/service/echo"));
        assert!(p.matches("/service/a/b/c"));
        assert!(!p.matches("/service"));
        assert!(!p.matches("/services/echo"));

        assert!(pattern("/**").matches("/anything/at/all"));
    }

    #[test]
    fn test_invalid_patterns() {
        for raw in ["chat", "/chat//x", "/*/x", "/chat/lob*", "/"] {
            assert!(
                ChannelPattern::parse(raw).is_err(),
                "`{raw}` should be rejected"
            );
        }
    }
}
