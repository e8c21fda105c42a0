//! Decoder configuration.

use crate::error::{LogError, Result};

/// The user id whose net balance is tracked unless configured otherwise.
pub const DEFAULT_TRACKED_USER: u64 = 1_111_111_111_111_111_111;

/// How the record decoder treats tag bytes outside `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagPolicy {
    /// Any tag other than 0, 1 or 2 decodes as `EndAutopay`.
    #[default]
    Lenient,

    /// Tags 4 and above are rejected with `UnknownTag`.
    Strict,
}

/// Settings for one decoding pass.
///
/// # Examples
///
/// ```
/// use txnlog::{DecoderConfig, TagPolicy};
///
/// let config = DecoderConfig::new()
///     .with_tag_policy(TagPolicy::Strict)
///     .with_tracked_user(42);
/// assert_eq!(config.tracked_user, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Handling of undefined tags.
    pub tag_policy: TagPolicy,

    /// Magic the header must carry; `None` accepts any magic.
    pub expected_magic: Option<[u8; 4]>,

    /// User id whose credits minus debits are accumulated separately.
    pub tracked_user: u64,
}

impl DecoderConfig {
    /// Creates the default configuration: lenient tags, any magic.
    pub fn new() -> Self {
        DecoderConfig {
            tag_policy: TagPolicy::Lenient,
            expected_magic: None,
            tracked_user: DEFAULT_TRACKED_USER,
        }
    }

    pub fn with_tag_policy(mut self, policy: TagPolicy) -> Self {
        self.tag_policy = policy;
        self
    }

    pub fn with_expected_magic(mut self, magic: [u8; 4]) -> Self {
        self.expected_magic = Some(magic);
        self
    }

    pub fn with_tracked_user(mut self, user_id: u64) -> Self {
        self.tracked_user = user_id;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a magic given as text; it must be exactly 4 bytes.
pub fn parse_magic(text: &str) -> Result<[u8; 4]> {
    text.as_bytes()
        .try_into()
        .map_err(|_| LogError::InvalidMagicArgument(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.tag_policy, TagPolicy::Lenient);
        assert_eq!(config.expected_magic, None);
        assert_eq!(config.tracked_user, DEFAULT_TRACKED_USER);
    }

    #[test]
    fn test_parse_magic() {
        assert_eq!(parse_magic("TXN1").unwrap(), *b"TXN1");
        assert!(matches!(
            parse_magic("TXN"),
            Err(LogError::InvalidMagicArgument(_))
        ));
        assert!(parse_magic("TXN10").is_err());
    }
}
