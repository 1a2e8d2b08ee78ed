//! Key material generation

/// Public/private key pair assigned to an account on write
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Strategy for deriving key material for a freshly written account
pub trait KeyGenerator: Send + Sync {
    fn generate(&self, account_id: &str) -> KeyPair;
}

/// Public key handed out by [`PlaceholderKeyGenerator`]
pub const PLACEHOLDER_PUBLIC_KEY: &str = "0x1234";
/// Private key handed out by [`PlaceholderKeyGenerator`]
pub const PLACEHOLDER_PRIVATE_KEY: &str = "0x9876";

/// Returns the same fixed key pair for every account.
///
/// Existing entries and callers depend on these exact values.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderKeyGenerator;

impl KeyGenerator for PlaceholderKeyGenerator {
    fn generate(&self, _account_id: &str) -> KeyPair {
        KeyPair {
            public_key: PLACEHOLDER_PUBLIC_KEY.to_string(),
            private_key: PLACEHOLDER_PRIVATE_KEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_constants_are_pinned() {
        let pair = PlaceholderKeyGenerator.generate("acct-1");
        assert_eq!(pair.public_key, "0x1234");
        assert_eq!(pair.private_key, "0x9876");
        assert_eq!(pair, PlaceholderKeyGenerator.generate("someone-else"));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let pair = PlaceholderKeyGenerator.generate("acct-1");
        assert!(!format!("{pair:?}").contains("0x9876"));
    }
}
