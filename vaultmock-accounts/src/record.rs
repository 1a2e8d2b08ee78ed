//! Account record and its storage encoding

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use vaultmock_core::{BackendError, ErrorCode};

use crate::keygen::KeyPair;

/// The persisted account record.
///
/// Field names on the wire match entries written by earlier versions of the
/// engine, so they stay in PascalCase.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    pub account_id: String,
    pub public_key: String,
    pub private_key: String,
}

impl Account {
    pub fn new(account_id: impl Into<String>, keys: KeyPair) -> Self {
        Self {
            account_id: account_id.into(),
            public_key: keys.public_key,
            private_key: keys.private_key,
        }
    }

    /// `<private>-<public>`
    pub fn derived_value(&self) -> String {
        format!("{}-{}", self.private_key, self.public_key)
    }

    /// `<message>-<private>-<public>`.
    ///
    /// Plain string composition, not a cryptographic signature.
    pub fn sign_message(&self, message: &str) -> String {
        format!("{}-{}", message, self.derived_value())
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("account_id", &self.account_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Serialize an account as a storage payload
pub fn encode(account: &Account) -> Result<Bytes, BackendError> {
    serde_json::to_vec(account)
        .map(Bytes::from)
        .map_err(|e| BackendError::new(ErrorCode::CorruptRecord, format!("json encoding failed: {e}")))
}

/// Parse a storage payload back into an account
pub fn decode(payload: &[u8]) -> Result<Account, BackendError> {
    serde_json::from_slice(payload).map_err(BackendError::corrupt_record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::{KeyGenerator, PlaceholderKeyGenerator};

    fn account(id: &str) -> Account {
        Account::new(id, PlaceholderKeyGenerator.generate(id))
    }

    #[test]
    fn test_encode_is_field_complete() {
        let payload = encode(&account("acct-1")).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "AccountId": "acct-1",
                "PublicKey": "0x1234",
                "PrivateKey": "0x9876"
            })
        );
    }

    #[test]
    fn test_round_trip() {
        for a in [
            account("acct-1"),
            account(""),
            Account {
                account_id: "ünï/côdé \"quoted\"".to_string(),
                public_key: String::new(),
                private_key: "line\nbreak".to_string(),
            },
        ] {
            assert_eq!(decode(&encode(&a).unwrap()).unwrap(), a);
        }
    }

    #[test]
    fn test_decode_existing_entry() {
        let stored = br#"{"AccountId":"acct-1","PublicKey":"0x1234","PrivateKey":"0x9876"}"#;
        assert_eq!(decode(stored).unwrap(), account("acct-1"));
    }

    #[test]
    fn test_decode_malformed_payload() {
        let err = decode(b"{not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::CorruptRecord);

        let err = decode(br#"{"AccountId":"acct-1"}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::CorruptRecord);
    }

    #[test]
    fn test_derived_values() {
        let a = account("acct-1");
        assert_eq!(a.derived_value(), "0x9876-0x1234");
        assert_eq!(a.sign_message("hello"), "hello-0x9876-0x1234");
    }
}
