//! Caller-scoped storage keys
//!
//! Every entry the backend writes lives under the caller token that wrote it.
//! The token is the tenancy boundary: two callers using the same logical id
//! never see each other's entries.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::borrow::Cow;
use std::fmt;

use crate::error::BackendError;

/// Characters escaped in the tenant component of a rendered key.
///
/// Escaping `/` keeps the first separator unambiguous; escaping `%` keeps
/// distinct tokens distinct after encoding.
const TENANT_ESCAPE: &AsciiSet = &CONTROLS.add(b'/').add(b'%');

/// Opaque caller token supplied by the host's authentication layer
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CallerToken(String);

impl CallerToken {
    /// Reject empty tokens before anything touches storage
    pub fn new(token: impl Into<String>) -> Result<Self, BackendError> {
        let token = token.into();
        if token.is_empty() {
            return Err(BackendError::unauthenticated());
        }
        Ok(Self(token))
    }

    fn encoded(&self) -> Cow<'_, str> {
        utf8_percent_encode(&self.0, TENANT_ESCAPE).into()
    }
}

impl fmt::Debug for CallerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallerToken(<redacted>)")
    }
}

/// Composite key: tenant plus the caller-chosen logical id
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    tenant: CallerToken,
    logical_id: String,
}

impl StorageKey {
    pub fn new(tenant: &CallerToken, logical_id: impl Into<String>) -> Result<Self, BackendError> {
        let logical_id = logical_id.into();
        if logical_id.is_empty() {
            return Err(BackendError::invalid_argument("logical id must not be empty"));
        }
        Ok(Self {
            tenant: tenant.clone(),
            logical_id,
        })
    }

    /// Render as `{tenant}/{logicalId}`
    pub fn render(&self) -> String {
        format!("{}/{}", self.tenant.encoded(), self.logical_id)
    }

    /// Prefix shared by every key belonging to `tenant`
    pub fn tenant_prefix(tenant: &CallerToken) -> String {
        format!("{}/", tenant.encoded())
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageKey")
            .field("tenant", &self.tenant)
            .field("logical_id", &self.logical_id)
            .finish()
    }
}
