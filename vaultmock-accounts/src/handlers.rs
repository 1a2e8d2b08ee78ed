//! Path handlers for the accounts backend

use serde_json::{Map, Value};
use tracing::{debug, info};

use vaultmock_core::{BackendError, CallerToken, StorageKey};

use crate::backend::{Backend, Request, Response};
use crate::record::{self, Account};
use crate::schema::{AccountRequest, ListRequest, PathRequest, PathWriteRequest, SignRequest};
use crate::storage::StorageEntry;

impl Backend {
    /// Whether an entry exists under `key`.
    ///
    /// A storage failure is an error, never "does not exist".
    pub(crate) async fn exists(&self, req: &Request, key: &StorageKey) -> Result<bool, BackendError> {
        let entry = req
            .storage
            .get(&key.render())
            .await
            .map_err(|e| BackendError::storage(format!("existence check failed: {e}")))?;
        Ok(entry.is_some())
    }

    pub(crate) async fn read_account(
        &self,
        req: &Request,
        token: &CallerToken,
        params: &AccountRequest,
    ) -> Result<Response, BackendError> {
        self.read_derived(req, token, &params.account_id, Account::derived_value)
            .await
    }

    pub(crate) async fn read_sign(
        &self,
        req: &Request,
        token: &CallerToken,
        params: &SignRequest,
    ) -> Result<Response, BackendError> {
        self.read_derived(req, token, &params.account_id, |account| {
            account.sign_message(&params.message)
        })
        .await
    }

    pub(crate) async fn read(
        &self,
        req: &Request,
        token: &CallerToken,
        params: &PathRequest,
    ) -> Result<Response, BackendError> {
        self.read_derived(req, token, &params.path, Account::derived_value)
            .await
    }

    pub(crate) async fn write_account(
        &self,
        req: &Request,
        token: &CallerToken,
        params: &AccountRequest,
    ) -> Result<Response, BackendError> {
        self.store(req, token, &params.account_id, &params.account_id)
            .await
    }

    pub(crate) async fn write(
        &self,
        req: &Request,
        token: &CallerToken,
        params: &PathWriteRequest,
    ) -> Result<Response, BackendError> {
        self.store(req, token, &params.path, &params.account_id).await
    }

    pub(crate) async fn delete(
        &self,
        req: &Request,
        token: &CallerToken,
        params: &PathRequest,
    ) -> Result<Response, BackendError> {
        let key = StorageKey::new(token, params.path.as_str())?;
        req.storage
            .delete(&key.render())
            .await
            .map_err(BackendError::storage)?;

        info!(path = %params.path, "Deleted entry");
        Ok(Response::empty())
    }

    pub(crate) async fn list_accounts(
        &self,
        req: &Request,
        token: &CallerToken,
        params: ListRequest,
    ) -> Result<Response, BackendError> {
        let mut keys = req
            .storage
            .list(&StorageKey::tenant_prefix(token))
            .await
            .map_err(BackendError::storage)?;
        if let Some(limit) = params.limit {
            keys.truncate(limit);
        }

        let mut data = Map::new();
        data.insert(
            "keys".to_string(),
            Value::Array(keys.into_iter().map(Value::String).collect()),
        );
        Ok(Response::with_data(data))
    }

    /// Fetch the account under `logical_id` and answer with a value derived from it
    async fn read_derived<F>(
        &self,
        req: &Request,
        token: &CallerToken,
        logical_id: &str,
        derive: F,
    ) -> Result<Response, BackendError>
    where
        F: FnOnce(&Account) -> String,
    {
        let key = StorageKey::new(token, logical_id)?;
        let entry = req
            .storage
            .get(&key.render())
            .await
            .map_err(BackendError::storage)?;

        let Some(entry) = entry else {
            debug!(logical_id = %logical_id, "No value stored");
            return Ok(Response::no_value(&req.mount_point, logical_id));
        };

        let account = record::decode(&entry.value)?;

        let mut data = Map::new();
        data.insert("signatureEncode64".to_string(), Value::String(derive(&account)));
        Ok(Response::with_data(data))
    }

    /// Write a freshly keyed account under `logical_id`, overwriting any prior entry.
    ///
    /// The router has already rejected writes without client data.
    async fn store(
        &self,
        req: &Request,
        token: &CallerToken,
        logical_id: &str,
        account_id: &str,
    ) -> Result<Response, BackendError> {
        let key = StorageKey::new(token, logical_id)?;
        let account = Account::new(account_id, self.keys.generate(account_id));
        let payload = record::encode(&account)?;

        req.storage
            .put(StorageEntry::new(key.render(), payload))
            .await
            .map_err(BackendError::storage)?;

        info!(account_id = %account.account_id, logical_id = %logical_id, "Stored account");

        let mut data = Map::new();
        data.insert("accountId".to_string(), Value::String(account.account_id));
        data.insert("status".to_string(), Value::Bool(true));
        data.insert("txHash".to_string(), Value::String(account.private_key));
        Ok(Response::with_data(data))
    }
}
