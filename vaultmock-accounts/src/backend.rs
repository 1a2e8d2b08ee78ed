//! Path registration and request dispatch

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

use vaultmock_core::{BackendError, CallerToken, ErrorCode, RequestId, StorageKey};

use crate::keygen::{KeyGenerator, PlaceholderKeyGenerator};
use crate::schema::{
    AccountRequest, FieldData, FieldSchema, FieldType, ListRequest, PathRequest, PathWriteRequest,
    RequestData, SignRequest,
};
use crate::storage::StorageGateway;

pub const BACKEND_HELP: &str = "The accounts backend is a mock secrets engine that stores \
placeholder key pairs per caller token and derives signature-like values from them.";

/// Logical operation requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
    List,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }

    fn is_write(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path handler a verb is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    ReadAccount,
    WriteAccount,
    ReadSign,
    ListAccounts,
    Read,
    Write,
    Delete,
}

/// Binding of one verb on a path to its handler
#[derive(Debug, Clone)]
pub struct OperationBinding {
    pub operation: Operation,
    pub handler: Handler,
    pub summary: &'static str,
}

impl OperationBinding {
    fn new(operation: Operation, handler: Handler, summary: &'static str) -> Self {
        Self {
            operation,
            handler,
            summary,
        }
    }
}

/// A registered path: pattern, field schema and operation bindings
#[derive(Debug, Clone)]
pub struct PathSpec {
    pub pattern: &'static str,
    regex: Regex,
    pub fields: Vec<FieldSchema>,
    pub operations: Vec<OperationBinding>,
    /// Field holding the logical id probed to pick create vs. update
    pub existence_field: Option<&'static str>,
}

impl PathSpec {
    fn new(
        pattern: &'static str,
        fields: Vec<FieldSchema>,
        operations: Vec<OperationBinding>,
        existence_field: Option<&'static str>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern,
            regex: Regex::new(&format!("^{pattern}$"))?,
            fields,
            operations,
            existence_field,
        })
    }

    /// Named captures when `path` matches this pattern
    fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    fn binding(&self, operation: Operation) -> Option<&OperationBinding> {
        self.operations.iter().find(|b| b.operation == operation)
    }

    /// Paths that only list are matched by `List` requests alone, so they
    /// never shadow a later pattern for the other verbs.
    fn serves(&self, operation: Operation) -> bool {
        operation == Operation::List
            || self
                .operations
                .iter()
                .any(|b| b.operation != Operation::List)
    }
}

fn account_paths() -> Result<Vec<PathSpec>, regex::Error> {
    Ok(vec![PathSpec::new(
        "account",
        vec![FieldSchema::string("accountId", "Specifies the accountId of the secret.").required()],
        vec![
            OperationBinding::new(
                Operation::Read,
                Handler::ReadAccount,
                "Retrieve the derived value for an account.",
            ),
            OperationBinding::new(
                Operation::Create,
                Handler::WriteAccount,
                "Create an account with fresh key material.",
            ),
            OperationBinding::new(
                Operation::Update,
                Handler::WriteAccount,
                "Overwrite an account with fresh key material.",
            ),
        ],
        Some("accountId"),
    )?])
}

fn sign_paths() -> Result<Vec<PathSpec>, regex::Error> {
    Ok(vec![PathSpec::new(
        "sign",
        vec![
            FieldSchema::string("message", "Specifies the message to sign.").required(),
            FieldSchema::string("accountId", "Specifies the accountId of the secret.").required(),
        ],
        vec![OperationBinding::new(
            Operation::Read,
            Handler::ReadSign,
            "Derive a signature-like value for a message.",
        )],
        None,
    )?])
}

fn list_paths() -> Result<Vec<PathSpec>, regex::Error> {
    Ok(vec![PathSpec::new(
        "accounts/?",
        vec![FieldSchema::new(
            "limit",
            FieldType::Int,
            "Maximum number of keys to return.",
        )],
        vec![OperationBinding::new(
            Operation::List,
            Handler::ListAccounts,
            "List the logical ids stored for the caller.",
        )],
        None,
    )?])
}

fn generic_paths() -> Result<Vec<PathSpec>, regex::Error> {
    Ok(vec![PathSpec::new(
        "(?P<path>.+)",
        vec![
            FieldSchema::string("path", "Specifies the path of the secret.").required(),
            FieldSchema::string("accountId", "Specifies the accountId of the secret."),
        ],
        vec![
            OperationBinding::new(
                Operation::Read,
                Handler::Read,
                "Retrieve the derived value at a path.",
            ),
            OperationBinding::new(Operation::Create, Handler::Write, "Store an account at a path."),
            OperationBinding::new(Operation::Update, Handler::Write, "Store an account at a path."),
            OperationBinding::new(
                Operation::Delete,
                Handler::Delete,
                "Delete the account at a path.",
            ),
        ],
        Some("path"),
    )?])
}

/// Request as handed over by the host
pub struct Request {
    pub operation: Operation,
    /// Path relative to the mount point
    pub path: String,
    pub client_token: String,
    /// Mount point including its trailing slash, e.g. `mock/`
    pub mount_point: String,
    pub data: RequestData,
    pub storage: Arc<dyn StorageGateway>,
    pub request_id: RequestId,
}

impl Request {
    pub fn new(
        operation: Operation,
        path: impl Into<String>,
        client_token: impl Into<String>,
        storage: Arc<dyn StorageGateway>,
    ) -> Self {
        Self {
            operation,
            path: path.into(),
            client_token: client_token.into(),
            mount_point: String::new(),
            data: RequestData::new(),
            storage,
            request_id: RequestId::new(),
        }
    }

    pub fn with_mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = mount_point.into();
        self
    }

    pub fn with_data(mut self, data: RequestData) -> Self {
        self.data = data;
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }
}

/// Handler result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub data: Option<Map<String, Value>>,
    no_value: bool,
}

impl Response {
    /// Success without a body
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            data: Some(data),
            no_value: false,
        }
    }

    /// Nothing stored for the requested id. Not an error.
    pub fn no_value(mount_point: &str, logical_id: &str) -> Self {
        let mut data = Map::new();
        data.insert(
            "error".to_string(),
            Value::String(format!("No value at {mount_point}{logical_id}")),
        );
        Self {
            data: Some(data),
            no_value: true,
        }
    }

    pub fn is_no_value(&self) -> bool {
        self.no_value
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

/// The accounts secrets engine.
///
/// Holds no per-request state; the storage gateway arrives with each
/// request, so one `Backend` can serve concurrent requests.
pub struct Backend {
    paths: Vec<PathSpec>,
    pub(crate) keys: Box<dyn KeyGenerator>,
}

impl Backend {
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_key_generator(PlaceholderKeyGenerator)
    }

    pub fn with_key_generator(keys: impl KeyGenerator + 'static) -> Result<Self, regex::Error> {
        let mut paths = account_paths()?;
        paths.extend(sign_paths()?);
        paths.extend(list_paths()?);
        paths.extend(generic_paths()?);
        Ok(Self {
            paths,
            keys: Box::new(keys),
        })
    }

    /// Backend help followed by every registered path, its verbs and fields
    pub fn help(&self) -> String {
        let mut help = String::from(BACKEND_HELP);
        for spec in &self.paths {
            let _ = write!(help, "\n\n{}", spec.pattern);
            for binding in &spec.operations {
                let _ = write!(help, "\n  {}: {}", binding.operation, binding.summary);
            }
            for field in &spec.fields {
                let required = if field.required { ", required" } else { "" };
                let _ = write!(
                    help,
                    "\n  {} ({}{required}): {}",
                    field.name,
                    field.field_type.name(),
                    field.description
                );
            }
        }
        help
    }

    pub fn paths(&self) -> &[PathSpec] {
        &self.paths
    }

    /// Route a request to its handler.
    ///
    /// Errors carry the operation, path and request id of the request.
    pub async fn handle_request(&self, req: Request) -> Result<Response, BackendError> {
        let span = info_span!(
            "accounts_request",
            request_id = %req.request_id,
            operation = %req.operation,
            path = %req.path,
        );

        async {
            info!("Accounts request");
            self.route(&req).await
        }
        .instrument(span)
        .await
        .map_err(|e| {
            e.with_context(req.operation, req.path.as_str())
                .with_request_id(req.request_id.as_str())
        })
    }

    async fn route(&self, req: &Request) -> Result<Response, BackendError> {
        let (spec, captures) = self.match_path(&req.path, req.operation).ok_or_else(|| {
            BackendError::new(
                ErrorCode::UnsupportedPath,
                format!("unsupported path '{}'", req.path),
            )
        })?;

        let token = CallerToken::new(req.client_token.as_str())?;
        if req.operation.is_write() && req.data.is_empty() {
            return Err(BackendError::invalid_argument(
                "data must be provided to store in secret",
            ));
        }
        let data = FieldData::validate(&spec.fields, &req.data, &captures)?;

        let mut operation = req.operation;
        if operation.is_write() {
            if let Some(field) = spec.existence_field {
                let key = StorageKey::new(&token, data.get_str(field).unwrap_or_default())?;
                operation = if self.exists(req, &key).await? {
                    Operation::Update
                } else {
                    Operation::Create
                };
                debug!(pattern = spec.pattern, resolved = %operation, "Existence check");
            }
        }

        let binding = spec.binding(operation).ok_or_else(|| {
            BackendError::new(
                ErrorCode::UnsupportedOperation,
                format!("unsupported operation '{operation}' on '{}'", spec.pattern),
            )
        })?;

        self.invoke(binding.handler, req, &token, &data).await
    }

    fn match_path(
        &self,
        path: &str,
        operation: Operation,
    ) -> Option<(&PathSpec, HashMap<String, String>)> {
        self.paths
            .iter()
            .filter(|spec| spec.serves(operation))
            .find_map(|spec| spec.captures(path).map(|caps| (spec, caps)))
    }

    async fn invoke(
        &self,
        handler: Handler,
        req: &Request,
        token: &CallerToken,
        data: &FieldData,
    ) -> Result<Response, BackendError> {
        match handler {
            Handler::ReadAccount => {
                self.read_account(req, token, &AccountRequest::try_from(data)?)
                    .await
            }
            Handler::WriteAccount => {
                self.write_account(req, token, &AccountRequest::try_from(data)?)
                    .await
            }
            Handler::ReadSign => {
                self.read_sign(req, token, &SignRequest::try_from(data)?)
                    .await
            }
            Handler::ListAccounts => {
                self.list_accounts(req, token, ListRequest::try_from(data)?)
                    .await
            }
            Handler::Read => self.read(req, token, &PathRequest::try_from(data)?).await,
            Handler::Write => {
                self.write(req, token, &PathWriteRequest::try_from(data)?)
                    .await
            }
            Handler::Delete => self.delete(req, token, &PathRequest::try_from(data)?).await,
        }
    }
}
