//! The evaluation client.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use compact_str::CompactString;
use reqwest::Client;
use tokio::task::JoinHandle;
use url::Url;

use super::cache::FlagCache;
use super::{ClientError, FetchError};
use crate::bucketing;
use crate::keys::ClientKey;
use crate::objects::flag::{FlagSnapshot, FlagType, InitResponse, Keyword};
use crate::objects::SDK_KEY_HEADER;

/// A typed flag value produced by evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    String(String),
    Int(i64),
    Json(serde_json::Value),
}

/// The subject of an evaluation: a stable identifier for bucketing plus
/// optional properties for keyword targeting.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    identifier: String,
    properties: HashMap<CompactString, String>,
}

impl UserContext {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            properties: HashMap::new(),
        }
    }

    /// Attach a targeting property (builder style).
    pub fn with_property(
        mut self,
        property: impl Into<CompactString>,
        data: impl Into<String>,
    ) -> Self {
        self.properties.insert(property.into(), data.into());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn property(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    /// Whether this user satisfies every property a keyword requires.
    /// A keyword with no properties targets nobody.
    fn satisfies(&self, keyword: &Keyword) -> bool {
        !keyword.properties.is_empty()
            && keyword
                .properties
                .iter()
                .all(|p| self.property(&p.property) == Some(p.data.as_str()))
    }
}

/// Errors surfaced by flag evaluation.
///
/// Evaluation never performs I/O, so every variant is a property of the
/// local cache and the caller's request.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    /// The flag key is not present in the local cache at all.
    #[error("unknown flag: {0}")]
    NotFound(CompactString),

    /// A typed accessor was called on a flag of a different declared type.
    #[error("flag `{title}` is declared {actual:?}, requested {requested:?}")]
    TypeMismatch {
        title: CompactString,
        actual: FlagType,
        requested: FlagType,
    },

    /// The cached value does not parse as the flag's declared type. The
    /// server rejects such values at write time, so this indicates a
    /// corrupted cache or a server-side bug.
    #[error("flag `{title}` value `{value}` does not parse as {flag_type:?}")]
    MalformedValue {
        title: CompactString,
        value: String,
        flag_type: FlagType,
    },
}

/// Feature-flag evaluation client.
///
/// Created with [`connect`](FlagClient::connect), which performs one full
/// fetch of the tenant's flag set and then keeps the local cache current
/// over a WebSocket subscription. Every evaluation call afterwards is a
/// local, synchronous cache read plus one bucketing computation.
#[derive(Debug)]
pub struct FlagClient {
    inner: Arc<ClientInner>,
    stream_task: JoinHandle<()>,
}

#[derive(Debug)]
pub(super) struct ClientInner {
    pub(super) http: Client,
    pub(super) base_url: Url,
    pub(super) sdk_key: String,
    pub(super) cache: FlagCache,
    pub(super) client_key: OnceLock<ClientKey>,
}

impl FlagClient {
    /// Connect to a Switchyard server.
    ///
    /// Fetches the full current flag set (a pull), then spawns the
    /// background subscription task (a push). If the initial fetch fails,
    /// no task is spawned and [`ClientError::Initialization`] is returned
    /// so the caller can retry or run with defaults.
    pub async fn connect(
        base_url: Url,
        sdk_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let inner = Arc::new(ClientInner {
            http: Client::new(),
            base_url,
            sdk_key: sdk_key.into(),
            cache: FlagCache::new(),
            client_key: OnceLock::new(),
        });

        let init = fetch_init(&inner).await?;
        inner.apply_init(init);

        let stream_task = tokio::spawn(super::stream::run(Arc::clone(&inner)));
        Ok(Self { inner, stream_task })
    }

    /// The derived client key the server routes this client's events by.
    pub fn client_key(&self) -> Option<&ClientKey> {
        self.inner.client_key.get()
    }

    /// Evaluate a flag for a bare identifier, returning the typed value.
    ///
    /// Never touches the network. An inactive flag resolves to its default
    /// value; an unknown flag key is a distinguishable
    /// [`EvaluateError::NotFound`].
    pub fn variation(
        &self,
        flag_key: &str,
        identifier: &str,
    ) -> Result<FlagValue, EvaluateError> {
        self.variation_for(flag_key, &UserContext::new(identifier))
    }

    /// Evaluate a flag for a full user context.
    ///
    /// Keyword targeting rules are checked against the user's properties
    /// before bucketing; a matching keyword's value wins.
    pub fn variation_for(
        &self,
        flag_key: &str,
        user: &UserContext,
    ) -> Result<FlagValue, EvaluateError> {
        let map = self.inner.cache.snapshot();
        let flag = map
            .get(flag_key)
            .ok_or_else(|| EvaluateError::NotFound(flag_key.into()))?;
        evaluate_for(flag, user)
    }

    /// Evaluate a BOOLEAN flag.
    pub fn bool_variation(
        &self,
        flag_key: &str,
        identifier: &str,
    ) -> Result<bool, EvaluateError> {
        self.typed_variation(
            flag_key,
            &UserContext::new(identifier),
            FlagType::Boolean,
            |value| match value {
                FlagValue::Bool(b) => Some(b),
                _ => None,
            },
        )
    }

    /// Evaluate a STRING flag.
    pub fn string_variation(
        &self,
        flag_key: &str,
        identifier: &str,
    ) -> Result<String, EvaluateError> {
        self.typed_variation(
            flag_key,
            &UserContext::new(identifier),
            FlagType::String,
            |value| match value {
                FlagValue::String(s) => Some(s),
                _ => None,
            },
        )
    }

    /// Evaluate an INTEGER flag.
    pub fn int_variation(
        &self,
        flag_key: &str,
        identifier: &str,
    ) -> Result<i64, EvaluateError> {
        self.typed_variation(
            flag_key,
            &UserContext::new(identifier),
            FlagType::Integer,
            |value| match value {
                FlagValue::Int(i) => Some(i),
                _ => None,
            },
        )
    }

    /// Evaluate a JSON flag.
    pub fn json_variation(
        &self,
        flag_key: &str,
        identifier: &str,
    ) -> Result<serde_json::Value, EvaluateError> {
        self.typed_variation(
            flag_key,
            &UserContext::new(identifier),
            FlagType::Json,
            |value| match value {
                FlagValue::Json(j) => Some(j),
                _ => None,
            },
        )
    }

    fn typed_variation<T>(
        &self,
        flag_key: &str,
        user: &UserContext,
        requested: FlagType,
        extract: impl FnOnce(FlagValue) -> Option<T>,
    ) -> Result<T, EvaluateError> {
        let map = self.inner.cache.snapshot();
        let flag = map
            .get(flag_key)
            .ok_or_else(|| EvaluateError::NotFound(flag_key.into()))?;
        if flag.flag_type != requested {
            return Err(EvaluateError::TypeMismatch {
                title: flag.title.clone(),
                actual: flag.flag_type,
                requested,
            });
        }
        let value = evaluate_for(flag, user)?;
        // The type check above pins the parsed variant, so this only
        // fires if parse_value and FlagType ever disagree.
        extract(value).ok_or_else(|| EvaluateError::TypeMismatch {
            title: flag.title.clone(),
            actual: flag.flag_type,
            requested,
        })
    }

    /// Shut down the background subscription task.
    pub fn close(self) {
        self.stream_task.abort();
    }
}

impl ClientInner {
    pub(super) fn apply_init(&self, init: InitResponse) {
        self.cache.replace_all(init.flags);
        let _ = self.client_key.set(init.user_key);
    }
}

/// `GET /api/v1/sdk/init` — full fetch of the tenant's flag set.
pub(super) async fn fetch_init(inner: &ClientInner) -> Result<InitResponse, FetchError> {
    let url = inner.base_url.join("/api/v1/sdk/init")?;
    let resp = inner
        .http
        .get(url)
        .header(SDK_KEY_HEADER, &inner.sdk_key)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(FetchError::Json)
}

/// Evaluate one flag definition for a bare identifier.
pub fn evaluate(flag: &FlagSnapshot, identifier: &str) -> Result<FlagValue, EvaluateError> {
    evaluate_for(flag, &UserContext::new(identifier))
}

/// Evaluate one flag definition for a user context.
///
/// This is the shared evaluation path: an inactive flag resolves to its
/// default value; otherwise the first keyword whose properties the user
/// satisfies short-circuits to that keyword's value; otherwise the user is
/// bucketed with the flag title as the salt. The raw value is parsed per
/// the flag's declared type. Exposed so server-side previews use the exact
/// same computation as SDK clients.
pub fn evaluate_for(
    flag: &FlagSnapshot,
    user: &UserContext,
) -> Result<FlagValue, EvaluateError> {
    let raw = if !flag.active {
        flag.default_value.clone()
    } else if let Some(keyword) = flag.keywords.iter().find(|k| user.satisfies(k)) {
        keyword.value.clone()
    } else {
        let default = flag.default_variation();
        bucketing::assign(&user.identifier, &flag.title, &default, &flag.variations)
            .to_owned()
    };
    parse_value(flag, raw)
}

fn parse_value(flag: &FlagSnapshot, raw: String) -> Result<FlagValue, EvaluateError> {
    let malformed = |value: String| EvaluateError::MalformedValue {
        title: flag.title.clone(),
        value,
        flag_type: flag.flag_type,
    };
    match flag.flag_type {
        FlagType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(FlagValue::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(FlagValue::Bool(false))
            } else {
                Err(malformed(raw))
            }
        }
        FlagType::Integer => match raw.parse::<i64>() {
            Ok(value) => Ok(FlagValue::Int(value)),
            Err(_) => Err(malformed(raw)),
        },
        FlagType::String => Ok(FlagValue::String(raw)),
        FlagType::Json => match serde_json::from_str(&raw) {
            Ok(value) => Ok(FlagValue::Json(value)),
            Err(_) => Err(malformed(raw)),
        },
    }
}
