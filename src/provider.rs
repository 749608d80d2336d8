//! OpenFeature provider that enriches evaluation contexts with identity facts.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use open_feature::provider::{
    FeatureProvider, ProviderMetadata, ProviderStatus, ResolutionDetails,
};
use open_feature::{
    EvaluationContext, EvaluationContextFieldValue, EvaluationError, EvaluationErrorCode,
    EvaluationResult, StructValue,
};

use crate::error::{Error, Result};
use crate::resolution::Resolution;
use crate::store::{HttpIdentityStore, IdentityStore, DEFAULT_REQUEST_TIMEOUT_MS};

/// Name reported in the provider metadata.
pub const PROVIDER_NAME: &str = "flagops-data-store";

/// Message of the resolution error returned when identity facts cannot be fetched.
pub const IDENTITY_FETCH_ERROR: &str = "could not fetch identity context from data store";

/// Configuration options for the data store provider.
pub struct ProviderOptions {
    /// Base URL of the FlagOps data store.
    pub base_url: String,
    /// Timeout for a single data store request in milliseconds.
    pub request_timeout_ms: Option<u64>,
    /// HTTP client to reuse. A default client is built if not set.
    pub http_client: Option<reqwest::Client>,
}

impl ProviderOptions {
    /// Create new options with the required data store base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_ms: None,
            http_client: None,
        }
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }

    /// Use an existing HTTP client instead of building one.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

/// OpenFeature provider that looks up facts about the targeting key in the
/// FlagOps data store, merges them into the evaluation context and delegates
/// resolution to a wrapped provider.
///
/// The caller's context is never mutated: facts are merged into a clone.
/// Hooks are not registered.
pub struct DataStoreProvider<P> {
    metadata: ProviderMetadata,
    store: Arc<dyn IdentityStore>,
    inner: P,
}

impl<P: FeatureProvider> DataStoreProvider<P> {
    /// Create a provider for the data store at `base_url`, wrapping `inner`.
    ///
    /// Fails with [`Error::Configuration`] if `base_url` is not a valid
    /// http(s) URL.
    pub fn new(base_url: &str, inner: P) -> Result<Self> {
        Self::with_options(ProviderOptions::new(base_url), inner)
    }

    /// Create a provider from explicit options.
    pub fn with_options(options: ProviderOptions, inner: P) -> Result<Self> {
        let client = match options.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| Error::Configuration(e.to_string()))?,
        };
        let timeout = Duration::from_millis(
            options
                .request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        );
        let store = HttpIdentityStore::with_client(&options.base_url, client, timeout)?;

        Ok(Self::with_store(Arc::new(store), inner))
    }

    /// Create a provider backed by a custom identity store.
    pub fn with_store(store: Arc<dyn IdentityStore>, inner: P) -> Self {
        Self {
            metadata: ProviderMetadata::new(PROVIDER_NAME),
            store,
            inner,
        }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Fetch the facts stored for `identity`.
    pub async fn get_identity_facts(&self, identity: &str) -> Result<HashMap<String, String>> {
        self.store.get_facts(identity).await
    }

    /// Store a fact for `identity`. Succeeds only if the data store answers 200.
    pub async fn set_identity_fact(&self, identity: &str, key: &str, value: &str) -> Result<()> {
        self.store.set_fact(identity, key, value).await
    }

    /// Fetch the secrets stored for `identity`.
    pub async fn get_identity_secrets(&self, identity: &str) -> Result<HashMap<String, String>> {
        self.store.get_secrets(identity).await
    }

    /// Store a secret for `identity`. Succeeds only if the data store answers 200.
    pub async fn set_identity_secret(&self, identity: &str, key: &str, value: &str) -> Result<()> {
        self.store.set_secret(identity, key, value).await
    }

    /// Evaluate a boolean flag, falling back to `default` on any error.
    pub async fn evaluate_boolean(
        &self,
        flag_key: &str,
        default: bool,
        context: &EvaluationContext,
    ) -> Resolution<bool> {
        Resolution::from_result(self.resolve_bool_value(flag_key, context).await, default)
    }

    /// Evaluate a float flag, falling back to `default` on any error.
    pub async fn evaluate_float(
        &self,
        flag_key: &str,
        default: f64,
        context: &EvaluationContext,
    ) -> Resolution<f64> {
        Resolution::from_result(self.resolve_float_value(flag_key, context).await, default)
    }

    /// Evaluate an integer flag, falling back to `default` on any error.
    pub async fn evaluate_int(
        &self,
        flag_key: &str,
        default: i64,
        context: &EvaluationContext,
    ) -> Resolution<i64> {
        Resolution::from_result(self.resolve_int_value(flag_key, context).await, default)
    }

    /// Evaluate an object flag, falling back to `default` on any error.
    pub async fn evaluate_object(
        &self,
        flag_key: &str,
        default: StructValue,
        context: &EvaluationContext,
    ) -> Resolution<StructValue> {
        Resolution::from_result(self.resolve_struct_value(flag_key, context).await, default)
    }

    /// Evaluate a string flag, falling back to `default` on any error.
    pub async fn evaluate_string(
        &self,
        flag_key: &str,
        default: String,
        context: &EvaluationContext,
    ) -> Resolution<String> {
        Resolution::from_result(self.resolve_string_value(flag_key, context).await, default)
    }

    /// Build the context handed to the wrapped provider.
    ///
    /// Without a targeting key the caller's context is passed through
    /// untouched and no request is made.
    async fn identity_context<'a>(
        &self,
        context: &'a EvaluationContext,
    ) -> EvaluationResult<Cow<'a, EvaluationContext>> {
        let Some(identity) = targeting_identity(context) else {
            tracing::debug!("No targeting key, skipping identity lookup");
            return Ok(Cow::Borrowed(context));
        };

        match self.store.get_facts(identity).await {
            Ok(facts) => Ok(Cow::Owned(merge_identity_context(context, facts))),
            Err(e) => {
                tracing::warn!("Failed to fetch identity context for {}: {}", identity, e);
                Err(EvaluationError::builder()
                    .code(EvaluationErrorCode::General(IDENTITY_FETCH_ERROR.to_string()))
                    .message(IDENTITY_FETCH_ERROR)
                    .build())
            }
        }
    }
}

#[async_trait]
impl<P: FeatureProvider> FeatureProvider for DataStoreProvider<P> {
    async fn initialize(&mut self, context: &EvaluationContext) {
        self.inner.initialize(context).await;
    }

    fn status(&self) -> ProviderStatus {
        self.inner.status()
    }

    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn resolve_bool_value(
        &self,
        flag_key: &str,
        evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<bool>> {
        let context = self.identity_context(evaluation_context).await?;
        self.inner.resolve_bool_value(flag_key, &context).await
    }

    async fn resolve_int_value(
        &self,
        flag_key: &str,
        evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<i64>> {
        let context = self.identity_context(evaluation_context).await?;
        self.inner.resolve_int_value(flag_key, &context).await
    }

    async fn resolve_float_value(
        &self,
        flag_key: &str,
        evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<f64>> {
        let context = self.identity_context(evaluation_context).await?;
        self.inner.resolve_float_value(flag_key, &context).await
    }

    async fn resolve_string_value(
        &self,
        flag_key: &str,
        evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<String>> {
        let context = self.identity_context(evaluation_context).await?;
        self.inner.resolve_string_value(flag_key, &context).await
    }

    async fn resolve_struct_value(
        &self,
        flag_key: &str,
        evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<StructValue>> {
        let context = self.identity_context(evaluation_context).await?;
        self.inner.resolve_struct_value(flag_key, &context).await
    }
}

// Helper functions

/// The identity to look up, if the context names one. Empty keys count as absent.
fn targeting_identity(ctx: &EvaluationContext) -> Option<&str> {
    ctx.targeting_key.as_deref().filter(|key| !key.is_empty())
}

/// Overlay `facts` onto a copy of `ctx`. Facts win over existing custom fields.
fn merge_identity_context(
    ctx: &EvaluationContext,
    facts: HashMap<String, String>,
) -> EvaluationContext {
    let mut merged = ctx.clone();
    merged.custom_fields.extend(
        facts
            .into_iter()
            .map(|(key, value)| (key, EvaluationContextFieldValue::String(value))),
    );
    merged
}
