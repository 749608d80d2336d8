//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use open_feature::provider::{FeatureProvider, ProviderMetadata, ResolutionDetails};
use open_feature::{
    EvaluationContext, EvaluationContextFieldValue, EvaluationError, EvaluationErrorCode,
    EvaluationReason, EvaluationResult, StructValue, Value,
};
use wiremock::{Request, Respond, ResponseTemplate};

/// Wrapped provider that answers from the evaluation context it receives.
///
/// - string: the string field named like the flag
/// - bool: whether a field named like the flag exists
/// - int: number of custom fields
/// - float: always `1.0`
/// - struct: every string field
pub struct EchoProvider {
    metadata: ProviderMetadata,
    calls: Arc<AtomicUsize>,
}

impl EchoProvider {
    pub fn new() -> Self {
        Self {
            metadata: ProviderMetadata::new("echo"),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter of resolve calls; stays valid after the provider is moved.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn resolved<T>(&self, value: T) -> EvaluationResult<ResolutionDetails<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ResolutionDetails {
            value,
            variant: Some("echo".to_string()),
            reason: Some(EvaluationReason::Static),
            flag_metadata: None,
        })
    }
}

#[async_trait]
impl FeatureProvider for EchoProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn resolve_bool_value(
        &self,
        flag_key: &str,
        evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<bool>> {
        self.resolved(evaluation_context.custom_fields.contains_key(flag_key))
    }

    async fn resolve_int_value(
        &self,
        _flag_key: &str,
        evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<i64>> {
        self.resolved(evaluation_context.custom_fields.len() as i64)
    }

    async fn resolve_float_value(
        &self,
        _flag_key: &str,
        _evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<f64>> {
        self.resolved(1.0)
    }

    async fn resolve_string_value(
        &self,
        flag_key: &str,
        evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<String>> {
        match evaluation_context.custom_fields.get(flag_key) {
            Some(EvaluationContextFieldValue::String(s)) => self.resolved(s.clone()),
            _ => {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(EvaluationError::builder()
                    .code(EvaluationErrorCode::FlagNotFound)
                    .message(format!("no string field '{}'", flag_key))
                    .build())
            }
        }
    }

    async fn resolve_struct_value(
        &self,
        _flag_key: &str,
        evaluation_context: &EvaluationContext,
    ) -> EvaluationResult<ResolutionDetails<StructValue>> {
        let fields = evaluation_context
            .custom_fields
            .iter()
            .filter_map(|(key, value)| match value {
                EvaluationContextFieldValue::String(s) => {
                    Some((key.clone(), Value::String(s.clone())))
                }
                _ => None,
            })
            .collect();
        self.resolved(StructValue { fields })
    }
}

/// Stub data store that keeps whatever is written to it.
///
/// `GET /{namespace}/{identity}` returns the stored entries,
/// `PUT /{namespace}/{identity}/{key}` with `{"value": ...}` stores one.
#[derive(Default)]
pub struct PersistingDataStore {
    entries: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl Respond for PersistingDataStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request
            .url
            .path()
            .trim_start_matches('/')
            .split('/')
            .collect();
        let mut entries = self.entries.lock().unwrap();

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", [namespace, identity]) => {
                let stored = entries
                    .get(&format!("{namespace}/{identity}"))
                    .cloned()
                    .unwrap_or_default();
                ResponseTemplate::new(200).set_body_json(stored)
            }
            ("PUT", [namespace, identity, key]) => {
                let body: serde_json::Value = match serde_json::from_slice(&request.body) {
                    Ok(body) => body,
                    Err(_) => return ResponseTemplate::new(400),
                };
                let Some(value) = body.get("value").and_then(|v| v.as_str()) else {
                    return ResponseTemplate::new(400);
                };
                entries
                    .entry(format!("{namespace}/{identity}"))
                    .or_default()
                    .insert(key.to_string(), value.to_string());
                ResponseTemplate::new(200)
            }
            _ => ResponseTemplate::new(404),
        }
    }
}

pub fn string_field<'a>(ctx: &'a StructValue, key: &str) -> Option<&'a str> {
    match ctx.fields.get(key) {
        Some(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}
