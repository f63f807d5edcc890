//! Lenient decoding of the backend's analysis response.
//!
//! Entries that do not fit the contract are skipped one by one; only a body
//! that is not an object, or the backend's own `{"error": ...}` envelope,
//! fails the decode.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{Credibility, SearchLink};

/// The backend answered with its failure envelope instead of a payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("analysis backend reported an error: {message}")]
pub struct BackendError {
    pub message: String,
}

/// `finalAnalysis` as sent by the backend, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFinalAnalysis {
    /// Kept as raw JSON: a non-array summary is a normalizer concern.
    pub summary: Option<Value>,
    pub confidence: Option<f64>,
}

impl RawFinalAnalysis {
    pub fn new<I, S>(summary: I, confidence: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let summary = summary
            .into_iter()
            .map(|entry| Value::String(entry.into()))
            .collect();
        Self {
            summary: Some(Value::Array(summary)),
            confidence: Some(confidence),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPayload {
    pub query: String,
    pub agent_workflow: Vec<String>,
    pub search_links: Vec<SearchLink>,
    pub final_analysis: Option<RawFinalAnalysis>,
}

impl AnalysisPayload {
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(body).context("analysis response is not valid JSON")?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            bail!("analysis response must be a JSON object");
        };

        if object.contains_key("error") && !object.contains_key("query") {
            let message = match object.remove("error") {
                Some(Value::String(message)) => message,
                other => other.map(|v| v.to_string()).unwrap_or_default(),
            };
            return Err(BackendError { message }.into());
        }

        Ok(Self {
            query: object
                .get("query")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            agent_workflow: decode_workflow(&object),
            search_links: decode_links(&object),
            final_analysis: decode_final_analysis(&object),
        })
    }
}

fn decode_workflow(object: &Map<String, Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = object.get("agentWorkflow") else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let line = entry.as_str();
            if line.is_none() {
                log::trace!("skipping non-string agentWorkflow entry: {entry}");
            }
            line.map(str::to_string)
        })
        .collect()
}

fn decode_links(object: &Map<String, Value>) -> Vec<SearchLink> {
    let Some(Value::Array(entries)) = object.get("search_links") else {
        return Vec::new();
    };
    entries.iter().filter_map(decode_link).collect()
}

/// Only `url` is required; every other field falls back on its own.
fn decode_link(entry: &Value) -> Option<SearchLink> {
    let Some(url) = entry.get("url").and_then(Value::as_str) else {
        log::debug!("skipping search link without url: {entry}");
        return None;
    };
    let text = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let credibility = entry
        .get("credibility")
        .and_then(Value::as_str)
        .map(Credibility::from_tag)
        .unwrap_or_default();

    Some(SearchLink {
        url: url.to_string(),
        title: text("title"),
        snippet: text("snippet"),
        credibility,
    })
}

fn decode_final_analysis(object: &Map<String, Value>) -> Option<RawFinalAnalysis> {
    let Some(Value::Object(analysis)) = object.get("finalAnalysis") else {
        return None;
    };
    Some(RawFinalAnalysis {
        summary: analysis.get("summary").cloned(),
        confidence: analysis.get("confidence").and_then(Value::as_f64),
    })
}
