use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod payload;

pub use payload::{AnalysisPayload, BackendError, RawFinalAnalysis};

/// Body sent to the analysis backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_count: Option<u32>,
}

impl AnalysisRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            link_count: None,
        }
    }

    #[must_use]
    pub fn with_link_count(mut self, link_count: u32) -> Self {
        self.link_count = Some(link_count);
        self
    }
}

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Credibility {
    Ok,
    #[default]
    News,
    Fake,
}

impl Credibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::News => "NEWS",
            Self::Fake => "FAKE",
        }
    }

    /// Reads a backend tag ignoring case; anything unrecognised is news.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        [Self::Ok, Self::News, Self::Fake]
            .into_iter()
            .find(|known| tag.eq_ignore_ascii_case(known.as_str()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct SearchLink {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub credibility: Credibility,
}

impl SearchLink {
    /// A link recovered from log text: no snippet, tagged as news.
    pub fn extracted(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: String::new(),
            credibility: Credibility::News,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct AgentMessage {
    pub timestamp: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub display_role: String,
    pub messages: Vec<AgentMessage>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalAnalysis {
    pub summary_markdown: String,
    /// 0..=100
    pub confidence_percent: u8,
}

/// Everything the presentation layer renders for one backend response.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowViews {
    pub query: String,
    pub agents: Vec<Agent>,
    pub search_links: Vec<SearchLink>,
    pub final_analysis: FinalAnalysis,
}

/// JSON Schema of [`WorkflowViews`] for the presentation layer.
pub fn views_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(WorkflowViews);
    serde_json::to_value(&schema).map_err(Into::into)
}
