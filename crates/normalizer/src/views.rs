use crate::agents::AgentLogParser;
use crate::analysis::normalize_analysis;
use crate::config::NormalizerConfig;
use crate::error::Result;
use crate::links::LinkExtractor;
use workflow_protocol::{
    Agent, AnalysisPayload, FinalAnalysis, RawFinalAnalysis, SearchLink, WorkflowViews,
};

/// Entry point: builds every view for a backend payload.
///
/// Holds only read-only configuration, so one instance can serve any number
/// of payloads from any thread.
#[derive(Debug, Clone)]
pub struct WorkflowNormalizer {
    config: NormalizerConfig,
    links: LinkExtractor,
}

impl Default for WorkflowNormalizer {
    fn default() -> Self {
        Self::from_valid(NormalizerConfig::default())
    }
}

impl WorkflowNormalizer {
    /// Create a normalizer, rejecting invalid configuration
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: NormalizerConfig) -> Self {
        let links = LinkExtractor::new(&config.research_task_name, config.untitled_title.clone());
        Self { config, links }
    }

    #[must_use]
    pub const fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn agents<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Agent> {
        AgentLogParser::new(&self.config.role_aliases).parse(lines)
    }

    pub fn links<S: AsRef<str>>(&self, direct: &[SearchLink], lines: &[S]) -> Vec<SearchLink> {
        self.links.resolve(direct, lines)
    }

    #[must_use]
    pub fn analysis(&self, raw: Option<&RawFinalAnalysis>) -> FinalAnalysis {
        normalize_analysis(raw)
    }

    /// All three views, recomputed from scratch for `payload`.
    #[must_use]
    pub fn views(&self, payload: &AnalysisPayload) -> WorkflowViews {
        WorkflowViews {
            query: payload.query.clone(),
            agents: self.agents(&payload.agent_workflow),
            search_links: self.links(&payload.search_links, &payload.agent_workflow),
            final_analysis: self.analysis(payload.final_analysis.as_ref()),
        }
    }
}
