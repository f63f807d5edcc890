//! # Workflow Normalizer
//!
//! Deterministic views over the raw output of a multi-agent research pipeline.
//!
//! The backend reports its progress as loosely formatted log lines. This crate
//! rebuilds three independent structures from one payload, without I/O and
//! without failing on malformed input: bad units are skipped, never reported.
//!
//! ## Architecture
//!
//! ```text
//! AnalysisPayload
//!     │
//!     ├──> agentWorkflow ──> line tokenizer ──┬──> AgentLogParser → Agent[]
//!     │                                       │      (first unique message wins)
//!     │                                       │
//!     ├──> search_links ──────────────────────┴──> LinkExtractor  → SearchLink[]
//!     │                                              (fallback only; last url wins)
//!     │
//!     └──> finalAnalysis ──> AnalysisNormalizer → FinalAnalysis
//!                              (fence stripping, confidence percent)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use workflow_normalizer::WorkflowNormalizer;
//! use workflow_protocol::AnalysisPayload;
//!
//! let payload = AnalysisPayload::from_json(r##"{
//!     "query": "latest in AI",
//!     "agentWorkflow": [
//!         "2024-01-01 00:00:00: agent=\"web_researcher\" task=\"find\" status=\"completed\" output=\"done\""
//!     ],
//!     "finalAnalysis": { "summary": ["# Hi"], "confidence": 0.873 }
//! }"##).unwrap();
//!
//! let views = WorkflowNormalizer::default().views(&payload);
//! assert_eq!(views.agents[0].display_role, "Expert Web Researcher");
//! assert_eq!(views.agents[0].messages[0].content, "find\nOutput: done");
//! assert_eq!(views.final_analysis.summary_markdown, "# Hi");
//! assert_eq!(views.final_analysis.confidence_percent, 87);
//! ```

mod agents;
mod analysis;
mod config;
mod error;
mod line;
mod links;
mod roles;
mod views;

pub use agents::AgentLogParser;
pub use analysis::{confidence_percent, normalize_analysis, strip_code_fence};
pub use config::NormalizerConfig;
pub use error::{NormalizerError, Result};
pub use line::{parse_line, parse_lines, split_log_entries, LogEvent, LogField};
pub use links::{merge_links, LinkExtractor};
pub use roles::RoleAliases;
pub use views::WorkflowNormalizer;
