use crate::line::scan_quoted_value;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use workflow_protocol::SearchLink;

const COMPLETED_MARKER: &str = r#"status="completed""#;
const OUTPUT_MARKER: &str = r#"output=""#;

static URL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)url:\s*(https?://\S+)").expect("url token regex"));
static TITLE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btitle:[ \t]*([^\r\n]*)").expect("title token regex"));

/// Recovers search links from research-task log lines.
///
/// Only a fallback: structured links from the payload take precedence, see
/// [`LinkExtractor::resolve`].
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    task_marker: String,
    untitled: String,
}

impl LinkExtractor {
    pub fn new(research_task_name: &str, untitled: impl Into<String>) -> Self {
        Self {
            task_marker: format!(r#"task_name="{research_task_name}""#),
            untitled: untitled.into(),
        }
    }

    /// Links found in `lines`, one candidate per matching line, deduplicated
    /// by url with the later candidate winning.
    pub fn extract<I, S>(&self, lines: I) -> Vec<SearchLink>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates = lines.into_iter().filter_map(|line| {
            let output = self.research_output(line.as_ref())?;
            let link = self.link_from_output(output);
            if link.is_none() {
                log::trace!("research output without url token: {output:?}");
            }
            link
        });
        let links = merge_links(candidates);
        log::debug!("extracted {} search links from log lines", links.len());
        links
    }

    /// `direct` when the backend sent any, otherwise links extracted from `lines`.
    pub fn resolve<I, S>(&self, direct: &[SearchLink], lines: I) -> Vec<SearchLink>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if direct.is_empty() {
            self.extract(lines)
        } else {
            merge_links(direct.iter().cloned())
        }
    }

    /// The `output` value of a completed research step. Task, status and
    /// output must appear in that order; anything less is no match.
    fn research_output<'l>(&self, line: &'l str) -> Option<&'l str> {
        let line = line.trim();
        let task_at = line.find(self.task_marker.as_str())?;
        let after_task = &line[task_at + self.task_marker.len()..];
        let status_at = after_task.find(COMPLETED_MARKER)?;
        let after_status = &after_task[status_at + COMPLETED_MARKER.len()..];
        let output_at = after_status.find(OUTPUT_MARKER)?;
        let value = &after_status[output_at + OUTPUT_MARKER.len()..];
        // Any quote that would close a later `output="` closes this one too.
        let len = scan_quoted_value(value)?;
        Some(&value[..len])
    }

    fn link_from_output(&self, output: &str) -> Option<SearchLink> {
        let url = URL_TOKEN.captures(output)?.get(1)?.as_str();
        let title = TITLE_TOKEN
            .captures(output)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|title| !title.is_empty())
            .unwrap_or(self.untitled.as_str());
        Some(SearchLink::extracted(url, title))
    }
}

/// Fold links by url: a later link replaces an earlier one in place, so the
/// list keeps the order in which each url first appeared.
pub fn merge_links<I>(links: I) -> Vec<SearchLink>
where
    I: IntoIterator<Item = SearchLink>,
{
    let mut merged: Vec<SearchLink> = Vec::new();
    let mut by_url: HashMap<String, usize> = HashMap::new();

    for link in links {
        match by_url.get(&link.url) {
            Some(&slot) => merged[slot] = link,
            None => {
                by_url.insert(link.url.clone(), merged.len());
                merged.push(link);
            }
        }
    }

    merged
}
