use crate::line::{parse_lines, LogEvent};
use crate::roles::RoleAliases;
use std::collections::{HashMap, HashSet};
use workflow_protocol::{Agent, AgentMessage};

const AGENT_FIELD: &str = "agent";
const TASK_FIELD: &str = "task";
const STATUS_FIELD: &str = "status";
const OUTPUT_FIELD: &str = "output";
const COMPLETED: &str = "completed";

/// Groups log lines into per-agent message timelines.
///
/// Agents appear in the order their id is first seen. Within an agent a
/// message is kept only if no earlier message has the same trimmed content;
/// the kept message stores its content untrimmed.
pub struct AgentLogParser<'a> {
    aliases: &'a RoleAliases,
}

struct Timeline {
    agent: Agent,
    seen: HashSet<String>,
}

impl<'a> AgentLogParser<'a> {
    #[must_use]
    pub const fn new(aliases: &'a RoleAliases) -> Self {
        Self { aliases }
    }

    pub fn parse<I, S>(&self, lines: I) -> Vec<Agent>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut timelines: Vec<Timeline> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();
        let mut duplicates = 0usize;

        for event in parse_lines(lines) {
            let Some(id) = event.field(AGENT_FIELD) else {
                log::trace!("dropping event without agent at {}", event.timestamp);
                continue;
            };

            let slot = *by_id.entry(id.to_string()).or_insert_with(|| {
                timelines.push(Timeline {
                    agent: Agent {
                        id: id.to_string(),
                        display_role: self.aliases.resolve(id),
                        messages: Vec::new(),
                    },
                    seen: HashSet::new(),
                });
                timelines.len() - 1
            });

            let content = message_content(&event);
            let timeline = &mut timelines[slot];
            if !timeline.seen.insert(content.trim().to_string()) {
                duplicates += 1;
                continue;
            }
            timeline.agent.messages.push(AgentMessage {
                timestamp: event.timestamp,
                content,
            });
        }

        let agents: Vec<Agent> = timelines.into_iter().map(|t| t.agent).collect();
        log::debug!(
            "parsed {} agents with {} messages ({duplicates} duplicates dropped)",
            agents.len(),
            agents.iter().map(|a| a.messages.len()).sum::<usize>(),
        );
        agents
    }
}

/// `task`, plus the output once the step completed. A missing task is an
/// empty base rather than a dropped event.
fn message_content(event: &LogEvent) -> String {
    let mut content = event.field(TASK_FIELD).unwrap_or_default().to_string();
    if event.field(STATUS_FIELD) == Some(COMPLETED) {
        if let Some(output) = event.field(OUTPUT_FIELD) {
            content.push_str("\nOutput: ");
            content.push_str(output);
        }
    }
    content
}
