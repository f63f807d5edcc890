use crate::error::{NormalizerError, Result};
use crate::roles::RoleAliases;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_RESEARCH_TASK: &str = "research_task";
const DEFAULT_UNTITLED: &str = "Untitled";

/// Configuration for log normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Agent id -> display role
    pub role_aliases: RoleAliases,

    /// `task_name` of the log events that carry search results
    pub research_task_name: String,

    /// Title given to extracted links without a `Title:` token
    pub untitled_title: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            role_aliases: RoleAliases::default(),
            research_task_name: DEFAULT_RESEARCH_TASK.to_string(),
            untitled_title: DEFAULT_UNTITLED.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNormalizerConfig {
    #[serde(default)]
    role_aliases: BTreeMap<String, String>,
    research_task_name: Option<String>,
    untitled_title: Option<String>,
}

impl NormalizerConfig {
    /// Show agents by their raw ids
    pub fn without_aliases() -> Self {
        Self {
            role_aliases: RoleAliases::empty(),
            ..Default::default()
        }
    }

    /// Parse a TOML document layered over the defaults.
    ///
    /// `[role_aliases]` entries extend the crew table rather than replace it.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawNormalizerConfig = toml::from_str(source)?;
        let mut config = Self::default();
        config.role_aliases.extend(raw.role_aliases);
        if let Some(name) = raw.research_task_name {
            config.research_task_name = name;
        }
        if let Some(title) = raw.untitled_title {
            config.untitled_title = title;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        log::debug!("Loading normalizer config from {}", path.display());
        Self::from_toml_str(&source)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (id, role) in self.role_aliases.iter() {
            if id.trim().is_empty() {
                return Err(NormalizerError::invalid_config(
                    "role_aliases keys must not be empty",
                ));
            }
            if role.trim().is_empty() {
                return Err(NormalizerError::invalid_config(format!(
                    "role alias for '{id}' must not be blank"
                )));
            }
        }

        let task = &self.research_task_name;
        if task.is_empty() || !task.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(NormalizerError::invalid_config(format!(
                "research_task_name '{task}' must be a bare word"
            )));
        }

        if self.untitled_title.trim().is_empty() {
            return Err(NormalizerError::invalid_config(
                "untitled_title must not be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        assert!(NormalizerConfig::default().validate().is_ok());
        assert!(NormalizerConfig::without_aliases().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = NormalizerConfig::default();

        // Invalid: task name with spaces
        config.research_task_name = "research task".to_string();
        assert!(config.validate().is_err());

        // Invalid: empty task name
        config.research_task_name = String::new();
        assert!(config.validate().is_err());

        // Invalid: blank placeholder title
        config.research_task_name = "research_task".to_string();
        config.untitled_title = "  ".to_string();
        assert!(config.validate().is_err());

        // Invalid: blank role
        config.untitled_title = "Untitled".to_string();
        config.role_aliases = RoleAliases::empty().with("critic", " ");
        assert!(config.validate().is_err());

        // Invalid: empty id
        config.role_aliases = RoleAliases::empty().with("", "Critic");
        assert!(config.validate().is_err());

        config.role_aliases = RoleAliases::empty().with("critic", "Critic");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_extends_crew_aliases() {
        let config = NormalizerConfig::from_toml_str(
            r#"
research_task_name = "search_task"

[role_aliases]
critic = "Sharp Critic"
manager = "Lead"
"#,
        )
        .unwrap();

        assert_eq!(config.research_task_name, "search_task");
        assert_eq!(config.untitled_title, "Untitled");
        assert_eq!(config.role_aliases.resolve("critic"), "Sharp Critic");
        assert_eq!(config.role_aliases.resolve("manager"), "Lead");
        assert_eq!(
            config.role_aliases.resolve("aggregator"),
            "Analytical Aggregator"
        );
    }

    #[test]
    fn toml_errors_are_reported() {
        let err = NormalizerConfig::from_toml_str("research_task_name = 3").unwrap_err();
        assert!(matches!(err, NormalizerError::ConfigParse(_)), "{err}");

        let err = NormalizerConfig::from_toml_str("unknown_key = true").unwrap_err();
        assert!(matches!(err, NormalizerError::ConfigParse(_)), "{err}");

        let err = NormalizerConfig::from_toml_str(r#"untitled_title = """#).unwrap_err();
        assert!(matches!(err, NormalizerError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn loads_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "untitled_title = \"(no title)\"").unwrap();

        let config = NormalizerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.untitled_title, "(no title)");

        let missing = file.path().with_extension("missing");
        let err = NormalizerConfig::from_file(missing).unwrap_err();
        assert!(matches!(err, NormalizerError::IoError(_)), "{err}");
    }
}
