//! Optional `pgen.toml` configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

pub(crate) const CONFIG_FILES: &[&str] = &["pgen.toml", ".pgen.toml"];

/// Settings loaded from `pgen.toml`. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Config file path (if found).
    pub config_path: Option<PathBuf>,
    /// Default grammar for `pgen parse`, relative to the config file.
    pub grammar: Option<PathBuf>,
    /// Default start symbol name.
    pub start: Option<String>,
    /// `tracing` filter directive.
    pub log_filter: Option<String>,
    pub format: OutputFormat,
    /// Print source ranges in tree and token output.
    pub ranges: bool,
    /// Problems found while loading, logged once logging is up.
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            grammar: None,
            start: None,
            log_filter: None,
            format: OutputFormat::Tree,
            ranges: true,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    grammar: GrammarSection,
    log: LogSection,
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GrammarSection {
    path: Option<String>,
    start: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LogSection {
    filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OutputSection {
    format: Option<OutputFormat>,
    ranges: Option<bool>,
}

impl Config {
    /// Load `explicit` if given, otherwise the first config file in `root`.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Self {
        let config_path = explicit
            .map(Path::to_path_buf)
            .or_else(|| find_config_file(root));
        let Some(path) = config_path else {
            return Config::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => Config::from_contents(Some(path), &contents),
            Err(err) => Config {
                warnings: vec![format!(
                    "Failed to read pgen config at {}: {err}",
                    path.display()
                )],
                config_path: Some(path),
                ..Config::default()
            },
        }
    }

    pub fn from_contents(config_path: Option<PathBuf>, contents: &str) -> Self {
        let mut config = Config {
            config_path,
            ..Config::default()
        };
        let parsed: ConfigFile = match toml::from_str(contents) {
            Ok(parsed) => parsed,
            Err(err) => {
                let warning = match &config.config_path {
                    Some(path) => {
                        format!("Failed to parse pgen config at {}: {err}", path.display())
                    }
                    None => format!("Failed to parse pgen config: {err}"),
                };
                config.warnings.push(warning);
                return config;
            }
        };

        let base = config
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""));
        config.grammar = parsed.grammar.path.map(|entry| resolve_path(base, &entry));
        config.start = parsed.grammar.start;
        config.log_filter = parsed.log.filter;
        if let Some(format) = parsed.output.format {
            config.format = format;
        }
        if let Some(ranges) = parsed.output.ranges {
            config.ranges = ranges;
        }
        config
    }
}

pub(crate) fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

fn resolve_path(root: &Path, entry: &str) -> PathBuf {
    let path = PathBuf::from(entry);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{prefix}-{}-{stamp}", std::process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn reads_all_sections() {
        let path = PathBuf::from("/work/project/pgen.toml");
        let config = Config::from_contents(
            Some(path.clone()),
            r#"
[grammar]
path = "grammars/calc.json"
start = "expr"

[log]
filter = "pgen_syntax=debug"

[output]
format = "json"
ranges = false
"#,
        );
        assert_eq!(config.config_path, Some(path));
        assert_eq!(
            config.grammar,
            Some(PathBuf::from("/work/project/grammars/calc.json"))
        );
        assert_eq!(config.start.as_deref(), Some("expr"));
        assert_eq!(config.log_filter.as_deref(), Some("pgen_syntax=debug"));
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.ranges);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn missing_sections_keep_defaults() {
        let config = Config::from_contents(None, "[grammar]\nstart = \"stmt\"\n");
        assert_eq!(config.start.as_deref(), Some("stmt"));
        assert_eq!(config.grammar, None);
        assert_eq!(config.format, OutputFormat::Tree);
        assert!(config.ranges);
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let config = Config::from_contents(None, "[output]\nformat = \"xml\"\n");
        assert_eq!(config.format, OutputFormat::Tree);
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].starts_with("Failed to parse pgen config"));
    }

    #[test]
    fn discovers_dotfile() {
        let dir = temp_dir("pgen-config");
        fs::write(dir.join(".pgen.toml"), "[grammar]\npath = \"g.json\"\n").expect("write");
        let config = Config::load(&dir, None);
        assert_eq!(config.config_path, Some(dir.join(".pgen.toml")));
        assert_eq!(config.grammar, Some(dir.join("g.json")));
        fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn unreadable_explicit_config_warns() {
        let dir = temp_dir("pgen-config-missing");
        let config = Config::load(&dir, Some(&dir.join("absent.toml")));
        assert_eq!(config.grammar, None);
        assert_eq!(config.warnings.len(), 1);
        fs::remove_dir_all(&dir).expect("cleanup");
    }
}
