//! Configuration consumed by the pipeline.
//!
//! A run's configuration is assembled from up to three sources, merged with
//! [`Config::merge`] in this order (later wins):
//!
//! 1. the template's own `.codetender` file,
//! 2. an explicitly requested config file,
//! 3. values given on the command line.
//!
//! [`Config::with_baseline`] then appends the exclusions that always apply.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{CodetenderError, Result};

/// Per-template configuration file name.
pub const CONFIG_FILE: &str = ".codetender";

/// Version-control metadata directory, never processed.
pub const VCS_DIR: &str = ".git/";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDef {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Treat `pattern` as a regular expression instead of a literal string.
    #[serde(default)]
    pub regex: bool,
}

impl TokenDef {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: Some(replacement.into()),
            ..Self::default()
        }
    }

    /// The question shown when asking for this token's replacement.
    pub fn prompt_text(&self) -> String {
        match &self.prompt {
            Some(prompt) => prompt.clone(),
            None => format!("Replace all instances of \"{}\" with [abort]:", self.pattern),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scripts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub tokens: Vec<TokenDef>,
    pub no_replace: Vec<String>,
    pub ignore: Vec<String>,
    pub delete: Vec<String>,
    pub scripts: Scripts,
    #[serde(deserialize_with = "one_or_many")]
    pub banner: Vec<String>,
}

/// Banners may be written as a single string or as a list of lines.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(line) => vec![line],
        OneOrMany::Many(lines) => lines,
    })
}

impl Config {
    pub fn from_json(text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| CodetenderError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Loads a config file that the user asked for. It must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            CodetenderError::Configuration(format!(
                "config file {} could not be read: {}",
                path.display(),
                e
            ))
        })?;
        debug!("Loaded config file: {}", path.display());
        Self::from_json(&text, path)
    }

    /// Loads a config file that may legitimately be absent. Bytes that were
    /// read must still parse.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!("Loaded config file: {}", path.display());
                Self::from_json(&text, path).map(Some)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config file at {}", path.display());
                Ok(None)
            }
            Err(source) => Err(CodetenderError::Filesystem {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Layers `other` on top of `self`.
    ///
    /// Tokens with a pattern already present update that token's
    /// replacement, prompt and regex flag; new patterns are appended. Scripts
    /// are overridden field by field. Pattern lists and banners are
    /// concatenated.
    pub fn merge(mut self, other: Config) -> Self {
        for incoming in other.tokens {
            match self.tokens.iter_mut().find(|t| t.pattern == incoming.pattern) {
                Some(existing) => {
                    if incoming.replacement.is_some() {
                        existing.replacement = incoming.replacement;
                    }
                    if incoming.prompt.is_some() {
                        existing.prompt = incoming.prompt;
                    }
                    if incoming.regex {
                        existing.regex = true;
                    }
                }
                None => self.tokens.push(incoming),
            }
        }

        if other.scripts.before.is_some() {
            self.scripts.before = other.scripts.before;
        }
        if other.scripts.after.is_some() {
            self.scripts.after = other.scripts.after;
        }

        self.no_replace.extend(other.no_replace);
        self.ignore.extend(other.ignore);
        self.delete.extend(other.delete);
        self.banner.extend(other.banner);
        self
    }

    /// Appends the VCS directory and the config file itself to `noReplace`
    /// and `ignore`, unless already listed.
    pub fn with_baseline(mut self) -> Self {
        for baseline in [VCS_DIR, CONFIG_FILE] {
            if !self.no_replace.iter().any(|p| p == baseline) {
                self.no_replace.push(baseline.to_string());
            }
            if !self.ignore.iter().any(|p| p == baseline) {
                self.ignore.push(baseline.to_string());
            }
        }
        self
    }

    pub fn missing_replacements(&self) -> bool {
        self.tokens.iter().any(|t| t.replacement.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "tokens": [
                { "pattern": "foo", "replacement": "bar" },
                { "pattern": "CodeTender", "prompt": "What is the name?" }
            ],
            "noReplace": ["no-replace-file.txt", "noReplace-folder/"],
            "ignore": ["ignored-folder/"],
            "delete": ["delete-file.txt"],
            "scripts": { "before": "echo before", "after": "echo after" },
            "banner": ["Done.", "Enjoy."]
        }"#;

        let config = Config::from_json(json, Path::new("codetender.json")).unwrap();

        assert_eq!(config.tokens.len(), 2);
        assert_eq!(config.tokens[0], TokenDef::new("foo", "bar"));
        assert_eq!(config.tokens[1].prompt.as_deref(), Some("What is the name?"));
        assert!(config.tokens[1].replacement.is_none());
        assert_eq!(config.no_replace, vec!["no-replace-file.txt", "noReplace-folder/"]);
        assert_eq!(config.scripts.before.as_deref(), Some("echo before"));
        assert_eq!(config.banner, vec!["Done.", "Enjoy."]);
    }

    #[test]
    fn test_banner_accepts_single_string() {
        let config = Config::from_json(r#"{ "banner": "Hello" }"#, Path::new("x")).unwrap();

        assert_eq!(config.banner, vec!["Hello"]);
    }

    #[test]
    fn test_parse_failure_is_fatal() {
        let result = Config::from_json("{ not json", Path::new("broken.json"));

        assert!(matches!(result, Err(CodetenderError::ConfigParse { .. })));
    }

    #[test]
    fn test_load_optional_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();

        let result = Config::load_optional(&dir.path().join(CONFIG_FILE)).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_optional_malformed_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ \"tokens\": [").unwrap();

        assert!(Config::load_optional(&path).is_err());
    }

    #[test]
    fn test_load_missing_required_file_is_fatal() {
        let dir = TempDir::new().unwrap();

        let result = Config::load(&dir.path().join("missing.json"));

        assert!(matches!(result, Err(CodetenderError::Configuration(_))));
    }

    #[test]
    fn test_merge_later_source_wins() {
        let file = Config {
            tokens: vec![
                TokenDef::new("foo", "file-bar"),
                TokenDef {
                    pattern: "CodeTender".to_string(),
                    prompt: Some("Name?".to_string()),
                    ..TokenDef::default()
                },
            ],
            scripts: Scripts {
                before: Some("file-before".to_string()),
                after: Some("file-after".to_string()),
            },
            no_replace: vec!["a".to_string()],
            ..Config::default()
        };
        let cli = Config {
            tokens: vec![TokenDef::new("foo", "cli-bar"), TokenDef::new("sub", "folder")],
            scripts: Scripts {
                before: Some("cli-before".to_string()),
                after: None,
            },
            no_replace: vec!["b".to_string()],
            ..Config::default()
        };

        let merged = file.merge(cli);

        assert_eq!(merged.tokens.len(), 3);
        assert_eq!(merged.tokens[0].replacement.as_deref(), Some("cli-bar"));
        assert_eq!(merged.tokens[1].prompt.as_deref(), Some("Name?"));
        assert_eq!(merged.tokens[2].pattern, "sub");
        assert_eq!(merged.scripts.before.as_deref(), Some("cli-before"));
        assert_eq!(merged.scripts.after.as_deref(), Some("file-after"));
        assert_eq!(merged.no_replace, vec!["a", "b"]);
    }

    #[test]
    fn test_baseline_added_once() {
        let config = Config {
            no_replace: vec![VCS_DIR.to_string()],
            ..Config::default()
        }
        .with_baseline()
        .with_baseline();

        assert_eq!(config.no_replace, vec![VCS_DIR, CONFIG_FILE]);
        assert_eq!(config.ignore, vec![VCS_DIR, CONFIG_FILE]);
    }

    #[test]
    fn test_missing_replacements() {
        let mut config = Config {
            tokens: vec![TokenDef {
                pattern: "foo".to_string(),
                ..TokenDef::default()
            }],
            ..Config::default()
        };
        assert!(config.missing_replacements());

        config.tokens[0].replacement = Some("bar".to_string());
        assert!(!config.missing_replacements());
    }
}
