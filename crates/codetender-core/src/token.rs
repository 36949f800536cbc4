use std::borrow::Cow;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use regex::{NoExpand, Regex};
use tracing::debug;

use crate::config::TokenDef;
use crate::{CodetenderError, Result};

/// Characters that carry meaning in a regex and must be escaped when a token
/// is given as a literal string.
const RESERVED: &[char] = &[
    '-', '/', '\\', '^', '$', '*', '+', '?', '.', '(', ')', '|', '[', ']', '{', '}',
];

/// Escapes every reserved regex character in `literal`.
pub fn escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    pub path: PathBuf,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedPath {
    pub old: String,
    pub new: String,
}

/// Counters accumulated for a single token while the tree is walked.
#[derive(Debug, Default, Clone)]
pub struct TokenStats {
    pub match_count: usize,
    pub matched_files: Vec<MatchedFile>,
    pub renamed_paths: Vec<RenamedPath>,
}

#[derive(Debug)]
pub struct Token {
    pattern: Regex,
    original_pattern: String,
    replacement: String,
    literal: bool,
    stats: Mutex<TokenStats>,
}

impl Token {
    pub fn literal(pattern: &str, replacement: &str) -> Result<Self> {
        Self::compile(pattern, &escape(pattern), replacement, true)
    }

    pub fn regex(pattern: &str, replacement: &str) -> Result<Self> {
        Self::compile(pattern, pattern, replacement, false)
    }

    fn compile(original: &str, source: &str, replacement: &str, literal: bool) -> Result<Self> {
        let pattern = Regex::new(source).map_err(|e| {
            CodetenderError::Configuration(format!("invalid token pattern '{}': {}", original, e))
        })?;
        Ok(Self {
            pattern,
            original_pattern: original.to_string(),
            replacement: replacement.to_string(),
            literal,
            stats: Mutex::new(TokenStats::default()),
        })
    }

    pub fn original_pattern(&self) -> &str {
        &self.original_pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replaces every non-overlapping match in `text`, returning the new text
    /// and the number of matches.
    pub fn substitute<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let count = self.pattern.find_iter(text).count();
        if count == 0 {
            return (Cow::Borrowed(text), 0);
        }
        let replaced = if self.literal {
            self.pattern.replace_all(text, NoExpand(&self.replacement))
        } else {
            self.pattern.replace_all(text, self.replacement.as_str())
        };
        (replaced, count)
    }

    pub fn record_file(&self, path: &Path, count: usize) {
        if count == 0 {
            return;
        }
        let mut stats = self.stats.lock();
        stats.match_count += count;
        stats.matched_files.push(MatchedFile {
            path: path.to_path_buf(),
            count,
        });
    }

    pub fn record_rename(&self, old: &str, new: &str) {
        self.stats.lock().renamed_paths.push(RenamedPath {
            old: old.to_string(),
            new: new.to_string(),
        });
    }

    pub fn stats(&self) -> TokenStats {
        self.stats.lock().clone()
    }
}

/// Ordered set of compiled tokens for one run.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
}

impl TokenRegistry {
    /// Compiles token definitions in order. Every token must have a
    /// replacement by now.
    pub fn build(defs: &[TokenDef]) -> Result<Self> {
        let mut tokens = Vec::with_capacity(defs.len());
        for def in defs {
            let replacement = def.replacement.as_deref().ok_or_else(|| {
                CodetenderError::Configuration(format!(
                    "token '{}' has no replacement value",
                    def.pattern
                ))
            })?;
            let token = if def.regex {
                Token::regex(&def.pattern, replacement)?
            } else {
                Token::literal(&def.pattern, replacement)?
            };
            debug!("Token: {} -> {}", token.pattern, token.replacement);
            tokens.push(token);
        }
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Folds every token over `text` in definition order. The returned counts
    /// line up with [`TokenRegistry::tokens`].
    pub fn apply(&self, text: &str) -> (String, Vec<usize>) {
        let mut current = text.to_string();
        let mut counts = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            let (replaced, count) = token.substitute(&current);
            if count > 0 {
                current = replaced.into_owned();
            }
            counts.push(count);
        }
        (current, counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(pattern: &str, replacement: &str) -> TokenDef {
        TokenDef {
            pattern: pattern.to_string(),
            replacement: Some(replacement.to_string()),
            ..TokenDef::default()
        }
    }

    #[test]
    fn test_escape_reserved_characters() {
        assert_eq!(escape("a.b*c"), r"a\.b\*c");
        assert_eq!(escape("com/acme"), r"com\/acme");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_literal_token_matches_metacharacters_literally() {
        let registry = TokenRegistry::build(&[def("foo.js", "bar.js")]).unwrap();

        let (text, counts) = registry.apply("foo.js fooXjs");

        assert_eq!(text, "bar.js fooXjs");
        assert_eq!(counts, vec![1]);
    }

    #[test]
    fn test_apply_in_definition_order() {
        let registry = TokenRegistry::build(&[def("foo", "bar"), def("bar", "baz")]).unwrap();

        let (text, counts) = registry.apply("foo bar");

        assert_eq!(text, "baz baz");
        assert_eq!(counts, vec![1, 2]);
    }

    #[test]
    fn test_apply_counts_zero_when_absent() {
        let registry = TokenRegistry::build(&[def("CodeTender", "Served")]).unwrap();

        let (text, counts) = registry.apply("nothing to see");

        assert_eq!(text, "nothing to see");
        assert_eq!(counts, vec![0]);
    }

    #[test]
    fn test_literal_replacement_is_not_expanded() {
        let registry = TokenRegistry::build(&[def("price", "$1")]).unwrap();

        let (text, _) = registry.apply("price");

        assert_eq!(text, "$1");
    }

    #[test]
    fn test_regex_token_expands_groups() {
        let defs = [TokenDef {
            pattern: r"v(\d+)".to_string(),
            replacement: Some("version-$1".to_string()),
            regex: true,
            ..TokenDef::default()
        }];
        let registry = TokenRegistry::build(&defs).unwrap();

        let (text, counts) = registry.apply("v1 and v22");

        assert_eq!(text, "version-1 and version-22");
        assert_eq!(counts, vec![2]);
    }

    #[test]
    fn test_missing_replacement_is_configuration_error() {
        let defs = [TokenDef {
            pattern: "foo".to_string(),
            ..TokenDef::default()
        }];

        let result = TokenRegistry::build(&defs);

        assert!(matches!(result, Err(CodetenderError::Configuration(_))));
    }

    #[test]
    fn test_invalid_regex_is_configuration_error() {
        let defs = [TokenDef {
            pattern: "(unclosed".to_string(),
            replacement: Some("x".to_string()),
            regex: true,
            ..TokenDef::default()
        }];

        assert!(matches!(
            TokenRegistry::build(&defs),
            Err(CodetenderError::Configuration(_))
        ));
    }

    #[test]
    fn test_record_file_ignores_zero_counts() {
        let token = Token::literal("foo", "bar").unwrap();

        token.record_file(Path::new("/tmp/a.txt"), 0);
        token.record_file(Path::new("/tmp/b.txt"), 3);

        let stats = token.stats();
        assert_eq!(stats.match_count, 3);
        assert_eq!(stats.matched_files.len(), 1);
        assert_eq!(stats.matched_files[0].path, PathBuf::from("/tmp/b.txt"));
    }
}
