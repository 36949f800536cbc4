use std::path::PathBuf;

use serde::Serialize;

use crate::token::TokenRegistry;
use crate::walker::WalkSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMatches {
    pub file: PathBuf,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    pub old: String,
    pub new: String,
}

/// What a single token did over the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReport {
    pub original_pattern: String,
    pub replacement: String,
    pub match_count: usize,
    pub files_touched: usize,
    pub rename_count: usize,
    pub matched_files: Vec<FileMatches>,
    pub renamed_paths: Vec<Rename>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub tokens: Vec<TokenReport>,
    pub files_processed: usize,
    pub content_changes: usize,
    pub paths_renamed: usize,
}

impl RunStats {
    pub fn total_matches(&self) -> usize {
        self.tokens.iter().map(|t| t.match_count).sum()
    }
}

/// Snapshots token counters into a report once the walk has finished.
pub struct StatsCollector<'a> {
    registry: &'a TokenRegistry,
}

impl<'a> StatsCollector<'a> {
    pub fn new(registry: &'a TokenRegistry) -> Self {
        Self { registry }
    }

    pub fn collect(&self, summary: &WalkSummary) -> RunStats {
        let tokens = self
            .registry
            .tokens()
            .iter()
            .map(|token| {
                let stats = token.stats();
                TokenReport {
                    original_pattern: token.original_pattern().to_string(),
                    replacement: token.replacement().to_string(),
                    match_count: stats.match_count,
                    files_touched: stats.matched_files.len(),
                    rename_count: stats.renamed_paths.len(),
                    matched_files: stats
                        .matched_files
                        .into_iter()
                        .map(|m| FileMatches {
                            file: m.path,
                            count: m.count,
                        })
                        .collect(),
                    renamed_paths: stats
                        .renamed_paths
                        .into_iter()
                        .map(|r| Rename { old: r.old, new: r.new })
                        .collect(),
                }
            })
            .collect();

        RunStats {
            tokens,
            files_processed: summary.files_processed,
            content_changes: summary.content_changes,
            paths_renamed: summary.paths_renamed,
        }
    }
}
