use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::config::Config;
use crate::matching::scorer::MatchScorer;
use crate::storage::files::FileStore;
use crate::storage::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record store: Postgres, or JSON files when no database is reachable.
    pub store: Arc<dyn Store>,
    /// Uploaded documents: local disk or S3.
    pub files: Arc<dyn FileStore>,
    pub analyzer: Analyzer,
    /// Pluggable resume↔job scorer. LlmMatchScorer when the analyzer can reach
    /// the LLM, KeywordMatchScorer otherwise.
    pub matcher: Arc<dyn MatchScorer>,
    pub config: Config,
}
