//! # Interactive Search Model Module
//!
//! ## Purpose
//! Per-source search coordination for the interactive "look up a word"
//! screens. Each submitted query fans out to every enabled source, one
//! `AnalysisTask` per source, so a slow or broken dictionary renders as its
//! own pending/failed section while the others fill in. A new query replaces
//! the whole task set.
//!
//! Unlike exercise analyses, interactive searches return the full sense list
//! per source and bypass the most-probable cache.

use crate::session::SessionContext;
use crate::sources::LookupSource;
use crate::task::{AnalysisTask, TaskStatus};
use crate::{Language, WordSense};
use std::sync::Arc;

/// Fans one query out across all configured sources
pub struct SearchDataModel {
    sources: Vec<Arc<dyn LookupSource>>,
    session: SessionContext,
    query: Option<(String, Language)>,
    tasks: Vec<(String, AnalysisTask<Vec<WordSense>>)>,
}

impl SearchDataModel {
    pub fn new(sources: Vec<Arc<dyn LookupSource>>, session: SessionContext) -> Self {
        Self {
            sources,
            session,
            query: None,
            tasks: Vec::new(),
        }
    }

    /// Replace the current search with a new query. Previous per-source
    /// tasks are aborted; a blank query clears the model without issuing
    /// any lookups.
    pub fn submit_query(&mut self, term: &str, language: Language) {
        for (_, task) in &self.tasks {
            task.abort();
        }
        self.tasks.clear();

        let term = term.trim().to_lowercase();
        if term.is_empty() {
            self.query = None;
            return;
        }

        tracing::debug!(%term, %language, sources = self.sources.len(), "submitting interactive search");
        self.query = Some((term.clone(), language));
        self.tasks = self
            .sources
            .iter()
            .map(|source| {
                let name = source.name().to_string();
                let source = Arc::clone(source);
                let session = self.session.clone();
                let term = term.clone();
                let task = AnalysisTask::spawn(async move {
                    source.lookup(&term, language, &session).await
                });
                (name, task)
            })
            .collect();
    }

    /// The normalized query currently in flight or rendered
    pub fn query(&self) -> Option<&(String, Language)> {
        self.query.as_ref()
    }

    /// All per-source tasks of the current query
    pub fn tasks(&self) -> &[(String, AnalysisTask<Vec<WordSense>>)] {
        &self.tasks
    }

    /// The task for one source section
    pub fn task(&self, source: &str) -> Option<&AnalysisTask<Vec<WordSense>>> {
        self.tasks
            .iter()
            .find(|(name, _)| name == source)
            .map(|(_, task)| task)
    }

    /// Per-source status snapshot, non-blocking
    pub fn statuses(&self) -> Vec<(String, TaskStatus)> {
        self.tasks
            .iter()
            .map(|(name, task)| (name.clone(), task.status()))
            .collect()
    }

    /// Await every section's terminal state
    pub async fn wait_all(&self) {
        for (_, task) in &self.tasks {
            task.wait().await;
        }
    }
}
