//! Application state shared by the HTTP layer.
//!
//! Wires the decision core from `Settings`: classifier, notifier, audit sink,
//! dispatcher and orchestrator, all over one `Database` handle.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::composer::TemplateComposer;
use crate::config::Settings;
use crate::db::{Database, DatabaseError};
use crate::dispatch::{
    DashboardNotifier, EscalationDispatcher, Notifier, NotifyError, SqliteAuditSink,
    WebhookNotifier,
};
use crate::intelligence::{ClassifierError, HybridClassifier, IntentClassifier, LlmClassifier};
use crate::orchestrator::CareOrchestrator;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Notifier setup failed: {0}")]
    Notifier(#[from] NotifyError),
    #[error("Classifier setup failed: {0}")]
    Classifier(#[from] ClassifierError),
}

pub struct CoreState {
    pub db: Database,
    pub settings: Settings,
    pub orchestrator: Arc<CareOrchestrator>,
    started_at: Instant,
}

impl CoreState {
    pub fn build(settings: Settings, db: Database) -> Result<Self, CoreError> {
        let notifier: Arc<dyn Notifier> = match &settings.webhook_url {
            Some(url) => {
                tracing::info!(url = %url, "Staff notifications via webhook");
                Arc::new(WebhookNotifier::new(url, settings.notify_timeout)?)
            }
            None => Arc::new(DashboardNotifier::new(db.clone())),
        };

        let classifier: Arc<dyn IntentClassifier> = match &settings.llm {
            Some(llm) => {
                tracing::info!(base_url = %llm.base_url, model = %llm.model, "LLM intent classification enabled");
                Arc::new(HybridClassifier::with_llm(Arc::new(LlmClassifier::new(llm)?)))
            }
            None => Arc::new(HybridClassifier::keyword_only()),
        };

        let dispatcher = Arc::new(EscalationDispatcher::new(
            notifier,
            Arc::new(SqliteAuditSink::new(db.clone())),
            db.clone(),
            settings.notify_timeout,
        ));

        let orchestrator = Arc::new(CareOrchestrator::new(
            db.clone(),
            classifier,
            Arc::new(TemplateComposer),
            dispatcher,
            settings.memory_window,
        ));

        Ok(Self {
            db,
            settings,
            orchestrator,
            started_at: Instant::now(),
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
