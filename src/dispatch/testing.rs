//! Scripted collaborators for dispatcher and orchestrator tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::audit::{AuditError, AuditSink};
use super::notifier::{NotificationReceipt, NotificationRequest, Notifier, NotifyError};
use crate::db::DatabaseError;
use crate::models::NewAuditRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyScript {
    Deliver,
    Fail,
    /// Never completes; only a timeout ends the call.
    Hang,
    /// Delivers after the given delay.
    DeliverAfter(Duration),
}

/// Notifier that follows a fixed script and records every request.
pub struct ScriptedNotifier {
    script: NotifyScript,
    calls: Mutex<Vec<NotificationRequest>>,
}

impl ScriptedNotifier {
    pub fn new(script: NotifyScript) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<NotificationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn notify(&self, request: &NotificationRequest) -> Result<NotificationReceipt, NotifyError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };
        let delivered = || -> Result<NotificationReceipt, NotifyError> {
            Ok(NotificationReceipt {
                delivered: true,
                notification_id: format!("NTF-TEST-{call_number}"),
            })
        };
        match self.script {
            NotifyScript::Deliver => delivered(),
            NotifyScript::DeliverAfter(delay) => {
                tokio::time::sleep(delay).await;
                delivered()
            }
            NotifyScript::Fail => Err(NotifyError::WebhookStatus(503)),
            NotifyScript::Hang => std::future::pending().await,
        }
    }
}

/// Audit sink whose store is always unavailable.
pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn append(&self, _record: &NewAuditRecord) -> Result<String, AuditError> {
        Err(AuditError::Store(DatabaseError::LockPoisoned))
    }
}
