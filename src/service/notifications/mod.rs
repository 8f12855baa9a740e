// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Notification intent emission.
//!
//! The control plane only *emits* typed intents; delivery, retry and
//! fan-out are the transport collaborator's responsibility. Emission is
//! best-effort by design: the incident event log is the authoritative
//! record, so a dropped intent is logged and never rolls anything back.

use std::sync::Arc;

use async_trait::async_trait;
use config::meta::{
    incident::Incident,
    notification::{IncidentSummary, IntentKind, NotificationIntent},
};
use once_cell::sync::OnceCell;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

static QUEUE: OnceCell<mpsc::Sender<NotificationIntent>> = OnceCell::new();

/// Delivery seam. The default transport just logs; real transports
/// (push, chat, email) are registered by the embedding deployment.
#[async_trait]
pub trait NotificationTransport: Send + Sync + 'static {
    fn name(&self) -> &str;
    async fn deliver(&self, intent: &NotificationIntent) -> Result<(), anyhow::Error>;
}

pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, intent: &NotificationIntent) -> Result<(), anyhow::Error> {
        log::info!(
            "[NOTIFY] {} incident={} org={} target={:?}",
            intent.kind,
            intent.incident_id,
            intent.org_id,
            intent.target_user_id
        );
        Ok(())
    }
}

/// Start the dispatcher task. Must be called once at startup before any
/// intent is emitted.
pub fn init(
    transport: Arc<dyn NotificationTransport>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let cfg = config::get_config();
    let (tx, mut rx) = mpsc::channel::<NotificationIntent>(cfg.notifications.queue_size);
    QUEUE.set(tx).expect("notification queue already initialized");

    tokio::spawn(async move {
        loop {
            tokio::select! {
                intent = rx.recv() => {
                    let Some(intent) = intent else { break };
                    if let Err(e) = transport.deliver(&intent).await {
                        // best effort: the escalated/resolved event row is
                        // the durable record, transports retry from there
                        log::error!(
                            "[NOTIFY] transport {} failed for incident {}: {e}",
                            transport.name(),
                            intent.incident_id
                        );
                    }
                }
                _ = shutdown.cancelled() => {
                    // drain whatever is already queued, then exit
                    while let Ok(intent) = rx.try_recv() {
                        if let Err(e) = transport.deliver(&intent).await {
                            log::error!(
                                "[NOTIFY] transport {} failed for incident {}: {e}",
                                transport.name(),
                                intent.incident_id
                            );
                        }
                    }
                    break;
                }
            }
        }
        log::info!("[NOTIFY] dispatcher stopped");
    })
}

/// Queue one intent. Emission failures are logged, never propagated.
pub fn emit(kind: IntentKind, incident: &Incident, target_user_id: Option<String>) {
    let intent = NotificationIntent {
        kind,
        org_id: incident.org_id.clone(),
        incident_id: incident.id.clone(),
        target_user_id,
        summary: IncidentSummary::from(incident),
        created_at: config::utils::time::now_micros(),
    };

    let Some(queue) = QUEUE.get() else {
        log::warn!("[NOTIFY] intent dropped, dispatcher not initialized: {kind}");
        return;
    };
    if let Err(e) = queue.try_send(intent) {
        log::error!("[NOTIFY] intent dropped: {e}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use config::meta::incident::{EscalationStatus, IncidentStatus, Severity, Urgency};

    use super::*;

    fn incident() -> Incident {
        Incident {
            id: "inc1".to_string(),
            org_id: "org1".to_string(),
            project_id: None,
            group_id: None,
            title: "api down".to_string(),
            description: "".to_string(),
            severity: Severity::Critical,
            urgency: Urgency::High,
            status: IncidentStatus::Triggered,
            source: "datadog".to_string(),
            incident_key: None,
            external_id: None,
            alert_count: 1,
            escalation_policy_id: None,
            current_escalation_level: 0,
            escalation_status: EscalationStatus::None,
            last_escalated_at: None,
            escalation_due_at: None,
            assigned_to: None,
            resolution: None,
            created_at: 0,
            updated_at: 0,
            acknowledged_at: None,
            resolved_at: None,
        }
    }

    struct CountingTransport(Arc<AtomicUsize>);

    #[async_trait]
    impl NotificationTransport for CountingTransport {
        fn name(&self) -> &str {
            "counting"
        }

        async fn deliver(&self, _intent: &NotificationIntent) -> Result<(), anyhow::Error> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_transport() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let handle = init(
            Arc::new(CountingTransport(delivered.clone())),
            token.clone(),
        );

        let inc = incident();
        emit(IntentKind::IncidentCreated, &inc, None);
        emit(IntentKind::IncidentEscalated, &inc, Some("user1".to_string()));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        token.cancel();
        handle.await.unwrap();
        assert_eq!(delivered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_summary_from_incident() {
        let inc = incident();
        let summary = IncidentSummary::from(&inc);
        assert_eq!(summary.incident_id, "inc1");
        assert_eq!(summary.severity, Severity::Critical);
        assert_eq!(summary.escalation_level, 0);
    }
}
