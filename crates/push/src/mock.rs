use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use printdesk_core::{Notification, PushSubscription};

use crate::error::PushError;
use crate::gateway::PushGateway;

/// One recorded delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPush {
    pub endpoint: String,
    pub user_id: String,
    pub notification: Notification,
}

#[derive(Debug, Clone, Copy)]
enum ScriptedOutcome {
    Gone,
    TransientFailure,
}

/// Recording [`PushGateway`] double used by tests across the workspace.
///
/// Records every attempt, succeeds by default, and can be scripted to
/// fail per endpoint. An optional channel mirrors each attempt so tests
/// can await deliveries that happen on a spawned task instead of
/// sleeping.
#[derive(Default)]
pub struct MockPushGateway {
    sent: Mutex<Vec<SentPush>>,
    scripted: Mutex<HashMap<String, ScriptedOutcome>>,
    attempts_tx: Mutex<Option<mpsc::UnboundedSender<SentPush>>>,
}

impl MockPushGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway plus a receiver that yields every attempt as it happens.
    #[must_use]
    pub fn with_channel() -> (Self, mpsc::UnboundedReceiver<SentPush>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = Self::new();
        *gateway.attempts_tx.lock().expect("mock lock poisoned") = Some(tx);
        (gateway, rx)
    }

    /// Make every send to `endpoint` fail with [`PushError::Gone`].
    pub fn fail_gone(&self, endpoint: &str) {
        self.scripted
            .lock()
            .expect("mock lock poisoned")
            .insert(endpoint.to_owned(), ScriptedOutcome::Gone);
    }

    /// Make every send to `endpoint` fail with a transient error.
    pub fn fail_transient(&self, endpoint: &str) {
        self.scripted
            .lock()
            .expect("mock lock poisoned")
            .insert(endpoint.to_owned(), ScriptedOutcome::TransientFailure);
    }

    /// Snapshot of every attempt so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl PushGateway for MockPushGateway {
    async fn send(
        &self,
        subscription: &PushSubscription,
        notification: &Notification,
    ) -> Result<(), PushError> {
        let attempt = SentPush {
            endpoint: subscription.endpoint.clone(),
            user_id: subscription.user_id.clone(),
            notification: notification.clone(),
        };
        self.sent
            .lock()
            .expect("mock lock poisoned")
            .push(attempt.clone());
        if let Some(tx) = self.attempts_tx.lock().expect("mock lock poisoned").as_ref() {
            let _ = tx.send(attempt);
        }

        let outcome = self
            .scripted
            .lock()
            .expect("mock lock poisoned")
            .get(&subscription.endpoint)
            .copied();
        match outcome {
            Some(ScriptedOutcome::Gone) => Err(PushError::Gone),
            Some(ScriptedOutcome::TransientFailure) => {
                Err(PushError::Timeout(Duration::from_secs(10)))
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use printdesk_core::SubscriptionKeys;
    use uuid::Uuid;

    use super::*;

    fn subscription(endpoint: &str) -> PushSubscription {
        PushSubscription {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: "pk".into(),
                auth: "ak".into(),
            },
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn records_successful_send() {
        let gateway = MockPushGateway::new();
        let n = Notification::new("T", "B");
        gateway.send(&subscription("ep-1"), &n).await.unwrap();
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].endpoint, "ep-1");
        assert_eq!(sent[0].notification.title, "T");
    }

    #[tokio::test]
    async fn scripted_gone_still_records_the_attempt() {
        let gateway = MockPushGateway::new();
        gateway.fail_gone("ep-dead");
        let n = Notification::new("T", "B");
        let err = gateway.send(&subscription("ep-dead"), &n).await.unwrap_err();
        assert!(err.is_permanent());
        assert_eq!(gateway.sent().len(), 1);
    }

    #[tokio::test]
    async fn channel_mirrors_attempts() {
        let (gateway, mut rx) = MockPushGateway::with_channel();
        let n = Notification::new("T", "B");
        gateway.send(&subscription("ep-2"), &n).await.unwrap();
        let mirrored = rx.recv().await.unwrap();
        assert_eq!(mirrored.endpoint, "ep-2");
    }
}
