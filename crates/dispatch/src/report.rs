/// How one delivery attempt settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The gateway accepted the message for this endpoint.
    Delivered { endpoint: String },
    /// The gateway declared the endpoint permanently gone; its
    /// subscription was removed from the registry.
    Pruned { endpoint: String },
    /// Delivery failed for a possibly-transient reason. The subscription
    /// is kept; there is no retry.
    Failed { endpoint: String, error: String },
}

/// Settled accounting for one dispatch call.
///
/// An empty report (`attempted() == 0`) is the normal result for users
/// who never opted in to notifications, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn delivered(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Delivered { .. }))
    }

    #[must_use]
    pub fn pruned(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Pruned { .. }))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&DeliveryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_outcome() {
        let report = DeliveryReport {
            outcomes: vec![
                DeliveryOutcome::Delivered {
                    endpoint: "a".into(),
                },
                DeliveryOutcome::Pruned {
                    endpoint: "b".into(),
                },
                DeliveryOutcome::Failed {
                    endpoint: "c".into(),
                    error: "timeout".into(),
                },
            ],
        };
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered(), 1);
        assert_eq!(report.pruned(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn empty_report_is_default() {
        assert_eq!(DeliveryReport::default().attempted(), 0);
    }
}
