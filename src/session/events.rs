//! Change notifications for observers of a session.

use serde::Serialize;
use tokio::sync::mpsc;

/// What caused a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmitTrigger {
    /// The user confirmed.
    User,
    /// The countdown ran out.
    Timer,
}

/// Notifications emitted after each state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    Loaded { total: usize, fallback: bool },
    Started { duration_secs: u32 },
    Answered { question_index: usize, option_index: usize },
    Navigated { index: usize },
    BookmarkToggled { index: usize, bookmarked: bool },
    Ticked { remaining_secs: u32 },
    WarningThresholdCrossed { remaining_secs: u32 },
    Submitted { trigger: SubmitTrigger, score: usize, total: usize },
    Restarted,
}

/// Fan-out to any number of subscribers. Dropped receivers are pruned.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventBus {
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_prunes_closed_receivers() {
        let mut bus = EventBus::default();
        let mut kept = bus.subscribe();
        let dropped = bus.subscribe();
        drop(dropped);

        bus.emit(SessionEvent::Restarted);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv().unwrap(), SessionEvent::Restarted);
    }

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::Submitted {
            trigger: SubmitTrigger::Timer,
            score: 9,
            total: 10,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Submitted\""));
        assert!(json.contains("\"trigger\":\"Timer\""));
    }
}
