//! Message delivery status with monotonic transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery state of a message.
///
/// Transitions only move forward: `sent → delivered → read`, with
/// `sent → read` allowed because a read receipt may reach the server before
/// the delivery receipt. Regressions are rejected at every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Persisted but not yet delivered to any recipient connection.
    Sent,
    /// A recipient acknowledged delivery.
    Delivered,
    /// A recipient read the message.
    Read,
}

impl MessageStatus {
    /// Whether a transition from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        use MessageStatus::*;
        matches!(
            (self, next),
            (Sent, Delivered) | (Sent, Read) | (Delivered, Read)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(MessageStatus::Sent.can_transition_to(MessageStatus::Delivered));
        assert!(MessageStatus::Sent.can_transition_to(MessageStatus::Read));
        assert!(MessageStatus::Delivered.can_transition_to(MessageStatus::Read));
    }

    #[test]
    fn test_regressions_rejected() {
        assert!(!MessageStatus::Read.can_transition_to(MessageStatus::Delivered));
        assert!(!MessageStatus::Read.can_transition_to(MessageStatus::Sent));
        assert!(!MessageStatus::Delivered.can_transition_to(MessageStatus::Sent));
    }

    #[test]
    fn test_self_transitions_rejected() {
        assert!(!MessageStatus::Sent.can_transition_to(MessageStatus::Sent));
        assert!(!MessageStatus::Read.can_transition_to(MessageStatus::Read));
    }
}
