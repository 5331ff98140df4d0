//! Provider webhook event vocabulary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Event types the reconciler understands.
///
/// Providers spell these differently (`send_failed`, `SendFailed`,
/// `send-failed`); parsing ignores case and separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderEvent {
    SendFailed,
    Completed,
    Declined,
    Expired,
    Revoked,
    Signed,
}

/// Event type string the reconciler does not understand
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown e-signature event type: {0}")]
pub struct UnknownEventType(pub String);

impl FromStr for ProviderEvent {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | '.'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "sendfailed" => Ok(ProviderEvent::SendFailed),
            "completed" => Ok(ProviderEvent::Completed),
            "declined" => Ok(ProviderEvent::Declined),
            "expired" => Ok(ProviderEvent::Expired),
            "revoked" => Ok(ProviderEvent::Revoked),
            "signed" => Ok(ProviderEvent::Signed),
            _ => Err(UnknownEventType(s.to_string())),
        }
    }
}

/// Signer details delivered alongside per-signer events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub signer_email: Option<String>,
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_provider_spellings() {
        for spelling in ["send_failed", "SendFailed", "SEND-FAILED", "send.failed"] {
            assert_eq!(
                spelling.parse::<ProviderEvent>().unwrap(),
                ProviderEvent::SendFailed
            );
        }
        assert_eq!("signed".parse::<ProviderEvent>().unwrap(), ProviderEvent::Signed);
    }

    #[test]
    fn rejects_unknown_event_types() {
        let err = "envelope_viewed".parse::<ProviderEvent>().unwrap_err();
        assert_eq!(err, UnknownEventType("envelope_viewed".into()));
    }

    #[test]
    fn payload_tolerates_missing_fields() {
        let payload: WebhookPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload, WebhookPayload::default());
    }
}
