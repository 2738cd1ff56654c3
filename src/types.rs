//! Wire types for the `/messages` envelope and the rocket snapshot
//! returned by the query endpoints.
//!
//! Validation is deliberately permissive at the `serde` layer: a malformed
//! envelope must be droppable rather than a deserialization error (a
//! non-JSON body is the only case that should surface as HTTP 400), so the
//! envelope is first decoded into [`RawEnvelope`] — all-`Value` fields — and
//! only promoted to a [`ValidatedEnvelope`] by [`validate`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The outer JSON body posted to `/messages`, decoded loosely so that
/// missing or wrong-typed fields can be detected and dropped rather than
/// rejected by `serde`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEnvelope {
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub message: Value,
}

/// The five event kinds a channel may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    RocketLaunched,
    RocketSpeedIncreased,
    RocketSpeedDecreased,
    RocketExploded,
    RocketMissionChanged,
}

impl MessageType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "RocketLaunched" => Some(Self::RocketLaunched),
            "RocketSpeedIncreased" => Some(Self::RocketSpeedIncreased),
            "RocketSpeedDecreased" => Some(Self::RocketSpeedDecreased),
            "RocketExploded" => Some(Self::RocketExploded),
            "RocketMissionChanged" => Some(Self::RocketMissionChanged),
            _ => None,
        }
    }
}

/// A [`RawEnvelope`] that has passed structural validation: non-empty
/// channel, integer (non-negative) message number, a recognized message
/// type, and a non-empty message time.
#[derive(Debug, Clone)]
pub struct ValidatedEnvelope {
    pub channel: String,
    pub message_number: i64,
    pub message_type: MessageType,
    pub message_time: NaiveDateTime,
    pub message_time_raw: String,
    pub payload: Value,
}

/// Validate a raw envelope per spec: non-empty `channel`, integer
/// `messageNumber` (>= 0), non-empty `messageType` that matches one of the
/// five known variants, and non-empty `messageTime`. Returns `None` on any
/// violation — the caller drops the envelope and logs a warning.
pub fn validate(raw: &RawEnvelope) -> Option<ValidatedEnvelope> {
    let channel = raw.metadata.get("channel")?.as_str()?;
    if channel.is_empty() {
        return None;
    }

    let message_number = raw.metadata.get("messageNumber")?.as_i64()?;
    if message_number < 0 {
        return None;
    }

    let message_type_str = raw.metadata.get("messageType")?.as_str()?;
    let message_type = MessageType::from_str(message_type_str)?;

    let message_time_raw = raw.metadata.get("messageTime")?.as_str()?;
    if message_time_raw.is_empty() {
        return None;
    }

    let message_time = parse_timestamp(message_time_raw);

    Some(ValidatedEnvelope {
        channel: channel.to_string(),
        message_number,
        message_type,
        message_time,
        message_time_raw: message_time_raw.to_string(),
        payload: raw.message.clone(),
    })
}

/// Parse an ISO-8601 timestamp, tolerating both a bare naive form
/// (`2025-05-14T10:00:00`, the source's format) and an offset-qualified
/// RFC 3339 form. Falls back to the Unix epoch if neither parses — the
/// spec defines no clock-skew or malformed-timestamp handling, and a
/// non-empty string has already been guaranteed by [`validate`].
pub fn parse_timestamp(raw: &str) -> NaiveDateTime {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.naive_utc();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt;
        }
    }
    NaiveDateTime::UNIX_EPOCH
}

/// Lifecycle status of a rocket. `Exploded` is terminal with respect to
/// status only — other fields may still change after it (see
/// `reconstructor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RocketStatus {
    Launched,
    Exploded,
}

/// Immutable projection of a rocket's state, as returned by every query
/// endpoint. Never holds a live reference back into the registry.
#[derive(Debug, Clone, Serialize)]
pub struct RocketSnapshot {
    pub id: String,
    pub launch_time: String,
    /// Parsed form of `launch_time`, kept only to sort chronologically —
    /// comparing the wire string lexicographically breaks across differing
    /// offset/fractional-second formatting. Not part of the wire shape.
    #[serde(skip)]
    pub launch_time_at: NaiveDateTime,
    pub last_update_time: String,
    pub last_message_number: i64,
    pub speed: i64,
    pub rocket_type: String,
    pub mission: String,
    pub status: RocketStatus,
    pub explosion_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(metadata: Value, message: Value) -> RawEnvelope {
        RawEnvelope { metadata, message }
    }

    #[test]
    fn validate_accepts_well_formed_envelope() {
        let env = raw(
            json!({
                "channel": "r1",
                "messageNumber": 1,
                "messageType": "RocketLaunched",
                "messageTime": "2025-05-14T10:00:00",
            }),
            json!({"type": "Falcon", "launchSpeed": 1000, "mission": "MoonLanding"}),
        );
        let validated = validate(&env).expect("should validate");
        assert_eq!(validated.channel, "r1");
        assert_eq!(validated.message_number, 1);
        assert_eq!(validated.message_type, MessageType::RocketLaunched);
    }

    #[test]
    fn validate_rejects_empty_channel() {
        let env = raw(
            json!({
                "channel": "",
                "messageNumber": 1,
                "messageType": "RocketLaunched",
                "messageTime": "2025-05-14T10:00:00",
            }),
            json!({}),
        );
        assert!(validate(&env).is_none());
    }

    #[test]
    fn validate_rejects_non_integer_message_number() {
        let env = raw(
            json!({
                "channel": "r1",
                "messageNumber": "one",
                "messageType": "RocketLaunched",
                "messageTime": "2025-05-14T10:00:00",
            }),
            json!({}),
        );
        assert!(validate(&env).is_none());
    }

    #[test]
    fn validate_rejects_unknown_message_type() {
        let env = raw(
            json!({
                "channel": "r1",
                "messageNumber": 1,
                "messageType": "RocketTeleported",
                "messageTime": "2025-05-14T10:00:00",
            }),
            json!({}),
        );
        assert!(validate(&env).is_none());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let env = raw(json!({"channel": "r1"}), json!({}));
        assert!(validate(&env).is_none());
    }

    #[test]
    fn validate_rejects_negative_message_number() {
        let env = raw(
            json!({
                "channel": "r1",
                "messageNumber": -1,
                "messageType": "RocketLaunched",
                "messageTime": "2025-05-14T10:00:00",
            }),
            json!({}),
        );
        assert!(validate(&env).is_none());
    }

    #[test]
    fn parse_timestamp_handles_naive_and_offset_forms() {
        let naive = parse_timestamp("2025-05-14T10:00:00");
        assert_eq!(naive.to_string(), "2025-05-14 10:00:00");

        let offset = parse_timestamp("2025-05-14T10:00:00Z");
        assert_eq!(offset.to_string(), "2025-05-14 10:00:00");
    }
}
