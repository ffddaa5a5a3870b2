//! Frames pushed over a delivery channel.
//!
//! The `GET /api/v1/sdk/stream` endpoint upgrades to a WebSocket and pushes
//! [`StreamFrame`] JSON frames.
//!
//! # Protocol
//!
//! 1. The server sends a [`StreamFrame::Connected`] acknowledgement
//!    immediately after the channel is registered.
//! 2. Every later frame is a change event:
//!    `{"type":"CREATE","clientKey":"…","payload":{…full snapshot…}}`
//!    (likewise `UPDATE`), `SWITCH` with a `{title, active}` payload, and
//!    `DELETE` with a `{title}` payload.
//!
//! Delivery is at-most-once and best-effort: a client that was disconnected
//! when an event was emitted never sees it and must re-sync with a fresh
//! full fetch on reconnect.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::flag::FlagSnapshot;
use crate::keys::ClientKey;

/// Payload of a SWITCH event: the flag's new active state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchPayload {
    pub title: CompactString,
    pub active: bool,
}

/// Payload of a DELETE event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePayload {
    pub title: CompactString,
}

/// A single server-to-client frame, dispatched on the `"type"` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum StreamFrame {
    /// Connection acknowledgement, always the first frame on a channel.
    #[serde(rename_all = "camelCase")]
    Connected { message: String },

    /// A flag was created; payload is the full definition.
    #[serde(rename_all = "camelCase")]
    Create {
        client_key: ClientKey,
        payload: FlagSnapshot,
    },

    /// A flag was updated; payload is the full replacement definition.
    #[serde(rename_all = "camelCase")]
    Update {
        client_key: ClientKey,
        payload: FlagSnapshot,
    },

    /// A flag was toggled active/inactive.
    #[serde(rename_all = "camelCase")]
    Switch {
        client_key: ClientKey,
        payload: SwitchPayload,
    },

    /// A flag was deleted.
    #[serde(rename_all = "camelCase")]
    Delete {
        client_key: ClientKey,
        payload: DeletePayload,
    },
}

impl StreamFrame {
    /// The standard acknowledgement frame.
    pub fn connected() -> Self {
        Self::Connected {
            message: "subscription established".to_owned(),
        }
    }

    /// The client key this frame is addressed to, if it is a change event.
    pub fn client_key(&self) -> Option<&ClientKey> {
        match self {
            Self::Connected { .. } => None,
            Self::Create { client_key, .. }
            | Self::Update { client_key, .. }
            | Self::Switch { client_key, .. }
            | Self::Delete { client_key, .. } => Some(client_key),
        }
    }

    /// Short event-kind label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "CONNECTED",
            Self::Create { .. } => "CREATE",
            Self::Update { .. } => "UPDATE",
            Self::Switch { .. } => "SWITCH",
            Self::Delete { .. } => "DELETE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_client_key;
    use crate::objects::flag::FlagType;
    use uuid::Uuid;

    fn snapshot() -> FlagSnapshot {
        FlagSnapshot {
            flag_id: Uuid::new_v4(),
            title: "checkout-redesign".into(),
            description: String::new(),
            flag_type: FlagType::Boolean,
            default_value: "TRUE".to_owned(),
            default_portion: 100,
            default_description: String::new(),
            variations: vec![],
            keywords: vec![],
            active: true,
        }
    }

    #[test]
    fn change_frames_carry_the_documented_wire_shape() {
        let key = derive_client_key("sdk-key");
        let frame = StreamFrame::Switch {
            client_key: key.clone(),
            payload: SwitchPayload {
                title: "checkout-redesign".into(),
                active: false,
            },
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&frame).unwrap()).unwrap();
        assert_eq!(json["type"], "SWITCH");
        assert_eq!(json["clientKey"], key.as_str());
        assert_eq!(json["payload"]["title"], "checkout-redesign");
        assert_eq!(json["payload"]["active"], false);
    }

    #[test]
    fn frames_round_trip() {
        let key = derive_client_key("sdk-key");
        let frames = [
            StreamFrame::connected(),
            StreamFrame::Create {
                client_key: key.clone(),
                payload: snapshot(),
            },
            StreamFrame::Delete {
                client_key: key,
                payload: DeletePayload {
                    title: "checkout-redesign".into(),
                },
            },
        ];
        for frame in frames {
            let json = serde_json::to_string(&frame).unwrap();
            let parsed: StreamFrame = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, frame);
        }
    }

    #[test]
    fn connected_frame_has_no_target_key() {
        assert!(StreamFrame::connected().client_key().is_none());
    }
}
