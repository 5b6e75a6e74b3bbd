use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{clamp_channel, Color, Coord};

/// On-the-wire shape shared by every message. Field casing is a strict
/// contract with the server, not cosmetic.
#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Outbound messages the client can emit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Envelope {
    Update,
    Pixel { coord: Coord, color: Color },
    Chat(String),
    LoadFrame { animation: String, frame: u32 },
    SaveFrame { animation: String, frame: u32 },
    Animate { animation: String, frame: u32 },
}

/// Inbound messages after decoding. Coordinates stay as wire integers so a
/// negative or oversized pair falls through the cell lookup as a no-op
/// instead of failing the whole frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    Pixel { x: i64, y: i64, color: Color },
    Chat(String),
    System(String),
    Unknown { kind: String },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid envelope: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("{kind} payload malformed")]
    Payload { kind: String },
}

pub fn encode(envelope: &Envelope) -> String {
    let (kind, data) = match envelope {
        Envelope::Update => ("Update", None),
        Envelope::Pixel { coord, color } => (
            "Pixel",
            Some(json!([coord.x, coord.y, color.r, color.g, color.b])),
        ),
        Envelope::Chat(text) => ("Chat", Some(Value::String(text.clone()))),
        Envelope::LoadFrame { animation, frame } => ("LoadFrame", Some(json!([animation, frame]))),
        Envelope::SaveFrame { animation, frame } => ("SaveFrame", Some(json!([animation, frame]))),
        Envelope::Animate { animation, frame } => ("Animate", Some(json!([animation, frame]))),
    };
    let wire = WireEnvelope {
        kind: kind.to_string(),
        data,
    };
    // A tagged string/array pair cannot fail to serialize.
    serde_json::to_string(&wire).unwrap_or_default()
}

/// Two-step decode: the raw Type/Data pair first, then the per-variant
/// payload. Unknown types are not an error; the caller logs and drops them.
pub fn decode(text: &str) -> Result<Inbound, DecodeError> {
    let WireEnvelope { kind, data } = serde_json::from_str(text)?;
    match kind.as_str() {
        "Pixel" => {
            let (x, y, r, g, b) = payload::<(i64, i64, i64, i64, i64)>(&kind, data)?;
            Ok(Inbound::Pixel {
                x,
                y,
                color: Color::new(clamp_channel(r), clamp_channel(g), clamp_channel(b)),
            })
        }
        "Chat" => Ok(Inbound::Chat(payload(&kind, data)?)),
        "System" => Ok(Inbound::System(payload(&kind, data)?)),
        _ => Ok(Inbound::Unknown { kind }),
    }
}

fn payload<T: DeserializeOwned>(kind: &str, data: Option<Value>) -> Result<T, DecodeError> {
    let data = data.ok_or_else(|| DecodeError::Payload {
        kind: kind.to_string(),
    })?;
    serde_json::from_value(data).map_err(|_| DecodeError::Payload {
        kind: kind.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_has_no_data_field() {
        assert_eq!(encode(&Envelope::Update), r#"{"Type":"Update"}"#);
    }

    #[test]
    fn pixel_encodes_as_five_tuple() {
        let envelope = Envelope::Pixel {
            coord: Coord::new(2, 3),
            color: Color::new(255, 0, 0),
        };
        assert_eq!(encode(&envelope), r#"{"Type":"Pixel","Data":[2,3,255,0,0]}"#);
    }

    #[test]
    fn chat_and_frame_encodings() {
        assert_eq!(
            encode(&Envelope::Chat("hi".to_string())),
            r#"{"Type":"Chat","Data":"hi"}"#
        );
        assert_eq!(
            encode(&Envelope::LoadFrame {
                animation: "anim1".to_string(),
                frame: 4,
            }),
            r#"{"Type":"LoadFrame","Data":["anim1",4]}"#
        );
        assert_eq!(
            encode(&Envelope::SaveFrame {
                animation: "anim1".to_string(),
                frame: 0,
            }),
            r#"{"Type":"SaveFrame","Data":["anim1",0]}"#
        );
        assert_eq!(
            encode(&Envelope::Animate {
                animation: "anim1".to_string(),
                frame: 7,
            }),
            r#"{"Type":"Animate","Data":["anim1",7]}"#
        );
    }

    #[test]
    fn decode_pixel_round_trip() {
        let text = encode(&Envelope::Pixel {
            coord: Coord::new(2, 3),
            color: Color::new(255, 0, 0),
        });
        let inbound = decode(&text).unwrap();
        assert_eq!(
            inbound,
            Inbound::Pixel {
                x: 2,
                y: 3,
                color: Color::new(255, 0, 0),
            }
        );
    }

    #[test]
    fn decode_clamps_pixel_channels() {
        let inbound = decode(r#"{"Type":"Pixel","Data":[1,1,300,-20,128]}"#).unwrap();
        assert_eq!(
            inbound,
            Inbound::Pixel {
                x: 1,
                y: 1,
                color: Color::new(255, 0, 128),
            }
        );
    }

    #[test]
    fn decode_keeps_negative_coordinates() {
        let inbound = decode(r#"{"Type":"Pixel","Data":[-1,5,1,2,3]}"#).unwrap();
        assert_eq!(
            inbound,
            Inbound::Pixel {
                x: -1,
                y: 5,
                color: Color::new(1, 2, 3),
            }
        );
    }

    #[test]
    fn decode_rejects_malformed_frames() {
        assert!(decode("not json").is_err());
        assert!(decode(r#"{"Data":[1,2,3,4,5]}"#).is_err());
        assert!(decode(r#"{"Type":"Pixel","Data":[1,2,3]}"#).is_err());
        assert!(decode(r#"{"Type":"Pixel"}"#).is_err());
        assert!(decode(r#"{"Type":"Chat","Data":[1]}"#).is_err());
    }

    #[test]
    fn decode_passes_unknown_types_through() {
        let inbound = decode(r#"{"Type":"Telemetry","Data":{"cpu":1}}"#).unwrap();
        assert_eq!(
            inbound,
            Inbound::Unknown {
                kind: "Telemetry".to_string(),
            }
        );
    }

    #[test]
    fn decode_chat_and_system() {
        assert_eq!(
            decode(r#"{"Type":"Chat","Data":"hello"}"#).unwrap(),
            Inbound::Chat("hello".to_string())
        );
        assert_eq!(
            decode(r#"{"Type":"System","Data":"I'm watching"}"#).unwrap(),
            Inbound::System("I'm watching".to_string())
        );
    }
}
