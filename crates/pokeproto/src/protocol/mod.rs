// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire codec: one message per UDP datagram, framed as `key:value` lines.
//!
//! The first pair is always `type:<MESSAGE_TYPE>`; every frame except `ACK`
//! carries `sequence_number`. Values are plain UTF-8 text (sticker payloads
//! are base64). Unknown keys survive a decode/encode round trip verbatim.

use std::fmt;
use std::str::FromStr;

/// Newline separator between `key:value` pairs.
const LINE_SEP: char = '\n';

/// Separator between a key and its value (split at the first occurrence).
const KV_SEP: char = ':';

// =======================================================================
// Message Kinds
// =======================================================================

/// Wire discriminant of a frame, as carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    HandshakeRequest,
    HandshakeResponse,
    SpectatorRequest,
    BattleSetup,
    AttackAnnounce,
    DefenseAnnounce,
    CalculationReport,
    CalculationConfirm,
    ResolutionRequest,
    GameOver,
    Chat,
    Ack,
}

impl MessageKind {
    /// Wire spelling of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageKind::HandshakeRequest => "HANDSHAKE_REQUEST",
            MessageKind::HandshakeResponse => "HANDSHAKE_RESPONSE",
            MessageKind::SpectatorRequest => "SPECTATOR_REQUEST",
            MessageKind::BattleSetup => "BATTLE_SETUP",
            MessageKind::AttackAnnounce => "ATTACK_ANNOUNCE",
            MessageKind::DefenseAnnounce => "DEFENSE_ANNOUNCE",
            MessageKind::CalculationReport => "CALCULATION_REPORT",
            MessageKind::CalculationConfirm => "CALCULATION_CONFIRM",
            MessageKind::ResolutionRequest => "RESOLUTION_REQUEST",
            MessageKind::GameOver => "GAME_OVER",
            MessageKind::Chat => "CHAT_MESSAGE",
            MessageKind::Ack => "ACK",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HANDSHAKE_REQUEST" => Ok(MessageKind::HandshakeRequest),
            "HANDSHAKE_RESPONSE" => Ok(MessageKind::HandshakeResponse),
            "SPECTATOR_REQUEST" => Ok(MessageKind::SpectatorRequest),
            "BATTLE_SETUP" => Ok(MessageKind::BattleSetup),
            "ATTACK_ANNOUNCE" => Ok(MessageKind::AttackAnnounce),
            "DEFENSE_ANNOUNCE" => Ok(MessageKind::DefenseAnnounce),
            "CALCULATION_REPORT" => Ok(MessageKind::CalculationReport),
            "CALCULATION_CONFIRM" => Ok(MessageKind::CalculationConfirm),
            "RESOLUTION_REQUEST" => Ok(MessageKind::ResolutionRequest),
            "GAME_OVER" => Ok(MessageKind::GameOver),
            "CHAT_MESSAGE" => Ok(MessageKind::Chat),
            "ACK" => Ok(MessageKind::Ack),
            _ => Err(()),
        }
    }
}

// =======================================================================
// Payloads
// =======================================================================

/// Chat content discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Sticker,
}

impl ContentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ContentType::Text => "TEXT",
            ContentType::Sticker => "STICKER",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application payload of a sequenced frame: a tagged sum over the message
/// kinds of the protocol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    HandshakeRequest {
        name: String,
    },
    HandshakeResponse {
        name: String,
        seed: u32,
    },
    SpectatorRequest {
        name: String,
    },
    BattleSetup {
        pokemon: String,
        hp: u32,
        sp_atk_uses: u8,
        sp_def_uses: u8,
    },
    AttackAnnounce {
        mv: String,
        use_sp_atk_boost: bool,
    },
    DefenseAnnounce {
        use_sp_def_boost: bool,
    },
    CalculationReport {
        damage: u32,
        defender_hp_after: u32,
    },
    CalculationConfirm,
    ResolutionRequest {
        damage: u32,
        defender_hp_after: u32,
    },
    GameOver {
        winner: String,
        loser: String,
    },
    Chat {
        content_type: ContentType,
        from: String,
        /// Plain text, or base64 sticker bytes.
        payload: String,
    },
}

impl Payload {
    /// Wire discriminant of this payload.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Payload::HandshakeRequest { .. } => MessageKind::HandshakeRequest,
            Payload::HandshakeResponse { .. } => MessageKind::HandshakeResponse,
            Payload::SpectatorRequest { .. } => MessageKind::SpectatorRequest,
            Payload::BattleSetup { .. } => MessageKind::BattleSetup,
            Payload::AttackAnnounce { .. } => MessageKind::AttackAnnounce,
            Payload::DefenseAnnounce { .. } => MessageKind::DefenseAnnounce,
            Payload::CalculationReport { .. } => MessageKind::CalculationReport,
            Payload::CalculationConfirm => MessageKind::CalculationConfirm,
            Payload::ResolutionRequest { .. } => MessageKind::ResolutionRequest,
            Payload::GameOver { .. } => MessageKind::GameOver,
            Payload::Chat { .. } => MessageKind::Chat,
        }
    }
}

/// A sequenced application message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub seq: u32,
    pub payload: Payload,
    /// Unknown keys, preserved in arrival order for forward compatibility.
    pub extras: Vec<(String, String)>,
}

impl Message {
    #[must_use]
    pub fn new(seq: u32, payload: Payload) -> Self {
        Self { seq, payload, extras: Vec::new() }
    }
}

/// One decoded datagram: either a bare ACK or a sequenced message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Ack { ack: u32 },
    Message(Message),
}

// =======================================================================
// Errors
// =======================================================================

/// Decode failures. The reliability layer drops malformed datagrams
/// silently; an `UnknownType` frame is still ACKed but never delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Empty,
    NotUtf8,
    /// A line with no `:` separator.
    MalformedLine { line: String },
    MissingType,
    /// Decodable datagram with an unrecognized `type`. The sequence number
    /// is surfaced when present so the caller can still ACK the sender.
    UnknownType { found: String, seq: Option<u32> },
    MissingField { kind: MessageKind, field: &'static str },
    InvalidValue { field: &'static str, value: String },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => f.write_str("empty datagram"),
            DecodeError::NotUtf8 => f.write_str("datagram is not UTF-8"),
            DecodeError::MalformedLine { line } => write!(f, "line without separator: '{}'", line),
            DecodeError::MissingType => f.write_str("missing 'type' field"),
            DecodeError::UnknownType { found, .. } => write!(f, "unknown message type '{}'", found),
            DecodeError::MissingField { kind, field } => {
                write!(f, "{} is missing required field '{}'", kind, field)
            }
            DecodeError::InvalidValue { field, value } => {
                write!(f, "field '{}' has invalid value '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

// =======================================================================
// Encoding
// =======================================================================

/// Serialize a frame into datagram bytes.
///
/// `type` is emitted first, then `sequence_number`, then the documented
/// field order of the kind, then any preserved extras. A trailing newline
/// is always emitted.
#[must_use]
pub fn encode(frame: &Frame) -> Vec<u8> {
    let mut out = String::with_capacity(64);
    match frame {
        Frame::Ack { ack } => {
            push_pair(&mut out, "type", MessageKind::Ack.as_str());
            push_pair(&mut out, "ack", &ack.to_string());
        }
        Frame::Message(msg) => {
            push_pair(&mut out, "type", msg.payload.kind().as_str());
            push_pair(&mut out, "sequence_number", &msg.seq.to_string());
            encode_payload(&mut out, &msg.payload);
            for (key, value) in &msg.extras {
                push_pair(&mut out, key, value);
            }
        }
    }
    out.into_bytes()
}

fn encode_payload(out: &mut String, payload: &Payload) {
    match payload {
        Payload::HandshakeRequest { name } | Payload::SpectatorRequest { name } => {
            push_pair(out, "name", name);
        }
        Payload::HandshakeResponse { name, seed } => {
            push_pair(out, "name", name);
            push_pair(out, "seed", &seed.to_string());
        }
        Payload::BattleSetup { pokemon, hp, sp_atk_uses, sp_def_uses } => {
            push_pair(out, "pokemon", pokemon);
            push_pair(out, "hp", &hp.to_string());
            push_pair(out, "sp_atk_uses", &sp_atk_uses.to_string());
            push_pair(out, "sp_def_uses", &sp_def_uses.to_string());
        }
        Payload::AttackAnnounce { mv, use_sp_atk_boost } => {
            push_pair(out, "move", mv);
            push_pair(out, "use_sp_atk_boost", bool_str(*use_sp_atk_boost));
        }
        Payload::DefenseAnnounce { use_sp_def_boost } => {
            push_pair(out, "use_sp_def_boost", bool_str(*use_sp_def_boost));
        }
        Payload::CalculationReport { damage, defender_hp_after }
        | Payload::ResolutionRequest { damage, defender_hp_after } => {
            push_pair(out, "damage", &damage.to_string());
            push_pair(out, "defender_hp_after", &defender_hp_after.to_string());
        }
        Payload::CalculationConfirm => {}
        Payload::GameOver { winner, loser } => {
            push_pair(out, "winner", winner);
            push_pair(out, "loser", loser);
        }
        Payload::Chat { content_type, from, payload } => {
            push_pair(out, "content_type", content_type.as_str());
            push_pair(out, "from", from);
            push_pair(out, "payload", payload);
        }
    }
}

fn push_pair(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push(KV_SEP);
    out.push_str(value);
    out.push(LINE_SEP);
}

const fn bool_str(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

// =======================================================================
// Decoding
// =======================================================================

/// Parse datagram bytes into a frame.
///
/// Lenient on framing: a missing trailing newline and `\r\n` line endings
/// are accepted. Unknown keys are preserved as extras; an unknown `type`
/// is an error so the caller can ACK without delivering.
pub fn decode(bytes: &[u8]) -> Result<Frame, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?;
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for raw in text.split(LINE_SEP) {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(KV_SEP)
            .ok_or_else(|| DecodeError::MalformedLine { line: line.to_string() })?;
        pairs.push((key, value));
    }
    if pairs.is_empty() {
        return Err(DecodeError::Empty);
    }

    let type_value = take(&mut pairs, "type").ok_or(DecodeError::MissingType)?;
    let kind = MessageKind::from_str(type_value).map_err(|()| DecodeError::UnknownType {
        found: type_value.to_string(),
        seq: take(&mut pairs, "sequence_number").and_then(|v| v.parse().ok()),
    })?;

    if kind == MessageKind::Ack {
        let ack = parse_u32(take_required(&mut pairs, kind, "ack")?, "ack")?;
        return Ok(Frame::Ack { ack });
    }

    let seq = parse_u32(
        take_required(&mut pairs, kind, "sequence_number")?,
        "sequence_number",
    )?;
    let payload = decode_payload(kind, &mut pairs)?;
    let extras = pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Ok(Frame::Message(Message { seq, payload, extras }))
}

fn decode_payload<'a>(
    kind: MessageKind,
    pairs: &mut Vec<(&'a str, &'a str)>,
) -> Result<Payload, DecodeError> {
    let payload = match kind {
        MessageKind::HandshakeRequest => Payload::HandshakeRequest {
            name: take_required(pairs, kind, "name")?.to_string(),
        },
        MessageKind::HandshakeResponse => Payload::HandshakeResponse {
            name: take_required(pairs, kind, "name")?.to_string(),
            seed: parse_u32(take_required(pairs, kind, "seed")?, "seed")?,
        },
        MessageKind::SpectatorRequest => Payload::SpectatorRequest {
            name: take_required(pairs, kind, "name")?.to_string(),
        },
        MessageKind::BattleSetup => Payload::BattleSetup {
            pokemon: take_required(pairs, kind, "pokemon")?.to_string(),
            hp: parse_u32(take_required(pairs, kind, "hp")?, "hp")?,
            sp_atk_uses: parse_u8(take_required(pairs, kind, "sp_atk_uses")?, "sp_atk_uses")?,
            sp_def_uses: parse_u8(take_required(pairs, kind, "sp_def_uses")?, "sp_def_uses")?,
        },
        MessageKind::AttackAnnounce => Payload::AttackAnnounce {
            mv: take_required(pairs, kind, "move")?.to_string(),
            use_sp_atk_boost: parse_bool(
                take_required(pairs, kind, "use_sp_atk_boost")?,
                "use_sp_atk_boost",
            )?,
        },
        MessageKind::DefenseAnnounce => Payload::DefenseAnnounce {
            use_sp_def_boost: parse_bool(
                take_required(pairs, kind, "use_sp_def_boost")?,
                "use_sp_def_boost",
            )?,
        },
        MessageKind::CalculationReport => Payload::CalculationReport {
            damage: parse_u32(take_required(pairs, kind, "damage")?, "damage")?,
            defender_hp_after: parse_u32(
                take_required(pairs, kind, "defender_hp_after")?,
                "defender_hp_after",
            )?,
        },
        MessageKind::CalculationConfirm => Payload::CalculationConfirm,
        MessageKind::ResolutionRequest => Payload::ResolutionRequest {
            damage: parse_u32(take_required(pairs, kind, "damage")?, "damage")?,
            defender_hp_after: parse_u32(
                take_required(pairs, kind, "defender_hp_after")?,
                "defender_hp_after",
            )?,
        },
        MessageKind::GameOver => Payload::GameOver {
            winner: take_required(pairs, kind, "winner")?.to_string(),
            loser: take_required(pairs, kind, "loser")?.to_string(),
        },
        MessageKind::Chat => Payload::Chat {
            content_type: match take_required(pairs, kind, "content_type")? {
                "TEXT" => ContentType::Text,
                "STICKER" => ContentType::Sticker,
                other => {
                    return Err(DecodeError::InvalidValue {
                        field: "content_type",
                        value: other.to_string(),
                    })
                }
            },
            from: take_required(pairs, kind, "from")?.to_string(),
            payload: take_required(pairs, kind, "payload")?.to_string(),
        },
        MessageKind::Ack => unreachable!("ACK handled before payload decoding"),
    };
    Ok(payload)
}

/// Remove and return the first pair under `key`, if any.
fn take<'a>(pairs: &mut Vec<(&'a str, &'a str)>, key: &str) -> Option<&'a str> {
    let idx = pairs.iter().position(|(k, _)| *k == key)?;
    Some(pairs.remove(idx).1)
}

fn take_required<'a>(
    pairs: &mut Vec<(&'a str, &'a str)>,
    kind: MessageKind,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    take(pairs, field).ok_or(DecodeError::MissingField { kind, field })
}

fn parse_u32(value: &str, field: &'static str) -> Result<u32, DecodeError> {
    value.parse::<u32>().map_err(|_| DecodeError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_u8(value: &str, field: &'static str) -> Result<u8, DecodeError> {
    value.parse::<u8>().map_err(|_| DecodeError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_bool(value: &str, field: &'static str) -> Result<bool, DecodeError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DecodeError::InvalidValue { field, value: other.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(frame: &Frame) {
        let bytes = encode(frame);
        let decoded = decode(&bytes).expect("round trip decodes");
        assert_eq!(&decoded, frame);
    }

    #[test]
    fn test_roundtrip_every_kind() {
        let frames = [
            Frame::Message(Message::new(1, Payload::HandshakeRequest { name: "Bob".into() })),
            Frame::Message(Message::new(
                1,
                Payload::HandshakeResponse { name: "Alice".into(), seed: 12345 },
            )),
            Frame::Message(Message::new(1, Payload::SpectatorRequest { name: "Eve".into() })),
            Frame::Message(Message::new(
                2,
                Payload::BattleSetup {
                    pokemon: "Pikachu".into(),
                    hp: 35,
                    sp_atk_uses: 5,
                    sp_def_uses: 5,
                },
            )),
            Frame::Message(Message::new(
                3,
                Payload::AttackAnnounce { mv: "Thunderbolt".into(), use_sp_atk_boost: false },
            )),
            Frame::Message(Message::new(3, Payload::DefenseAnnounce { use_sp_def_boost: true })),
            Frame::Message(Message::new(
                4,
                Payload::CalculationReport { damage: 114, defender_hp_after: 0 },
            )),
            Frame::Message(Message::new(5, Payload::CalculationConfirm)),
            Frame::Message(Message::new(
                6,
                Payload::ResolutionRequest { damage: 41, defender_hp_after: 9 },
            )),
            Frame::Message(Message::new(
                7,
                Payload::GameOver { winner: "Pikachu".into(), loser: "Charmander".into() },
            )),
            Frame::Message(Message::new(
                8,
                Payload::Chat {
                    content_type: ContentType::Text,
                    from: "Alice".into(),
                    payload: "gg".into(),
                },
            )),
            Frame::Ack { ack: 7 },
        ];
        for frame in &frames {
            roundtrip(frame);
        }
    }

    #[test]
    fn test_encode_layout_matches_wire_example() {
        let frame = Frame::Message(Message::new(
            7,
            Payload::AttackAnnounce { mv: "Thunderbolt".into(), use_sp_atk_boost: false },
        ));
        let text = String::from_utf8(encode(&frame)).expect("utf8");
        assert_eq!(
            text,
            "type:ATTACK_ANNOUNCE\nsequence_number:7\nmove:Thunderbolt\nuse_sp_atk_boost:false\n"
        );

        let ack = String::from_utf8(encode(&Frame::Ack { ack: 7 })).expect("utf8");
        assert_eq!(ack, "type:ACK\nack:7\n");
    }

    #[test]
    fn test_decode_without_trailing_newline_and_crlf() {
        let frame = decode(b"type:ACK\nack:3").expect("no trailing newline");
        assert_eq!(frame, Frame::Ack { ack: 3 });

        let frame = decode(b"type:ACK\r\nack:3\r\n").expect("crlf");
        assert_eq!(frame, Frame::Ack { ack: 3 });
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let bytes = b"type:DEFENSE_ANNOUNCE\nsequence_number:9\nuse_sp_def_boost:false\nx_custom:hello\n";
        let frame = decode(bytes).expect("decodes with extras");
        let Frame::Message(msg) = &frame else {
            panic!("expected message");
        };
        assert_eq!(msg.extras, vec![("x_custom".to_string(), "hello".to_string())]);
        // Extras re-encode verbatim.
        assert_eq!(encode(&frame), bytes.to_vec());
    }

    #[test]
    fn test_value_may_contain_separator() {
        // Only the first ':' splits; the rest belongs to the value.
        let bytes = b"type:CHAT_MESSAGE\nsequence_number:2\ncontent_type:TEXT\nfrom:Bob\npayload:score 3:1\n";
        let frame = decode(bytes).expect("decodes");
        let Frame::Message(Message { payload: Payload::Chat { payload, .. }, .. }) = frame else {
            panic!("expected chat");
        };
        assert_eq!(payload, "score 3:1");
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode(b""), Err(DecodeError::Empty));
        assert_eq!(decode(b"\n\n"), Err(DecodeError::Empty));
        assert_eq!(
            decode(b"type:WARP_TEN\nsequence_number:1\n"),
            Err(DecodeError::UnknownType { found: "WARP_TEN".to_string(), seq: Some(1) })
        );
        assert_eq!(
            decode(b"type:HANDSHAKE_REQUEST\nsequence_number:1\n"),
            Err(DecodeError::MissingField { kind: MessageKind::HandshakeRequest, field: "name" })
        );
        assert_eq!(
            decode(b"type:ACK\nack:banana\n"),
            Err(DecodeError::InvalidValue { field: "ack", value: "banana".to_string() })
        );
        assert_eq!(
            decode(b"sequence_number:1\nname:Bob\n"),
            Err(DecodeError::MissingType)
        );
        assert!(matches!(decode(b"no separator here"), Err(DecodeError::MalformedLine { .. })));
        assert_eq!(decode(&[0xff, 0xfe]), Err(DecodeError::NotUtf8));
    }

    #[test]
    fn test_bool_values_are_strict() {
        let bytes = b"type:DEFENSE_ANNOUNCE\nsequence_number:1\nuse_sp_def_boost:yes\n";
        assert_eq!(
            decode(bytes),
            Err(DecodeError::InvalidValue {
                field: "use_sp_def_boost",
                value: "yes".to_string()
            })
        );
    }
}
