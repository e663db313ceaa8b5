// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Battle state machine: phases, turn ownership, the four-step turn
//! exchange, discrepancy resolution, and win detection.
//!
//! The machine is pure. Inputs are delivered peer payloads and local user
//! commands; outputs are [`Effect`]s the orchestrator executes (sends via
//! the reliability layer, events to the front end). Messages that do not
//! match the current phase are ignored here; the reliability layer has
//! already ACKed them.

mod machine;
mod spectator;

pub use machine::BattleMachine;
pub use spectator::{SpectatorEvent, SpectatorView, RELAY_ORIGIN_KEY};

use std::fmt;

/// Battle lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Exchanging `BATTLE_SETUP` messages.
    Setup,
    /// Waiting for an attack: ours (turn = Me) or the peer's (turn = Opp).
    AwaitAttack,
    /// Attacker side: announced, waiting for `DEFENSE_ANNOUNCE`.
    AwaitDefenseAck,
    /// Defender side: defense sent, waiting for the attacker's report.
    AwaitCalcReports,
    /// Reports exchanged, waiting for the confirm handshake.
    AwaitConfirm,
    /// Defender side: computed values disagreed, resolution in flight.
    Resolving,
    /// Terminal; no transitions leave this phase.
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Setup => "SETUP",
            Phase::AwaitAttack => "AWAIT_ATTACK",
            Phase::AwaitDefenseAck => "AWAIT_DEFENSE_ACK",
            Phase::AwaitCalcReports => "AWAIT_CALC_REPORTS",
            Phase::AwaitConfirm => "AWAIT_CONFIRM",
            Phase::Resolving => "RESOLVING",
            Phase::GameOver => "GAME_OVER",
        };
        f.write_str(s)
    }
}

/// Whose attack is expected while in [`Phase::AwaitAttack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOwner {
    Me,
    Opp,
}

/// An output of the state machine, executed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send this payload to the battle peer through the reliability layer.
    Send(crate::protocol::Payload),
    /// Surface this event to the front end.
    Event(BattleEvent),
}

/// User-visible battle happenings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    /// Both setups accounted for; the battle is live.
    SetupComplete { opp_pokemon: String, opp_hp: u32 },
    /// Somebody's attack is now expected.
    TurnStarted { mine: bool },
    /// The peer announced an attack against us.
    AttackIncoming { mv: String, boosted: bool },
    /// A turn's damage was agreed and applied.
    DamageApplied { damage: u32, target_hp: u32, mine: bool },
    /// Our computed values disagreed with the attacker's.
    DiscrepancyDetected { ours: u32, theirs: u32 },
    /// Terminal result.
    BattleEnded { winner: String, loser: String, i_won: bool },
    /// Plain-text chat line.
    ChatText { from: String, text: String },
    /// Decoded sticker bytes, ready for the persistence sink.
    StickerReceived { from: String, bytes: Vec<u8> },
    /// The peer's setup referenced data we cannot resolve; fatal.
    SetupFailed { reason: String },
}

/// Rejected user commands. State is unchanged when one of these comes
/// back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    NotYourTurn,
    /// A turn exchange is still in flight (or setup has not finished).
    TurnInProgress,
    GameIsOver,
    UnknownMove { name: String, sample: Vec<String> },
    MoveNotKnown { pokemon: String, mv: String },
    /// Chat text may not contain a newline (it would break the framing).
    InvalidChatText,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotYourTurn => f.write_str("it is not your turn"),
            CommandError::TurnInProgress => f.write_str("a turn is still being resolved"),
            CommandError::GameIsOver => f.write_str("the battle is over"),
            CommandError::UnknownMove { name, sample } => {
                write!(f, "unknown move '{}' (try one of: {})", name, sample.join(", "))
            }
            CommandError::MoveNotKnown { pokemon, mv } => {
                write!(f, "{} does not know {}", pokemon, mv)
            }
            CommandError::InvalidChatText => f.write_str("chat text may not contain newlines"),
        }
    }
}

impl std::error::Error for CommandError {}
