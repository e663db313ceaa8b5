// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # PokeProtocol - peer-to-peer UDP battle protocol
//!
//! A pure Rust implementation of a two-player, turn-based battle protocol
//! over UDP, with optional read-only spectators. Two endpoints shake
//! hands, agree on a random seed, set up their combatants, then drive a
//! deterministic turn cycle: announce, acknowledge, independently compute
//! damage, confirm.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pokeproto::catalog::Catalog;
//! use pokeproto::peer::{Peer, PeerConfig, Role};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Arc::new(Catalog::builtin());
//!     let peer = Peer::spawn(
//!         PeerConfig {
//!             name: "Alice".into(),
//!             role: Role::Host,
//!             pokemon: "Pikachu".into(),
//!             ..PeerConfig::default()
//!         },
//!         catalog,
//!     )?;
//!     for event in peer.events().iter() {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                        Front End (CLI)                       |
//! |        commands in  -  events out  -  sticker sink           |
//! +--------------------------------------------------------------+
//! |                        Peer Orchestrator                     |
//! |   socket  |  network reader  |  retransmit ticker  |  relay  |
//! +--------------------------------------------------------------+
//! |    Battle State Machine     |      Reliability Layer         |
//! |  phases, turns, resolution  |  seq, ACK, retransmit, dedup   |
//! +--------------------------------------------------------------+
//! |   Damage Engine + Shared RNG   |        Wire Codec           |
//! +--------------------------------------------------------------+
//! |              Combatant Catalog (species, moves)              |
//! +--------------------------------------------------------------+
//! ```
//!
//! Because UDP is lossy and unordered, every non-ACK datagram carries a
//! sequence number, is individually acknowledged, and is retransmitted on
//! timeout with bounded retries. Duplicates are suppressed by a bounded
//! `(sender, sequence)` window; ordering is enforced by the battle
//! machine's phase checks, not by the transport.

/// Battle state machine (phases, turn cycle, resolution, spectator view).
pub mod battle;
/// Combatant catalog: species stat blocks, move table, type chart.
pub mod catalog;
/// Protocol constants - single source of truth.
pub mod config;
/// Deterministic damage formula.
pub mod damage;
/// Peer orchestrator: socket, background activities, commands, events.
pub mod peer;
/// Wire codec (`key:value` line framing).
pub mod protocol;
/// Reliability layer over UDP (sequencing, ACK, retransmit, dedup).
pub mod reliability;
/// Shared deterministic random stream.
pub mod rng;

pub use battle::{BattleEvent, BattleMachine, CommandError, Phase, TurnOwner};
pub use catalog::{Catalog, CatalogError, Species};
pub use peer::{Peer, PeerConfig, PeerError, PeerEvent, Role, StatusReport};
pub use protocol::{DecodeError, Frame, Message, MessageKind, Payload};
