// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read-only spectator view.
//!
//! Spectators receive the battle traffic relayed by the host and fold it
//! into displayable events. They never emit battle messages themselves.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::protocol::{ContentType, Message, Payload};

/// Extra key the host attaches to relayed frames naming the originating
/// player. Unknown to plain peers, which carry it through as an extra.
pub const RELAY_ORIGIN_KEY: &str = "relay_origin";

/// Something a spectator should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpectatorEvent {
    Setup { origin: Option<String>, pokemon: String, hp: u32 },
    Attack { origin: Option<String>, mv: String, boosted: bool },
    Defense { origin: Option<String>, boosted: bool },
    Report { origin: Option<String>, damage: u32, defender_hp_after: u32 },
    Resolution { origin: Option<String>, damage: u32 },
    Ended { winner: String, loser: String },
    Chat { from: String, text: String },
    Sticker { from: String, bytes: Vec<u8> },
}

/// Folds relayed battle traffic into [`SpectatorEvent`]s and a rough HP
/// table.
#[derive(Debug, Default)]
pub struct SpectatorView {
    /// Combatant name -> last known HP, from setups and reports.
    hp: BTreeMap<String, u32>,
    /// Combatant name -> owning player, from relayed setups.
    owners: BTreeMap<String, String>,
    /// Player whose attack is currently being resolved.
    current_attacker: Option<String>,
    ended: bool,
}

impl SpectatorView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known HP per combatant.
    #[must_use]
    pub fn hp_table(&self) -> &BTreeMap<String, u32> {
        &self.hp
    }

    #[must_use]
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Fold one relayed message. Returns events to display, usually one.
    pub fn observe(&mut self, msg: &Message) -> Vec<SpectatorEvent> {
        if self.ended {
            return Vec::new();
        }
        let origin = msg
            .extras
            .iter()
            .find(|(k, _)| k == RELAY_ORIGIN_KEY)
            .map(|(_, v)| v.clone());

        match &msg.payload {
            Payload::BattleSetup { pokemon, hp, .. } => {
                self.hp.insert(pokemon.clone(), *hp);
                if let Some(player) = &origin {
                    self.owners.insert(pokemon.clone(), player.clone());
                }
                vec![SpectatorEvent::Setup {
                    origin,
                    pokemon: pokemon.clone(),
                    hp: *hp,
                }]
            }
            Payload::AttackAnnounce { mv, use_sp_atk_boost } => {
                self.current_attacker.clone_from(&origin);
                vec![SpectatorEvent::Attack {
                    origin,
                    mv: mv.clone(),
                    boosted: *use_sp_atk_boost,
                }]
            }
            Payload::DefenseAnnounce { use_sp_def_boost } => vec![SpectatorEvent::Defense {
                origin,
                boosted: *use_sp_def_boost,
            }],
            Payload::CalculationReport { damage, defender_hp_after } => {
                // Both sides' reports name the HP of the turn's defender:
                // the combatant not owned by the current attacker.
                if let Some(attacker) = &self.current_attacker {
                    let target = self
                        .owners
                        .iter()
                        .find(|(_, owner)| *owner != attacker)
                        .map(|(pokemon, _)| pokemon.clone());
                    if let Some(target) = target {
                        self.hp.insert(target, *defender_hp_after);
                    }
                }
                vec![SpectatorEvent::Report {
                    origin,
                    damage: *damage,
                    defender_hp_after: *defender_hp_after,
                }]
            }
            Payload::ResolutionRequest { damage, .. } => vec![SpectatorEvent::Resolution {
                origin,
                damage: *damage,
            }],
            Payload::GameOver { winner, loser } => {
                self.ended = true;
                self.hp.insert(loser.clone(), 0);
                vec![SpectatorEvent::Ended {
                    winner: winner.clone(),
                    loser: loser.clone(),
                }]
            }
            Payload::Chat { content_type, from, payload } => match content_type {
                ContentType::Text => vec![SpectatorEvent::Chat {
                    from: from.clone(),
                    text: payload.clone(),
                }],
                ContentType::Sticker => match BASE64.decode(payload) {
                    Ok(bytes) => vec![SpectatorEvent::Sticker { from: from.clone(), bytes }],
                    Err(err) => {
                        log::warn!("[spect] sticker from {} failed to decode: {}", from, err);
                        Vec::new()
                    }
                },
            },
            // Confirms and handshake traffic carry nothing to display.
            _ => Vec::new(),
        }
    }
}
