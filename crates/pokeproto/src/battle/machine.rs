// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The per-peer battle state machine.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use super::{BattleEvent, CommandError, Effect, Phase, TurnOwner};
use crate::catalog::{Catalog, MoveData, Species};
use crate::damage;
use crate::protocol::{ContentType, Payload};
use crate::rng::SharedRng;

/// The turn currently being resolved.
#[derive(Debug, Clone)]
struct PendingAttack {
    mv: MoveData,
    attacker_is_me: bool,
    /// Attacker boost flag after honoring (exhausted uses read as false).
    atk_boosted: bool,
    /// Defender boost flag, known once `DEFENSE_ANNOUNCE` is seen.
    def_boosted: Option<bool>,
    /// Damage and resulting defender HP as computed locally.
    local_report: Option<(u32, u32)>,
    /// Values agreed with the peer, once reports match (or resolution
    /// adopted the attacker's).
    agreed: Option<(u32, u32)>,
}

/// Deterministic turn-cycle state machine for one battling peer.
///
/// Owns the shared RNG stream; advances it exactly once per computed
/// attack so both peers stay in lockstep.
pub struct BattleMachine {
    catalog: Arc<Catalog>,
    phase: Phase,
    turn: TurnOwner,
    host_is_me: bool,
    opp_name: String,
    me: Species,
    opp: Option<Species>,
    my_hp: u32,
    opp_hp: u32,
    my_sp_atk_left: u8,
    my_sp_def_left: u8,
    opp_sp_atk_left: u8,
    opp_sp_def_left: u8,
    setup_sent: bool,
    setup_received: bool,
    /// Standing defender policy: spend a Sp.Def boost while uses remain.
    auto_def_boost: bool,
    pending: Option<PendingAttack>,
    rng: SharedRng,
}

impl BattleMachine {
    /// Build a machine right after the handshake settles the seed.
    pub fn new(
        catalog: Arc<Catalog>,
        me: Species,
        opp_name: String,
        seed: u32,
        host_is_me: bool,
        boost_uses: u8,
    ) -> Self {
        let my_hp = me.stats.hp;
        Self {
            catalog,
            phase: Phase::Setup,
            // Meaningful only once AWAIT_ATTACK is reached.
            turn: if host_is_me { TurnOwner::Me } else { TurnOwner::Opp },
            host_is_me,
            opp_name,
            me,
            opp: None,
            my_hp,
            opp_hp: 0,
            my_sp_atk_left: boost_uses,
            my_sp_def_left: boost_uses,
            opp_sp_atk_left: 0,
            opp_sp_def_left: 0,
            setup_sent: false,
            setup_received: false,
            auto_def_boost: false,
            pending: None,
            rng: SharedRng::new(seed),
        }
    }

    // ===================================================================
    // Accessors
    // ===================================================================

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn turn(&self) -> TurnOwner {
        self.turn
    }

    #[must_use]
    pub fn my_hp(&self) -> u32 {
        self.my_hp
    }

    #[must_use]
    pub fn opp_hp(&self) -> u32 {
        self.opp_hp
    }

    #[must_use]
    pub fn my_pokemon(&self) -> &Species {
        &self.me
    }

    #[must_use]
    pub fn opp_pokemon(&self) -> Option<&Species> {
        self.opp.as_ref()
    }

    #[must_use]
    pub fn boosts_left(&self) -> (u8, u8) {
        (self.my_sp_atk_left, self.my_sp_def_left)
    }

    /// Toggle the standing Sp.Def boost policy for incoming attacks.
    pub fn set_auto_def_boost(&mut self, on: bool) {
        self.auto_def_boost = on;
    }

    // ===================================================================
    // Local Commands
    // ===================================================================

    /// Emit our `BATTLE_SETUP`. Called once by the orchestrator after the
    /// handshake.
    pub fn start_setup(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::Send(Payload::BattleSetup {
            pokemon: self.me.name.clone(),
            hp: self.me.stats.hp,
            sp_atk_uses: self.my_sp_atk_left,
            sp_def_uses: self.my_sp_def_left,
        })];
        self.setup_sent = true;
        self.maybe_finish_setup(&mut effects);
        effects
    }

    /// User command: attack with `mv`, optionally spending a Sp.Atk boost.
    ///
    /// The boost flag is advisory; with no uses left it is silently
    /// treated as false, matching what the peer will compute.
    pub fn attack(&mut self, mv: &str, boost: bool) -> Result<Vec<Effect>, CommandError> {
        match self.phase {
            Phase::AwaitAttack => {}
            Phase::GameOver => return Err(CommandError::GameIsOver),
            _ => return Err(CommandError::TurnInProgress),
        }
        if self.turn != TurnOwner::Me {
            return Err(CommandError::NotYourTurn);
        }
        let mv = match self.catalog.move_data(mv) {
            Ok(data) => *data,
            Err(crate::catalog::CatalogError::UnknownMove { name, sample }) => {
                return Err(CommandError::UnknownMove { name, sample })
            }
            Err(_) => unreachable!("move lookup only fails as UnknownMove"),
        };
        if !self.me.knows(mv.name) {
            return Err(CommandError::MoveNotKnown {
                pokemon: self.me.name.clone(),
                mv: mv.name.to_string(),
            });
        }

        let honored = boost && self.my_sp_atk_left > 0;
        if honored {
            self.my_sp_atk_left -= 1;
        }
        self.pending = Some(PendingAttack {
            mv,
            attacker_is_me: true,
            atk_boosted: honored,
            def_boosted: None,
            local_report: None,
            agreed: None,
        });
        self.phase = Phase::AwaitDefenseAck;
        log::debug!("[battle] attacking with {} boost={}", mv.name, honored);
        Ok(vec![Effect::Send(Payload::AttackAnnounce {
            mv: mv.name.to_string(),
            use_sp_atk_boost: honored,
        })])
    }

    // ===================================================================
    // Peer Messages
    // ===================================================================

    /// Feed one delivered (deduplicated) peer payload through the machine.
    pub fn handle(&mut self, payload: &Payload) -> Vec<Effect> {
        // Chat flows in every phase and never touches battle state.
        if let Payload::Chat { content_type, from, payload } = payload {
            return self.on_chat(*content_type, from, payload);
        }
        if self.phase == Phase::GameOver {
            // Terminal state is absorbing.
            log::debug!("[battle] {} ignored in GAME_OVER", payload.kind());
            return Vec::new();
        }
        match payload {
            Payload::BattleSetup { pokemon, hp, sp_atk_uses, sp_def_uses } => {
                self.on_battle_setup(pokemon, *hp, *sp_atk_uses, *sp_def_uses)
            }
            Payload::AttackAnnounce { mv, use_sp_atk_boost } => {
                self.on_attack_announce(mv, *use_sp_atk_boost)
            }
            Payload::DefenseAnnounce { use_sp_def_boost } => {
                self.on_defense_announce(*use_sp_def_boost)
            }
            Payload::CalculationReport { damage, defender_hp_after } => {
                self.on_calculation_report(*damage, *defender_hp_after)
            }
            Payload::CalculationConfirm => self.on_calculation_confirm(),
            Payload::ResolutionRequest { damage, defender_hp_after } => {
                self.on_resolution_request(*damage, *defender_hp_after)
            }
            Payload::GameOver { winner, loser } => self.on_game_over(winner, loser),
            // Handshake traffic is the orchestrator's concern.
            other => {
                log::debug!("[battle] {} not a battle message, ignored", other.kind());
                Vec::new()
            }
        }
    }

    fn on_chat(&self, content_type: ContentType, from: &str, payload: &str) -> Vec<Effect> {
        match content_type {
            ContentType::Text => vec![Effect::Event(BattleEvent::ChatText {
                from: from.to_string(),
                text: payload.to_string(),
            })],
            ContentType::Sticker => match BASE64.decode(payload) {
                Ok(bytes) => vec![Effect::Event(BattleEvent::StickerReceived {
                    from: from.to_string(),
                    bytes,
                })],
                Err(err) => {
                    log::warn!("[battle] sticker from {} failed to decode: {}", from, err);
                    Vec::new()
                }
            },
        }
    }

    fn on_battle_setup(
        &mut self,
        pokemon: &str,
        hp: u32,
        sp_atk_uses: u8,
        sp_def_uses: u8,
    ) -> Vec<Effect> {
        if self.phase != Phase::Setup || self.setup_received {
            log::debug!("[battle] BATTLE_SETUP ignored in phase {}", self.phase);
            return Vec::new();
        }
        let species = match self.catalog.species(pokemon) {
            Ok(s) => s.clone(),
            Err(err) => {
                return vec![Effect::Event(BattleEvent::SetupFailed {
                    reason: err.to_string(),
                })]
            }
        };
        self.opp = Some(species);
        self.opp_hp = hp;
        self.opp_sp_atk_left = sp_atk_uses;
        self.opp_sp_def_left = sp_def_uses;
        self.setup_received = true;

        let mut effects = Vec::new();
        self.maybe_finish_setup(&mut effects);
        effects
    }

    fn maybe_finish_setup(&mut self, effects: &mut Vec<Effect>) {
        if self.phase == Phase::Setup && self.setup_sent && self.setup_received {
            self.phase = Phase::AwaitAttack;
            self.turn = if self.host_is_me { TurnOwner::Me } else { TurnOwner::Opp };
            effects.push(Effect::Event(BattleEvent::SetupComplete {
                opp_pokemon: self.opp.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
                opp_hp: self.opp_hp,
            }));
            effects.push(Effect::Event(BattleEvent::TurnStarted {
                mine: self.turn == TurnOwner::Me,
            }));
            log::info!(
                "[battle] setup complete, {} attacks first",
                if self.turn == TurnOwner::Me { "we" } else { "they" }
            );
        }
    }

    fn on_attack_announce(&mut self, mv: &str, use_sp_atk_boost: bool) -> Vec<Effect> {
        if self.phase != Phase::AwaitAttack || self.turn != TurnOwner::Opp {
            // Includes the tie-break: with turn == Me the attack is ours
            // to make, so a peer announce is dropped.
            log::debug!("[battle] ATTACK_ANNOUNCE ignored in phase {}", self.phase);
            return Vec::new();
        }
        let mv = match self.catalog.move_data(mv) {
            Ok(data) => *data,
            Err(err) => {
                log::warn!("[battle] peer announced unresolvable move: {}", err);
                return Vec::new();
            }
        };

        let atk_boosted = use_sp_atk_boost && self.opp_sp_atk_left > 0;
        if atk_boosted {
            self.opp_sp_atk_left -= 1;
        }
        let def_boosted = self.auto_def_boost && self.my_sp_def_left > 0;
        if def_boosted {
            self.my_sp_def_left -= 1;
        }

        self.pending = Some(PendingAttack {
            mv,
            attacker_is_me: false,
            atk_boosted,
            def_boosted: Some(def_boosted),
            local_report: None,
            agreed: None,
        });
        self.phase = Phase::AwaitCalcReports;
        vec![
            Effect::Event(BattleEvent::AttackIncoming {
                mv: mv.name.to_string(),
                boosted: atk_boosted,
            }),
            Effect::Send(Payload::DefenseAnnounce { use_sp_def_boost: def_boosted }),
        ]
    }

    fn on_defense_announce(&mut self, use_sp_def_boost: bool) -> Vec<Effect> {
        if self.phase != Phase::AwaitDefenseAck {
            log::debug!("[battle] DEFENSE_ANNOUNCE ignored in phase {}", self.phase);
            return Vec::new();
        }
        let Some(opp) = self.opp.clone() else {
            return Vec::new();
        };
        let Some(pending) = self.pending.as_mut() else {
            return Vec::new();
        };

        let def_boosted = use_sp_def_boost && self.opp_sp_def_left > 0;
        if def_boosted {
            self.opp_sp_def_left -= 1;
        }
        pending.def_boosted = Some(def_boosted);

        let roll = self.rng.roll();
        let dmg = damage::compute(
            &pending.mv,
            &self.me,
            &opp,
            pending.atk_boosted,
            def_boosted,
            roll,
        );
        let hp_after = self.opp_hp.saturating_sub(dmg);
        pending.local_report = Some((dmg, hp_after));
        self.phase = Phase::AwaitConfirm;
        log::debug!("[battle] computed damage={} defender_hp_after={}", dmg, hp_after);
        vec![Effect::Send(Payload::CalculationReport {
            damage: dmg,
            defender_hp_after: hp_after,
        })]
    }

    fn on_calculation_report(&mut self, damage: u32, defender_hp_after: u32) -> Vec<Effect> {
        match self.phase {
            // Defender: the attacker's report triggers our own computation.
            Phase::AwaitCalcReports => self.defender_check_report(damage, defender_hp_after),
            // Attacker: the defender echoed a report back.
            Phase::AwaitConfirm => self.attacker_check_report(damage, defender_hp_after),
            // Defender in resolution: the attacker re-sent; its values win.
            Phase::Resolving => self.adopt_attacker_values(damage, defender_hp_after),
            _ => {
                log::debug!("[battle] CALCULATION_REPORT ignored in phase {}", self.phase);
                Vec::new()
            }
        }
    }

    fn defender_check_report(&mut self, their_damage: u32, their_hp_after: u32) -> Vec<Effect> {
        let Some(opp) = self.opp.clone() else {
            return Vec::new();
        };
        let Some(pending) = self.pending.as_mut() else {
            return Vec::new();
        };
        let def_boosted = pending.def_boosted.unwrap_or(false);
        let roll = self.rng.roll();
        let dmg = damage::compute(&pending.mv, &opp, &self.me, pending.atk_boosted, def_boosted, roll);
        let hp_after = self.my_hp.saturating_sub(dmg);
        pending.local_report = Some((dmg, hp_after));

        if dmg == their_damage && hp_after == their_hp_after {
            pending.agreed = Some((dmg, hp_after));
            self.phase = Phase::AwaitConfirm;
            vec![Effect::Send(Payload::CalculationReport {
                damage: dmg,
                defender_hp_after: hp_after,
            })]
        } else {
            log::warn!(
                "[battle] damage discrepancy: ours={}/{} theirs={}/{}",
                dmg,
                hp_after,
                their_damage,
                their_hp_after
            );
            self.phase = Phase::Resolving;
            vec![
                Effect::Event(BattleEvent::DiscrepancyDetected {
                    ours: dmg,
                    theirs: their_damage,
                }),
                Effect::Send(Payload::ResolutionRequest {
                    damage: dmg,
                    defender_hp_after: hp_after,
                }),
            ]
        }
    }

    fn attacker_check_report(&mut self, damage: u32, defender_hp_after: u32) -> Vec<Effect> {
        let Some(pending) = self.pending.as_mut() else {
            return Vec::new();
        };
        if !pending.attacker_is_me {
            log::debug!("[battle] CALCULATION_REPORT ignored, not the attacker");
            return Vec::new();
        }
        if pending.local_report != Some((damage, defender_hp_after)) {
            // A disagreeing defender sends RESOLUTION_REQUEST, not a
            // report; anything else is noise.
            log::warn!(
                "[battle] defender report {}/{} does not match ours, ignored",
                damage,
                defender_hp_after
            );
            return Vec::new();
        }
        pending.agreed = Some((damage, defender_hp_after));
        let mut effects = vec![Effect::Send(Payload::CalculationConfirm)];
        effects.extend(self.apply_agreed_damage());
        effects
    }

    fn adopt_attacker_values(&mut self, damage: u32, defender_hp_after: u32) -> Vec<Effect> {
        let Some(pending) = self.pending.as_mut() else {
            return Vec::new();
        };
        // The attacker is the authority on its own roll.
        pending.agreed = Some((damage, defender_hp_after));
        pending.local_report = Some((damage, defender_hp_after));
        self.phase = Phase::AwaitConfirm;
        log::info!(
            "[battle] resolution: adopting attacker values {}/{}",
            damage,
            defender_hp_after
        );
        vec![Effect::Send(Payload::CalculationReport {
            damage,
            defender_hp_after,
        })]
    }

    fn on_calculation_confirm(&mut self) -> Vec<Effect> {
        if self.phase != Phase::AwaitConfirm {
            log::debug!("[battle] CALCULATION_CONFIRM ignored in phase {}", self.phase);
            return Vec::new();
        }
        let Some(pending) = self.pending.as_mut() else {
            return Vec::new();
        };
        if pending.agreed.is_none() {
            // Confirm can only settle agreed values.
            pending.agreed = pending.local_report;
        }
        let mut effects = vec![Effect::Send(Payload::CalculationConfirm)];
        effects.extend(self.apply_agreed_damage());
        effects
    }

    fn on_resolution_request(&mut self, damage: u32, defender_hp_after: u32) -> Vec<Effect> {
        if self.phase != Phase::AwaitConfirm {
            log::debug!("[battle] RESOLUTION_REQUEST ignored in phase {}", self.phase);
            return Vec::new();
        }
        let Some(pending) = self.pending.as_ref() else {
            return Vec::new();
        };
        if !pending.attacker_is_me {
            return Vec::new();
        }
        let Some((our_damage, our_hp_after)) = pending.local_report else {
            return Vec::new();
        };
        log::warn!(
            "[battle] defender requested resolution with {}/{}, re-sending ours {}/{}",
            damage,
            defender_hp_after,
            our_damage,
            our_hp_after
        );
        vec![
            Effect::Event(BattleEvent::DiscrepancyDetected {
                ours: our_damage,
                theirs: damage,
            }),
            Effect::Send(Payload::CalculationReport {
                damage: our_damage,
                defender_hp_after: our_hp_after,
            }),
        ]
    }

    fn on_game_over(&mut self, winner: &str, loser: &str) -> Vec<Effect> {
        self.phase = Phase::GameOver;
        self.pending = None;
        vec![Effect::Event(BattleEvent::BattleEnded {
            winner: winner.to_string(),
            loser: loser.to_string(),
            i_won: winner == self.me.name,
        })]
    }

    /// Apply the agreed damage of the finished exchange, flip the turn,
    /// and detect a win.
    fn apply_agreed_damage(&mut self) -> Vec<Effect> {
        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };
        let Some((dmg, hp_after)) = pending.agreed else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if pending.attacker_is_me {
            self.opp_hp = hp_after;
            effects.push(Effect::Event(BattleEvent::DamageApplied {
                damage: dmg,
                target_hp: hp_after,
                mine: false,
            }));
            if hp_after == 0 {
                self.phase = Phase::GameOver;
                let winner = self.me.name.clone();
                let loser = self
                    .opp
                    .as_ref()
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| self.opp_name.clone());
                effects.push(Effect::Send(Payload::GameOver {
                    winner: winner.clone(),
                    loser: loser.clone(),
                }));
                effects.push(Effect::Event(BattleEvent::BattleEnded {
                    winner,
                    loser,
                    i_won: true,
                }));
                return effects;
            }
        } else {
            self.my_hp = hp_after;
            effects.push(Effect::Event(BattleEvent::DamageApplied {
                damage: dmg,
                target_hp: hp_after,
                mine: true,
            }));
            if hp_after == 0 {
                // We lost; the attacker's GAME_OVER names the result.
                self.phase = Phase::GameOver;
                let winner = self
                    .opp
                    .as_ref()
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| self.opp_name.clone());
                effects.push(Effect::Event(BattleEvent::BattleEnded {
                    winner,
                    loser: self.me.name.clone(),
                    i_won: false,
                }));
                return effects;
            }
        }

        self.turn = match self.turn {
            TurnOwner::Me => TurnOwner::Opp,
            TurnOwner::Opp => TurnOwner::Me,
        };
        self.phase = Phase::AwaitAttack;
        effects.push(Effect::Event(BattleEvent::TurnStarted {
            mine: self.turn == TurnOwner::Me,
        }));
        effects
    }
}
