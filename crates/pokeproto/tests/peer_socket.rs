// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Whole-peer integration over real loopback sockets: handshake, setup,
//! turns, chat, stickers, spectator relay, and clean termination.

use std::sync::Arc;
use std::time::Duration;

use pokeproto::battle::{BattleEvent, SpectatorEvent};
use pokeproto::catalog::Catalog;
use pokeproto::peer::{Peer, PeerConfig, PeerEvent, Role};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn spawn_host(catalog: &Arc<Catalog>, pokemon: &str, seed: u32) -> Peer {
    Peer::spawn(
        PeerConfig {
            name: "Alice".into(),
            role: Role::Host,
            bind_port: 0,
            remote: None,
            pokemon: pokemon.into(),
            boost_uses: 5,
            seed: Some(seed),
        },
        Arc::clone(catalog),
    )
    .expect("host spawns")
}

fn spawn_joiner(catalog: &Arc<Catalog>, host: &Peer, pokemon: &str) -> Peer {
    Peer::spawn(
        PeerConfig {
            name: "Bob".into(),
            role: Role::Joiner,
            bind_port: 0,
            remote: Some(host.local_addr()),
            pokemon: pokemon.into(),
            boost_uses: 5,
            seed: None,
        },
        Arc::clone(catalog),
    )
    .expect("joiner spawns")
}

/// Wait for the first event matching `pred`, discarding others.
fn wait_for<F>(peer: &Peer, mut pred: F) -> PeerEvent
where
    F: FnMut(&PeerEvent) -> bool,
{
    let deadline = std::time::Instant::now() + EVENT_TIMEOUT;
    while let Ok(event) = peer
        .events()
        .recv_deadline(deadline)
    {
        if pred(&event) {
            return event;
        }
    }
    panic!("timed out waiting for event");
}

fn wait_for_turn(peer: &Peer, mine: bool) {
    wait_for(peer, |e| {
        matches!(e, PeerEvent::Battle(BattleEvent::TurnStarted { mine: m }) if *m == mine)
    });
}

#[test]
fn test_handshake_and_setup_over_udp() {
    // Scenario: host with seed 12345; joiner Bob sends the handshake.
    // Both land in AWAIT_ATTACK with the host holding the turn.
    let catalog = Arc::new(Catalog::builtin());
    let host = spawn_host(&catalog, "Pikachu", 12345);
    let joiner = spawn_joiner(&catalog, &host, "Charmander");

    let event = wait_for(&joiner, |e| matches!(e, PeerEvent::HandshakeComplete { .. }));
    let PeerEvent::HandshakeComplete { peer_name, seed } = event else {
        unreachable!();
    };
    assert_eq!(peer_name, "Alice");
    assert_eq!(seed, 12345);

    wait_for(&host, |e| matches!(e, PeerEvent::HandshakeComplete { .. }));
    wait_for(&host, |e| {
        matches!(e, PeerEvent::Battle(BattleEvent::SetupComplete { .. }))
    });
    wait_for(&joiner, |e| {
        matches!(e, PeerEvent::Battle(BattleEvent::SetupComplete { .. }))
    });
    wait_for_turn(&host, true);
    wait_for_turn(&joiner, false);

    let host_status = host.status().expect("host in battle");
    let joiner_status = joiner.status().expect("joiner in battle");
    assert!(host_status.my_turn);
    assert!(!joiner_status.my_turn);
    assert_eq!(host_status.opp_pokemon.as_deref(), Some("Charmander"));
    assert_eq!(joiner_status.opp_pokemon.as_deref(), Some("Pikachu"));
}

#[test]
fn test_one_turn_applies_identical_damage() {
    let catalog = Arc::new(Catalog::builtin());
    let host = spawn_host(&catalog, "Pikachu", 777);
    let joiner = spawn_joiner(&catalog, &host, "Snorlax");
    wait_for_turn(&host, true);
    wait_for_turn(&joiner, false);

    host.attack("Thunderbolt", false).expect("attack accepted");

    let event = wait_for(&joiner, |e| {
        matches!(e, PeerEvent::Battle(BattleEvent::DamageApplied { .. }))
    });
    let PeerEvent::Battle(BattleEvent::DamageApplied { damage: j_damage, mine: true, .. }) = event
    else {
        panic!("joiner should take the damage");
    };
    let event = wait_for(&host, |e| {
        matches!(e, PeerEvent::Battle(BattleEvent::DamageApplied { .. }))
    });
    let PeerEvent::Battle(BattleEvent::DamageApplied { damage: h_damage, mine: false, .. }) = event
    else {
        panic!("host should deal the damage");
    };
    assert_eq!(h_damage, j_damage);

    // Turn flipped on both sides.
    wait_for_turn(&host, false);
    wait_for_turn(&joiner, true);
    let host_status = host.status().expect("status");
    let joiner_status = joiner.status().expect("status");
    assert_eq!(host_status.opp_hp, joiner_status.my_hp);
    assert_eq!(host_status.my_hp, joiner_status.opp_hp);
}

#[test]
fn test_battle_to_game_over() {
    // Pikachu one-shots Gyarados (4x Thunderbolt); both peers terminate
    // cleanly and the handle drains without pending messages.
    let catalog = Arc::new(Catalog::builtin());
    let host = spawn_host(&catalog, "Pikachu", 31337);
    let joiner = spawn_joiner(&catalog, &host, "Gyarados");
    wait_for_turn(&host, true);
    wait_for_turn(&joiner, false);

    host.attack("Thunderbolt", false).expect("attack accepted");

    let event = wait_for(&host, |e| {
        matches!(e, PeerEvent::Battle(BattleEvent::BattleEnded { .. }))
    });
    assert!(matches!(
        event,
        PeerEvent::Battle(BattleEvent::BattleEnded { i_won: true, .. })
    ));
    let event = wait_for(&joiner, |e| {
        matches!(e, PeerEvent::Battle(BattleEvent::BattleEnded { .. }))
    });
    assert!(matches!(
        event,
        PeerEvent::Battle(BattleEvent::BattleEnded { i_won: false, .. })
    ));

    assert!(host.is_game_over());
    assert!(joiner.is_game_over());
    host.drain();
    joiner.drain();

    // Dead peers reject further commands.
    assert!(host.attack("Thunderbolt", false).is_err());
}

#[test]
fn test_chat_and_sticker_flow() {
    let catalog = Arc::new(Catalog::builtin());
    let host = spawn_host(&catalog, "Pikachu", 99);
    let joiner = spawn_joiner(&catalog, &host, "Charmander");
    wait_for_turn(&host, true);
    wait_for_turn(&joiner, false);

    joiner.chat("gl hf").expect("chat accepted");
    let event = wait_for(&host, |e| {
        matches!(e, PeerEvent::Battle(BattleEvent::ChatText { .. }))
    });
    assert_eq!(
        event,
        PeerEvent::Battle(BattleEvent::ChatText { from: "Bob".into(), text: "gl hf".into() })
    );

    // Newlines would break the line framing and are refused up front.
    assert!(joiner.chat("two\nlines").is_err());

    let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    host.sticker(&png).expect("sticker accepted");
    let event = wait_for(&joiner, |e| {
        matches!(e, PeerEvent::Battle(BattleEvent::StickerReceived { .. }))
    });
    let PeerEvent::Battle(BattleEvent::StickerReceived { from, bytes }) = event else {
        unreachable!();
    };
    assert_eq!(from, "Alice");
    assert_eq!(bytes, png);
}

#[test]
fn test_spectator_sees_the_battle() {
    let catalog = Arc::new(Catalog::builtin());
    let host = spawn_host(&catalog, "Pikachu", 2468);

    // Register the spectator before the battle so it sees both setups.
    let spectator = Peer::spawn(
        PeerConfig {
            name: "Eve".into(),
            role: Role::Spectator,
            bind_port: 0,
            remote: Some(host.local_addr()),
            pokemon: String::new(),
            boost_uses: 5,
            seed: None,
        },
        Arc::clone(&catalog),
    )
    .expect("spectator spawns");
    let event = wait_for(&spectator, |e| matches!(e, PeerEvent::HandshakeComplete { .. }));
    let PeerEvent::HandshakeComplete { seed, .. } = event else {
        unreachable!();
    };
    assert_eq!(seed, 2468, "spectator mirrors the host seed");

    let joiner = spawn_joiner(&catalog, &host, "Gyarados");
    wait_for_turn(&host, true);
    wait_for_turn(&joiner, false);

    // Both setups reach the spectator, attributed to their players.
    let mut setups = Vec::new();
    for _ in 0..2 {
        let event = wait_for(&spectator, |e| {
            matches!(e, PeerEvent::Spectate(SpectatorEvent::Setup { .. }))
        });
        let PeerEvent::Spectate(SpectatorEvent::Setup { origin, pokemon, .. }) = event else {
            unreachable!();
        };
        setups.push((origin, pokemon));
    }
    assert!(setups.contains(&(Some("Alice".into()), "Pikachu".into())));
    assert!(setups.contains(&(Some("Bob".into()), "Gyarados".into())));

    host.attack("Thunderbolt", false).expect("attack accepted");
    let event = wait_for(&spectator, |e| {
        matches!(e, PeerEvent::Spectate(SpectatorEvent::Attack { .. }))
    });
    assert_eq!(
        event,
        PeerEvent::Spectate(SpectatorEvent::Attack {
            origin: Some("Alice".into()),
            mv: "Thunderbolt".into(),
            boosted: false,
        })
    );

    // The one-shot ends it; the spectator sees the result.
    let event = wait_for(&spectator, |e| {
        matches!(e, PeerEvent::Spectate(SpectatorEvent::Ended { .. }))
    });
    assert_eq!(
        event,
        PeerEvent::Spectate(SpectatorEvent::Ended {
            winner: "Pikachu".into(),
            loser: "Gyarados".into(),
        })
    );
    assert!(spectator.is_game_over());
}
