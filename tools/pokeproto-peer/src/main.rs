// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! pokeproto-peer - interactive PokeProtocol battle peer.
//!
//! Hosts a battle, joins one, or spectates. Commands are read from stdin;
//! battle events are printed as they happen. Received stickers are saved
//! under `stickers/`.

use std::fs;
use std::io::{self, BufRead, Write as _};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use colored::Colorize;
use pokeproto::battle::{BattleEvent, SpectatorEvent};
use pokeproto::catalog::Catalog;
use pokeproto::config::{DEFAULT_BOOST_USES, DEFAULT_PORT};
use pokeproto::peer::{Peer, PeerConfig, PeerEvent, Role};

/// Poll period of the command/event loop.
const LOOP_TICK_MS: u64 = 50;

/// Peer-to-peer UDP battle client
#[derive(Parser, Debug)]
#[command(name = "pokeproto-peer")]
#[command(version)]
#[command(about = "Host, join, or spectate a PokeProtocol battle")]
struct Args {
    /// Display name
    #[arg(long, default_value = "Player")]
    name: String,

    /// Act as host (waits for the handshake, generates the seed, attacks first)
    #[arg(long, conflicts_with = "connect")]
    host: bool,

    /// Local UDP port to bind
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Act as joiner; send the handshake to this host address
    #[arg(long, value_name = "IP:PORT")]
    connect: Option<SocketAddr>,

    /// Combatant name (ignored for spectators)
    #[arg(long, default_value = "Pikachu")]
    pokemon: String,

    /// Act as spectator (requires --connect)
    #[arg(long, requires = "connect")]
    spectator: bool,

    /// Log every sent and received frame with its sequence number
    #[arg(long)]
    verbose: bool,

    /// Extra species file merged over the builtin catalog
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Special attack/defense boost uses granted at setup
    #[arg(long, default_value_t = DEFAULT_BOOST_USES)]
    boost_uses: u8,
}

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut catalog = Catalog::builtin();
    if let Some(path) = &args.catalog {
        catalog.load_species_file(path)?;
    }
    let catalog = Arc::new(catalog);

    let role = if args.spectator {
        Role::Spectator
    } else if args.connect.is_some() {
        Role::Joiner
    } else if args.host {
        Role::Host
    } else {
        return Err("pass --host, --connect <ip:port>, or --spectator".into());
    };

    let mut peer = Peer::spawn(
        PeerConfig {
            name: args.name.clone(),
            role,
            bind_port: args.port,
            remote: args.connect,
            pokemon: args.pokemon.clone(),
            boost_uses: args.boost_uses,
            seed: None,
        },
        Arc::clone(&catalog),
    )?;

    println!(
        "{} listening on {} as {}",
        "pokeproto".green().bold(),
        peer.local_addr(),
        match role {
            Role::Host => "host",
            Role::Joiner => "joiner",
            Role::Spectator => "spectator",
        }
    );
    if role != Role::Spectator {
        print_help();
    }

    // Stdin is its own blocking activity; lines flow in over a channel.
    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let mut connection_failed = false;
    'main: while running.load(Ordering::SeqCst) {
        for event in peer.events().try_iter() {
            if let PeerEvent::ConnectionFailed { seq, kind } = &event {
                eprintln!(
                    "{}: no ACK for seq={} ({}) after retries",
                    "connection failed".red().bold(),
                    seq,
                    kind
                );
                connection_failed = true;
                break 'main;
            }
            print_event(&event);
        }
        if peer.is_game_over() {
            break;
        }
        if peer.is_shutdown() {
            connection_failed = true;
            break;
        }

        match line_rx.recv_timeout(Duration::from_millis(LOOP_TICK_MS)) {
            Ok(line) => {
                if !handle_command(&peer, &catalog, line.trim()) {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    // Let the final ACK exchange finish before the socket closes.
    peer.drain();
    peer.shutdown();
    if connection_failed {
        return Err("session failed: peer stopped responding".into());
    }
    println!("{}", "bye".green());
    Ok(())
}

/// Execute one prompt line. Returns false to quit.
fn handle_command(peer: &Peer, catalog: &Catalog, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let result = match command {
        "quit" | "exit" => return false,
        "help" => {
            print_help();
            Ok(())
        }
        "attack" => {
            let (mv, boost) = match rest.strip_suffix(" boost") {
                Some(mv) => (mv, true),
                None => (rest, false),
            };
            peer.attack(mv.trim(), boost).map_err(|e| e.to_string())
        }
        "guard" => match rest.trim() {
            "on" => peer.set_auto_def_boost(true).map_err(|e| e.to_string()),
            "off" => peer.set_auto_def_boost(false).map_err(|e| e.to_string()),
            _ => Err("usage: guard on|off".to_string()),
        },
        "chat" => peer.chat(rest).map_err(|e| e.to_string()),
        "sticker" => match fs::read(rest.trim()) {
            Ok(bytes) => peer.sticker(&bytes).map_err(|e| e.to_string()),
            Err(err) => Err(format!("cannot read '{}': {}", rest.trim(), err)),
        },
        "moves" => {
            match peer.status() {
                Some(status) => match catalog.species(&status.my_pokemon) {
                    Ok(species) => println!("  {}", species.moves.join(", ")),
                    Err(err) => println!("  {}", err),
                },
                None => println!("  not in a battle yet"),
            }
            Ok(())
        }
        "status" => {
            print_status(peer);
            Ok(())
        }
        other => Err(format!("unknown command '{}' (try 'help')", other)),
    };
    if let Err(msg) = result {
        println!("{} {}", "!".yellow().bold(), msg);
    }
    true
}

fn print_help() {
    println!("commands:");
    println!("  attack <move> [boost]   announce an attack (optionally spend a Sp.Atk boost)");
    println!("  guard on|off            spend Sp.Def boosts on incoming attacks");
    println!("  chat <text>             send a chat line");
    println!("  sticker <file>          send an image as a sticker");
    println!("  moves                   list your combatant's moves");
    println!("  status                  show the battle state");
    println!("  quit                    leave");
}

fn print_status(peer: &Peer) {
    match peer.status() {
        Some(s) => {
            println!(
                "  {} {} HP {}  |  {} {} HP  |  boosts atk:{} def:{}  |  {}",
                s.my_pokemon.green().bold(),
                s.my_hp,
                if s.my_turn { "(your turn)".cyan() } else { "".normal() },
                s.opp_pokemon.unwrap_or_else(|| "???".to_string()).red().bold(),
                s.opp_hp,
                s.sp_atk_uses_left,
                s.sp_def_uses_left,
                s.phase,
            );
        }
        None => println!("  waiting for the handshake"),
    }
}

fn print_event(event: &PeerEvent) {
    match event {
        PeerEvent::HandshakeComplete { peer_name, seed } => {
            println!("{} {} (seed {})", "connected to".green(), peer_name.bold(), seed);
        }
        PeerEvent::Battle(event) => print_battle_event(event),
        PeerEvent::Spectate(event) => print_spectator_event(event),
        PeerEvent::ConnectionFailed { .. } => {}
    }
}

fn print_battle_event(event: &BattleEvent) {
    match event {
        BattleEvent::SetupComplete { opp_pokemon, opp_hp } => {
            println!("{} {} ({} HP)", "opponent sent out".yellow(), opp_pokemon.bold(), opp_hp);
        }
        BattleEvent::TurnStarted { mine } => {
            if *mine {
                println!("{}", "your turn - attack <move> [boost]".cyan().bold());
            } else {
                println!("{}", "waiting for the opponent's move...".dimmed());
            }
        }
        BattleEvent::AttackIncoming { mv, boosted } => {
            println!(
                "{} {}{}",
                "incoming:".red(),
                mv.bold(),
                if *boosted { " (boosted)" } else { "" }
            );
        }
        BattleEvent::DamageApplied { damage, target_hp, mine } => {
            let side = if *mine { "you take" } else { "opponent takes" };
            println!("{} {} damage -> {} HP left", side, damage, target_hp);
        }
        BattleEvent::DiscrepancyDetected { ours, theirs } => {
            println!(
                "{} ours={} theirs={} (attacker's values win)",
                "damage mismatch:".yellow(),
                ours,
                theirs
            );
        }
        BattleEvent::BattleEnded { winner, loser, i_won } => {
            if *i_won {
                println!("{} {} defeated {}", "you win!".green().bold(), winner, loser);
            } else {
                println!("{} {} defeated {}", "you lose.".red().bold(), winner, loser);
            }
        }
        BattleEvent::ChatText { from, text } => {
            println!("{} {}", format!("[{}]", from).blue().bold(), text);
        }
        BattleEvent::StickerReceived { from, bytes } => match save_sticker(from, bytes) {
            Ok(path) => println!("{} saved to {}", format!("[{}] sticker", from).blue(), path),
            Err(err) => println!("{} sticker from {} not saved: {}", "!".yellow(), from, err),
        },
        BattleEvent::SetupFailed { reason } => {
            println!("{} {}", "setup failed:".red().bold(), reason);
        }
    }
}

fn print_spectator_event(event: &SpectatorEvent) {
    let who = |origin: &Option<String>| {
        origin.clone().unwrap_or_else(|| "?".to_string())
    };
    match event {
        SpectatorEvent::Setup { origin, pokemon, hp } => {
            println!("{} sent out {} ({} HP)", who(origin).bold(), pokemon, hp);
        }
        SpectatorEvent::Attack { origin, mv, boosted } => {
            println!(
                "{} used {}{}",
                who(origin).bold(),
                mv,
                if *boosted { " (boosted)" } else { "" }
            );
        }
        SpectatorEvent::Defense { origin, boosted } => {
            if *boosted {
                println!("{} braces (Sp.Def boost)", who(origin).bold());
            }
        }
        SpectatorEvent::Report { origin, damage, defender_hp_after } => {
            println!(
                "{} reports {} damage -> defender at {} HP",
                who(origin).bold(),
                damage,
                defender_hp_after
            );
        }
        SpectatorEvent::Resolution { origin, damage } => {
            println!("{} disputes the damage ({})", who(origin).bold(), damage);
        }
        SpectatorEvent::Ended { winner, loser } => {
            println!("{} {} defeated {}", "battle over:".green().bold(), winner, loser);
        }
        SpectatorEvent::Chat { from, text } => {
            println!("{} {}", format!("[{}]", from).blue().bold(), text);
        }
        SpectatorEvent::Sticker { from, bytes } => match save_sticker(from, bytes) {
            Ok(path) => println!("{} saved to {}", format!("[{}] sticker", from).blue(), path),
            Err(err) => println!("{} sticker from {} not saved: {}", "!".yellow(), from, err),
        },
    }
}

/// Persist sticker bytes as `stickers/sticker_<sender>_<unix-ms>.png`.
fn save_sticker(from: &str, bytes: &[u8]) -> io::Result<String> {
    fs::create_dir_all("stickers")?;
    let unix_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let path = format!("stickers/sticker_{}_{}.png", from, unix_ms);
    let mut file = fs::File::create(&path)?;
    file.write_all(bytes)?;
    Ok(path)
}
