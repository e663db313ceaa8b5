// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Peer orchestrator.
//!
//! Owns the UDP socket, binds the codec, reliability layer, and battle
//! state machine together, and runs the two background activities: the
//! network reader (blocking receive) and the retransmit ticker. User
//! commands arrive on the caller's thread; events flow out through a
//! channel. One mutex guards the session state and is never held across a
//! socket write.

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use socket2::{Domain, Protocol as SockProtocol, Socket, Type};

use crate::battle::{
    BattleEvent, BattleMachine, CommandError, Effect, Phase, SpectatorEvent, SpectatorView,
    TurnOwner, RELAY_ORIGIN_KEY,
};
use crate::catalog::{Catalog, CatalogError, Species};
use crate::config::{
    retransmit_tick, DEFAULT_BOOST_USES, DEFAULT_PORT, GAME_OVER_GRACE_MS, MAX_DATAGRAM_SIZE,
    SOCKET_READ_TIMEOUT_MS,
};
use crate::protocol::{ContentType, Message, MessageKind, Payload};
use crate::reliability::Reliability;

// =======================================================================
// Configuration
// =======================================================================

/// Which side of the protocol this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Waits for the handshake, generates the seed, attacks first.
    Host,
    /// Sends `HANDSHAKE_REQUEST` to the host.
    Joiner,
    /// Read-only; sends `SPECTATOR_REQUEST` and displays the relay.
    Spectator,
}

/// Startup parameters of a peer.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Display name used in chat and the handshake.
    pub name: String,
    pub role: Role,
    /// Local UDP port to bind.
    pub bind_port: u16,
    /// Host address; required for joiner and spectator roles.
    pub remote: Option<SocketAddr>,
    /// Combatant name; ignored for spectators.
    pub pokemon: String,
    /// Boost uses granted at setup.
    pub boost_uses: u8,
    /// Fixed seed for the host (random when unset). Joiners mirror the
    /// host's seed and ignore this.
    pub seed: Option<u32>,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            role: Role::Host,
            bind_port: DEFAULT_PORT,
            remote: None,
            pokemon: "Pikachu".to_string(),
            boost_uses: DEFAULT_BOOST_USES,
            seed: None,
        }
    }
}

// =======================================================================
// Errors & Events
// =======================================================================

/// Fatal and user-facing peer failures.
#[derive(Debug)]
pub enum PeerError {
    Io(io::Error),
    Catalog(CatalogError),
    Command(CommandError),
    /// Joiner or spectator configured without a host address.
    MissingRemote,
    /// A command needs a connected battle peer.
    NotConnected,
    /// Spectators cannot issue battle commands.
    SpectatorsDontBattle,
}

impl fmt::Display for PeerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerError::Io(err) => write!(f, "socket: {}", err),
            PeerError::Catalog(err) => write!(f, "{}", err),
            PeerError::Command(err) => write!(f, "{}", err),
            PeerError::MissingRemote => f.write_str("this role requires a host address"),
            PeerError::NotConnected => f.write_str("no battle peer connected yet"),
            PeerError::SpectatorsDontBattle => f.write_str("spectators only watch"),
        }
    }
}

impl std::error::Error for PeerError {}

impl From<io::Error> for PeerError {
    fn from(err: io::Error) -> Self {
        PeerError::Io(err)
    }
}

impl From<CatalogError> for PeerError {
    fn from(err: CatalogError) -> Self {
        PeerError::Catalog(err)
    }
}

impl From<CommandError> for PeerError {
    fn from(err: CommandError) -> Self {
        PeerError::Command(err)
    }
}

/// Everything the front end can observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// Handshake settled: we know the peer and the shared seed.
    HandshakeComplete { peer_name: String, seed: u32 },
    Battle(BattleEvent),
    Spectate(SpectatorEvent),
    /// A message exhausted its retries; the session is dead.
    ConnectionFailed { seq: u32, kind: MessageKind },
}

/// Point-in-time battle status for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub phase: Phase,
    pub my_turn: bool,
    pub my_pokemon: String,
    pub my_hp: u32,
    pub opp_pokemon: Option<String>,
    pub opp_hp: u32,
    pub sp_atk_uses_left: u8,
    pub sp_def_uses_left: u8,
}

// =======================================================================
// Session State
// =======================================================================

struct SessionState {
    peer_addr: Option<SocketAddr>,
    peer_name: Option<String>,
    seed: Option<u32>,
    machine: Option<BattleMachine>,
    view: Option<SpectatorView>,
    spectators: Vec<SocketAddr>,
    game_over: bool,
}

struct PeerInner {
    config: PeerConfig,
    catalog: Arc<Catalog>,
    /// Resolved at spawn so a catalog miss fails before any traffic.
    my_species: Option<Species>,
    reliability: Reliability,
    state: Mutex<SessionState>,
    events: Sender<PeerEvent>,
    shutdown: AtomicBool,
}

/// A queued outbound frame, executed after the state lock is released.
struct OutFrame {
    payload: Payload,
    extras: Vec<(String, String)>,
    dest: SocketAddr,
}

impl OutFrame {
    fn plain(payload: Payload, dest: SocketAddr) -> Self {
        Self { payload, extras: Vec::new(), dest }
    }

    fn relayed(payload: Payload, origin: &str, dest: SocketAddr) -> Self {
        Self {
            payload,
            extras: vec![(RELAY_ORIGIN_KEY.to_string(), origin.to_string())],
            dest,
        }
    }
}

// =======================================================================
// Peer Handle
// =======================================================================

/// A running peer: socket, reader thread, retransmit ticker, and the
/// event stream. Dropping the handle shuts everything down.
pub struct Peer {
    inner: Arc<PeerInner>,
    events: Receiver<PeerEvent>,
    local_addr: SocketAddr,
    reader: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
}

impl Peer {
    /// Bind the socket, start the background activities, and kick off the
    /// handshake appropriate to the configured role.
    pub fn spawn(config: PeerConfig, catalog: Arc<Catalog>) -> Result<Self, PeerError> {
        if config.role != Role::Host && config.remote.is_none() {
            return Err(PeerError::MissingRemote);
        }
        let my_species = if config.role == Role::Spectator {
            None
        } else {
            Some(catalog.species(&config.pokemon)?.clone())
        };

        let socket = Arc::new(bind_socket(config.bind_port)?);
        let local_addr = socket.local_addr()?;
        log::info!("[peer] {} bound to {} as {:?}", config.name, local_addr, config.role);

        let (tx, rx) = channel::unbounded();
        let seed = match config.role {
            Role::Host => Some(config.seed.unwrap_or_else(entropy_seed)),
            _ => None,
        };
        let inner = Arc::new(PeerInner {
            config,
            catalog,
            my_species,
            reliability: Reliability::new(Arc::clone(&socket)),
            state: Mutex::new(SessionState {
                peer_addr: None,
                peer_name: None,
                seed,
                machine: None,
                view: None,
                spectators: Vec::new(),
                game_over: false,
            }),
            events: tx,
            shutdown: AtomicBool::new(false),
        });

        let reader = {
            let inner = Arc::clone(&inner);
            let socket = Arc::clone(&socket);
            thread::Builder::new()
                .name("pokeproto-reader".to_string())
                .spawn(move || reader_loop(&inner, &socket))?
        };
        let ticker = {
            let inner = Arc::clone(&inner);
            thread::Builder::new()
                .name("pokeproto-ticker".to_string())
                .spawn(move || ticker_loop(&inner))?
        };

        let peer = Self {
            inner,
            events: rx,
            local_addr,
            reader: Some(reader),
            ticker: Some(ticker),
        };
        peer.start_handshake()?;
        Ok(peer)
    }

    fn start_handshake(&self) -> Result<(), PeerError> {
        let inner = &self.inner;
        match inner.config.role {
            Role::Host => {}
            Role::Joiner => {
                let remote = inner.config.remote.ok_or(PeerError::MissingRemote)?;
                inner.reliability.send(
                    Payload::HandshakeRequest { name: inner.config.name.clone() },
                    remote,
                )?;
            }
            Role::Spectator => {
                let remote = inner.config.remote.ok_or(PeerError::MissingRemote)?;
                inner.reliability.send(
                    Payload::SpectatorRequest { name: inner.config.name.clone() },
                    remote,
                )?;
            }
        }
        Ok(())
    }

    /// Address the socket actually bound (useful with port 0).
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Event stream for the front end.
    #[must_use]
    pub fn events(&self) -> &Receiver<PeerEvent> {
        &self.events
    }

    /// User command: attack with `mv`, optionally spending a boost.
    pub fn attack(&self, mv: &str, boost: bool) -> Result<(), PeerError> {
        if self.inner.config.role == Role::Spectator {
            return Err(PeerError::SpectatorsDontBattle);
        }
        let (out, events) = {
            let mut st = self.inner.state.lock();
            let peer_addr = st.peer_addr.ok_or(PeerError::NotConnected)?;
            let machine = st.machine.as_mut().ok_or(PeerError::NotConnected)?;
            let effects = machine.attack(mv, boost)?;
            self.inner.collect_effects(&mut st, effects, peer_addr)
        };
        self.inner.execute(out, events);
        Ok(())
    }

    /// Standing policy: spend a Sp.Def boost on incoming attacks.
    pub fn set_auto_def_boost(&self, on: bool) -> Result<(), PeerError> {
        let mut st = self.inner.state.lock();
        let machine = st.machine.as_mut().ok_or(PeerError::NotConnected)?;
        machine.set_auto_def_boost(on);
        Ok(())
    }

    /// Send a text chat line to everyone in the session.
    pub fn chat(&self, text: &str) -> Result<(), PeerError> {
        if text.contains('\n') || text.contains('\r') {
            return Err(PeerError::Command(CommandError::InvalidChatText));
        }
        self.send_chat(ContentType::Text, text.to_string())
    }

    /// Send sticker bytes (base64 on the wire) to everyone in the session.
    pub fn sticker(&self, bytes: &[u8]) -> Result<(), PeerError> {
        self.send_chat(ContentType::Sticker, BASE64.encode(bytes))
    }

    fn send_chat(&self, content_type: ContentType, payload: String) -> Result<(), PeerError> {
        let inner = &self.inner;
        let chat = Payload::Chat {
            content_type,
            from: inner.config.name.clone(),
            payload,
        };
        let out = {
            let st = inner.state.lock();
            let mut out = Vec::new();
            if let Some(peer_addr) = st.peer_addr {
                out.push(OutFrame::plain(chat.clone(), peer_addr));
            } else if inner.config.role != Role::Host {
                return Err(PeerError::NotConnected);
            }
            for spectator in &st.spectators {
                out.push(OutFrame::relayed(chat.clone(), &inner.config.name, *spectator));
            }
            out
        };
        inner.execute(out, Vec::new());
        Ok(())
    }

    /// Battle status, once setup has begun.
    #[must_use]
    pub fn status(&self) -> Option<StatusReport> {
        let st = self.inner.state.lock();
        let machine = st.machine.as_ref()?;
        let (sp_atk, sp_def) = machine.boosts_left();
        Some(StatusReport {
            phase: machine.phase(),
            my_turn: machine.turn() == TurnOwner::Me,
            my_pokemon: machine.my_pokemon().name.clone(),
            my_hp: machine.my_hp(),
            opp_pokemon: machine.opp_pokemon().map(|s| s.name.clone()),
            opp_hp: machine.opp_hp(),
            sp_atk_uses_left: sp_atk,
            sp_def_uses_left: sp_def,
        })
    }

    /// Whether the battle reached its terminal phase.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.inner.state.lock().game_over
    }

    /// Whether a fatal failure or shutdown stopped the peer.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    /// Block until every pending message is ACKed or the grace window
    /// elapses. Called before exiting after `GAME_OVER`.
    pub fn drain(&self) {
        let deadline = Instant::now() + Duration::from_millis(GAME_OVER_GRACE_MS);
        while self.inner.reliability.pending_len() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
    }

    /// Stop the background threads and close the socket.
    pub fn shutdown(&mut self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.ticker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Peer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// =======================================================================
// Background Activities
// =======================================================================

fn reader_loop(inner: &PeerInner, socket: &UdpSocket) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    while !inner.shutdown.load(Ordering::SeqCst) {
        match socket.recv_from(&mut buf) {
            Ok((len, from)) => {
                if let Some(msg) = inner.reliability.on_datagram(&buf[..len], from) {
                    inner.dispatch(msg, from);
                }
            }
            Err(err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::TimedOut =>
            {
                // Read timeout; loop to observe the shutdown flag.
            }
            Err(err) => {
                log::error!("[peer] socket receive failed: {}", err);
                break;
            }
        }
    }
    log::debug!("[peer] reader stopped");
}

fn ticker_loop(inner: &PeerInner) {
    while !inner.shutdown.load(Ordering::SeqCst) {
        thread::sleep(retransmit_tick());
        for give_up in inner.reliability.sweep(Instant::now()) {
            log::error!(
                "[peer] connection failed: seq={} kind={}",
                give_up.seq,
                give_up.kind
            );
            let _ = inner.events.send(PeerEvent::ConnectionFailed {
                seq: give_up.seq,
                kind: give_up.kind,
            });
            inner.state.lock().game_over = true;
            inner.shutdown.store(true, Ordering::SeqCst);
        }
    }
    log::debug!("[peer] ticker stopped");
}

// =======================================================================
// Inbound Dispatch
// =======================================================================

impl PeerInner {
    /// Route one delivered message. State is mutated under the lock;
    /// socket writes and event emission happen after it is released.
    fn dispatch(&self, msg: Message, from: SocketAddr) {
        let (out, events) = {
            let mut st = self.state.lock();
            match (&msg.payload, self.config.role) {
                (Payload::HandshakeRequest { name }, Role::Host) => {
                    self.on_handshake_request(&mut st, name.clone(), from)
                }
                (Payload::HandshakeResponse { name, seed }, Role::Joiner) => {
                    self.on_handshake_response(&mut st, name.clone(), *seed, from)
                }
                (Payload::HandshakeResponse { name, seed }, Role::Spectator) => {
                    st.peer_addr = Some(from);
                    st.peer_name = Some(name.clone());
                    st.seed = Some(*seed);
                    st.view = Some(SpectatorView::new());
                    (
                        Vec::new(),
                        vec![PeerEvent::HandshakeComplete { peer_name: name.clone(), seed: *seed }],
                    )
                }
                (Payload::SpectatorRequest { name }, Role::Host) => {
                    self.on_spectator_request(&mut st, name, from)
                }
                (_, Role::Spectator) => self.on_spectated(&mut st, &msg),
                _ => self.on_battle_message(&mut st, &msg, from),
            }
        };
        self.execute(out, events);
    }

    fn on_handshake_request(
        &self,
        st: &mut SessionState,
        name: String,
        from: SocketAddr,
    ) -> (Vec<OutFrame>, Vec<PeerEvent>) {
        if let Some(existing) = st.peer_addr {
            if existing != from {
                log::warn!("[peer] handshake from {} refused, battling {}", from, existing);
            }
            return (Vec::new(), Vec::new());
        }
        let seed = st.seed.unwrap_or_else(entropy_seed);
        st.seed = Some(seed);
        st.peer_addr = Some(from);
        st.peer_name = Some(name.clone());
        log::info!("[peer] {} joined from {}, seed={}", name, from, seed);

        let mut out = vec![OutFrame::plain(
            Payload::HandshakeResponse { name: self.config.name.clone(), seed },
            from,
        )];
        let mut events = vec![PeerEvent::HandshakeComplete { peer_name: name.clone(), seed }];

        let machine = self.build_machine(name, seed, true);
        let effects = match machine {
            Some(mut machine) => {
                let fx = machine.start_setup();
                st.machine = Some(machine);
                fx
            }
            None => Vec::new(),
        };
        let (mut fx_out, mut fx_events) = self.collect_effects(st, effects, from);
        out.append(&mut fx_out);
        events.append(&mut fx_events);
        (out, events)
    }

    fn on_handshake_response(
        &self,
        st: &mut SessionState,
        name: String,
        seed: u32,
        from: SocketAddr,
    ) -> (Vec<OutFrame>, Vec<PeerEvent>) {
        if st.machine.is_some() {
            // Duplicate response after a lost ACK; already set up.
            return (Vec::new(), Vec::new());
        }
        st.peer_addr = Some(from);
        st.peer_name = Some(name.clone());
        st.seed = Some(seed);
        log::info!("[peer] handshake with {} complete, seed={}", name, seed);

        let mut events = vec![PeerEvent::HandshakeComplete { peer_name: name.clone(), seed }];
        let effects = match self.build_machine(name, seed, false) {
            Some(mut machine) => {
                let fx = machine.start_setup();
                st.machine = Some(machine);
                fx
            }
            None => Vec::new(),
        };
        let (out, mut fx_events) = self.collect_effects(st, effects, from);
        events.append(&mut fx_events);
        (out, events)
    }

    fn on_spectator_request(
        &self,
        st: &mut SessionState,
        name: &str,
        from: SocketAddr,
    ) -> (Vec<OutFrame>, Vec<PeerEvent>) {
        if !st.spectators.contains(&from) {
            st.spectators.push(from);
            log::info!("[peer] spectator {} registered from {}", name, from);
        }
        let seed = st.seed.unwrap_or_else(entropy_seed);
        st.seed = Some(seed);
        (
            vec![OutFrame::plain(
                Payload::HandshakeResponse { name: self.config.name.clone(), seed },
                from,
            )],
            Vec::new(),
        )
    }

    fn on_spectated(
        &self,
        st: &mut SessionState,
        msg: &Message,
    ) -> (Vec<OutFrame>, Vec<PeerEvent>) {
        let Some(view) = st.view.as_mut() else {
            return (Vec::new(), Vec::new());
        };
        let events = view
            .observe(msg)
            .into_iter()
            .map(PeerEvent::Spectate)
            .collect();
        if view.ended() {
            st.game_over = true;
        }
        (Vec::new(), events)
    }

    fn on_battle_message(
        &self,
        st: &mut SessionState,
        msg: &Message,
        from: SocketAddr,
    ) -> (Vec<OutFrame>, Vec<PeerEvent>) {
        // Chat from registered spectators is displayed and relayed; any
        // other battle traffic must come from the battle peer.
        if st.peer_addr != Some(from) {
            if let Payload::Chat { content_type, from: sender, payload } = &msg.payload {
                if st.spectators.contains(&from) && *content_type == ContentType::Text {
                    let mut out = Vec::new();
                    if let Some(peer_addr) = st.peer_addr {
                        out.push(OutFrame::plain(msg.payload.clone(), peer_addr));
                    }
                    for spectator in &st.spectators {
                        if *spectator != from {
                            out.push(OutFrame::relayed(msg.payload.clone(), sender, *spectator));
                        }
                    }
                    let events = vec![PeerEvent::Battle(BattleEvent::ChatText {
                        from: sender.clone(),
                        text: payload.clone(),
                    })];
                    return (out, events);
                }
            }
            log::debug!(
                "[peer] {} from unknown sender {} ignored",
                msg.payload.kind(),
                from
            );
            return (Vec::new(), Vec::new());
        }

        let Some(machine) = st.machine.as_mut() else {
            log::debug!("[peer] {} before setup ignored", msg.payload.kind());
            return (Vec::new(), Vec::new());
        };
        let effects = machine.handle(&msg.payload);

        // Host relays what the peer did to every spectator.
        let mut out = Vec::new();
        if self.config.role == Role::Host && is_relayable(&msg.payload) {
            let origin = st.peer_name.clone().unwrap_or_default();
            for spectator in &st.spectators {
                out.push(OutFrame::relayed(msg.payload.clone(), &origin, *spectator));
            }
        }

        let (mut fx_out, events) = self.collect_effects(st, effects, from);
        out.append(&mut fx_out);
        (out, events)
    }

    /// Turn machine effects into queued frames and events; update the
    /// session flags they imply.
    fn collect_effects(
        &self,
        st: &mut SessionState,
        effects: Vec<Effect>,
        peer_addr: SocketAddr,
    ) -> (Vec<OutFrame>, Vec<PeerEvent>) {
        let mut out = Vec::new();
        let mut events = Vec::new();
        for effect in effects {
            match effect {
                Effect::Send(payload) => {
                    if self.config.role == Role::Host && is_relayable(&payload) {
                        for spectator in &st.spectators {
                            out.push(OutFrame::relayed(
                                payload.clone(),
                                &self.config.name,
                                *spectator,
                            ));
                        }
                    }
                    out.push(OutFrame::plain(payload, peer_addr));
                }
                Effect::Event(event) => {
                    match &event {
                        BattleEvent::BattleEnded { .. } => st.game_over = true,
                        BattleEvent::SetupFailed { reason } => {
                            log::error!("[peer] setup failed: {}", reason);
                            st.game_over = true;
                            self.shutdown.store(true, Ordering::SeqCst);
                        }
                        _ => {}
                    }
                    events.push(PeerEvent::Battle(event));
                }
            }
        }
        (out, events)
    }

    /// Perform the socket writes and event emission queued under the lock.
    fn execute(&self, out: Vec<OutFrame>, events: Vec<PeerEvent>) {
        for frame in out {
            if let Err(err) = self
                .reliability
                .send_with_extras(frame.payload, frame.extras, frame.dest)
            {
                log::warn!("[peer] send to {} failed: {}", frame.dest, err);
            }
        }
        for event in events {
            let _ = self.events.send(event);
        }
    }

    fn build_machine(&self, opp_name: String, seed: u32, host_is_me: bool) -> Option<BattleMachine> {
        let species = self.my_species.clone()?;
        Some(BattleMachine::new(
            Arc::clone(&self.catalog),
            species,
            opp_name,
            seed,
            host_is_me,
            self.config.boost_uses,
        ))
    }
}

/// Battle traffic spectators should see.
fn is_relayable(payload: &Payload) -> bool {
    matches!(
        payload,
        Payload::BattleSetup { .. }
            | Payload::AttackAnnounce { .. }
            | Payload::DefenseAnnounce { .. }
            | Payload::CalculationReport { .. }
            | Payload::CalculationConfirm
            | Payload::ResolutionRequest { .. }
            | Payload::GameOver { .. }
            | Payload::Chat { .. }
    )
}

// =======================================================================
// Socket & Seed Helpers
// =======================================================================

/// Bind the local UDP socket with address reuse and a short read timeout
/// so the reader thread can observe shutdown.
fn bind_socket(port: u16) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(SockProtocol::UDP))?;
    socket.set_reuse_address(true)?;
    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&bind_addr.into())?;
    let socket: UdpSocket = socket.into();
    socket.set_read_timeout(Some(Duration::from_millis(SOCKET_READ_TIMEOUT_MS)))?;
    Ok(socket)
}

/// Seed entropy for the host. Determinism only matters after the seed is
/// shared, so wall-clock nanoseconds are enough here.
fn entropy_seed() -> u32 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.subsec_nanos()).wrapping_add(now.as_secs() as u32) | 1
}
