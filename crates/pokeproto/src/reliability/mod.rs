// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Best-effort reliability over UDP.
//!
//! Every non-ACK datagram is sequenced, individually acknowledged, and
//! retransmitted on timeout with bounded retries. Inbound messages are
//! deduplicated by `(sender, sequence_number)` before delivery, so the
//! layer offers at-least-once, deduplicated, non-FIFO delivery; ordering
//! across messages is the state machine's concern.

mod dedup;
mod pending;

pub use dedup::{DedupMap, DedupWindow};
pub use pending::{GiveUp, PendingEntry, PendingStore, Resend};

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::config::ack_timeout;
use crate::protocol::{self, DecodeError, Frame, Message, Payload};

/// Sequencing, ACK, retransmit, and dedup state for one peer process.
///
/// The socket is shared with the orchestrator; internal state sits behind
/// one mutex per concern. No mutex is held across a socket write.
pub struct Reliability {
    socket: Arc<UdpSocket>,
    pending: Mutex<PendingStore>,
    dedup: Mutex<DedupMap>,
}

impl Reliability {
    #[must_use]
    pub fn new(socket: Arc<UdpSocket>) -> Self {
        Self {
            socket,
            pending: Mutex::new(PendingStore::new()),
            dedup: Mutex::new(DedupMap::new()),
        }
    }

    /// Sequence, record, and transmit an application message.
    ///
    /// Returns the assigned sequence number. The message stays in the
    /// pending store until its ACK arrives or retries run out.
    pub fn send(&self, payload: Payload, dest: SocketAddr) -> io::Result<u32> {
        self.send_with_extras(payload, Vec::new(), dest)
    }

    /// [`Reliability::send`] with extra `key:value` pairs appended to the
    /// frame (used by the host to tag relayed spectator traffic).
    pub fn send_with_extras(
        &self,
        payload: Payload,
        extras: Vec<(String, String)>,
        dest: SocketAddr,
    ) -> io::Result<u32> {
        let kind = payload.kind();
        let (seq, bytes) = {
            let mut pending = self.pending.lock();
            let seq = pending.allocate_seq();
            let bytes = protocol::encode(&Frame::Message(Message { seq, payload, extras }));
            pending.record(seq, bytes.clone(), dest, kind);
            (seq, bytes)
        };
        self.socket.send_to(&bytes, dest)?;
        log::debug!("[relia] TX seq={} type={} dest={}", seq, kind, dest);
        Ok(seq)
    }

    /// Transmit a bare ACK. ACKs are never sequenced, recorded, or
    /// themselves acknowledged.
    pub fn send_ack(&self, seq: u32, dest: SocketAddr) -> io::Result<()> {
        let bytes = protocol::encode(&Frame::Ack { ack: seq });
        self.socket.send_to(&bytes, dest)?;
        log::debug!("[relia] TX ack={} dest={}", seq, dest);
        Ok(())
    }

    /// Process one inbound datagram.
    ///
    /// Returns a message exactly when it is new to this session and should
    /// reach the state machine:
    /// - malformed datagrams are dropped silently;
    /// - an unknown `type` is ACKed (the sender framed a valid datagram)
    ///   but not delivered;
    /// - ACKs settle the pending entry they reference;
    /// - duplicates are re-ACKed and swallowed.
    pub fn on_datagram(&self, bytes: &[u8], from: SocketAddr) -> Option<Message> {
        let frame = match protocol::decode(bytes) {
            Ok(frame) => frame,
            Err(DecodeError::UnknownType { found, seq }) => {
                log::debug!("[relia] RX unknown type '{}' from {}", found, from);
                if let Some(seq) = seq {
                    if let Err(err) = self.send_ack(seq, from) {
                        log::warn!("[relia] ack send failed for seq={}: {}", seq, err);
                    }
                }
                return None;
            }
            Err(err) => {
                log::debug!("[relia] RX dropped malformed datagram from {}: {}", from, err);
                return None;
            }
        };

        match frame {
            Frame::Ack { ack } => {
                let settled = self.pending.lock().ack(ack);
                match settled {
                    Some(kind) => log::debug!("[relia] RX ack={} settles {}", ack, kind),
                    None => log::debug!("[relia] RX ack={} unknown, ignored", ack),
                }
                None
            }
            Frame::Message(msg) => {
                let seq = msg.seq;
                let kind = msg.payload.kind();
                // ACK first, duplicate or not: the sender only stops
                // retransmitting once an ACK gets through.
                if let Err(err) = self.send_ack(seq, from) {
                    log::warn!("[relia] ack send failed for seq={}: {}", seq, err);
                }
                let fresh = self.dedup.lock().insert(from, seq);
                if fresh {
                    log::debug!("[relia] RX seq={} type={} from={}", seq, kind, from);
                    Some(msg)
                } else {
                    log::debug!("[relia] RX seq={} type={} duplicate, suppressed", seq, kind);
                    None
                }
            }
        }
    }

    /// Retransmit overdue messages; report the ones that are out of
    /// retries. Called from the ticker at the retransmit tick rate.
    pub fn sweep(&self, now: Instant) -> Vec<GiveUp> {
        let (resends, give_ups) = self.pending.lock().sweep(now, ack_timeout());
        for resend in resends {
            log::warn!(
                "[relia] retransmit seq={} type={} retries_left={}",
                resend.seq,
                resend.kind,
                resend.retries_left
            );
            if let Err(err) = self.socket.send_to(&resend.bytes, resend.dest) {
                log::warn!("[relia] retransmit seq={} send failed: {}", resend.seq, err);
            }
        }
        for give_up in &give_ups {
            log::error!(
                "[relia] giving up on seq={} type={} after retries",
                give_up.seq,
                give_up.kind
            );
        }
        give_ups
    }

    /// Number of messages still awaiting an ACK.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}
