// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PokeProtocol global configuration - single source of truth.
//!
//! This module centralizes ALL protocol constants and timing parameters.
//! **NEVER hardcode elsewhere!**

use std::time::Duration;

// =======================================================================
// Reliability Layer Timing
// =======================================================================

/// ACK timeout before a pending message is retransmitted (milliseconds).
///
/// A non-ACK datagram that has not been acknowledged within this window
/// is resent by the retransmit ticker.
pub const ACK_TIMEOUT_MS: u64 = 500;

/// Retransmit attempts per message before the session is declared failed.
///
/// Combined with [`ACK_TIMEOUT_MS`], a message is abandoned roughly 2 s
/// after its first transmission.
pub const MAX_RETRIES: u8 = 3;

/// Retransmit ticker period (milliseconds).
///
/// The ticker scans the pending store at this rate and resends entries
/// whose ACK deadline has passed.
pub const RETRANSMIT_TICK_MS: u64 = 100;

/// Blocking read timeout on the UDP socket (milliseconds).
///
/// The network reader wakes at this rate to observe the shutdown flag;
/// it is not a protocol timeout.
pub const SOCKET_READ_TIMEOUT_MS: u64 = 100;

/// Grace window after GAME_OVER before the socket closes (milliseconds).
///
/// Covers the final ACK exchange; losing an in-flight ACK past this
/// window is acceptable because the peer is terminating.
pub const GAME_OVER_GRACE_MS: u64 = 1_000;

// =======================================================================
// Reliability Layer Sizing
// =======================================================================

/// Duplicate-suppression window per sender (sequence numbers).
///
/// Covers every retransmit within one session; 1024 is sufficient for
/// any realistic battle.
pub const DEDUP_WINDOW: usize = 1024;

/// Maximum UDP datagram size accepted from the socket (bytes).
///
/// One message per datagram; base64 sticker payloads are the only
/// frames that approach this bound.
pub const MAX_DATAGRAM_SIZE: usize = 65_536;

/// First sequence number assigned by a fresh peer.
pub const INITIAL_SEQ: u32 = 1;

// =======================================================================
// Battle Parameters
// =======================================================================

/// Fixed combatant level used by the damage formula.
pub const BATTLE_LEVEL: u32 = 50;

/// Special attack/defense boost uses granted at setup by default.
pub const DEFAULT_BOOST_USES: u8 = 5;

/// Stat multiplier applied when a boost is honored.
pub const BOOST_MULTIPLIER: f64 = 1.5;

/// Same-Type Attack Bonus multiplier.
pub const STAB_MULTIPLIER: f64 = 1.5;

/// Lower bound of the shared damage roll.
pub const ROLL_MIN: f64 = 0.85;

/// Width of the shared damage roll interval ([0.85, 1.0)).
pub const ROLL_SPAN: f64 = 0.15;

// =======================================================================
// Defaults for the CLI Collaborator
// =======================================================================

/// Default local UDP port when none is given on the command line.
pub const DEFAULT_PORT: u16 = 8888;

/// ACK deadline as a [`Duration`].
#[inline]
#[must_use]
pub const fn ack_timeout() -> Duration {
    Duration::from_millis(ACK_TIMEOUT_MS)
}

/// Retransmit tick as a [`Duration`].
#[inline]
#[must_use]
pub const fn retransmit_tick() -> Duration {
    Duration::from_millis(RETRANSMIT_TICK_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abandon_horizon_is_about_two_seconds() {
        // First send + MAX_RETRIES resends, each waiting ACK_TIMEOUT_MS.
        let horizon = ACK_TIMEOUT_MS * (u64::from(MAX_RETRIES) + 1);
        assert_eq!(horizon, 2_000);
    }

    #[test]
    fn test_roll_interval() {
        assert!(ROLL_MIN + ROLL_SPAN <= 1.0 + f64::EPSILON);
        assert!((ROLL_MIN + ROLL_SPAN - 1.0).abs() < 1e-12);
    }
}
