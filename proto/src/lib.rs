//! Wire protocol for the foosball simulation
//!
//! Uses postcard for compact binary serialization. Frames written to a stream
//! are COBS-encoded so a reader can split them on zero bytes.

use postcard::{from_bytes_cobs, to_allocvec_cobs};

// ============================================================================
// Frames (simulation to renderer / recorder)
// ============================================================================

/// Static layout of one rod
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RodLayout {
    pub owner: u8,
    pub x: f32,
    pub foosman_count: u8,
    pub spacing: f32,
    pub max_offset: f32,
}

/// Rod state as reported to renderers
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RodSnapshot {
    pub offset: f32,
    pub angle: f32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub tick: u32,
    pub ball_x: f32,
    pub ball_y: f32,
    pub ball_vx: f32,
    pub ball_vy: f32,
    pub rods: Vec<RodSnapshot>, // Table order
    pub score_home: u16,
    pub score_away: u16,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Frame {
    /// Sent once before any snapshot
    Table {
        length: f32,
        goal_width: f32,
        ball_radius: f32,
        foosman_w: f32,
        foosman_l: f32,
        rods: Vec<RodLayout>,
    },

    /// Game state after a tick
    Snapshot(Snapshot),

    /// Ball entered the net defended by `side`
    Goal { tick: u32, side: u8 },

    /// Ball left the table
    OutOfBounds { tick: u32 },

    /// New episode started
    Reset {
        episode: u32,
        score_home: u16,
        score_away: u16,
    },
}

// ============================================================================
// Serialization Helpers
// ============================================================================

impl Frame {
    /// Serialize frame as a zero-terminated COBS record
    pub fn to_framed(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec_cobs(self)
    }

    /// Decode every COBS record in `stream`. The buffer is decoded in place.
    pub fn decode_stream(stream: &mut [u8]) -> Result<Vec<Frame>, postcard::Error> {
        stream
            .split_inclusive_mut(|b| *b == 0)
            .filter(|record| record.iter().any(|b| *b != 0))
            .map(|record| from_bytes_cobs(record))
            .collect()
    }
}
