use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One rod as described by the table configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RodConfig {
    pub owner: u8,        // 0 = goal at x = 0, 1 = goal at x = length
    pub x: f64,           // Rod axis position along the table
    pub foo_count: u32,   // Foosmen on the rod
    pub foo_spacing: f64, // Distance between neighbouring foosmen, in [0, 1)
}

impl RodConfig {
    pub fn new(owner: u8, x: f64, foo_count: u32, foo_spacing: f64) -> Self {
        Self {
            owner,
            x,
            foo_count,
            foo_spacing,
        }
    }
}

/// Foosman box dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoosmanSize {
    pub w: f64, // Extent along the table length
    pub l: f64, // Extent along the rod (lateral footprint)
    pub h: f64, // Foot distance from the rod axis
}

/// Table configuration, as produced by an external config source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub length: f64,
    pub rods: Vec<RodConfig>,
    pub foo: FoosmanSize,
    pub goal_w: f64,
    pub ball_r: f64,
    /// Clamp reported rod offsets to [0, 1]
    #[serde(default)]
    pub clamp_rod_offset: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        let length = 2.0;
        Self {
            length,
            rods: vec![
                RodConfig::new(0, 0.1, 1, 0.0),
                RodConfig::new(0, 0.35, 2, 1.0 / 3.0),
                RodConfig::new(1, 0.6, 3, 1.0 / 4.0),
                RodConfig::new(0, 0.9, 5, 1.0 / 6.0),
                RodConfig::new(1, length - 0.9, 5, 1.0 / 6.0),
                RodConfig::new(0, length - 0.6, 3, 1.0 / 4.0),
                RodConfig::new(1, length - 0.35, 2, 1.0 / 3.0),
                RodConfig::new(1, length - 0.1, 1, 0.0),
            ],
            foo: FoosmanSize {
                w: 0.04,
                l: 0.08,
                h: 0.09,
            },
            goal_w: 0.25,
            ball_r: 0.045,
            clamp_rod_offset: false,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
