pub mod components;
pub mod config;
pub mod error;
pub mod observation;
pub mod params;
pub mod resources;
pub mod simulation;
pub mod state;
pub mod systems;
pub mod table;
pub mod world;

pub use components::*;
pub use config::*;
pub use error::*;
pub use observation::*;
pub use params::*;
pub use resources::*;
pub use simulation::*;
pub use state::*;
pub use systems::{evaluate, terminal, Reward, RodCommand, RodInput, Terminal};
pub use table::*;
pub use world::*;

/// Build a table from JSON configuration text and start a match on it
pub fn simulation_from_json(text: &str, seed: u64) -> Result<MatchSimulation> {
    let config = TableConfig::from_json_str(text)?;
    let table = TableModel::new(&config)?;
    Ok(MatchSimulation::new(table, seed))
}
