use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::state::{GameState, Side};
use crate::table::TableModel;

/// Command for one rod, in the player's own frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RodInput {
    pub rod: usize, // Player-relative rod index, counted from the player's own goal
    pub offset_velocity: f64,
    pub angle_velocity: f64,
}

impl RodInput {
    pub fn new(rod: usize, offset_velocity: f64, angle_velocity: f64) -> Self {
        Self {
            rod,
            offset_velocity,
            angle_velocity,
        }
    }
}

/// Command resolved to an absolute rod in the table frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RodCommand {
    pub rod: usize,
    pub offset_velocity: f64,
    pub angle_velocity: f64,
}

/// Map a player-relative input to an absolute rod.
///
/// Home counts its rods in table order, Away in reverse. Away's axes are
/// mirrored, so both of its commands are negated.
pub fn resolve_input(table: &TableModel, side: Side, input: &RodInput) -> Result<RodCommand> {
    let owned = table.rods_for(side);
    let rod = *owned.get(input.rod).ok_or(SimError::RodIndexOutOfRange {
        side,
        rod: input.rod,
        available: owned.len(),
    })?;

    Ok(RodCommand {
        rod,
        offset_velocity: input.offset_velocity * side.sign(),
        angle_velocity: input.angle_velocity * side.sign(),
    })
}

/// Write a resolved command into the game state
pub fn apply_command(state: &mut GameState, command: &RodCommand) {
    state.apply_command(command.rod, command.offset_velocity, command.angle_velocity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::state::Score;

    fn table() -> TableModel {
        TableModel::new(&TableConfig::new()).unwrap()
    }

    #[test]
    fn test_home_resolves_in_table_order() {
        let table = table();
        let cmd = resolve_input(&table, Side::Home, &RodInput::new(0, 0.5, 2.0)).unwrap();
        assert_eq!(cmd.rod, 0);
        assert_eq!(cmd.offset_velocity, 0.5);
        assert_eq!(cmd.angle_velocity, 2.0);

        let cmd = resolve_input(&table, Side::Home, &RodInput::new(3, 0.0, 0.0)).unwrap();
        assert_eq!(cmd.rod, 5, "Home owns rods 0, 1, 3, 5");
    }

    #[test]
    fn test_away_resolves_reversed_and_negated() {
        let table = table();
        let cmd = resolve_input(&table, Side::Away, &RodInput::new(0, 0.5, -2.0)).unwrap();
        assert_eq!(cmd.rod, 7);
        assert_eq!(cmd.offset_velocity, -0.5);
        assert_eq!(cmd.angle_velocity, 2.0);

        let cmd = resolve_input(&table, Side::Away, &RodInput::new(3, 0.0, 0.0)).unwrap();
        assert_eq!(cmd.rod, 2);
    }

    #[test]
    fn test_out_of_range() {
        let table = table();
        let err = resolve_input(&table, Side::Home, &RodInput::new(4, 0.0, 0.0)).unwrap_err();
        match err {
            SimError::RodIndexOutOfRange {
                side,
                rod,
                available,
            } => {
                assert_eq!(side, Side::Home);
                assert_eq!(rod, 4);
                assert_eq!(available, 4);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_apply_command_sets_velocities() {
        let table = table();
        let mut state = table.initial_state(Score::new());
        let cmd = resolve_input(&table, Side::Away, &RodInput::new(1, 0.25, 4.0)).unwrap();
        apply_command(&mut state, &cmd);
        assert_eq!(state.rods[6].offset_velocity, -0.25);
        assert_eq!(state.rods[6].angle_velocity, -4.0);
        assert_eq!(state.rods[0].offset_velocity, 0.0);
    }
}
