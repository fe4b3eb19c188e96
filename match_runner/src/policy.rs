use std::collections::VecDeque;

use foos_core::RodInput;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lateral command range, centered on zero
const OFFSET_SPAN: f64 = 1.0;
/// Rotation command range, centered on zero
const ANGLE_SPAN: f64 = 16.0;
/// Minimum hold time before a command is replaced
const MIN_HOLD: f64 = 0.1;

/// Random controller for one side.
///
/// Holds one command per rod. Every so often the oldest command is replaced
/// with a fresh one for the same rod. Each tick emits the next rod's command
/// in turn, since the simulation accepts one input per side per tick.
#[derive(Debug)]
pub struct RandomPolicy {
    rng: StdRng,
    commands: VecDeque<RodInput>,
    cursor: usize,
    time: f64,
    last_change: f64,
}

impl RandomPolicy {
    pub fn new(rod_count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let commands = (0..rod_count)
            .map(|rod| random_input(&mut rng, rod))
            .collect();
        Self {
            rng,
            commands,
            cursor: 0,
            time: 0.0,
            last_change: 0.0,
        }
    }

    /// Command for the coming tick, or None if the side owns no rods
    pub fn next_input(&mut self, dt: f64) -> Option<RodInput> {
        if self.commands.is_empty() {
            return None;
        }

        self.time += dt;
        let hold = self.rng.gen::<f64>() + MIN_HOLD;
        if self.time - self.last_change > hold {
            if let Some(stale) = self.commands.pop_front() {
                let fresh = random_input(&mut self.rng, stale.rod);
                self.commands.push_back(fresh);
            }
            self.last_change = self.time;
        }

        let input = self.commands[self.cursor % self.commands.len()];
        self.cursor = self.cursor.wrapping_add(1);
        Some(input)
    }

    pub fn commands(&self) -> impl Iterator<Item = &RodInput> {
        self.commands.iter()
    }
}

fn random_input(rng: &mut StdRng, rod: usize) -> RodInput {
    RodInput::new(
        rod,
        (rng.gen::<f64>() - 0.5) * OFFSET_SPAN,
        (rng.gen::<f64>() - 0.5) * ANGLE_SPAN,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_stay_in_range() {
        let mut policy = RandomPolicy::new(4, 1);
        for _ in 0..600 {
            let input = policy.next_input(1.0 / 60.0).unwrap();
            assert!(input.rod < 4);
            assert!(input.offset_velocity.abs() <= 0.5);
            assert!(input.angle_velocity.abs() <= 8.0);
        }
    }

    #[test]
    fn test_rods_are_visited_in_turn() {
        let mut policy = RandomPolicy::new(3, 2);
        let mut seen: Vec<usize> = (0..3)
            .map(|_| policy.next_input(0.0).unwrap().rod)
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2], "Each rod gets a turn");
    }

    #[test]
    fn test_commands_change_over_time() {
        let mut policy = RandomPolicy::new(2, 3);
        let before: Vec<RodInput> = policy.commands().copied().collect();
        // Holds never exceed 1.1s
        for _ in 0..3 {
            policy.next_input(1.2);
        }
        let after: Vec<RodInput> = policy.commands().copied().collect();
        assert_ne!(before, after);
        let mut rods: Vec<usize> = after.iter().map(|c| c.rod).collect();
        rods.sort_unstable();
        assert_eq!(rods, vec![0, 1], "Replacements keep one command per rod");
    }

    #[test]
    fn test_empty_side_yields_nothing() {
        let mut policy = RandomPolicy::new(0, 4);
        assert!(policy.next_input(1.0).is_none());
    }
}
