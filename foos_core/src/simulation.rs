//! Episode orchestration.
//!
//! `MatchSimulation` owns the table, the physics scene and the semantic state
//! of one match. A tick steps the scene, refreshes the state and checks for a
//! goal or an out-of-bounds ball. Terminal conditions fire their events right
//! away and leave the episode frozen until the scheduled reset runs at the
//! start of the next `apply_input` or `tick`, or on an explicit `reset`.

use crate::error::{Result, SimError};
use crate::resources::{EventRegistry, Events, GameRng, InputLedger};
use crate::state::{GameState, Side};
use crate::systems::{
    apply_command, evaluate, extract_state, resolve_input, terminal, Reward, RodInput, Terminal,
};
use crate::table::TableModel;
use crate::world::{jittered_ball, PhysicsWorld};

/// Where the current episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    /// Episode ended; a reset is scheduled
    Ended(Terminal),
}

pub struct MatchSimulation {
    table: TableModel,
    physics: PhysicsWorld,
    state: GameState,
    rng: GameRng,
    registry: EventRegistry,
    ledger: InputLedger,
    events: Events,
    phase: Phase,
    aborted: bool,
    tick_count: u64,
}

impl MatchSimulation {
    /// Start a match on `table`. The seed drives ball jitter for every episode.
    pub fn new(table: TableModel, seed: u64) -> Self {
        let mut rng = GameRng::new(seed);
        let state = Self::fresh_state(&table, &mut rng, Default::default());
        let physics = PhysicsWorld::build(&table, &state);

        Self {
            table,
            physics,
            state,
            rng,
            registry: EventRegistry::new(),
            ledger: InputLedger::new(),
            events: Events::new(),
            phase: Phase::Running,
            aborted: false,
            tick_count: 0,
        }
    }

    fn fresh_state(table: &TableModel, rng: &mut GameRng, score: crate::Score) -> GameState {
        let mut state = table.initial_state(score);
        state.ball = jittered_ball(table, rng);
        state
    }

    fn ensure_live(&self) -> Result<()> {
        if self.aborted {
            Err(SimError::Aborted)
        } else {
            Ok(())
        }
    }

    fn resolve_pending_reset(&mut self) {
        if matches!(self.phase, Phase::Ended(_)) {
            self.reset();
        }
    }

    /// Apply one player's rod command for the coming tick.
    ///
    /// Each side may submit once per tick. An out-of-range rod index leaves
    /// the state untouched and does not use up the side's input.
    pub fn apply_input(&mut self, side: Side, input: &RodInput) -> Result<()> {
        self.ensure_live()?;
        self.resolve_pending_reset();

        if self.ledger.is_consumed(side) {
            return Err(SimError::InputAlreadyApplied(side));
        }

        let command = resolve_input(&self.table, side, input)?;
        apply_command(&mut self.state, &command);
        self.ledger.consume(side);

        log::debug!(
            "{side:?} input: local rod {} -> rod {}, dv={:.3}, dw={:.3}",
            input.rod,
            command.rod,
            command.offset_velocity,
            command.angle_velocity
        );
        Ok(())
    }

    /// Advance the episode by `dt` seconds.
    ///
    /// Returns what happened since the previous tick: a reset that ran first,
    /// and a goal or out-of-bounds ball detected after stepping.
    pub fn tick(&mut self, dt: f64) -> Result<Events> {
        self.ensure_live()?;
        self.resolve_pending_reset();

        let contacts = self.physics.step(&self.table, &self.state.rods, dt);
        extract_state(self.physics.world(), &self.table, &mut self.state);

        if let Err(err) = self.physics.check_finite() {
            log::warn!("aborting simulation at tick {}: {err}", self.tick_count);
            self.aborted = true;
            return Err(err);
        }

        self.ledger.clear();
        self.tick_count += 1;
        log::trace!(
            "tick {}: ball {:?} vel {:?}, {contacts} contacts",
            self.tick_count,
            self.state.ball.position,
            self.state.ball.velocity
        );

        if let Some(ended) = terminal(&self.table, &self.state) {
            self.phase = Phase::Ended(ended);
            match ended {
                Terminal::Goal { conceded } => {
                    log::debug!("goal in {conceded:?} net at tick {}", self.tick_count);
                    self.events.goal = Some(conceded);
                    self.registry.fire_goal(conceded);
                }
                Terminal::OutOfBounds => {
                    log::debug!(
                        "ball out of bounds at {:?}, tick {}",
                        self.state.ball.position,
                        self.tick_count
                    );
                    self.events.out_of_bounds = true;
                    self.registry.fire_oob();
                }
            }
        }

        Ok(std::mem::take(&mut self.events))
    }

    /// Rebuild the scene with a freshly jittered ball and rods at rest.
    ///
    /// Credits the scorer when the episode ended in a goal. Subscribers to
    /// `on_reset` run after the new scene exists.
    pub fn reset(&mut self) {
        let mut score = self.state.score;
        if let Phase::Ended(ended) = self.phase {
            if let Some(scorer) = ended.scorer() {
                score.increment(scorer);
            }
        }

        self.state = Self::fresh_state(&self.table, &mut self.rng, score);
        self.physics = PhysicsWorld::build(&self.table, &self.state);
        self.ledger.clear();
        self.phase = Phase::Running;
        self.events.reset = true;

        log::info!(
            "episode reset at tick {}: score {}-{}",
            self.tick_count,
            score.home,
            score.away
        );
        self.registry.fire_reset();
    }

    /// Reward and penalty for `side` in the current state
    pub fn reward(&self, side: Side) -> Reward {
        evaluate(&self.table, &self.state, side)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn table(&self) -> &TableModel {
        &self.table
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Direct access to the scene, for tooling and tests
    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Subscribe to goal, out-of-bounds and reset events
    pub fn events_mut(&mut self) -> &mut EventRegistry {
        &mut self.registry
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
