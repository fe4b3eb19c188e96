use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use foos_core::*;
use proto::{Frame, RodLayout, RodSnapshot, Snapshot};

use crate::policy::RandomPolicy;

/// Destination for encoded frames
pub trait FrameSink {
    fn send(&mut self, frame: &Frame) -> Result<()>;

    /// Called once after the last frame
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes COBS-framed records to a file
pub struct FileSink {
    out: BufWriter<File>,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create frame dump {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }
}

impl FrameSink for FileSink {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        let bytes = frame.to_framed()?;
        self.out.write_all(&bytes)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush().context("failed to flush frame dump")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    pub episodes: u32,
    pub max_ticks: u32, // Per episode; the episode is abandoned after this many ticks
    pub dt: f64,
    pub snapshot_every: u32, // 0 disables snapshot frames
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            episodes: 10,
            max_ticks: 3600,
            dt: Params::FIXED_DT,
            snapshot_every: 1,
        }
    }
}

/// Event counts gathered by the simulation's subscribers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub goals: [u32; 2], // Indexed by the side whose net was hit
    pub out_of_bounds: u32,
    pub resets: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub episodes: u32,
    pub timeouts: u32,
    pub ticks: u64,
    pub score: Score,
    pub tally: Tally,
    pub reward: [f64; 2], // Summed reward + penalty per side
}

/// Drives a match with random policies and streams frames to a sink
pub struct MatchRunner {
    sim: MatchSimulation,
    policies: [RandomPolicy; 2],
    sink: Option<Box<dyn FrameSink>>,
    tally: Rc<RefCell<Tally>>,
    config: RunnerConfig,
    episode: u32,
    episode_ticks: u32,
    timeouts: u32,
    reward: [f64; 2],
}

impl MatchRunner {
    pub fn new(
        table: TableModel,
        seed: u64,
        config: RunnerConfig,
        sink: Option<Box<dyn FrameSink>>,
    ) -> Self {
        let policies = [
            RandomPolicy::new(table.rods_for(Side::Home).len(), seed.wrapping_add(1)),
            RandomPolicy::new(table.rods_for(Side::Away).len(), seed.wrapping_add(2)),
        ];
        let mut sim = MatchSimulation::new(table, seed);
        let tally = Rc::new(RefCell::new(Tally::default()));

        let t = tally.clone();
        sim.events_mut().on_goal(move |side| {
            log::info!("Goal in the {side:?} net");
            t.borrow_mut().goals[side.index()] += 1;
        });
        let t = tally.clone();
        sim.events_mut().on_oob(move || {
            log::info!("Ball left the table");
            t.borrow_mut().out_of_bounds += 1;
        });
        let t = tally.clone();
        sim.events_mut().on_reset(move || {
            let mut tally = t.borrow_mut();
            tally.resets += 1;
            log::debug!("Episode {} started", tally.resets);
        });

        Self {
            sim,
            policies,
            sink,
            tally,
            config,
            episode: 0,
            episode_ticks: 0,
            timeouts: 0,
            reward: [0.0; 2],
        }
    }

    pub fn simulation(&self) -> &MatchSimulation {
        &self.sim
    }

    fn send(&mut self, frame: &Frame) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.send(frame)?;
        }
        Ok(())
    }

    /// Static table description for renderers
    pub fn table_frame(&self) -> Frame {
        let table = self.sim.table();
        let foo = table.foosman();
        Frame::Table {
            length: table.length() as f32,
            goal_width: table.goal_width() as f32,
            ball_radius: table.ball_radius() as f32,
            foosman_w: foo.w as f32,
            foosman_l: foo.l as f32,
            rods: table
                .rods()
                .iter()
                .map(|rod| RodLayout {
                    owner: rod.owner.index() as u8,
                    x: rod.base_x as f32,
                    foosman_count: u8::try_from(rod.foosman_count).unwrap_or(u8::MAX),
                    spacing: rod.spacing as f32,
                    max_offset: rod.max_offset as f32,
                })
                .collect(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.sim.state();
        Snapshot {
            tick: clamp_u32(self.sim.tick_count()),
            ball_x: state.ball.position.x as f32,
            ball_y: state.ball.position.y as f32,
            ball_vx: state.ball.velocity.x as f32,
            ball_vy: state.ball.velocity.y as f32,
            rods: state
                .rods
                .iter()
                .map(|rod| RodSnapshot {
                    offset: rod.offset as f32,
                    angle: rod.angle as f32,
                })
                .collect(),
            score_home: clamp_u16(state.score.home),
            score_away: clamp_u16(state.score.away),
        }
    }

    /// Apply both policies and advance one tick
    pub fn step(&mut self) -> Result<Events> {
        for side in Side::BOTH {
            if let Some(input) = self.policies[side.index()].next_input(self.config.dt) {
                self.sim.apply_input(side, &input)?;
            }
        }

        let events = self.sim.tick(self.config.dt)?;
        let tick = clamp_u32(self.sim.tick_count());
        self.episode_ticks += 1;

        if events.reset {
            let score = self.sim.state().score;
            self.send(&Frame::Reset {
                episode: self.episode,
                score_home: clamp_u16(score.home),
                score_away: clamp_u16(score.away),
            })?;
        }

        for side in Side::BOTH {
            self.reward[side.index()] += self.sim.reward(side).total();
        }

        if self.config.snapshot_every > 0 && tick % self.config.snapshot_every == 0 {
            let snapshot = self.snapshot();
            self.send(&Frame::Snapshot(snapshot))?;
        }
        if let Some(side) = events.goal {
            self.send(&Frame::Goal {
                tick,
                side: side.index() as u8,
            })?;
        }
        if events.out_of_bounds {
            self.send(&Frame::OutOfBounds { tick })?;
        }

        Ok(events)
    }

    /// Play `config.episodes` episodes and report what happened
    pub fn run(&mut self) -> Result<Summary> {
        let table = self.table_frame();
        self.send(&table)?;

        while self.episode < self.config.episodes {
            let events = self.step()?;

            let timed_out = !events.is_terminal() && self.episode_ticks >= self.config.max_ticks;
            if !events.is_terminal() && !timed_out {
                continue;
            }

            if timed_out {
                log::debug!("episode {} hit the tick limit", self.episode);
                self.timeouts += 1;
            }
            self.episode += 1;
            self.episode_ticks = 0;

            if timed_out && self.episode < self.config.episodes {
                self.sim.reset();
            }
        }

        // Credit a goal that ended the last episode
        if self.sim.phase() != Phase::Running {
            self.sim.reset();
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.finish()?;
        }

        let summary = Summary {
            episodes: self.episode,
            timeouts: self.timeouts,
            ticks: self.sim.tick_count(),
            score: self.sim.state().score,
            tally: *self.tally.borrow(),
            reward: self.reward,
        };
        log::info!(
            "{} episodes in {} ticks, goals home/away {}/{}, out of bounds {}",
            summary.episodes,
            summary.ticks,
            summary.tally.goals[Side::Home.index()],
            summary.tally.goals[Side::Away.index()],
            summary.tally.out_of_bounds
        );
        Ok(summary)
    }
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn clamp_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}
