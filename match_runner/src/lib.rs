pub mod policy;
pub mod runner;


pub use policy::RandomPolicy;
pub use runner::{FileSink, FrameSink, MatchRunner, RunnerConfig, Summary, Tally};
