pub mod collision;
pub mod extract;
pub mod input;
pub mod movement;
pub mod rod_control;
pub mod sanity;
pub mod scoring;

pub use collision::*;
pub use extract::*;
pub use input::*;
pub use movement::*;
pub use rod_control::*;
pub use sanity::*;
pub use scoring::*;
