//! Backend abstraction: the collaborator that performs collision resolution.

mod environment;
mod traits;

pub use environment::{floor_friction, SlideEnvironment, WorldEnvironment};
pub use traits::{KineBodyBackend, SlideOutput, MIN_MASS};
