/// Simulation: game state, level setup, the scheduled step, commands
/// and the engine that sequences them.

pub mod command;
pub mod engine;
pub mod event;
pub mod level;
pub mod step;
pub mod world;
