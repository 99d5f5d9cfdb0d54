/// GridBlast: a real-time tile arena simulation engine.
///
/// `domain` holds the pure rules, `sim` owns and advances the live game.
/// The terminal host lives in the binary (`main.rs` + `ui/`).

pub mod config;
pub mod domain;
pub mod sim;
