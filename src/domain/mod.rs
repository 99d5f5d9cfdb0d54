/// Pure game rules: terrain, entities, movement, blasts, enemy policy
/// and particles. Nothing in here owns state or reads a clock.

pub mod ai;
pub mod blast;
pub mod entity;
pub mod particle;
pub mod rules;
pub mod tile;
