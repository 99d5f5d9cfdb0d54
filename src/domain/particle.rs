/// Cosmetic particles: burst spawning and per-tick decay.
///
/// Particles never affect gameplay. They exist so a renderer has something
/// to animate when a brick breaks, an item is picked up, the door appears
/// or an enemy dies.

use rand::Rng;

use super::entity::{Coord, IdCounter, ItemKind, Particle, Tint};

/// Life lost per tick.
pub const DECAY_PER_TICK: f32 = 0.05;

/// What caused a burst.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Burst {
    Pickup(ItemKind),
    Debris,
    DoorReveal,
    EnemyDeath,
}

/// Parameters for one burst kind.
#[derive(Clone, Copy, Debug)]
struct BurstShape {
    count: usize,
    /// Velocity components are uniform in `[-spread, spread)`.
    spread: f32,
    life: f32,
    tint: Tint,
    /// `[min, max)`; equal bounds mean a fixed size.
    size: (f32, f32),
}

impl Burst {
    fn shape(self) -> BurstShape {
        match self {
            Burst::Pickup(kind) => BurstShape {
                count: 8,
                spread: 0.2,
                life: 1.0,
                tint: match kind {
                    ItemKind::RangeUp => Tint::YELLOW,
                    ItemKind::SpeedUp => Tint::CYAN,
                },
                size: (0.1, 0.4),
            },
            Burst::Debris => BurstShape { count: 6, spread: 0.15, life: 1.0, tint: Tint::PURPLE, size: (0.2, 0.6) },
            Burst::DoorReveal => BurstShape { count: 10, spread: 0.25, life: 1.5, tint: Tint::WHITE, size: (0.2, 0.2) },
            Burst::EnemyDeath => BurstShape { count: 10, spread: 0.2, life: 1.0, tint: Tint::RED, size: (0.3, 0.3) },
        }
    }
}

/// Append one burst of particles at cell `at`.
pub fn spawn(out: &mut Vec<Particle>, burst: Burst, at: Coord, ids: &mut IdCounter, rng: &mut impl Rng) {
    let shape = burst.shape();
    out.reserve(shape.count);
    for _ in 0..shape.count {
        let size = if shape.size.1 > shape.size.0 {
            rng.gen_range(shape.size.0..shape.size.1)
        } else {
            shape.size.0
        };
        out.push(Particle {
            id: ids.next(),
            x: at.x as f32,
            y: at.y as f32,
            vx: rng.gen_range(-shape.spread..shape.spread),
            vy: rng.gen_range(-shape.spread..shape.spread),
            life: shape.life,
            tint: shape.tint,
            size,
        });
    }
}

/// Advance every particle one tick and drop the dead ones.
pub fn update(particles: &mut Vec<Particle>) {
    particles.retain_mut(|p| {
        p.x += p.vx;
        p.y += p.vy;
        p.life -= DECAY_PER_TICK;
        p.life > 0.0
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn burst_sizes() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ids = IdCounter::default();
        let mut ps = Vec::new();
        spawn(&mut ps, Burst::Debris, Coord::new(3, 4), &mut ids, &mut rng);
        assert_eq!(ps.len(), 6);
        spawn(&mut ps, Burst::EnemyDeath, Coord::new(3, 4), &mut ids, &mut rng);
        assert_eq!(ps.len(), 16);
        assert!(ps.iter().all(|p| p.x == 3.0 && p.y == 4.0));
    }

    #[test]
    fn pickup_color_follows_item() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ids = IdCounter::default();
        let mut ps = Vec::new();
        spawn(&mut ps, Burst::Pickup(ItemKind::SpeedUp), Coord::new(1, 1), &mut ids, &mut rng);
        assert_eq!(ps.len(), 8);
        assert!(ps.iter().all(|p| p.tint == Tint::CYAN));
        assert!(ps.iter().all(|p| p.size >= 0.1 && p.size < 0.4));
        assert!(ps.iter().all(|p| p.vx.abs() <= 0.2 && p.vy.abs() <= 0.2));
    }

    #[test]
    fn ids_do_not_collide() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ids = IdCounter::default();
        let mut ps = Vec::new();
        spawn(&mut ps, Burst::DoorReveal, Coord::new(1, 1), &mut ids, &mut rng);
        spawn(&mut ps, Burst::DoorReveal, Coord::new(1, 1), &mut ids, &mut rng);
        let mut seen: Vec<_> = ps.iter().map(|p| p.id).collect();
        seen.dedup();
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn decay_moves_and_prunes() {
        let mut ps = vec![
            Particle { id: 1, x: 0.0, y: 0.0, vx: 0.1, vy: -0.1, life: 1.0, tint: Tint::WHITE, size: 0.2 },
            Particle { id: 2, x: 0.0, y: 0.0, vx: 0.0, vy: 0.0, life: 0.04, tint: Tint::WHITE, size: 0.2 },
        ];
        update(&mut ps);
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].id, 1);
        assert!((ps[0].x - 0.1).abs() < 1e-6);
        assert!((ps[0].life - 0.95).abs() < 1e-6);
    }

    #[test]
    fn fresh_burst_dies_after_twenty_ticks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ids = IdCounter::default();
        let mut ps = Vec::new();
        spawn(&mut ps, Burst::Debris, Coord::new(2, 2), &mut ids, &mut rng);
        for _ in 0..19 {
            update(&mut ps);
        }
        assert_eq!(ps.len(), 6);
        // Float accumulation may leave a sliver past 20 ticks.
        for _ in 0..2 {
            update(&mut ps);
        }
        assert!(ps.is_empty());
    }
}
