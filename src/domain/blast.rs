/// Blast propagation: pure planning over one grid snapshot.
///
/// `plan` looks at every bomb detonating this tick and returns what the
/// blasts touch. It never mutates anything: `sim::step` applies the plan,
/// so all bombs of one tick see the same terrain and all grid writes
/// commit together.
///
/// ## Ray rules (per direction, cells 1..=range)
///
/// ┌──────────────────────────┬────────────────────────────────┐
/// │ Cell                      │ Effect                          │
/// ├──────────────────────────┼────────────────────────────────┤
/// │ Off the arena             │ stop, nothing marked            │
/// │ Wall                      │ stop, nothing marked            │
/// │ Brick                     │ mark, destroy, then stop        │
/// │ Empty                     │ mark, continue                  │
/// └──────────────────────────┴────────────────────────────────┘
///
/// Every marked ray cell also chain-triggers a stable bomb on it and
/// removes an item on it. The bomb's own cell is marked as the center.

use std::collections::HashSet;

use super::entity::{Bomb, Coord, Direction, EntityId};
use super::tile::Grid;

/// Cells one ray reaches, plus the brick that stopped it (if any).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ray {
    pub cells: Vec<Coord>,
    pub brick: Option<Coord>,
}

/// Walk one ray outward from `origin`. See table above.
pub fn ray(grid: &Grid, origin: Coord, dir: Direction, range: u32) -> Ray {
    let mut out = Ray::default();
    for i in 1..=range as i32 {
        let at = origin.step(dir, i);
        match grid.get(at.x, at.y) {
            None => break,
            Some(cell) if cell.blocks_blast() => break,
            Some(cell) => {
                out.cells.push(at);
                if cell.is_destructible() {
                    out.brick = Some(at);
                    break;
                }
            }
        }
    }
    out
}

/// Everything the detonations of one tick touch.
#[derive(Clone, Debug, Default)]
pub struct BlastPlan {
    /// One entry per hazard instance: each bomb's center, then its rays in
    /// `Direction::ALL` order. A cell may appear more than once.
    pub hazards: Vec<Coord>,
    /// Ray cells only (no centers). Items here are removed.
    pub swept: Vec<Coord>,
    /// Stable bombs reached by a ray; they detonate next tick.
    pub chained: Vec<EntityId>,
    /// Bricks to destroy, each listed once, in first-hit order.
    pub bricks: Vec<Coord>,
}

impl BlastPlan {
    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }
}

/// Plan the blasts of `detonating` against a single `grid` snapshot.
/// `stable` are the bombs that stay armed this tick.
pub fn plan(grid: &Grid, detonating: &[Bomb], stable: &[Bomb]) -> BlastPlan {
    let mut out = BlastPlan::default();
    let mut seen_bricks: HashSet<Coord> = HashSet::new();
    let mut seen_chain: HashSet<EntityId> = HashSet::new();

    for bomb in detonating {
        out.hazards.push(bomb.pos);

        for dir in Direction::ALL {
            let r = ray(grid, bomb.pos, dir, bomb.range);
            for &at in &r.cells {
                out.hazards.push(at);
                out.swept.push(at);
                for hit in stable.iter().filter(|b| b.pos == at) {
                    if seen_chain.insert(hit.id) {
                        out.chained.push(hit.id);
                    }
                }
            }
            if let Some(b) = r.brick {
                if seen_bricks.insert(b) {
                    out.bricks.push(b);
                }
            }
        }
    }

    out
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::{Cell, GRID_HEIGHT, GRID_WIDTH};
    use proptest::prelude::*;

    fn bomb(id: EntityId, x: i32, y: i32, range: u32) -> Bomb {
        Bomb { id, pos: Coord::new(x, y), fuse_at: 0, range }
    }

    #[test]
    fn open_ray_reaches_full_range() {
        let g = Grid::walled();
        let r = ray(&g, Coord::new(5, 5), Direction::Right, 3);
        assert_eq!(r.cells, vec![Coord::new(6, 5), Coord::new(7, 5), Coord::new(8, 5)]);
        assert_eq!(r.brick, None);
    }

    #[test]
    fn wall_stops_ray_unmarked() {
        let g = Grid::walled();
        let r = ray(&g, Coord::new(1, 1), Direction::Up, 3);
        assert!(r.cells.is_empty());
    }

    #[test]
    fn brick_absorbs_ray() {
        // Column x=5: brick at y=7, wall at y=8.
        let mut g = Grid::walled();
        g.set(5, 7, Cell::Brick);
        g.set(5, 8, Cell::Wall);
        let r = ray(&g, Coord::new(5, 5), Direction::Down, 2);
        assert_eq!(r.cells, vec![Coord::new(5, 6), Coord::new(5, 7)]);
        assert_eq!(r.brick, Some(Coord::new(5, 7)));

        // Range beyond the brick changes nothing.
        let r = ray(&g, Coord::new(5, 5), Direction::Down, 6);
        assert_eq!(r.cells, vec![Coord::new(5, 6), Coord::new(5, 7)]);
    }

    #[test]
    fn center_is_first_hazard() {
        let g = Grid::walled();
        let p = plan(&g, &[bomb(1, 1, 1, 1)], &[]);
        assert_eq!(p.hazards[0], Coord::new(1, 1));
        // (1,1) in the corner: only down and right are open.
        assert_eq!(p.hazards.len(), 3);
        assert!(p.hazards.contains(&Coord::new(1, 2)));
        assert!(p.hazards.contains(&Coord::new(2, 1)));
        assert!(!p.swept.contains(&Coord::new(1, 1)));
    }

    #[test]
    fn stable_bomb_in_ray_is_chained() {
        let g = Grid::walled();
        let stable = [bomb(7, 3, 1, 1), bomb(8, 9, 9, 1)];
        let p = plan(&g, &[bomb(1, 1, 1, 2)], &stable);
        assert_eq!(p.chained, vec![7]);
    }

    #[test]
    fn shared_brick_listed_once() {
        // Two bombs on either side of one brick, same tick.
        let mut g = Grid::walled();
        g.set(5, 3, Cell::Brick);
        let p = plan(&g, &[bomb(1, 4, 3, 2), bomb(2, 6, 3, 2)], &[]);
        assert_eq!(p.bricks, vec![Coord::new(5, 3)]);
        // Both rays still mark the brick cell.
        assert_eq!(p.hazards.iter().filter(|&&c| c == Coord::new(5, 3)).count(), 2);
    }

    #[test]
    fn simultaneous_bombs_share_snapshot() {
        // Bomb A sits right above the brick and destroys it this tick.
        // Bomb B's upward ray must still stop at the brick, not pass to A.
        let mut g = Grid::walled();
        g.set(5, 3, Cell::Brick);
        let p = plan(&g, &[bomb(1, 5, 2, 1), bomb(2, 5, 5, 3)], &[]);
        let from_b = ray(&g, Coord::new(5, 5), Direction::Up, 3);
        assert_eq!(from_b.cells, vec![Coord::new(5, 4), Coord::new(5, 3)]);
        assert_eq!(p.bricks, vec![Coord::new(5, 3)]);
        // (5,2) is marked once, as A's center, never by B's ray.
        assert_eq!(p.hazards.iter().filter(|&&c| c == Coord::new(5, 2)).count(), 1);
    }

    fn arb_cell() -> impl Strategy<Value = Cell> {
        prop_oneof![3 => Just(Cell::Empty), 1 => Just(Cell::Wall), 1 => Just(Cell::Brick)]
    }

    proptest! {
        #[test]
        fn ray_never_passes_wall_or_brick(
            cells in proptest::collection::vec(arb_cell(), GRID_WIDTH * GRID_HEIGHT),
            ox in 0..GRID_WIDTH as i32,
            oy in 0..GRID_HEIGHT as i32,
            range in 0u32..8,
            dir_idx in 0usize..4,
        ) {
            let mut g = Grid::empty();
            for (i, c) in cells.iter().enumerate() {
                g.set((i % GRID_WIDTH) as i32, (i / GRID_WIDTH) as i32, *c);
            }
            let dir = Direction::ALL[dir_idx];
            let r = ray(&g, Coord::new(ox, oy), dir, range);

            prop_assert!(r.cells.len() <= range as usize);
            for (i, at) in r.cells.iter().enumerate() {
                let cell = g.get(at.x, at.y);
                prop_assert!(cell.is_some());
                prop_assert_ne!(cell, Some(Cell::Wall));
                // Only the last marked cell may be a brick.
                if cell == Some(Cell::Brick) {
                    prop_assert_eq!(i, r.cells.len() - 1);
                }
                // Every cell before this one along the ray is open.
                for j in 1..=i as i32 {
                    let before = Coord::new(ox, oy).step(dir, j);
                    prop_assert_eq!(g.get(before.x, before.y), Some(Cell::Empty));
                }
            }
        }
    }
}
