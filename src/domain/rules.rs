/// Movement rules, truth-table driven.
///
/// Pure functions over the grid and bomb occupancy, no side effects.
/// These encode "what is legal" without performing the action, so the
/// player command path and the enemy AI can both call them freely.
///
/// ## Movement Truth Table
///
/// ┌──────────────────────────┬───────────┬─────────────────────┐
/// │ Condition                 │ Allow?    │ Notes               │
/// ├──────────────────────────┼───────────┼─────────────────────┤
/// │ Dest out of bounds        │ DENY      │ arena edge          │
/// │ Dest cell = Wall          │ DENY      │ indestructible      │
/// │ Dest cell = Brick         │ DENY      │ blast it first      │
/// │ Live bomb on dest         │ DENY      │ bombs are solid     │
/// │ Item on dest              │ (ignored) │ items never block   │
/// │ Otherwise                 │ ALLOW     │                     │
/// └──────────────────────────┴───────────┴─────────────────────┘
///
/// Occupancy by other actors (enemies, the player) is not
/// part of the table: contact is resolved by the tick's collision check.

use super::entity::{Bomb, Coord};
use super::tile::Grid;

/// Is (x, y) a legal destination? See truth table above.
///
/// The bounds check comes first, so callers may pass `pos + delta`
/// without validating it themselves.
pub fn is_valid_move(grid: &Grid, x: i32, y: i32, bombs: &[Bomb]) -> bool {
    match grid.get(x, y) {
        Some(cell) if cell.is_passable() => !has_bomb(bombs, Coord::new(x, y)),
        _ => false,
    }
}

/// Coordinate form of `is_valid_move`.
#[inline]
pub fn can_enter(grid: &Grid, at: Coord, bombs: &[Bomb]) -> bool {
    is_valid_move(grid, at.x, at.y, bombs)
}

/// Is there a live bomb on this cell?
pub fn has_bomb(bombs: &[Bomb], at: Coord) -> bool {
    bombs.iter().any(|b| b.pos == at)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::{Cell, GRID_HEIGHT, GRID_WIDTH};
    use proptest::prelude::*;

    fn bomb(x: i32, y: i32) -> Bomb {
        Bomb { id: 0, pos: Coord::new(x, y), fuse_at: 2500, range: 1 }
    }

    #[test]
    fn empty_cell_allowed() {
        let g = Grid::from_rows(&[
            "=====",
            "=   =",
            "=====",
        ]);
        assert!(is_valid_move(&g, 2, 1, &[]));
    }

    #[test]
    fn wall_and_brick_denied() {
        let g = Grid::from_rows(&[
            "=====",
            "= # =",
            "=====",
        ]);
        assert!(!is_valid_move(&g, 0, 1, &[]));
        assert!(!is_valid_move(&g, 2, 1, &[]));
        assert!(is_valid_move(&g, 1, 1, &[]));
    }

    #[test]
    fn out_of_bounds_denied() {
        let g = Grid::empty();
        assert!(!is_valid_move(&g, -1, 0, &[]));
        assert!(!is_valid_move(&g, 0, -1, &[]));
        assert!(!is_valid_move(&g, GRID_WIDTH as i32, 0, &[]));
        assert!(!is_valid_move(&g, 0, GRID_HEIGHT as i32, &[]));
    }

    #[test]
    fn bomb_blocks() {
        let g = Grid::walled();
        let bombs = [bomb(3, 3)];
        assert!(!is_valid_move(&g, 3, 3, &bombs));
        assert!(is_valid_move(&g, 3, 4, &bombs));
    }

    #[test]
    fn can_enter_matches_is_valid_move() {
        let g = Grid::walled();
        let bombs = [bomb(2, 2)];
        assert_eq!(can_enter(&g, Coord::new(2, 2), &bombs), is_valid_move(&g, 2, 2, &bombs));
        assert_eq!(can_enter(&g, Coord::new(2, 3), &bombs), is_valid_move(&g, 2, 3, &bombs));
    }

    fn arb_cell() -> impl Strategy<Value = Cell> {
        prop_oneof![Just(Cell::Empty), Just(Cell::Wall), Just(Cell::Brick)]
    }

    proptest! {
        #[test]
        fn never_approves_non_empty_or_bomb(
            cells in proptest::collection::vec(arb_cell(), GRID_WIDTH * GRID_HEIGHT),
            bomb_cells in proptest::collection::vec((0..GRID_WIDTH as i32, 0..GRID_HEIGHT as i32), 0..4),
            x in -2..(GRID_WIDTH as i32 + 2),
            y in -2..(GRID_HEIGHT as i32 + 2),
        ) {
            let mut g = Grid::empty();
            for (i, c) in cells.iter().enumerate() {
                g.set((i % GRID_WIDTH) as i32, (i / GRID_WIDTH) as i32, *c);
            }
            let bombs: Vec<Bomb> = bomb_cells.iter().map(|&(bx, by)| bomb(bx, by)).collect();
            if is_valid_move(&g, x, y, &bombs) {
                prop_assert_eq!(g.get(x, y), Some(Cell::Empty));
                prop_assert!(!bombs.iter().any(|b| b.pos == Coord::new(x, y)));
            }
        }
    }
}
