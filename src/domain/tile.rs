/// Cell types and the fixed-size arena grid.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

/// Arena width in cells.
pub const GRID_WIDTH: usize = 15;
/// Arena height in cells.
pub const GRID_HEIGHT: usize = 11;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Wall,  // Indestructible
    Brick, // Destroyed by blasts
}

impl Cell {
    /// Can an entity occupy this cell?
    pub fn is_passable(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Does a blast ray stop *before* this cell (without marking it)?
    pub fn blocks_blast(self) -> bool {
        matches!(self, Cell::Wall)
    }

    /// Can a blast destroy this cell?
    pub fn is_destructible(self) -> bool {
        matches!(self, Cell::Brick)
    }
}

/// The arena terrain. Row-major: `cells[y][x]`.
///
/// Always `GRID_WIDTH x GRID_HEIGHT`. Out-of-range reads return `None`,
/// so no caller ever indexes past the edge.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// An all-empty arena.
    pub fn empty() -> Self {
        Grid { cells: vec![vec![Cell::Empty; GRID_WIDTH]; GRID_HEIGHT] }
    }

    /// An arena with a wall border and an empty interior.
    pub fn walled() -> Self {
        let mut grid = Grid::empty();
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                if x == 0 || y == 0 || x == GRID_WIDTH - 1 || y == GRID_HEIGHT - 1 {
                    grid.cells[y][x] = Cell::Wall;
                }
            }
        }
        grid
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < GRID_WIDTH && (y as usize) < GRID_HEIGHT
    }

    /// Cell at (x, y), or `None` off the arena.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if self.in_bounds(x, y) {
            Some(self.cells[y as usize][x as usize])
        } else {
            None
        }
    }

    /// Overwrite a cell. Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if self.in_bounds(x, y) {
            self.cells[y as usize][x as usize] = cell;
        }
    }

    /// Iterate every cell with its coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, c)| (x as i32, y as i32, *c))
        })
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.iter().filter(|&(_, _, c)| c == cell).count()
    }

    /// Build a grid from a string diagram (test and tooling helper).
    /// Legend: `=` wall, `#` brick, anything else empty.
    /// Rows shorter than the arena are padded with empty cells.
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut grid = Grid::empty();
        for (y, row) in rows.iter().enumerate().take(GRID_HEIGHT) {
            for (x, ch) in row.chars().enumerate().take(GRID_WIDTH) {
                let cell = match ch {
                    '=' => Cell::Wall,
                    '#' => Cell::Brick,
                    _ => Cell::Empty,
                };
                grid.cells[y][x] = cell;
            }
        }
        grid
    }
}
