use arrayvec::ArrayVec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::piece::{Piece, PieceKind};

/// Converts a board dimension or index into a signed board coordinate.
///
/// Board dimensions are bounded by [`Board::MAX_WIDTH`] and [`Board::MAX_HEIGHT`].
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) const fn coord(value: usize) -> i32 {
    value as i32
}

/// A single cell of the board.
///
/// A cell is either empty or holds the kind of the piece that was locked there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// No block.
    #[default]
    Empty,
    /// Locked block of a specific piece kind.
    Block(PieceKind),
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn kind(self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Block(kind) => Some(kind),
        }
    }

    /// Returns `.` for an empty cell, otherwise the piece kind's character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Block(kind) => kind.as_char(),
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::Empty);
        }
        match PieceKind::from_char(c) {
            Some(kind) => Some(Cell::Block(kind)),
            None => None,
        }
    }
}

/// The playfield: a dense `width × height` grid of locked cells.
///
/// Row 0 is the top of the board. The grid is the only record of the settled
/// stack; the set of locked cells is derived from it with [`Board::locked_cells`].
///
/// Boards serialize as a list of row strings, one character per cell
/// (see [`Cell::as_char`]).
///
/// # Example
///
/// ```
/// use bombris_engine::{Board, Cell, PieceKind};
///
/// let mut board = Board::new(10, 20);
/// board.set_cell(0, 19, Cell::Block(PieceKind::I));
/// assert_eq!(board.locked_cells().count(), 1);
/// assert!(!board.is_row_full(19));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub const MIN_WIDTH: usize = 4;
    pub const MIN_HEIGHT: usize = 4;
    pub const MAX_WIDTH: usize = 64;
    pub const MAX_HEIGHT: usize = 64;

    /// Creates an empty board.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are outside `MIN..=MAX`.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            Self::is_supported_size(width, height),
            "unsupported board size {width}x{height}"
        );
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    #[must_use]
    pub fn is_supported_size(width: usize, height: usize) -> bool {
        (Self::MIN_WIDTH..=Self::MAX_WIDTH).contains(&width)
            && (Self::MIN_HEIGHT..=Self::MAX_HEIGHT).contains(&height)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y * self.width + x)
    }

    /// Returns the cell at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Sets the cell at `(x, y)`. Returns `false` when out of bounds.
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some_and(|cell| !cell.is_empty())
    }

    /// Returns row `y` of cells, counting from the top, or `None` below the board.
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        self.cells.chunks_exact(self.width).nth(y)
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.width)
    }

    /// Returns every locked cell as `(x, y, kind)`, row by row.
    pub fn locked_cells(&self) -> impl Iterator<Item = (usize, usize, PieceKind)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.kind()
                .map(|kind| (i % self.width, i / self.width, kind))
        })
    }

    /// Checks whether `piece` translated by `(dx, dy)` is a legal position.
    ///
    /// Every occupied cell must lie within `0..width` horizontally and above
    /// the bottom edge. Cells above row 0 are not checked for occupancy, which
    /// lets pieces sit partially above the visible board.
    #[must_use]
    pub fn is_valid_move(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        piece.occupied_positions().all(|(x, y)| {
            let (x, y) = (x + dx, y + dy);
            if x < 0 || x >= coord(self.width) || y >= coord(self.height) {
                return false;
            }
            y < 0 || !self.is_occupied(x, y)
        })
    }

    /// Writes the piece's occupied cells into the grid.
    ///
    /// Cells above the visible board are discarded.
    pub fn fill_piece(&mut self, piece: &Piece) {
        for (x, y) in piece.occupied_positions() {
            self.set_cell(x, y, Cell::Block(piece.kind()));
        }
    }

    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row(y)
            .is_some_and(|row| row.iter().all(|cell| !cell.is_empty()))
    }

    /// Removes row `y` and shifts every row above it down by one.
    ///
    /// The top row becomes empty.
    pub fn clear_row(&mut self, y: usize) {
        if y >= self.height {
            return;
        }
        self.cells.copy_within(..y * self.width, self.width);
        self.cells[..self.width].fill(Cell::Empty);
    }

    /// Clears every full row and returns how many were cleared.
    ///
    /// Rows are found top to bottom and cleared one at a time in that order,
    /// each clear shifting the (already partially shifted) rows above it.
    pub fn clear_lines(&mut self) -> usize {
        let full_rows: Vec<usize> = (0..self.height).filter(|&y| self.is_row_full(y)).collect();
        for &y in &full_rows {
            self.clear_row(y);
        }
        full_rows.len()
    }

    /// Lets every locked cell in column `x` fall straight down until it rests on
    /// the floor or another cell, preserving their vertical order.
    ///
    /// Returns the number of cells that moved.
    pub fn collapse_column(&mut self, x: usize) -> usize {
        if x >= self.width {
            return 0;
        }
        let mut moved = 0;
        let mut target = self.height;
        for y in (0..self.height).rev() {
            let cell = self.cells[y * self.width + x];
            if cell.is_empty() {
                continue;
            }
            target -= 1;
            if target != y {
                self.cells[target * self.width + x] = cell;
                self.cells[y * self.width + x] = Cell::Empty;
                moved += 1;
            }
        }
        moved
    }

    /// In-bounds cells hit by a bomb resting at `(x, y)`: below-left, below
    /// and below-right.
    #[must_use]
    pub fn blast_cells(&self, x: i32, y: i32) -> ArrayVec<(i32, i32), 3> {
        [(x - 1, y + 1), (x, y + 1), (x + 1, y + 1)]
            .into_iter()
            .filter(|&(x, y)| self.index(x, y).is_some())
            .collect()
    }

    /// Returns `true` if any locked cell lies within the top `rows` rows.
    #[must_use]
    pub fn is_occupied_above(&self, rows: usize) -> bool {
        let rows = rows.min(self.height);
        self.cells[..rows * self.width]
            .iter()
            .any(|cell| !cell.is_empty())
    }

    /// Parses a board from row strings (see [`Cell::as_char`]).
    pub fn from_rows<S>(rows: &[S]) -> Result<Self, String>
    where
        S: AsRef<str>,
    {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if !Self::is_supported_size(width, height) {
            return Err(format!(
                "board must be between {}x{} and {}x{}, got {width}x{height}",
                Self::MIN_WIDTH,
                Self::MIN_HEIGHT,
                Self::MAX_WIDTH,
                Self::MAX_HEIGHT,
            ));
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(format!(
                    "board row {y} has {} cells, expected {width}",
                    row.chars().count()
                ));
            }
            for ch in row.chars() {
                let cell = Cell::from_char(ch)
                    .ok_or_else(|| format!("invalid board cell '{ch}' in row {y}"))?;
                cells.push(cell);
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Creates a board from ASCII art for testing.
    ///
    /// Each non-blank line is a row, top to bottom. `.` is empty, `#` is a
    /// locked cell (tagged as an I-piece block) and piece characters are
    /// locked cells of that kind.
    ///
    /// # Panics
    ///
    /// Panics if the art is not a valid board.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let rows: Vec<String> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.replace('#', "I"))
            .collect();
        match Self::from_rows(&rows) {
            Ok(board) => board,
            Err(e) => panic!("invalid board art: {e}"),
        }
    }

    /// Renders the board as row strings, top to bottom.
    #[must_use]
    pub fn to_rows(&self) -> Vec<String> {
        self.rows()
            .map(|row| row.iter().map(|cell| cell.as_char()).collect())
            .collect()
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_rows().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        Board::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceShape;

    fn full_row(width: usize) -> String {
        "#".repeat(width)
    }

    fn empty_rows(count: usize) -> String {
        "..........\n".repeat(count)
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(10, 20);
        assert_eq!(board.width(), 10);
        assert_eq!(board.height(), 20);
        assert_eq!(board.locked_cells().count(), 0);
        assert!(board.rows().all(|row| row.iter().all(|c| c.is_empty())));
    }

    #[test]
    fn test_cell_bounds() {
        let mut board = Board::new(10, 20);
        assert!(board.set_cell(9, 19, Cell::Block(PieceKind::T)));
        assert!(!board.set_cell(10, 0, Cell::Block(PieceKind::T)));
        assert!(!board.set_cell(0, -1, Cell::Block(PieceKind::T)));
        assert_eq!(board.cell(9, 19), Some(Cell::Block(PieceKind::T)));
        assert_eq!(board.cell(-1, 0), None);
        assert_eq!(board.cell(0, 20), None);
        assert_eq!(board.row(19).map(|row| row[9]), Some(Cell::Block(PieceKind::T)));
        assert_eq!(board.row(20), None);
        assert!(!board.is_row_full(20));
    }

    #[test]
    fn test_valid_move_walls_and_floor() {
        let board = Board::new(10, 20);
        let piece = Piece::spawn(PieceKind::O, 10);
        assert!(board.is_valid_move(&piece, 0, 0));
        assert!(board.is_valid_move(&piece, -4, 0));
        assert!(!board.is_valid_move(&piece, -5, 0));
        assert!(board.is_valid_move(&piece, 4, 0));
        assert!(!board.is_valid_move(&piece, 5, 0));
        assert!(board.is_valid_move(&piece, 0, 18));
        assert!(!board.is_valid_move(&piece, 0, 19));
    }

    #[test]
    fn test_valid_move_above_board_skips_occupancy() {
        let mut board = Board::new(10, 20);
        board.set_cell(4, 0, Cell::Block(PieceKind::I));
        let piece = Piece::spawn(PieceKind::O, 10);
        assert!(!board.is_valid_move(&piece, 0, 0));
        // Only the bottom row of the O-piece is on the board, at row 0 column 4.
        assert!(!board.is_valid_move(&piece, 0, -1));
        assert!(board.is_valid_move(&piece, 0, -2));
        // Horizontal bounds still apply above the board.
        assert!(!board.is_valid_move(&piece, -5, -2));
    }

    #[test]
    fn test_valid_move_blocked_by_stack() {
        let mut board = Board::new(10, 20);
        board.set_cell(4, 10, Cell::Block(PieceKind::S));
        let piece = Piece::new(PieceKind::Bomb, PieceShape::BOMB, 4, 8);
        assert!(board.is_valid_move(&piece, 0, 1));
        assert!(!board.is_valid_move(&piece, 0, 2));
    }

    #[test]
    fn test_fill_piece_discards_cells_above_board() {
        let mut board = Board::new(10, 20);
        let piece = Piece::spawn(PieceKind::O, 10).moved(0, -1);
        board.fill_piece(&piece);
        let cells: Vec<_> = board.locked_cells().collect();
        assert_eq!(cells, [(4, 0, PieceKind::O), (5, 0, PieceKind::O)]);
    }

    #[test]
    fn test_clear_lines_without_full_rows_is_noop() {
        let mut board = Board::from_ascii(&format!(
            "{}#########.\n#.#.#.#.#.\n",
            empty_rows(18)
        ));
        let before = board.clone();
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_single_row_shifts_rows_above() {
        let mut board = Board::from_ascii(&format!(
            "{}..T.......\n.S........\n{}\n",
            empty_rows(17),
            full_row(10)
        ));
        assert_eq!(board.clear_lines(), 1);
        assert_eq!(board.cell(2, 18), Some(Cell::Block(PieceKind::T)));
        assert_eq!(board.cell(1, 19), Some(Cell::Block(PieceKind::S)));
        assert_eq!(board.locked_cells().count(), 2);
    }

    #[test]
    fn test_clear_non_adjacent_rows() {
        let mut board = Board::from_ascii(&format!(
            "{}{}\n....Z.....\n{}\n.....L....\n",
            empty_rows(16),
            full_row(10),
            full_row(10)
        ));
        assert_eq!(board.clear_lines(), 2);
        assert_eq!(board.cell(4, 18), Some(Cell::Block(PieceKind::Z)));
        assert_eq!(board.cell(5, 19), Some(Cell::Block(PieceKind::L)));
        assert_eq!(board.locked_cells().count(), 2);
    }

    #[test]
    fn test_collapse_column_preserves_order() {
        let mut board = Board::from_ascii(&format!(
            "{}...T......\n..........\n...S......\n..........\n..........\n",
            empty_rows(15)
        ));
        let moved = board.collapse_column(3);
        assert_eq!(moved, 2);
        assert_eq!(board.cell(3, 18), Some(Cell::Block(PieceKind::T)));
        assert_eq!(board.cell(3, 19), Some(Cell::Block(PieceKind::S)));
        assert_eq!(board.collapse_column(3), 0);
    }

    #[test]
    fn test_blast_cells_clipped_to_board() {
        let board = Board::new(10, 20);
        assert_eq!(board.blast_cells(4, 5).as_slice(), &[(3, 6), (4, 6), (5, 6)]);
        assert_eq!(board.blast_cells(0, 5).as_slice(), &[(0, 6), (1, 6)]);
        assert!(board.blast_cells(4, 19).is_empty());
    }

    #[test]
    fn test_is_occupied_above() {
        let mut board = Board::new(10, 20);
        assert!(!board.is_occupied_above(2));
        board.set_cell(7, 1, Cell::Block(PieceKind::J));
        assert!(board.is_occupied_above(2));
        assert!(!board.is_occupied_above(1));
    }

    #[test]
    fn test_board_serialization() {
        let mut board = Board::new(4, 4);
        board.set_cell(0, 3, Cell::Block(PieceKind::Bomb));
        board.set_cell(3, 3, Cell::Block(PieceKind::L));

        let serialized = serde_json::to_string(&board).unwrap();
        assert_eq!(serialized, r#"["....","....","....","B..L"]"#);

        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);
    }

    #[test]
    fn test_board_deserialization_error_cases() {
        assert!(serde_json::from_str::<Board>(r#"["....","....","...."]"#).is_err());
        assert!(serde_json::from_str::<Board>(r#"["....","....","....","..."]"#).is_err());
        assert!(serde_json::from_str::<Board>(r#"["....","....","....","..X."]"#).is_err());
    }
}
