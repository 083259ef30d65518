use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::board::{Board, coord};

/// A falling piece (tetromino or bomb) with its shape and board position.
///
/// The position is the top-left corner of the shape's bounding box. `y` may
/// be negative while a piece is partially above the visible board.
/// Pieces are immutable values: movement and rotation return new `Piece`s.
///
/// # Example
///
/// ```
/// use bombris_engine::{Piece, PieceKind};
///
/// let piece = Piece::spawn(PieceKind::T, 10);
/// assert_eq!((piece.x(), piece.y()), (4, 0));
///
/// let rotated = piece.rotated_clockwise();
/// assert_eq!(rotated.shape().width(), 2);
/// assert_eq!(rotated.shape().height(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    kind: PieceKind,
    shape: PieceShape,
    x: i32,
    y: i32,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, shape: PieceShape, x: i32, y: i32) -> Self {
        Self { kind, shape, x, y }
    }

    /// Creates a piece in its spawn orientation, horizontally centered at row 0.
    #[must_use]
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let shape = kind.spawn_shape();
        let x = (board_width / 2).saturating_sub(shape.width() / 2);
        Self::new(kind, shape, coord(x), 0)
    }

    /// Creates a bomb at row 0 of the given column.
    #[must_use]
    pub fn bomb(column: usize) -> Self {
        Self::new(PieceKind::Bomb, PieceShape::BOMB, coord(column), 0)
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> PieceShape {
        self.shape
    }

    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub fn is_bomb(&self) -> bool {
        self.kind.is_bomb()
    }

    /// Returns the absolute board positions of the occupied shape cells.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .occupied_cells()
            .map(move |(dx, dy)| (self.x + coord(dx), self.y + coord(dy)))
    }

    #[must_use]
    pub fn moved(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        Self {
            shape: self.shape.rotated_clockwise(),
            ..*self
        }
    }

    /// Candidate placements tried in order when rotating: in place, then one
    /// column right, then one column left.
    ///
    /// Bombs never rotate, so they have no candidates.
    #[must_use]
    pub fn rotation_candidates(&self) -> ArrayVec<Self, 3> {
        let mut candidates = ArrayVec::new();
        if self.is_bomb() {
            return candidates;
        }
        let rotated = self.rotated_clockwise();
        candidates.push(rotated);
        candidates.push(rotated.moved(1, 0));
        candidates.push(rotated.moved(-1, 0));
        candidates
    }

    /// Returns the position this piece would come to rest at if dropped straight down.
    #[must_use]
    pub fn simulate_drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while board.is_valid_move(&dropped, 0, 1) {
            dropped = dropped.moved(0, 1);
        }
        dropped
    }
}

/// Kind of a piece, also used as the tag of a locked cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
    /// Single-cell bomb.
    Bomb = 7,
}

/// Samples one of the seven tetrominoes uniformly. Never yields a bomb.
impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::TETROMINOES[rng.random_range(0..PieceKind::TETROMINOES.len())]
    }
}

impl PieceKind {
    /// The seven standard tetromino kinds.
    pub const TETROMINOES: [Self; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    #[must_use]
    pub const fn is_bomb(self) -> bool {
        matches!(self, PieceKind::Bomb)
    }

    /// Shape of the piece as it spawns.
    #[must_use]
    pub const fn spawn_shape(self) -> PieceShape {
        SPAWN_SHAPES[self as usize]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use bombris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::Bomb.as_char(), 'B');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::Bomb => 'B',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use bombris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('B'), Some(PieceKind::Bomb));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'B' => Some(PieceKind::Bomb),
            _ => None,
        }
    }
}

/// Occupancy matrix of a piece, from 1×1 up to 4×4.
///
/// Each row is stored as a bit mask where bit `x` marks column `x` as occupied.
/// Shapes serialize as a list of rows drawn with `#` (occupied) and `.` (empty),
/// e.g. `[".#.", "###"]` for the spawn T-piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceShape {
    width: u8,
    height: u8,
    rows: [u8; PieceShape::MAX_SIZE],
}

impl PieceShape {
    /// Largest width or height of a shape.
    pub const MAX_SIZE: usize = 4;

    /// The single-cell bomb shape.
    pub const BOMB: Self = Self::from_masks(1, 1, [0b1, 0, 0, 0]);

    const fn from_masks(width: u8, height: u8, rows: [u8; Self::MAX_SIZE]) -> Self {
        assert!(width as usize <= Self::MAX_SIZE && height as usize <= Self::MAX_SIZE);
        Self {
            width,
            height,
            rows,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(self.height)
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height() && self.rows[y] & (1 << x) != 0
    }

    /// Returns the `(x, y)` offsets of the occupied cells, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height())
            .flat_map(move |y| (0..self.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_occupied(x, y))
    }

    /// Returns this shape rotated 90° clockwise.
    ///
    /// A `w×h` shape becomes `h×w`; the cell at `(x, y)` of the result comes
    /// from `(y, h - 1 - x)` of `self`.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let mut rows = [0; Self::MAX_SIZE];
        let height = self.height();
        for (y, row) in rows.iter_mut().enumerate().take(self.width()) {
            for x in 0..height {
                if self.is_occupied(y, height - 1 - x) {
                    *row |= 1 << x;
                }
            }
        }
        Self {
            width: self.height,
            height: self.width,
            rows,
        }
    }

    /// Parses a shape from rows of `#` and `.` characters.
    ///
    /// Rows must share a width, both dimensions must be within `1..=4`, and at
    /// least one cell must be occupied.
    pub fn from_rows<S>(rows: &[S]) -> Result<Self, String>
    where
        S: AsRef<str>,
    {
        if rows.is_empty() || rows.len() > Self::MAX_SIZE {
            return Err(format!(
                "shape must have 1 to {} rows, got {}",
                Self::MAX_SIZE,
                rows.len()
            ));
        }
        let width = rows[0].as_ref().chars().count();
        if width == 0 || width > Self::MAX_SIZE {
            return Err(format!(
                "shape must have 1 to {} columns, got {width}",
                Self::MAX_SIZE
            ));
        }

        let mut masks = [0; Self::MAX_SIZE];
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(format!("shape row {y} has a different width: '{row}'"));
            }
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '#' => masks[y] |= 1 << x,
                    '.' => {}
                    _ => return Err(format!("invalid shape cell '{ch}' in row {y}")),
                }
            }
        }
        if masks.iter().all(|&mask| mask == 0) {
            return Err("shape has no occupied cells".to_owned());
        }

        #[expect(clippy::cast_possible_truncation)]
        let shape = Self::from_masks(width as u8, rows.len() as u8, masks);
        Ok(shape)
    }

    /// Renders the shape as rows of `#` and `.` characters.
    #[must_use]
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height())
            .map(|y| {
                (0..self.width())
                    .map(|x| if self.is_occupied(x, y) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }
}

impl Serialize for PieceShape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_rows().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PieceShape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        PieceShape::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}

const SPAWN_SHAPES: [PieceShape; 8] = [
    // I: ####
    PieceShape::from_masks(4, 1, [0b1111, 0, 0, 0]),
    // O: ## / ##
    PieceShape::from_masks(2, 2, [0b11, 0b11, 0, 0]),
    // T: .#. / ###
    PieceShape::from_masks(3, 2, [0b010, 0b111, 0, 0]),
    // S: .## / ##.
    PieceShape::from_masks(3, 2, [0b110, 0b011, 0, 0]),
    // Z: ##. / .##
    PieceShape::from_masks(3, 2, [0b011, 0b110, 0, 0]),
    // J: #.. / ###
    PieceShape::from_masks(3, 2, [0b001, 0b111, 0, 0]),
    // L: ..# / ###
    PieceShape::from_masks(3, 2, [0b100, 0b111, 0, 0]),
    // Bomb
    PieceShape::BOMB,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(shape: PieceShape) -> Vec<String> {
        shape.to_rows()
    }

    #[test]
    fn test_spawn_shapes() {
        assert_eq!(rows(PieceKind::I.spawn_shape()), ["####"]);
        assert_eq!(rows(PieceKind::O.spawn_shape()), ["##", "##"]);
        assert_eq!(rows(PieceKind::T.spawn_shape()), [".#.", "###"]);
        assert_eq!(rows(PieceKind::S.spawn_shape()), [".##", "##."]);
        assert_eq!(rows(PieceKind::Z.spawn_shape()), ["##.", ".##"]);
        assert_eq!(rows(PieceKind::J.spawn_shape()), ["#..", "###"]);
        assert_eq!(rows(PieceKind::L.spawn_shape()), ["..#", "###"]);
        assert_eq!(rows(PieceKind::Bomb.spawn_shape()), ["#"]);
    }

    #[test]
    fn test_every_tetromino_has_four_cells() {
        for kind in PieceKind::TETROMINOES {
            assert_eq!(kind.spawn_shape().occupied_cells().count(), 4, "{kind:?}");
        }
    }

    #[test]
    fn test_rotate_t_clockwise() {
        let shape = PieceKind::T.spawn_shape();
        assert_eq!(rows(shape.rotated_clockwise()), ["#.", "##", "#."]);
        assert_eq!(
            rows(shape.rotated_clockwise().rotated_clockwise()),
            ["###", ".#."]
        );
    }

    #[test]
    fn test_rotate_i_clockwise() {
        let shape = PieceKind::I.spawn_shape().rotated_clockwise();
        assert_eq!(rows(shape), ["#", "#", "#", "#"]);
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        for kind in PieceKind::TETROMINOES {
            let shape = kind.spawn_shape();
            let mut rotated = shape;
            for _ in 0..4 {
                rotated = rotated.rotated_clockwise();
            }
            assert_eq!(rotated, shape, "{kind:?}");
        }
    }

    #[test]
    fn test_spawn_position_is_centered() {
        assert_eq!(Piece::spawn(PieceKind::I, 10).x(), 3);
        assert_eq!(Piece::spawn(PieceKind::O, 10).x(), 4);
        assert_eq!(Piece::spawn(PieceKind::T, 10).x(), 4);
        assert_eq!(Piece::spawn(PieceKind::I, 13).x(), 4);
        assert_eq!(Piece::spawn(PieceKind::L, 10).y(), 0);
    }

    #[test]
    fn test_occupied_positions_are_absolute() {
        let piece = Piece::spawn(PieceKind::T, 10).moved(0, 5);
        let cells: Vec<_> = piece.occupied_positions().collect();
        assert_eq!(cells, [(5, 5), (4, 6), (5, 6), (6, 6)]);
    }

    #[test]
    fn test_bomb_has_no_rotation_candidates() {
        assert!(Piece::bomb(3).rotation_candidates().is_empty());

        let t = Piece::spawn(PieceKind::T, 10);
        let candidates = t.rotation_candidates();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[1].x(), t.x() + 1);
        assert_eq!(candidates[2].x(), t.x() - 1);
    }

    fn parse_json(rows: &[&str]) -> Result<PieceShape, serde_json::Error> {
        let json = serde_json::to_string(rows).unwrap();
        serde_json::from_str(&json)
    }

    #[test]
    fn test_shape_serialization() {
        let shape = PieceKind::S.spawn_shape();
        let serialized = serde_json::to_string(&shape).unwrap();
        assert_eq!(serialized, serde_json::to_string(&[".##", "##."]).unwrap());

        let deserialized: PieceShape = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, shape);
    }

    #[test]
    fn test_shape_deserialization_error_cases() {
        assert!(parse_json(&[]).is_err());
        assert!(parse_json(&["#####"]).is_err());
        assert!(parse_json(&["#", "#", "#", "#", "#"]).is_err());
        assert!(parse_json(&["##", "#"]).is_err());
        assert!(parse_json(&["..", ".."]).is_err());
        assert!(parse_json(&["#x"]).is_err());
        assert!(parse_json(&["#.", "##"]).is_ok());
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::TETROMINOES.into_iter().chain([PieceKind::Bomb]) {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('x'), None);
    }
}
