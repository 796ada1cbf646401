//! River Farm core types: seats, placed tiles, the coarse board and its text notation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Board rows.
pub const ROWS: usize = 4;
/// Board columns.
pub const COLS: usize = 6;
/// Sub-cells per tile edge in the master grid.
pub const K: usize = 7;

/// Coarse board coordinate `(row, col)`.
pub type TilePos = (usize, usize);

/// Master-grid coordinate `(row, col)`.
pub type SubCell = (usize, usize);

// --- Tile type IDs ---

pub const SOURCE: u8 = 1;
pub const CHANNEL: u8 = 2;
pub const DIAGONAL: u8 = 3;
pub const FIELD: u8 = 4;
pub const JUNCTION: u8 = 5;
pub const TWIN_CHANNEL: u8 = 6;

pub const TILE_TYPES: [u8; 6] = [SOURCE, CHANNEL, DIAGONAL, FIELD, JUNCTION, TWIN_CHANNEL];

/// Human-readable tile name, used in events and logs.
pub fn tile_name(tile_type: u8) -> &'static str {
    match tile_type {
        SOURCE => "source",
        CHANNEL => "channel",
        DIAGONAL => "diagonal",
        FIELD => "field",
        JUNCTION => "junction",
        TWIN_CHANNEL => "twin_channel",
        _ => panic!("Invalid tile type: {tile_type}"),
    }
}

// --- Seats ---

/// One of the two players, numbered 1 and 2 on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub const ALL: [Seat; 2] = [Seat::First, Seat::Second];

    /// Zero-based index into per-player arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Seat::First,
            1 => Seat::Second,
            _ => panic!("Invalid seat index: {idx}"),
        }
    }

    /// Seat number as written on the board (1 or 2).
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Seat::First),
            2 => Some(Seat::Second),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

// --- Placed tiles ---

/// A tile on the board. `owner` is set only for fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub tile_type: u8,
    #[serde(default)]
    pub owner: Option<Seat>,
    #[serde(default)]
    pub rotation: u8,
}

impl PlacedTile {
    /// An unowned non-field tile.
    pub fn new(tile_type: u8, rotation: u8) -> Self {
        assert!(
            (SOURCE..=TWIN_CHANNEL).contains(&tile_type) && tile_type != FIELD,
            "Invalid unowned tile type: {tile_type}"
        );
        assert!(rotation < 4, "Invalid rotation: {rotation}");
        Self {
            tile_type,
            owner: None,
            rotation,
        }
    }

    /// A field owned by `owner`. Fields are never rotated.
    pub fn field(owner: Seat) -> Self {
        Self {
            tile_type: FIELD,
            owner: Some(owner),
            rotation: 0,
        }
    }

    pub fn is_field(&self) -> bool {
        self.tile_type == FIELD
    }

    pub fn is_source(&self) -> bool {
        self.tile_type == SOURCE
    }
}

// --- Board ---

/// The fixed 4x6 coarse board. Cells are only ever filled, never cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub tiles: [[Option<PlacedTile>; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            tiles: [[None; COLS]; ROWS],
        }
    }

    #[inline]
    pub fn in_bounds(pos: TilePos) -> bool {
        pos.0 < ROWS && pos.1 < COLS
    }

    pub fn get(&self, pos: TilePos) -> Option<&PlacedTile> {
        assert!(Self::in_bounds(pos), "Board position out of range: {pos:?}");
        self.tiles[pos.0][pos.1].as_ref()
    }

    pub fn is_empty_at(&self, pos: TilePos) -> bool {
        self.get(pos).is_none()
    }

    /// Place a tile. Panics if the cell is occupied or the tile is malformed.
    pub fn place(&mut self, pos: TilePos, tile: PlacedTile) {
        assert!(Self::in_bounds(pos), "Board position out of range: {pos:?}");
        assert!(
            self.tiles[pos.0][pos.1].is_none(),
            "Board position already occupied: {pos:?}"
        );
        assert!(
            TILE_TYPES.contains(&tile.tile_type),
            "Invalid tile type: {}",
            tile.tile_type
        );
        assert!(tile.rotation < 4, "Invalid rotation: {}", tile.rotation);
        assert_eq!(
            tile.owner.is_some(),
            tile.is_field(),
            "Only fields carry an owner: {tile:?}"
        );
        self.tiles[pos.0][pos.1] = Some(tile);
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (TilePos, &PlacedTile)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.as_ref().map(|t| ((r, c), t)))
        })
    }

    /// Empty cells in row-major order.
    pub fn empty_positions(&self) -> Vec<TilePos> {
        let mut result = Vec::new();
        for r in 0..ROWS {
            for c in 0..COLS {
                if self.tiles[r][c].is_none() {
                    result.push((r, c));
                }
            }
        }
        result
    }

    pub fn is_full(&self) -> bool {
        self.tiles.iter().all(|row| row.iter().all(|cell| cell.is_some()))
    }

    pub fn count_of(&self, tile_type: u8) -> usize {
        self.occupied().filter(|(_, t)| t.tile_type == tile_type).count()
    }
}

// --- Board notation ---
//
// Rows are separated by '/' or newlines, cells by whitespace.
//   .      empty
//   T      tile type T, rotation 0
//   TrN    tile type T, rotation N
//   4@S    field owned by seat S

fn parse_cell(token: &str) -> Result<Option<PlacedTile>, String> {
    if token == "." {
        return Ok(None);
    }

    let bad = || format!("Invalid board cell: {token:?}");

    if let Some((kind, seat)) = token.split_once('@') {
        if kind != "4" {
            return Err(format!("Only fields (4) can have an owner: {token:?}"));
        }
        let n: u8 = seat.parse().map_err(|_| bad())?;
        let owner = Seat::from_number(n).ok_or_else(bad)?;
        return Ok(Some(PlacedTile::field(owner)));
    }

    let (kind, rotation) = match token.split_once('r') {
        Some((kind, rot)) => (kind, rot.parse::<u8>().map_err(|_| bad())?),
        None => (token, 0),
    };
    let tile_type: u8 = kind.parse().map_err(|_| bad())?;
    if !TILE_TYPES.contains(&tile_type) {
        return Err(format!("Unknown tile type in {token:?}"));
    }
    if tile_type == FIELD {
        return Err(format!("Field needs an owner, e.g. 4@1: {token:?}"));
    }
    if rotation > 3 {
        return Err(format!("Rotation must be 0-3: {token:?}"));
    }
    Ok(Some(PlacedTile::new(tile_type, rotation)))
}

impl FromStr for Board {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .split(['/', '\n'])
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect();
        if rows.len() > ROWS {
            return Err(format!("Board has {} rows, at most {ROWS} allowed", rows.len()));
        }

        let mut board = Board::new();
        for (r, row) in rows.iter().enumerate() {
            let cells: Vec<&str> = row.split_whitespace().collect();
            if cells.len() > COLS {
                return Err(format!(
                    "Row {r} has {} cells, at most {COLS} allowed",
                    cells.len()
                ));
            }
            for (c, token) in cells.iter().enumerate() {
                board.tiles[r][c] = parse_cell(token)?;
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.tiles.iter().enumerate() {
            if r > 0 {
                f.write_str(" / ")?;
            }
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    f.write_str(" ")?;
                }
                match cell {
                    None => f.write_str(".")?,
                    Some(t) => match t.owner {
                        Some(seat) => write!(f, "{}@{}", t.tile_type, seat.number())?,
                        None if t.rotation == 0 => write!(f, "{}", t.tile_type)?,
                        None => write!(f, "{}r{}", t.tile_type, t.rotation)?,
                    },
                }
            }
        }
        Ok(())
    }
}
