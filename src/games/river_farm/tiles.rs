//! Tile pattern catalog: the 7x7 water masks of all six tile types and their rotations.

use once_cell::sync::Lazy;

use super::types::*;

/// K x K water mask. `true` is water.
pub type TilePattern = [[bool; K]; K];

const fn mask(rows: [[u8; K]; K]) -> TilePattern {
    let mut out = [[false; K]; K];
    let mut i = 0;
    while i < K {
        let mut j = 0;
        while j < K {
            out[i][j] = rows[i][j] == 1;
            j += 1;
        }
        i += 1;
    }
    out
}

/// Canonical (rotation 0) patterns, indexed by `tile_type - 1`.
pub const PATTERNS: [TilePattern; 6] = [
    // 1: Source, a hollow ring
    mask([
        [1, 1, 1, 1, 1, 1, 1],
        [1, 0, 0, 0, 0, 0, 1],
        [1, 0, 0, 0, 0, 0, 1],
        [1, 0, 0, 0, 0, 0, 1],
        [1, 0, 0, 0, 0, 0, 1],
        [1, 0, 0, 0, 0, 0, 1],
        [1, 1, 1, 1, 1, 1, 1],
    ]),
    // 2: Channel, straight through the middle row
    mask([
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0],
        [1, 1, 1, 1, 1, 1, 1],
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0],
    ]),
    // 3: Diagonal band, top-left to bottom-right
    mask([
        [1, 1, 0, 0, 0, 0, 0],
        [1, 1, 1, 0, 0, 0, 0],
        [0, 1, 1, 1, 0, 0, 0],
        [0, 0, 1, 1, 1, 0, 0],
        [0, 0, 0, 1, 1, 1, 0],
        [0, 0, 0, 0, 1, 1, 1],
        [0, 0, 0, 0, 0, 1, 1],
    ]),
    // 4: Field, dry
    mask([[0; K]; K]),
    // 5: Junction, both diagonals
    mask([
        [1, 1, 0, 0, 0, 1, 1],
        [1, 1, 1, 0, 1, 1, 1],
        [0, 1, 1, 1, 1, 1, 0],
        [0, 0, 1, 1, 1, 0, 0],
        [0, 1, 1, 1, 1, 1, 0],
        [1, 1, 1, 0, 1, 1, 1],
        [1, 1, 0, 0, 0, 1, 1],
    ]),
    // 6: Twin channel, rows 1 and 5
    mask([
        [0, 0, 0, 0, 0, 0, 0],
        [1, 1, 1, 1, 1, 1, 1],
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0],
        [1, 1, 1, 1, 1, 1, 1],
        [0, 0, 0, 0, 0, 0, 0],
    ]),
];

/// Canonical pattern of a tile type (1..=6).
pub fn pattern(tile_type: u8) -> &'static TilePattern {
    assert!(
        (SOURCE..=TWIN_CHANNEL).contains(&tile_type),
        "Invalid tile type: {tile_type}"
    );
    &PATTERNS[tile_type as usize - 1]
}

/// Rotate 90 degrees clockwise: transpose, then reverse each row.
pub fn rotate90(m: &TilePattern) -> TilePattern {
    let mut out = [[false; K]; K];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = m[K - 1 - j][i];
        }
    }
    out
}

/// Rotate clockwise `times` quarter turns (taken mod 4).
pub fn rotate(m: &TilePattern, times: u32) -> TilePattern {
    let mut out = *m;
    for _ in 0..times % 4 {
        out = rotate90(&out);
    }
    out
}

/// Pre-computed rotated patterns: `ROTATED_PATTERNS[tile_type - 1][rotation]`.
pub static ROTATED_PATTERNS: Lazy<[[TilePattern; 4]; 6]> = Lazy::new(|| {
    let mut table = [[[[false; K]; K]; 4]; 6];
    for (idx, base) in PATTERNS.iter().enumerate() {
        for rot in 0..4 {
            table[idx][rot] = rotate(base, rot as u32);
        }
    }
    table
});

/// Pattern of a tile with its rotation applied. Uses the lookup table.
#[inline]
pub fn rotated_pattern(tile_type: u8, rotation: u8) -> &'static TilePattern {
    assert!(
        (SOURCE..=TWIN_CHANNEL).contains(&tile_type),
        "Invalid tile type: {tile_type}"
    );
    assert!(rotation < 4, "Invalid rotation: {rotation}");
    &ROTATED_PATTERNS[tile_type as usize - 1][rotation as usize]
}

/// Whether a player may turn this tile before placing it.
/// Source, field and junction look the same from every side.
pub fn is_rotatable(tile_type: u8) -> bool {
    assert!(
        (SOURCE..=TWIN_CHANNEL).contains(&tile_type),
        "Invalid tile type: {tile_type}"
    );
    !matches!(tile_type, SOURCE | FIELD | JUNCTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_count(p: &TilePattern) -> usize {
        p.iter().flatten().filter(|&&w| w).count()
    }

    #[test]
    fn test_catalog_masks() {
        assert_eq!(water_count(pattern(SOURCE)), 24);
        assert_eq!(water_count(pattern(CHANNEL)), 7);
        assert_eq!(water_count(pattern(DIAGONAL)), 19);
        assert_eq!(water_count(pattern(FIELD)), 0);
        assert_eq!(water_count(pattern(JUNCTION)), 33);
        assert_eq!(water_count(pattern(TWIN_CHANNEL)), 14);

        // Source interior is dry
        assert!(!pattern(SOURCE)[3][3]);
        assert!(pattern(SOURCE)[0][3]);
    }

    #[test]
    fn test_rotate90_channel_becomes_vertical() {
        let rotated = rotate90(pattern(CHANNEL));
        for i in 0..K {
            for j in 0..K {
                assert_eq!(rotated[i][j], j == 3, "cell ({i},{j})");
            }
        }
    }

    #[test]
    fn test_rotate90_is_clockwise() {
        // Diagonal corner (0,0) moves to the top-right corner.
        let rotated = rotate90(pattern(DIAGONAL));
        assert!(rotated[0][6]);
        assert!(rotated[6][0]);
        assert!(!rotated[0][0]);
        // (0,1) is water in the canonical band; clockwise it lands on (1,6).
        assert!(rotated[1][6]);
    }

    #[test]
    fn test_rotation_has_order_four() {
        for &t in &TILE_TYPES {
            let p = pattern(t);
            let mut m = *p;
            for _ in 0..4 {
                m = rotate90(&m);
            }
            assert_eq!(&m, p, "tile {t}");
            for r in 0..4 {
                assert_eq!(rotate(p, r), rotate(p, r + 4), "tile {t} rotation {r}");
            }
        }
    }

    #[test]
    fn test_rotation_does_not_mutate_catalog() {
        let before = *pattern(DIAGONAL);
        let _ = rotate(pattern(DIAGONAL), 1);
        assert_eq!(*pattern(DIAGONAL), before);
    }

    #[test]
    fn test_lookup_table_matches_rotate() {
        for &t in &TILE_TYPES {
            for r in 0..4u8 {
                assert_eq!(*rotated_pattern(t, r), rotate(pattern(t), r as u32));
            }
        }
    }

    #[test]
    fn test_non_rotatable_tiles_are_symmetric() {
        for &t in &TILE_TYPES {
            if !is_rotatable(t) {
                assert_eq!(rotate90(pattern(t)), *pattern(t), "tile {t}");
            }
        }
        assert!(is_rotatable(CHANNEL));
        assert!(is_rotatable(DIAGONAL));
        assert!(is_rotatable(TWIN_CHANNEL));
    }

    #[test]
    #[should_panic(expected = "Invalid tile type")]
    fn test_unknown_tile_type_panics() {
        let _ = pattern(7);
    }

    #[test]
    #[should_panic(expected = "Invalid tile type: 9")]
    fn test_rotatable_rejects_unknown_type() {
        is_rotatable(9);
    }

    #[test]
    #[should_panic(expected = "Invalid tile type: 0")]
    fn test_rotatable_rejects_zero() {
        is_rotatable(0);
    }
}
