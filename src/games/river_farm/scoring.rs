//! Field connectivity and scoring.
//!
//! Every owned field searches outward from the water touching its four edges.
//! Each distinct source tile the search reaches is worth one point to the
//! field's owner, and the first-reached cell of that source yields a display
//! path back to the seed it came from.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::grid::{compose, tile_of, tile_origin, MasterGrid};
use super::networks::{find_networks, live_network_indices, neighbors, WaterNetwork};
use super::types::*;

/// One scoring connection: a field, the source it reaches, and a water route
/// from the field's boundary seed to the first-reached source cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePath {
    pub field: TilePos,
    pub source: TilePos,
    pub path: Vec<SubCell>,
}

/// Everything a presentation layer needs after a placement or at game end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub master_grid: MasterGrid,
    /// Indexed by `Seat::index()`.
    pub scores: [u32; 2],
    pub paths: [Vec<SourcePath>; 2],
    pub fields: [Vec<TilePos>; 2],
    pub source_tiles: Vec<TilePos>,
    pub water_networks: Vec<WaterNetwork>,
}

impl Analysis {
    pub fn score(&self, seat: Seat) -> u32 {
        self.scores[seat.index()]
    }

    pub fn paths_for(&self, seat: Seat) -> &[SourcePath] {
        &self.paths[seat.index()]
    }

    pub fn fields_for(&self, seat: Seat) -> &[TilePos] {
        &self.fields[seat.index()]
    }

    /// Connections made by a single field.
    pub fn paths_from(&self, field: TilePos) -> impl Iterator<Item = &SourcePath> + '_ {
        self.paths.iter().flatten().filter(move |p| p.field == field)
    }

    /// Indices into `water_networks` of networks fed by a source tile.
    pub fn live_networks(&self) -> Vec<usize> {
        live_network_indices(&self.water_networks, &self.source_tiles)
    }
}

/// Water cells just outside the field's block, across each of its four edges.
///
/// Order: top edge, bottom edge (left to right), then left edge, right edge
/// (top to bottom). Edges on the board boundary contribute nothing.
pub fn boundary_seeds(grid: &MasterGrid, field: TilePos) -> Vec<SubCell> {
    let (r0, c0) = tile_origin(field);
    let mut candidates = Vec::with_capacity(4 * K);

    if field.0 > 0 {
        candidates.extend((0..K).map(|j| (r0 - 1, c0 + j)));
    }
    if field.0 < ROWS - 1 {
        candidates.extend((0..K).map(|j| (r0 + K, c0 + j)));
    }
    if field.1 > 0 {
        candidates.extend((0..K).map(|i| (r0 + i, c0 - 1)));
    }
    if field.1 < COLS - 1 {
        candidates.extend((0..K).map(|i| (r0 + i, c0 + K)));
    }

    candidates.retain(|&cell| grid.is_water(cell));
    candidates
}

/// Breadth-first search from one field's boundary seeds.
///
/// Returns one `SourcePath` per distinct source tile reached, in the order the
/// search first entered each source's footprint.
pub fn field_connections(board: &Board, grid: &MasterGrid, field: TilePos) -> Vec<SourcePath> {
    let mut visited = vec![false; grid.rows * grid.cols];
    let mut parent: HashMap<SubCell, SubCell> = HashMap::new();
    let mut queue: VecDeque<SubCell> = VecDeque::new();

    for seed in boundary_seeds(grid, field) {
        let i = seed.0 * grid.cols + seed.1;
        if !visited[i] {
            visited[i] = true;
            queue.push_back(seed);
        }
    }

    // source tile -> first cell reached inside its footprint
    let mut reached: Vec<(TilePos, SubCell)> = Vec::new();

    while let Some(cell) = queue.pop_front() {
        let tile_pos = tile_of(cell);
        let is_source = board.get(tile_pos).is_some_and(|t| t.is_source());
        if is_source && !reached.iter().any(|(src, _)| *src == tile_pos) {
            reached.push((tile_pos, cell));
        }

        for next in neighbors(grid, cell) {
            let i = next.0 * grid.cols + next.1;
            if visited[i] || !grid.is_water(next) {
                continue;
            }
            visited[i] = true;
            parent.insert(next, cell);
            queue.push_back(next);
        }
    }

    reached
        .into_iter()
        .map(|(source, end)| SourcePath {
            field,
            source,
            path: trace_path(&parent, end),
        })
        .collect()
}

/// Walk predecessors back to the seed, returned seed-first.
fn trace_path(parent: &HashMap<SubCell, SubCell>, end: SubCell) -> Vec<SubCell> {
    let mut path = vec![end];
    let mut node = end;
    while let Some(&prev) = parent.get(&node) {
        path.push(prev);
        node = prev;
    }
    path.reverse();
    path
}

/// Compose the master grid and score every field on the board.
///
/// Stateless: the whole analysis is rebuilt from the board snapshot.
pub fn compose_and_analyze(board: &Board) -> Analysis {
    let master_grid = compose(board);

    let mut fields: [Vec<TilePos>; 2] = [Vec::new(), Vec::new()];
    let mut source_tiles = Vec::new();
    for (pos, tile) in board.occupied() {
        if tile.is_field() {
            let owner = tile
                .owner
                .unwrap_or_else(|| panic!("Field at {pos:?} has no owner"));
            fields[owner.index()].push(pos);
        } else if tile.is_source() {
            source_tiles.push(pos);
        }
    }

    let mut scores = [0u32; 2];
    let mut paths: [Vec<SourcePath>; 2] = [Vec::new(), Vec::new()];
    for seat in Seat::ALL {
        for &field in &fields[seat.index()] {
            let connections = field_connections(board, &master_grid, field);
            tracing::debug!(
                seat = seat.number(),
                field = ?field,
                sources = connections.len(),
                "field reach"
            );
            scores[seat.index()] += connections.len() as u32;
            paths[seat.index()].extend(connections);
        }
    }

    let water_networks = find_networks(&master_grid);

    tracing::debug!(
        p1 = scores[0],
        p2 = scores[1],
        sources = source_tiles.len(),
        networks = water_networks.len(),
        "analysis complete"
    );

    Analysis {
        master_grid,
        scores,
        paths,
        fields,
        source_tiles,
        water_networks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Analysis {
        compose_and_analyze(&text.parse::<Board>().unwrap())
    }

    #[test]
    fn test_field_reaches_source_through_channel() {
        let a = analyze("4@1 2 1");
        assert_eq!(a.score(Seat::First), 1);
        assert_eq!(a.score(Seat::Second), 0);

        let paths = a.paths_for(Seat::First);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].field, (0, 0));
        assert_eq!(paths[0].source, (0, 2));
        // Seven channel cells, then the first cell of the source's left column.
        let expected: Vec<SubCell> = (7..=14).map(|c| (3, c)).collect();
        assert_eq!(paths[0].path, expected);
    }

    #[test]
    fn test_source_directly_adjacent() {
        let a = analyze(". . / . 4@2 1");
        assert_eq!(a.score(Seat::Second), 1);
        let path = &a.paths_for(Seat::Second)[0].path;
        // The first right-edge seed already lies in the source footprint.
        assert_eq!(path, &vec![(7, 14)]);
    }

    #[test]
    fn test_isolated_field_scores_nothing() {
        // Vertical channel: its left column is dry, so no water touches the field.
        let a = analyze("4@1 2r1 1");
        assert_eq!(a.score(Seat::First), 0);
        assert!(a.paths_for(Seat::First).is_empty());
        assert!(a.paths_from((0, 0)).next().is_none());
    }

    #[test]
    fn test_field_alone_on_board() {
        let a = analyze(". . . / . 4@1");
        assert_eq!(a.scores, [0, 0]);
        assert_eq!(a.fields_for(Seat::First).to_vec(), vec![(1, 1)]);
        assert!(a.water_networks.is_empty());
    }

    #[test]
    fn test_counts_each_source_separately() {
        // Two sources joined into one network both count.
        let a = analyze("4@1 2 1 1");
        assert_eq!(a.water_networks.len(), 1);
        assert_eq!(a.score(Seat::First), 2);
        let sources: Vec<TilePos> = a.paths_for(Seat::First).iter().map(|p| p.source).collect();
        assert_eq!(sources, vec![(0, 2), (0, 3)]);
    }

    #[test]
    fn test_source_reached_from_two_sides_counts_once() {
        // Source below the field and to its right, both adjacent, linked by a ring.
        let a = analyze("4@1 1 / 1 1");
        assert_eq!(a.score(Seat::First), 3);
        let sources: Vec<TilePos> = a.paths_for(Seat::First).iter().map(|p| p.source).collect();
        // Bottom seeds are enqueued before right seeds.
        assert_eq!(sources[0], (1, 0));
        assert_eq!(sources[1], (0, 1));
        assert_eq!(sources[2], (1, 1));
    }

    #[test]
    fn test_both_players_score_independently() {
        let a = analyze("4@1 2 1 2 4@2");
        assert_eq!(a.scores, [1, 1]);
        assert_eq!(a.paths_for(Seat::Second)[0].source, (0, 2));
        // Seat 2's route runs leftwards from its boundary seed.
        let path = &a.paths_for(Seat::Second)[0].path;
        assert_eq!(path.first(), Some(&(3, 27)));
        assert_eq!(path.last(), Some(&(3, 20)));
    }

    #[test]
    fn test_paths_are_contiguous_water() {
        let a = analyze("4@1 3 5 1 / 6r1 5 3r1 2 / 1 2 4@2 5 / 3 . 1 2r1");
        for path in a.paths.iter().flatten() {
            assert!(!path.path.is_empty());
            for w in path.path.windows(2) {
                let (a0, b0) = (w[0], w[1]);
                let dist = a0.0.abs_diff(b0.0) + a0.1.abs_diff(b0.1);
                assert_eq!(dist, 1, "{a0:?} -> {b0:?}");
            }
            for &cell in &path.path {
                assert!(a.master_grid.is_water(cell));
            }
            let end = *path.path.last().unwrap();
            assert_eq!(tile_of(end), path.source);
            let start = path.path[0];
            assert!(boundary_seeds(&a.master_grid, path.field).contains(&start));
        }
    }

    #[test]
    fn test_seeds_skip_board_edges() {
        let board: Board = "4@1 1 / 1".parse().unwrap();
        let grid = compose(&board);
        let seeds = boundary_seeds(&grid, (0, 0));
        // Bottom edge: the whole top row of the source below (row 7, cols 0..7).
        // Right edge: the whole left column of the source to the right.
        assert_eq!(seeds.len(), 14);
        assert_eq!(seeds[0], (7, 0));
        assert_eq!(seeds[7], (0, 7));
    }

    #[test]
    fn test_unrelated_tile_leaves_scores_unchanged() {
        let before = analyze("4@1 2 1 / . . . / . . . / . . . . . .");
        let after = analyze("4@1 2 1 / . . . / . . . / . . . . . 6");
        assert_eq!(before.scores, after.scores);
        assert_eq!(before.paths, after.paths);
    }

    #[test]
    fn test_live_networks_follow_sources() {
        let a = analyze("1 2 / . . / . . . . 2");
        assert_eq!(a.source_tiles, vec![(0, 0)]);
        assert_eq!(a.live_networks(), vec![0]);
    }

    #[test]
    #[should_panic(expected = "has no owner")]
    fn test_unowned_field_panics() {
        let mut board = Board::new();
        board.tiles[0][0] = Some(PlacedTile {
            tile_type: FIELD,
            owner: None,
            rotation: 0,
        });
        compose_and_analyze(&board);
    }
}
