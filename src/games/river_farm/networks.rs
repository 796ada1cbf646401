//! Water network discovery: 4-connected components of water cells in the master grid.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::grid::{tile_of, MasterGrid};
use super::types::*;

/// Neighbour offsets in enumeration order: down, up, right, left.
/// Diagonal cells never connect.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// In-range 4-neighbours of `cell`, in `NEIGHBOR_OFFSETS` order.
pub fn neighbors(grid: &MasterGrid, cell: SubCell) -> impl Iterator<Item = SubCell> + '_ {
    NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
        let r = cell.0.checked_add_signed(dr)?;
        let c = cell.1.checked_add_signed(dc)?;
        grid.in_bounds((r, c)).then_some((r, c))
    })
}

/// A maximal set of 4-connected water cells. Identity is positional only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterNetwork {
    pub cells: BTreeSet<SubCell>,
}

impl WaterNetwork {
    pub fn contains(&self, cell: SubCell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Board tiles this network passes through.
    pub fn tiles(&self) -> BTreeSet<TilePos> {
        self.cells.iter().map(|&cell| tile_of(cell)).collect()
    }
}

/// Partition every water cell into its connected network.
///
/// Discovery starts from water cells in row-major order and expands with an
/// explicit queue, so networks come out ordered by their first row-major cell.
pub fn find_networks(grid: &MasterGrid) -> Vec<WaterNetwork> {
    let mut visited = vec![false; grid.rows * grid.cols];
    let mut networks = Vec::new();

    for start in grid.water_cells() {
        if visited[start.0 * grid.cols + start.1] {
            continue;
        }

        let mut cells = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        visited[start.0 * grid.cols + start.1] = true;

        while let Some(cell) = queue.pop_front() {
            cells.insert(cell);
            for next in neighbors(grid, cell) {
                let i = next.0 * grid.cols + next.1;
                if !visited[i] && grid.is_water(next) {
                    visited[i] = true;
                    queue.push_back(next);
                }
            }
        }

        networks.push(WaterNetwork { cells });
    }

    tracing::debug!(networks = networks.len(), "found water networks");
    networks
}

/// Indices of networks touching at least one source tile's footprint.
pub fn live_network_indices(networks: &[WaterNetwork], source_tiles: &[TilePos]) -> Vec<usize> {
    networks
        .iter()
        .enumerate()
        .filter(|(_, network)| {
            network
                .cells
                .iter()
                .any(|&cell| source_tiles.contains(&tile_of(cell)))
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::river_farm::grid::compose;

    fn grid_from(text: &[&str]) -> MasterGrid {
        let rows: Vec<Vec<bool>> = text
            .iter()
            .map(|line| line.chars().map(|ch| ch == '~').collect())
            .collect();
        MasterGrid::from_rows(&rows)
    }

    #[test]
    fn test_diagonal_touch_does_not_connect() {
        let grid = grid_from(&["~.", ".~"]);
        let networks = find_networks(&grid);
        assert_eq!(networks.len(), 2);
        assert!(networks[0].contains((0, 0)));
        assert!(networks[1].contains((1, 1)));
    }

    #[test]
    fn test_orthogonal_cells_connect() {
        let grid = grid_from(&["~~.", ".~.", ".~~"]);
        let networks = find_networks(&grid);
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].len(), 5);
    }

    #[test]
    fn test_dry_grid_has_no_networks() {
        let grid = grid_from(&["...", "..."]);
        assert!(find_networks(&grid).is_empty());
    }

    #[test]
    fn test_networks_partition_water_cells() {
        let board: Board = "1 2 3 4@1 5 6 / 6r1 5 4@2 3r2 2r3 1 / 2r1 . 3 . 6 . / . 5 . 1 . 4@1"
            .parse()
            .unwrap();
        let grid = compose(&board);
        let networks = find_networks(&grid);

        let mut seen = BTreeSet::new();
        for network in &networks {
            assert!(!network.is_empty());
            for &cell in &network.cells {
                assert!(grid.is_water(cell));
                assert!(seen.insert(cell), "cell {cell:?} in two networks");
            }
        }
        let all_water: BTreeSet<SubCell> = grid.water_cells().collect();
        assert_eq!(seen, all_water);
    }

    #[test]
    fn test_network_cells_are_connected_within_water() {
        let board: Board = "1 2 5 / 3r1 . 6".parse().unwrap();
        let grid = compose(&board);

        for network in find_networks(&grid) {
            // Re-flood from one cell restricted to the network; it must reach all of it.
            let start = *network.cells.iter().next().unwrap();
            let mut reached = BTreeSet::from([start]);
            let mut queue = VecDeque::from([start]);
            while let Some(cell) = queue.pop_front() {
                for next in neighbors(&grid, cell) {
                    if network.contains(next) && reached.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            assert_eq!(reached, network.cells);
        }
    }

    #[test]
    fn test_adjacent_tiles_merge_into_one_network() {
        // Source ring touches the channel's middle row.
        let board: Board = "1 2 2".parse().unwrap();
        let networks = find_networks(&compose(&board));
        assert_eq!(networks.len(), 1);
        assert_eq!(
            networks[0].tiles(),
            BTreeSet::from([(0, 0), (0, 1), (0, 2)])
        );
    }

    #[test]
    fn test_live_networks() {
        // Channel at (0,1) joins the source; the one at (2,4) is isolated.
        let board: Board = "1 2 / . . / . . . . 2".parse().unwrap();
        let networks = find_networks(&compose(&board));
        assert_eq!(networks.len(), 2);

        let live = live_network_indices(&networks, &[(0, 0)]);
        assert_eq!(live, vec![0]);
        assert!(networks[0].tiles().contains(&(0, 1)));
    }

    #[test]
    fn test_neighbor_order_and_bounds() {
        let grid = grid_from(&["...", "...", "..."]);
        let around: Vec<SubCell> = neighbors(&grid, (1, 1)).collect();
        assert_eq!(around, vec![(2, 1), (0, 1), (1, 2), (1, 0)]);
        let corner: Vec<SubCell> = neighbors(&grid, (0, 0)).collect();
        assert_eq!(corner, vec![(1, 0), (0, 1)]);
    }
}
