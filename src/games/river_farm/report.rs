//! Results-browser data: per-player route listings and a text overlay of the master grid.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::grid::MasterGrid;
use super::scoring::{Analysis, SourcePath};
use super::types::*;

/// One selectable line in a player's results list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub label: String,
    pub field: TilePos,
    pub source: TilePos,
    pub path: Vec<SubCell>,
}

fn entry(index: usize, sp: &SourcePath) -> RouteEntry {
    RouteEntry {
        label: format!(
            "Route {}: field ({},{}) -> source ({},{})",
            index + 1,
            sp.field.0,
            sp.field.1,
            sp.source.0,
            sp.source.1
        ),
        field: sp.field,
        source: sp.source,
        path: sp.path.clone(),
    }
}

/// Routes for one player, numbered from 1 in scoring order.
pub fn results_entries(analysis: &Analysis, seat: Seat) -> Vec<RouteEntry> {
    analysis
        .paths_for(seat)
        .iter()
        .enumerate()
        .map(|(i, sp)| entry(i, sp))
        .collect()
}

/// Render the grid with `~` water, `.` dry and `*` for cells on `overlay`.
pub fn render_grid(grid: &MasterGrid, overlay: &[SubCell]) -> String {
    let marked: BTreeSet<SubCell> = overlay.iter().copied().collect();
    let mut out = String::with_capacity((grid.cols + 1) * grid.rows);
    for r in 0..grid.rows {
        for c in 0..grid.cols {
            let ch = if marked.contains(&(r, c)) {
                '*'
            } else if grid.is_water((r, c)) {
                '~'
            } else {
                '.'
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::river_farm::scoring::compose_and_analyze;

    #[test]
    fn test_entries_are_numbered_per_player() {
        let board: Board = "4@1 2 1 1 / 4@2 . . 2r1".parse().unwrap();
        let analysis = compose_and_analyze(&board);

        let p1 = results_entries(&analysis, Seat::First);
        assert_eq!(p1.len(), 2);
        assert_eq!(p1[0].label, "Route 1: field (0,0) -> source (0,2)");
        assert_eq!(p1[1].label, "Route 2: field (0,0) -> source (0,3)");

        let p2 = results_entries(&analysis, Seat::Second);
        assert!(p2.is_empty());
    }

    #[test]
    fn test_render_marks_path() {
        let grid = MasterGrid::from_rows(&[vec![true, true, false], vec![false, true, false]]);
        let text = render_grid(&grid, &[(0, 1), (1, 1)]);
        assert_eq!(text, "~*.\n.*.\n");
    }

    #[test]
    fn test_render_marks_long_path_once_per_cell() {
        let board: Board = "4@1 2 1".parse().unwrap();
        let analysis = compose_and_analyze(&board);
        let mut path = analysis.paths_for(Seat::First)[0].path.clone();
        // Repeated overlay cells render the same as a single mark.
        path.extend(path.clone());

        let text = render_grid(&analysis.master_grid, &path);
        assert_eq!(text.matches('*').count(), K + 1);
        let row3 = text.lines().nth(3).unwrap();
        assert_eq!(&row3[K..=2 * K], "********");
    }

    #[test]
    fn test_render_without_overlay_matches_display() {
        let board: Board = "1 2r1 3".parse().unwrap();
        let analysis = compose_and_analyze(&board);
        assert_eq!(
            render_grid(&analysis.master_grid, &[]),
            analysis.master_grid.to_string()
        );
    }
}
