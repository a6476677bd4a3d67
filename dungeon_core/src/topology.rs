//! Maze topology generation using Kruskal's algorithm over grid candidate edges.
//!
//! The spanning pass guarantees every cave is reachable. Wrapping dungeons then
//! re-admit up to `interconnectivity` of the rejected (leftover) edges, giving
//! the maze loops.

use petgraph::unionfind::UnionFind;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::Position;

/// An undirected connection between two grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: Position,
    pub to: Position,
}

/// The order in which candidate edges are offered to the spanning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateOrder {
    /// Row-major enumeration: right, down, then wrap edges at the borders.
    #[default]
    RowMajor,
    /// Row-major enumeration shuffled with the dungeon's random source.
    Shuffled,
}

/// Lists every candidate edge in row-major vertex order.
///
/// For each vertex: its right neighbour, its lower neighbour, and when
/// `wrapping`, the edge from row 0 to the last row and from column 0 to the
/// last column. Wrap edges are skipped along dimensions shorter than 3, where
/// they would loop back onto the vertex or duplicate an ordinary edge.
pub fn candidate_edges(rows: usize, cols: usize, wrapping: bool) -> Vec<Edge> {
    let mut edges = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let from = Position::new(row, col);
            if col + 1 < cols {
                edges.push(Edge {
                    from,
                    to: Position::new(row, col + 1),
                });
            }
            if row + 1 < rows {
                edges.push(Edge {
                    from,
                    to: Position::new(row + 1, col),
                });
            }
            if wrapping {
                if row == 0 && rows >= 3 {
                    edges.push(Edge {
                        from,
                        to: Position::new(rows - 1, col),
                    });
                }
                if col == 0 && cols >= 3 {
                    edges.push(Edge {
                        from,
                        to: Position::new(row, cols - 1),
                    });
                }
            }
        }
    }
    edges
}

/// Generates the accepted edge set for a `rows` x `cols` dungeon.
///
/// The result always spans the grid. Non-wrapping dungeons get exactly the
/// spanning tree; wrapping dungeons get the tree plus up to
/// `interconnectivity` leftover edges, taken in the order they were rejected.
pub fn generate<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    wrapping: bool,
    interconnectivity: usize,
    order: CandidateOrder,
    rng: &mut R,
) -> Vec<Edge> {
    let mut candidates = candidate_edges(rows, cols, wrapping);
    if order == CandidateOrder::Shuffled {
        candidates.shuffle(rng);
    }

    let index = |p: Position| p.row * cols + p.col;
    let mut sets = UnionFind::<usize>::new(rows * cols);
    let mut accepted = Vec::with_capacity(rows * cols);
    let mut leftovers = Vec::new();

    for edge in candidates {
        if sets.union(index(edge.from), index(edge.to)) {
            accepted.push(edge);
        } else {
            leftovers.push(edge);
        }
    }

    if wrapping {
        accepted.extend(leftovers.into_iter().take(interconnectivity));
    }

    tracing::debug!(
        rows,
        cols,
        wrapping,
        interconnectivity,
        edges = accepted.len(),
        "generated dungeon topology"
    );
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn is_spanning(rows: usize, cols: usize, edges: &[Edge]) -> bool {
        let index = |p: Position| p.row * cols + p.col;
        let mut sets = UnionFind::<usize>::new(rows * cols);
        for edge in edges {
            sets.union(index(edge.from), index(edge.to));
        }
        let root = sets.find(0);
        (0..rows * cols).all(|i| sets.find(i) == root)
    }

    #[test]
    fn candidates_follow_row_major_order() {
        let edges = candidate_edges(3, 3, true);
        assert_eq!(
            &edges[..4],
            &[
                Edge {
                    from: Position::new(0, 0),
                    to: Position::new(0, 1),
                },
                Edge {
                    from: Position::new(0, 0),
                    to: Position::new(1, 0),
                },
                Edge {
                    from: Position::new(0, 0),
                    to: Position::new(2, 0),
                },
                Edge {
                    from: Position::new(0, 0),
                    to: Position::new(0, 2),
                },
            ]
        );
        // 12 grid edges plus 3 vertical and 3 horizontal wrap edges
        assert_eq!(edges.len(), 18);
        assert_eq!(candidate_edges(3, 3, false).len(), 12);
    }

    #[test]
    fn narrow_dimensions_skip_wrap_edges() {
        let edges = candidate_edges(2, 6, true);
        // 2x6 grid edges: 2*5 + 6 = 16, plus horizontal wrap on both rows
        assert_eq!(edges.len(), 18);
        assert!(edges.iter().all(|e| e.from != e.to));
    }

    #[test]
    fn non_wrapping_generates_a_spanning_tree() {
        let edges = generate(5, 7, false, 0, CandidateOrder::RowMajor, &mut rng());
        assert_eq!(edges.len(), 5 * 7 - 1);
        assert!(is_spanning(5, 7, &edges));
    }

    #[test]
    fn wrapping_adds_exactly_interconnectivity_extras() {
        let edges = generate(5, 5, true, 3, CandidateOrder::RowMajor, &mut rng());
        assert_eq!(edges.len(), 5 * 5 - 1 + 3);
        assert!(is_spanning(5, 5, &edges));
    }

    #[test]
    fn extras_are_capped_by_the_leftover_pool() {
        let total = candidate_edges(5, 5, true).len();
        let edges = generate(5, 5, true, 10_000, CandidateOrder::RowMajor, &mut rng());
        assert_eq!(edges.len(), total);
    }

    #[test]
    fn row_major_order_is_deterministic() {
        let order = CandidateOrder::RowMajor;
        let first = generate(6, 6, true, 4, order, &mut StdRng::seed_from_u64(1));
        let second = generate(6, 6, true, 4, order, &mut StdRng::seed_from_u64(2));
        assert_eq!(first, second);
    }

    #[test]
    fn shuffled_order_still_spans() {
        for seed in 0..10 {
            let edges = generate(
                6,
                8,
                false,
                0,
                CandidateOrder::Shuffled,
                &mut StdRng::seed_from_u64(seed),
            );
            assert_eq!(edges.len(), 6 * 8 - 1);
            assert!(is_spanning(6, 8, &edges));
        }
    }
}
