use std::collections::VecDeque;

use crate::{Direction, Position, dungeon::Node, map::Grid};

/// Breadth-first traversal from `start`, following passages.
///
/// Returns caves in the order they are dequeued, each at most once. The search
/// stops as soon as `end` is dequeued; `end` is the last element in that case.
/// If `end` is unreachable, every cave reachable from `start` is returned.
pub fn bfs_traversal(grid: &Grid<Node>, start: Position, end: Position) -> Vec<Position> {
    let mut visited = vec![false; grid.len()];
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let Some(index) = grid.index_of(current) else {
            continue;
        };
        if visited[index] {
            continue;
        }
        visited[index] = true;
        order.push(current);

        if current == end {
            break;
        }
        queue.extend(grid[current].passages().iter().map(|p| p.destination()));
    }

    order
}

/// Finds the fewest passages leading from `from` to `to`.
///
/// Returns the directions to walk, empty if `from == to`, or `None` if `to`
/// cannot be reached.
pub fn shortest_path(grid: &Grid<Node>, from: Position, to: Position) -> Option<Vec<Direction>> {
    let start = grid.index_of(from)?;
    let goal = grid.index_of(to)?;
    let mut came_from: Vec<Option<(usize, Direction)>> = vec![None; grid.len()];
    let mut seen = vec![false; grid.len()];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;

    while let Some(current) = queue.pop_front() {
        if current == goal {
            break;
        }
        let position = grid.position_of(current)?;
        for passage in grid[position].passages() {
            let Some(next) = grid.index_of(passage.destination()) else {
                continue;
            };
            if !seen[next] {
                seen[next] = true;
                came_from[next] = Some((current, passage.direction()));
                queue.push_back(next);
            }
        }
    }

    if !seen[goal] {
        return None;
    }

    // Reconstruct path
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        let (previous, direction) = came_from[current]?;
        path.push(direction);
        current = previous;
    }
    path.reverse();
    Some(path)
}
