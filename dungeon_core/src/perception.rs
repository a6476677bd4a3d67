use serde::{Deserialize, Serialize};

use crate::{dungeon::Node, map::Grid};

/// How strongly otyughs can be smelled from a cave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Smell {
    None,
    Faint,
    Strong,
}

/// Computes the stench reaching `node` from live otyughs nearby.
///
/// Caves one passage away are "near"; caves two passages away through a near
/// cave are "far". Far caves are counted once per two-hop path, which includes
/// paths that lead back to `node` itself. A single far otyugh and no near one
/// gives a faint smell; any near otyugh or several far ones give a strong smell.
pub fn smell(grid: &Grid<Node>, node: &Node) -> Smell {
    let mut near = 0;
    let mut far = 0;
    for passage in node.passages() {
        let Some(neighbour) = grid.get(passage.destination()) else {
            continue;
        };
        if neighbour.has_live_otyugh() {
            near += 1;
        }
        far += neighbour
            .passages()
            .iter()
            .filter_map(|second| grid.get(second.destination()))
            .filter(|cave| cave.has_live_otyugh())
            .count();
    }

    if near >= 1 || far > 1 {
        Smell::Strong
    } else if far == 1 {
        Smell::Faint
    } else {
        Smell::None
    }
}
