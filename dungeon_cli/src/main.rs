use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dungeon_core::{
    CandidateOrder, Direction, Dungeon, DungeonConfig, Position,
    dungeon::{ArrowCache, Node},
    map::Grid,
    strategy::{Autopilot, PlaythroughReport, RandomWalker, Strategy},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyKind {
    Autopilot,
    Random,
}

#[derive(Parser, Debug)]
#[command(version, about = "Generate a dungeon and let a strategy play it", long_about = None)]
struct Args {
    /// Number of rows in the dungeon
    #[arg(short, long, default_value_t = 6)]
    rows: usize,

    /// Number of columns in the dungeon
    #[arg(short, long, default_value_t = 8)]
    cols: usize,

    /// Join opposite borders with wrap-around passages
    #[arg(short, long)]
    wrapping: bool,

    /// Extra passages beyond the spanning tree (wrapping dungeons only)
    #[arg(short, long, default_value_t = 0)]
    interconnectivity: usize,

    /// Percentage of caves to seed with treasure and arrows
    #[arg(long, default_value_t = 50)]
    items: u32,

    /// Number of otyughs, including the one guarding the exit
    #[arg(long, default_value_t = 3)]
    otyughs: usize,

    /// Seed for reproducible dungeons
    #[arg(long)]
    seed: Option<u64>,

    /// Offer Kruskal candidate edges in shuffled order
    #[arg(long)]
    shuffled: bool,

    /// Strategy that drives the player
    #[arg(long, value_enum, default_value_t = StrategyKind::Autopilot)]
    strategy: StrategyKind,

    /// Give up after this many turns
    #[arg(long, default_value_t = 500)]
    max_turns: usize,
}

impl Args {
    fn config(&self) -> DungeonConfig {
        let order = if self.shuffled {
            CandidateOrder::Shuffled
        } else {
            CandidateOrder::RowMajor
        };
        DungeonConfig::new(self.wrapping, self.rows, self.cols, self.interconnectivity)
            .with_candidate_order(order)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = args.config();
    let mut dungeon = match args.seed {
        Some(seed) => Dungeon::seeded(config, seed),
        None => Dungeon::new(config),
    }
    .context("Failed to build dungeon")?;
    dungeon.add_treasure(args.items);
    dungeon
        .add_otyughs(args.otyughs)
        .context("Failed to place otyughs")?;
    dungeon.enter_player();

    println!(
        "{}x{} {} dungeon, interconnectivity {}",
        dungeon.rows(),
        dungeon.cols(),
        if dungeon.is_wrapping() { "wrapping" } else { "non-wrapping" },
        dungeon.interconnectivity()
    );
    println!(
        "Start {}  End {}  Treasures {}  Arrows {}",
        dungeon.start(),
        dungeon.end(),
        dungeon.treasure_count(),
        dungeon.arrow_count()
    );
    println!();
    print!("{}", render_map(&dungeon));
    println!();

    let order: Vec<String> = dungeon.bfs_traversal().iter().map(ToString::to_string).collect();
    println!("BFS order: {}", order.join(" "));
    println!();

    let mut strategy: Box<dyn Strategy> = match args.strategy {
        StrategyKind::Autopilot => Box::new(Autopilot::new()),
        StrategyKind::Random => Box::new(RandomWalker::new(args.seed.unwrap_or_default())),
    };
    let report = dungeon.play(strategy.as_mut(), args.max_turns)?;
    print_report(&report);

    println!();
    println!("{}", dungeon.location_description()?);
    println!();
    println!("{}", dungeon.player_description()?);
    Ok(())
}

/// Prints each turn and how the playthrough ended.
fn print_report(report: &PlaythroughReport) {
    for (turn, record) in report.turns.iter().enumerate() {
        println!("{:>4}: {:?} -> {:?}", turn + 1, record.action, record.outcome);
    }
    println!("Finished after {} turns: {:?}", report.turns.len(), report.state);
}

/// Draws the dungeon as text.
///
/// Each cave is one character: `S` start, `E` end, `@` the player, `O` an
/// otyugh, `*` loot, `.` empty. Passages between horizontal neighbours are
/// drawn as `-` and between vertical neighbours as `|`; wrap-around passages
/// are marked with `~` on the border.
fn render_map<R>(dungeon: &Dungeon<R>) -> String {
    let grid: &Grid<Node> = dungeon.grid();
    let player = dungeon.player().ok().map(|p| p.position());
    let mut out = String::new();

    for row in 0..grid.rows() {
        let mut cells = String::new();
        let mut links = String::new();
        for col in 0..grid.cols() {
            let position = Position::new(row, col);
            let node = &grid[position];

            let west_wraps = col == 0 && node.passage(Direction::West).is_some();
            cells.push(if west_wraps { '~' } else { ' ' });
            cells.push(cave_glyph(dungeon, node, player));
            let east = match node.passage(Direction::East) {
                Some(_) if col + 1 == grid.cols() => '~',
                Some(_) => '-',
                None => ' ',
            };
            cells.push(east);

            links.push(' ');
            links.push(match node.passage(Direction::South) {
                Some(_) if row + 1 == grid.rows() => '~',
                Some(_) => '|',
                None => ' ',
            });
            links.push(' ');
        }
        out.push_str(cells.trim_end());
        out.push('\n');
        out.push_str(links.trim_end());
        out.push('\n');
    }
    out
}

fn cave_glyph<R>(dungeon: &Dungeon<R>, node: &Node, player: Option<Position>) -> char {
    let position = node.position();
    if player == Some(position) {
        '@'
    } else if position == dungeon.start() {
        'S'
    } else if position == dungeon.end() {
        'E'
    } else if node.has_live_otyugh() {
        'O'
    } else if !node.treasures().is_empty() || node.arrows() > 0 || node.passage_arrows() > 0 {
        '*'
    } else {
        '.'
    }
}
