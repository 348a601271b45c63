use std::io::Write;

use anyhow::{Context, Result};
use chess_stats::chess::input::{CompressionMode, expand_paths, read_sources};
use chess_stats::chess::shard::DEFAULT_GAMES_PER_SHARD;
use chess_stats::chess::{OpeningIndex, ShardBatch, SubjectNames, load_openings_tsv};
use clap::Parser;

/// Summarize one player's results, opponent ratings and openings from PGN files.
#[derive(Parser)]
#[command(name = "chess-stats", version)]
struct Cli {
    /// PGN file or glob pattern (e.g. "games/*.pgn")
    games: String,

    /// Player names, alternatives separated by "||"
    #[arg(short, long)]
    player: String,

    /// Opening dataset file or glob pattern (lichess eco/name/pgn TSV)
    #[arg(short, long)]
    openings: Option<String>,

    /// Compression of the game files; only "zstd" is supported
    #[arg(long)]
    compression: Option<CompressionMode>,

    #[arg(long, default_value_t = DEFAULT_GAMES_PER_SHARD)]
    games_per_shard: usize,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .target(env_logger::Target::Stderr)
    .init();
}

fn load_openings(pattern: Option<&str>) -> Result<OpeningIndex> {
    let Some(pattern) = pattern else {
        log::warn!("no opening dataset given; openings will not be tallied");
        return Ok(OpeningIndex::default());
    };

    let mut records = Vec::new();
    for (path, text) in read_sources(&expand_paths(pattern)?, CompressionMode::Plain)? {
        records.extend(
            load_openings_tsv(text.as_bytes())
                .with_context(|| format!("loading openings from '{}'", path.display()))?,
        );
    }
    let index = OpeningIndex::new(records);
    log::debug!("loaded {} openings", index.len());
    Ok(index)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let subject = SubjectNames::parse(&cli.player);
    if subject.is_empty() {
        anyhow::bail!("--player must name at least one player");
    }

    let openings = load_openings(cli.openings.as_deref())?;
    let compression = cli.compression.unwrap_or_default();
    let sources = read_sources(&expand_paths(&cli.games)?, compression)?;

    let mut batch = ShardBatch::new();
    for (path, text) in &sources {
        let label = path.display().to_string();
        batch.run(text, &subject, &openings, cli.games_per_shard, &label);
    }
    let report = batch.finish();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
