use anyhow::{bail, Context, Result};
use clap::Parser;
use libchinese_grid::{
    path_score, CachedLanguageModel, Config, InMemoryLanguageModel, NodeAnchor, ReadingBuilder,
    Walker,
};
use serde::Serialize;
use std::path::PathBuf;

/// Build a reading grid from a JSON phrase table and print its best path.
#[derive(Parser)]
#[command(name = "walk_grid")]
struct Args {
    /// Phrase table: {"reading": [["text", score], ...]}
    #[arg(long)]
    model: PathBuf,

    /// TOML config (separator, span length, cache size)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra user phrase, KEY=VALUE (repeatable)
    #[arg(long = "user-phrase")]
    user_phrases: Vec<String>,

    /// Pin a candidate at a cursor position, POS=VALUE (repeatable)
    #[arg(long)]
    fix: Vec<String>,

    /// Also list every complete path with its score
    #[arg(long)]
    dump: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Readings, in order
    #[arg(required = true, num_args = 1..)]
    readings: Vec<String>,
}

#[derive(Serialize)]
struct AnchorOut {
    location: usize,
    length: usize,
    key: String,
    value: String,
    score: f64,
    accumulated_score: f64,
}

#[derive(Serialize)]
struct PathOut {
    score: f64,
    nodes: Vec<AnchorOut>,
}

#[derive(Serialize)]
struct WalkOut {
    readings: Vec<String>,
    best: PathOut,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    paths: Vec<PathOut>,
}

fn path_out(path: &[NodeAnchor<'_>]) -> PathOut {
    PathOut {
        score: path_score(path),
        nodes: path
            .iter()
            .map(|a| AnchorOut {
                location: a.location,
                length: a.spanning_length,
                key: a.key().to_string(),
                value: a.value().to_string(),
                score: a.score(),
                accumulated_score: a.accumulated_score,
            })
            .collect(),
    }
}

fn split_pair<'a>(raw: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    match raw.split_once('=') {
        Some((k, v)) if !k.is_empty() && !v.is_empty() => Ok((k, v)),
        _ => bail!("invalid {what} '{raw}', expected KEY=VALUE"),
    }
}

fn print_text(out: &WalkOut) {
    let best: Vec<&str> = out.best.nodes.iter().map(|n| n.value.as_str()).collect();
    println!("{}", best.concat());
    for n in &out.best.nodes {
        println!(
            "  @({},{}) {} -> {}  score={:.4} acc={:.4}",
            n.location, n.length, n.key, n.value, n.score, n.accumulated_score
        );
    }
    if !out.paths.is_empty() {
        println!("{} complete paths:", out.paths.len());
        for p in &out.paths {
            let values: Vec<&str> = p.nodes.iter().map(|n| n.value.as_str()).collect();
            println!("  {:>10.4}  {}", p.score, values.join(" "));
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_toml(path)?,
        None => Config::default(),
    };

    let mut lm = InMemoryLanguageModel::load_json(&args.model)?;
    for raw in &args.user_phrases {
        let (key, value) = split_pair(raw, "user phrase")?;
        lm.add_user_phrase(key, value);
    }
    let lm = CachedLanguageModel::new(lm, config.lm_cache_size);

    let mut builder = ReadingBuilder::with_config(lm, config);
    for reading in &args.readings {
        builder.insert_reading_at_cursor(reading);
    }

    for raw in &args.fix {
        let (pos, value) = split_pair(raw, "fix")?;
        let pos: usize = pos
            .parse()
            .with_context(|| format!("invalid cursor position in '{raw}'"))?;
        builder.set_cursor(pos);
        if !builder.fix_candidate_at_cursor(value) {
            eprintln!("warning: no candidate '{}' at position {}", value, pos);
        }
    }

    let best = builder.walk();
    if best.last().map(NodeAnchor::end) != Some(builder.len()) {
        eprintln!("warning: some readings have no candidates; path is partial");
    }

    let paths: Vec<PathOut> = if args.dump {
        let walker = Walker::new(builder.grid());
        let mut all = walker.dump_paths(builder.len(), 0.0);
        all.sort_by(|a, b| {
            path_score(b)
                .partial_cmp(&path_score(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        all.iter().map(|p| path_out(p)).collect()
    } else {
        Vec::new()
    };

    let out = WalkOut {
        readings: builder.readings().to_vec(),
        best: path_out(&best),
        paths,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_text(&out);
    }

    let (hits, misses) = builder.language_model().cache_stats();
    eprintln!("lm cache: {} hits, {} misses", hits, misses);
    Ok(())
}
