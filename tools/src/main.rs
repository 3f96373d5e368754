//! tickgrid-runner: headless dataset builder over one log directory.
//!
//! Usage:
//!   tickgrid-runner --data-dir ./script-output
//!   tickgrid-runner --config pipeline.json --cell-size 16 --on-missing skip
//!   tickgrid-runner --data-dir ./script-output --aligned-out aligned.jsonl --summary-out run.json

use anyhow::{bail, Context, Result};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tickgrid_core::{
    record::AlignedExample, AlignmentStats, CollisionPolicy, MissingAssetPolicy, Pipeline,
    PipelineConfig, TrainingExample,
};

#[derive(serde::Serialize)]
struct RunSummary {
    generated_at:     String,
    data_dir:         PathBuf,
    cell_size:        usize,
    on_missing_asset: MissingAssetPolicy,
    alignment:        AlignmentStats,
    built:            usize,
    skipped_missing:  usize,
    grid_shape:       Option<[usize; 5]>,
}

struct SampleView {
    index:      usize,
    tick:       i64,
    grid_shape: [usize; 5],
    actions:    usize,
    position:   Option<(f64, f64)>,
    entities:   Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = build_config(&args)?;
    let sample_index = parse_arg(&args, "--sample", 10usize);
    let aligned_out = find_arg(&args, "--aligned-out").map(PathBuf::from);
    let summary_out = find_arg(&args, "--summary-out").map(PathBuf::from);

    println!("tickgrid-runner");
    println!("  data_dir:    {}", config.data_dir.display());
    println!("  cell_size:   {}", config.cell_size);
    println!("  on_missing:  {:?}", config.on_missing_asset);
    println!("  collisions:  {:?}", config.on_collision);
    println!();

    let pipeline = Pipeline::new(config)?;
    let alignment = pipeline.align()?;

    if let Some(path) = &aligned_out {
        write_aligned(path, &alignment.examples)?;
        log::info!("Wrote {} aligned examples to {}", alignment.examples.len(), path.display());
    }

    let stats = alignment.stats.clone();
    let mut examples = pipeline.build(alignment.examples);
    let mut built = 0usize;
    let mut grid_shape = None;
    let mut sample = None;

    for result in examples.by_ref() {
        let example = result?;
        let shape = shape_of(&example);
        grid_shape.get_or_insert(shape);
        if built == sample_index {
            sample = Some(sample_view(built, &example));
        }
        built += 1;
    }

    print_summary(&stats, built, examples.skipped());
    print_sample(sample.as_ref(), sample_index);

    if let Some(path) = &summary_out {
        let config = pipeline.config();
        let summary = RunSummary {
            generated_at:     chrono::Utc::now().to_rfc3339(),
            data_dir:         config.data_dir.clone(),
            cell_size:        config.cell_size,
            on_missing_asset: config.on_missing_asset,
            alignment:        stats,
            built,
            skipped_missing:  examples.skipped(),
            grid_shape,
        };
        let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &summary)?;
    }

    Ok(())
}

fn build_config(args: &[String]) -> Result<PipelineConfig> {
    let mut config = match find_arg(args, "--config") {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::for_data_dir("."),
    };

    if let Some(dir) = find_arg(args, "--data-dir") {
        config.data_dir = PathBuf::from(dir);
    }
    config.cell_size = parse_arg(args, "--cell-size", config.cell_size);

    config.on_missing_asset = match find_arg(args, "--on-missing") {
        None => config.on_missing_asset,
        Some("abort") => MissingAssetPolicy::Abort,
        Some("skip") => MissingAssetPolicy::Skip,
        Some(other) => bail!("--on-missing expects abort|skip, got {other}"),
    };
    config.on_collision = match find_arg(args, "--on-collision") {
        None => config.on_collision,
        Some("greatest") => CollisionPolicy::GreatestPath,
        Some("reject") => CollisionPolicy::Reject,
        Some(other) => bail!("--on-collision expects greatest|reject, got {other}"),
    };

    Ok(config)
}

fn write_aligned(path: &Path, examples: &[AlignedExample]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for example in examples {
        serde_json::to_writer(&mut out, example)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn shape_of(example: &TrainingExample) -> [usize; 5] {
    let (gh, gw, ch, cw, c) = example.grid.dim();
    [gh, gw, ch, cw, c]
}

fn sample_view(index: usize, example: &TrainingExample) -> SampleView {
    SampleView {
        index,
        tick:       example.tick(),
        grid_shape: shape_of(example),
        actions:    example.actions.len(),
        position:   example.state.player_position(),
        entities:   example.state.visible_entity_count(),
    }
}

fn print_summary(stats: &AlignmentStats, built: usize, skipped: usize) {
    println!("=== RUN SUMMARY ===");
    println!("  snapshots:          {}", stats.snapshots);
    println!("  windows:            {}", stats.windows);
    println!("  aligned:            {}", stats.emitted);
    println!("  no screenshot:      {}", stats.skipped_without_screenshot);
    println!("  actions total:      {}", stats.actions_total);
    println!("  actions aligned:    {}", stats.actions_emitted);
    println!("  actions unscreened: {}", stats.actions_unscreened);
    println!("  actions before:     {}", stats.actions_before_first);
    println!("  actions after:      {}", stats.actions_at_or_after_last);
    println!("  examples built:     {built}");
    println!("  missing skipped:    {skipped}");
}

fn print_sample(sample: Option<&SampleView>, requested: usize) {
    println!();
    let Some(s) = sample else {
        println!("  (No example at index {requested})");
        return;
    };
    println!("=== SAMPLE EXAMPLE #{} ===", s.index);
    println!("  tick:       {}", s.tick);
    println!("  grid shape: {:?}", s.grid_shape);
    println!("  actions:    {}", s.actions);
    match s.position {
        Some((x, y)) => println!("  player at:  ({x:.1}, {y:.1})"),
        None => println!("  player at:  (unknown)"),
    }
    if let Some(n) = s.entities {
        println!("  entities:   {n}");
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    find_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
