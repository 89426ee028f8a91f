use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

use handshape::corpus::{self, Corpus};
use handshape::{
    AppConfig, Engine, FinalTally, HuMomentMetric, ImageSilhouetteExtractor, MatchMethod,
};

#[derive(Parser)]
#[command(name = "handshape")]
#[command(about = "Classify rock / paper / scissors hand silhouettes by outline shape")]
struct Cli {
    /// Directory of gesture images named <label>_<n>.<ext>
    #[arg(value_name = "GESTURES")]
    gestures: Option<PathBuf>,

    /// Directory holding the paper, rock and scissors base images
    #[arg(long, value_name = "DIR")]
    base: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Largest shape distance accepted as a match
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Maximum number of recovery rounds
    #[arg(long)]
    max_retries: Option<usize>,

    /// How final success counts are reported
    #[arg(long, value_enum)]
    final_tally: Option<FinalTally>,

    /// Hu-moment matching method
    #[arg(long, value_enum)]
    method: Option<MatchMethod>,

    /// Do not downscale images before extracting silhouettes
    #[arg(long)]
    no_resize: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Save extraction steps to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

impl Cli {
    fn app_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(dir) = &self.gestures {
            config.gestures_dir = dir.clone();
        }
        if let Some(dir) = &self.base {
            config.base_dir = dir.clone();
        }
        if let Some(threshold) = self.threshold {
            config.engine.threshold = threshold;
        }
        if let Some(max_retries) = self.max_retries {
            config.engine.max_retries = max_retries;
        }
        if let Some(mode) = self.final_tally {
            config.engine.final_tally = mode;
        }
        if let Some(method) = self.method {
            config.metric = method;
        }
        if self.no_resize {
            config.extractor.resize = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = args.app_config()?;
    let resize = config.extractor.resize;

    let mut extractor = ImageSilhouetteExtractor::new(&config.extractor);
    if let Some(debug_dir) = args.debug_out.clone() {
        extractor = extractor.with_debug(debug_dir)?;
    }

    let base = corpus::load_base_exemplars(&config.base_dir, &extractor, resize)
        .context("Cannot start without base exemplars")?;
    let corpus = Corpus::open(&config.gestures_dir)?;
    let batch = corpus.load(&extractor, resize);

    let engine = Engine::new(config.engine.clone(), HuMomentMetric::new(config.metric), base)?;
    let outcome = engine.run(batch)?;
    let report = &outcome.report;

    if args.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if args.verbose {
        println!("\n=== Samples ===");
        for sample in &report.samples {
            let recovery = match (sample.recovery, sample.recovered_round) {
                (Some(_), Some(round)) => format!(" -> recovered in round {}", round),
                (Some(state), None) => format!(" -> {:?}", state).to_lowercase(),
                (None, _) => String::new(),
            };
            println!(
                "  {:<20} truth {:<9} predicted {:<9} distance {:.4}{}",
                sample.identifier,
                sample.truth.name(),
                sample.initial.label.name(),
                sample.initial.distance,
                recovery
            );
        }
        for error in &report.reading_errors {
            println!("  {:<20} reading error: {}", error.identifier, error.reason);
        }
        println!();
    }

    println!("{}", report.summary);

    if !report.unresolved.is_empty() {
        println!(
            "\nUnresolved after {} rounds: {}",
            report.rounds.len(),
            report.unresolved.join(", ")
        );
    }

    Ok(())
}
