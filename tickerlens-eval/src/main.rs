//! TickerLens Eval — offline model comparison and analysis reports.
//!
//! Commands:
//! - `compare` — hold out the last N bars, run all four forecasters on the
//!   prefix, score each against the holdout, print a comparison table
//! - `analyze` — full analysis pass (indicators, signals, levels, risk
//!   metrics, chosen forecast) over a CSV file or a seeded synthetic series

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tickerlens_core::forecast::{compare_models, HoldoutScore};
use tickerlens_core::{
    generate_forecast, AnalysisConfig, AnalysisReport, Analyzer, CsvSource, ForecastModel,
    ForecastResult, MarketDataSource, OhlcvBar, SyntheticSource,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tickerlens-eval",
    about = "TickerLens Eval — offline forecast scoring and analysis reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score all four forecast models against a holdout window.
    Compare {
        #[command(flatten)]
        source: SourceArgs,

        /// Bars held out of training for scoring.
        #[arg(long, default_value_t = 10)]
        holdout: usize,

        /// Confidence level for the forecast bands (0.5-0.99).
        #[arg(long, default_value_t = 0.95)]
        confidence: f64,
    },
    /// Run a full analysis pass and print the report.
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        /// Forecast model. Defaults to the config file's, else simple.
        #[arg(long, value_enum)]
        model: Option<ModelArg>,

        /// Forecast horizon in days (1-90).
        #[arg(long)]
        days: Option<u32>,

        /// Confidence level for the forecast bands (0.5-0.99).
        #[arg(long)]
        confidence: Option<f64>,

        /// TOML config file with [indicators.*] and [forecast] tables.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Where bars come from: a CSV file, or a seeded synthetic walk.
#[derive(Args)]
struct SourceArgs {
    /// CSV file with date,open,high,low,close,volume rows.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Symbol label for the report and the forecast cache.
    #[arg(long, default_value = "SYNTH")]
    symbol: String,

    /// Seed for the synthetic walk (ignored with --csv).
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of synthetic bars (ignored with --csv).
    #[arg(long, default_value_t = 252)]
    bars: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Simple,
    Arima,
    Prophet,
    Lstm,
}

impl From<ModelArg> for ForecastModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Simple => ForecastModel::Simple,
            ModelArg::Arima => ForecastModel::Arima,
            ModelArg::Prophet => ForecastModel::Prophet,
            ModelArg::Lstm => ForecastModel::Lstm,
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            source,
            holdout,
            confidence,
        } => run_compare(source, holdout, confidence),
        Commands::Analyze {
            source,
            model,
            days,
            confidence,
            config,
        } => run_analyze(source, model, days, confidence, config),
    }
}

/// Env-driven log filtering; reports stay on stdout, diagnostics on stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_bars(source: &SourceArgs) -> Result<Vec<OhlcvBar>> {
    let bars = match &source.csv {
        Some(path) => CsvSource::new(path)
            .fetch(&source.symbol)
            .with_context(|| format!("loading bars from {}", path.display()))?,
        None => SyntheticSource::new(source.seed, source.bars)
            .fetch(&source.symbol)
            .context("generating synthetic bars")?,
    };
    info!(symbol = %source.symbol, bars = bars.len(), "series loaded");
    Ok(bars)
}

fn run_compare(source: SourceArgs, holdout: usize, confidence: f64) -> Result<()> {
    if !(0.5..=0.99).contains(&confidence) {
        bail!("confidence must be between 0.5 and 0.99, got {confidence}");
    }
    let bars = load_bars(&source)?;
    if holdout == 0 || holdout >= bars.len() {
        bail!(
            "holdout of {holdout} does not leave a training prefix in {} bars",
            bars.len()
        );
    }

    let scores = compare_models(&bars, holdout, confidence);
    if scores.is_empty() {
        bail!("training prefix is too short, need at least 10 bars before the holdout");
    }

    print_comparison(&source.symbol, &bars, holdout, &scores);
    Ok(())
}

fn run_analyze(
    source: SourceArgs,
    model: Option<ModelArg>,
    days: Option<u32>,
    confidence: Option<f64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str::<AnalysisConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    // Flags win over the config file; forecasting is always on here.
    config.forecast.enabled = true;
    if let Some(model) = model {
        config.forecast.model = model.into();
    }
    if let Some(days) = days {
        config.forecast.forecast_period = days;
    }
    if let Some(confidence) = confidence {
        config.forecast.confidence_level = confidence;
    }
    config.validate()?;

    let bars = load_bars(&source)?;
    let report = Analyzer::new().analyze(&source.symbol, &bars, &config)?;
    let chosen = generate_forecast(&bars, &config.forecast);

    print_report(&report, &bars, chosen.as_ref());
    Ok(())
}

fn print_comparison(symbol: &str, bars: &[OhlcvBar], holdout: usize, scores: &[HoldoutScore]) {
    println!();
    println!("=== Model Comparison ===");
    println!("Symbol:         {symbol}");
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("Period:         {} to {}", first.date, last.date);
    }
    println!("Bars:           {} ({holdout} held out)", bars.len());
    println!();
    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>12}",
        "Model", "RMSE", "MAE", "Dir Acc", "Cum Return"
    );
    for score in scores {
        let eval = &score.evaluation;
        println!(
            "{:<10} {:>10.3} {:>10.3} {:>9.1}% {:>11.2}%",
            score.model.label(),
            eval.rmse,
            eval.mae,
            eval.directional_accuracy * 100.0,
            eval.cumulative_return * 100.0
        );
    }

    let best = scores
        .iter()
        .min_by(|a, b| a.evaluation.rmse.total_cmp(&b.evaluation.rmse));
    if let Some(best) = best {
        println!();
        println!("Best RMSE:      {}", best.model.label());
    }
    println!();
}

fn print_report(report: &AnalysisReport, bars: &[OhlcvBar], forecast: Option<&ForecastResult>) {
    println!();
    println!("=== Analysis Report ===");
    println!("Symbol:         {}", report.symbol);
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("Period:         {} to {}", first.date, last.date);
    }
    println!("Bars:           {}", bars.len());
    println!("Latest Close:   {:.2}", report.risk.entry_price);

    println!();
    println!("--- Signals ---");
    if report.signals.is_empty() {
        println!("none");
    }
    for signal in &report.signals {
        println!(
            "{:?} @ {:.2} on {}   [{:?}]   stop {:.2}   target {:.2}   r:r {:.1}",
            signal.kind,
            signal.price,
            signal.date,
            signal.trend,
            signal.stop_loss,
            signal.target,
            signal.risk_reward_ratio
        );
        println!("  reason: {}", signal.reason);
    }

    println!();
    println!("--- Support / Resistance ---");
    if report.levels.is_empty() {
        println!("none");
    }
    for level in &report.levels {
        println!(
            "{:<11} {:>8.2}   strength {}   {} touches",
            format!("{:?}", level.kind),
            level.level,
            level.strength,
            level.touches
        );
    }

    println!();
    println!("--- Risk ---");
    println!("Account:        {:.2}", report.risk.account_size);
    println!(
        "Risk/Trade:     {:.2} ({:.1}%)",
        report.risk.risk_amount, report.risk.risk_percentage
    );
    println!("Position Size:  {}", report.risk.position_size);
    println!(
        "Stop:           {:.2} (distance {:.2})",
        report.risk.stop_loss_price, report.risk.stop_loss_distance
    );
    println!("Target (3R):    {:.2}", report.risk.recommended_target);

    println!();
    println!("--- Forecast ---");
    match forecast {
        Some(forecast) if !forecast.is_empty() => {
            let end = forecast.horizon();
            println!("Model:          {}", forecast.model.label());
            println!(
                "Direction:      {:?} (bias {:+.2})",
                forecast.direction, forecast.bias
            );
            println!("Confidence:     {:.0}%", forecast.confidence * 100.0);
            println!(
                "{:<16}{:.2}  [{:.2}, {:.2}]  {}",
                "Day 1:",
                forecast.predicted[0],
                forecast.lower_bound[0],
                forecast.upper_bound[0],
                forecast.dates[0]
            );
            if end > 1 {
                println!(
                    "{:<16}{:.2}  [{:.2}, {:.2}]  {}",
                    format!("Day {end}:"),
                    forecast.predicted[end - 1],
                    forecast.lower_bound[end - 1],
                    forecast.upper_bound[end - 1],
                    forecast.dates[end - 1]
                );
            }
        }
        _ => println!("none (series below the forecasting minimum)"),
    }
    println!();
}
