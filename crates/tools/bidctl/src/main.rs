use anyhow::{anyhow, Context, Result};
use bideval_engine::{
    default_criteria, Bid, BidEvalError, BidEvaluator, BidId, BidStatistics, ComparisonReport, EngineConfig,
    EvaluationReport, EvaluationRequest, ManualScoreOverrides, ScoringCriterion, TieBreak,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line interface for bid evaluation
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score, rank and analyse every bid in a file
    Evaluate {
        /// JSON file holding an array of bids
        #[clap(long, short)]
        bids: PathBuf,

        /// Budget ceiling for compliance checks and the price bonus
        #[clap(long)]
        budget: Option<f64>,

        /// JSON file holding an array of manual scores
        #[clap(long)]
        overrides: Option<PathBuf>,

        /// Adjusted criterion weight, e.g. `--weights Timeline=30`
        #[clap(long, value_parser = parse_weight)]
        weights: Vec<(String, f64)>,

        /// How bids with equal weighted scores are ordered
        #[clap(long, value_enum, default_value = "input-order")]
        tie_break: TieBreakArg,

        /// Print the full report as JSON
        #[clap(long)]
        json: bool,
    },

    /// Compare up to three bids side by side
    Compare {
        /// JSON file holding an array of bids
        #[clap(long, short)]
        bids: PathBuf,

        /// Bid id to add to the comparison, in order
        #[clap(long, short, required = true)]
        select: Vec<String>,

        /// Budget ceiling
        #[clap(long)]
        budget: Option<f64>,

        /// Print the comparison as JSON
        #[clap(long)]
        json: bool,
    },

    /// List the default scoring criteria
    Criteria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TieBreakArg {
    InputOrder,
    BidId,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::InputOrder => TieBreak::InputOrder,
            TieBreakArg::BidId => TieBreak::BidId,
        }
    }
}

fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (name, weight) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=WEIGHT, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing criterion name in '{}'", raw));
    }
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight in '{}': {}", raw, e))?;
    Ok((name.to_string(), weight))
}

/// Default criteria with the given weights swapped in.
fn apply_weights(adjustments: &[(String, f64)]) -> Result<Vec<ScoringCriterion>, BidEvalError> {
    let mut criteria = default_criteria();
    for (name, weight) in adjustments {
        let slot = criteria
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| BidEvalError::UnknownCriterion(name.clone()))?;
        *slot = slot.with_weight(*weight)?;
    }
    Ok(criteria)
}

fn read_bids(path: &Path) -> Result<Vec<Bid>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading bids from {}", path.display()))?;
    let bids: Vec<Bid> =
        serde_json::from_str(&raw).with_context(|| format!("parsing bids from {}", path.display()))?;
    tracing::debug!("Loaded {} bids from {}", bids.len(), path.display());
    Ok(bids)
}

fn read_overrides(path: &Path) -> Result<ManualScoreOverrides> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading overrides from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing overrides from {}", path.display()))
}

fn check_budget(budget: Option<f64>) -> Result<()> {
    match budget {
        Some(limit) if !limit.is_finite() || limit < 0.0 => {
            Err(anyhow!("budget must be a non-negative number, got {}", limit))
        }
        _ => Ok(()),
    }
}

fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn print_report(report: &EvaluationReport) {
    println!("{}", "Bid Evaluation".blue().bold());

    match &report.statistics {
        BidStatistics::NoData { total_count } => {
            println!("{} ({} bids, none priced)", "No pricing data".yellow(), total_count);
        }
        BidStatistics::Available(stats) => {
            println!(
                "Bids: {} ({} priced)  Average: {}  Median: {}  Range: {} - {}",
                stats.total_count,
                stats.valid_count,
                money(stats.average),
                money(stats.median),
                money(stats.min),
                money(stats.max)
            );
            for bucket in &stats.buckets {
                println!(
                    "  {:>12} - {:<12} {}",
                    money(bucket.lower),
                    money(bucket.upper),
                    "#".repeat(bucket.count)
                );
            }
        }
    }

    if let Some(compliance) = &report.budget_compliance {
        println!(
            "Budget {}: {} within, {} over ({:.1}%)",
            money(compliance.budget_limit),
            compliance.within_budget.to_string().green(),
            compliance.over_budget.to_string().red(),
            compliance.percentage
        );
    }

    println!(
        "Quality: {:.1}%  Trend: {}",
        report.quality.quality_score, report.trend.direction
    );
    if !report.weights.balanced {
        println!("{} weights total {}", "Warning:".yellow().bold(), report.weights.total);
    }

    println!("\n{}", "Ranking".blue().bold());
    for score in &report.scores {
        let parts: Vec<String> = score
            .criterion_scores
            .iter()
            .map(|c| {
                let marker = if c.manual.is_some() { "*" } else { "" };
                format!("{} {}{}", c.criterion, c.score, marker)
            })
            .collect();
        println!(
            "{:>3}. {:<28} {:>6.2}  [{}]",
            score.rank,
            score.company_name,
            score.weighted_score,
            parts.join(", ")
        );
    }

    println!("\n{}", "Recommendation".blue().bold());
    match &report.recommendation.top {
        Some(top) => println!("Top pick: {} ({:.2})", top.company_name.green().bold(), top.weighted_score),
        None => println!("{}", "No open bids to recommend".yellow()),
    }
    if let Some(alt) = &report.recommendation.budget_alternate {
        println!("Within budget: {} ({:.2})", alt.company_name.green(), alt.weighted_score);
    }
    for insight in &report.recommendation.insights {
        println!("  - {}", insight.message);
    }
}

fn print_comparison(report: &ComparisonReport) {
    println!("{}", "Bid Comparison".blue().bold());
    for id in &report.ignored_bid_ids {
        println!("{} {} was not added", "Skipped:".yellow(), id);
    }

    let Some(metrics) = &report.metrics else {
        println!("{}", "Select at least two priced bids to compare".yellow());
        return;
    };

    println!(
        "Average: {}  Range: {}  Potential savings: {}",
        money(metrics.average),
        money(metrics.range),
        money(metrics.potential_savings).green()
    );
    for row in &metrics.rows {
        let amount = row.total_amount.map_or_else(|| "-".to_string(), money);
        let amount = if row.is_lowest {
            amount.green().to_string()
        } else if row.is_highest {
            amount.red().to_string()
        } else {
            amount
        };
        let mut tags = Vec::new();
        if row.best_timeline {
            tags.push("best timeline");
        }
        if row.best_credentials {
            tags.push("best credentials");
        }
        println!(
            "{:<28} {:>14}  timeline {:>2}  credentials {:>2}  {}",
            row.company_name,
            amount,
            row.timeline_score,
            row.credentials_score,
            tags.join(", ")
        );
    }
}

fn evaluate(
    bids: &Path,
    budget: Option<f64>,
    overrides: Option<&Path>,
    weights: &[(String, f64)],
    tie_break: TieBreakArg,
    json: bool,
) -> Result<()> {
    check_budget(budget)?;
    let mut request = EvaluationRequest::new(read_bids(bids)?);
    if let Some(limit) = budget {
        request = request.with_budget(limit);
    }
    if let Some(path) = overrides {
        request = request.with_overrides(read_overrides(path)?);
    }
    if !weights.is_empty() {
        request = request.with_criteria(apply_weights(weights)?);
    }

    let evaluator = BidEvaluator::new(EngineConfig { tie_break: tie_break.into(), ..Default::default() });
    let report = evaluator.evaluate(&request);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn compare(bids: &Path, select: &[String], budget: Option<f64>, json: bool) -> Result<()> {
    check_budget(budget)?;
    let mut request = EvaluationRequest::new(read_bids(bids)?);
    if let Some(limit) = budget {
        request = request.with_budget(limit);
    }
    let ids: Vec<BidId> = select.iter().map(|s| BidId::from(s.as_str())).collect();

    let report = BidEvaluator::default().compare(&request, &ids)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_comparison(&report);
    }
    Ok(())
}

fn list_criteria() {
    println!("{}", "Default criteria".blue().bold());
    for criterion in default_criteria() {
        println!("{:<24} {:>5.1}  {}", criterion.name, criterion.weight, criterion.description);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Evaluate {
            bids,
            budget,
            overrides,
            weights,
            tie_break,
            json,
        } => {
            evaluate(bids, *budget, overrides.as_deref(), weights, *tie_break, *json)?;
        }
        Commands::Compare {
            bids,
            select,
            budget,
            json,
        } => {
            compare(bids, select, *budget, *json)?;
        }
        Commands::Criteria => list_criteria(),
    }

    Ok(())
}
