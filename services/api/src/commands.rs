use clap::Args;
use seismic_risk::config::{AppConfig, ScoringConfig};
use seismic_risk::error::AppError;
use seismic_risk::layer::{CsvLayer, FeatureFilter};
use seismic_risk::scoring::{BoundsScope, Category, RiskEngine, RuleCatalog, RunOptions, RunSummary};
use seismic_risk::telemetry;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CSV export of the building layer
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// JSON rule catalog (defaults to RISK_CATALOG_PATH or the standard catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Write the scored layer here; without it the run is a dry run
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Boolean column selecting the buildings to score
    #[arg(long, conflicts_with = "all_features")]
    pub(crate) eligibility_field: Option<String>,
    /// Score every building regardless of eligibility
    #[arg(long)]
    pub(crate) all_features: bool,
    /// Population used for normalization bounds (eligible or all)
    #[arg(long)]
    pub(crate) bounds_scope: Option<BoundsScope>,
    /// Print the run summary as JSON instead of text
    #[arg(long)]
    pub(crate) summary_json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CatalogArgs {
    /// Write the catalog to a file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let catalog = match &args.catalog {
        Some(path) => RuleCatalog::from_path(path)?,
        None => config.scoring.load_catalog()?,
    };
    let options = run_options(&config.scoring, &args);
    let engine = RiskEngine::new(catalog);

    let mut layer = CsvLayer::from_path(&args.input)?;
    let summary = engine.run(&mut layer, &options)?;

    if let Some(output) = &args.output {
        layer.commit_to_path(output)?;
    }

    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        render_summary(&engine, &summary, args.output.as_ref());
    }

    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let json = config.scoring.load_catalog()?.to_json_pretty()?;

    match args.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

fn run_options(config: &ScoringConfig, args: &ScoreArgs) -> RunOptions {
    let mut options = config.run_options();
    if args.all_features {
        options.filter = FeatureFilter::All;
    } else if let Some(field) = &args.eligibility_field {
        options.filter = FeatureFilter::eligibility(field);
    }
    if let Some(scope) = args.bounds_scope {
        options.bounds_scope = scope;
    }
    options
}

fn render_summary(engine: &RiskEngine, summary: &RunSummary, output: Option<&PathBuf>) {
    println!("Seismic risk scoring");
    println!(
        "Features scored: {} ({} warnings)",
        summary.features_scored,
        summary.warnings()
    );

    println!("\nCategory weights");
    for category in Category::ordered() {
        println!(
            "- {}: total weight {} across {} attribute(s)",
            category.label(),
            engine.weight_totals().total(category),
            engine.weight_totals().members(category)
        );
    }

    if summary.bounds.is_empty() {
        println!("\nNormalization bounds: none");
    } else {
        println!("\nNormalization bounds");
        for (attribute, bounds) in summary.bounds.iter() {
            println!("- {attribute}: {} - {}", bounds.min, bounds.max);
        }
    }

    match (summary.max_risk, summary.mean_risk) {
        (Some(max), Some(mean)) => println!("\nRisk: max {max:.4}, mean {mean:.4}"),
        _ => println!("\nRisk: no features scored"),
    }

    match output {
        Some(path) => println!("Committed scored layer to {}", path.display()),
        None => println!("Dry run: no output written (pass --output to commit)"),
    }
}
