use crate::commands::{run_catalog, run_score, CatalogArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use seismic_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "seismic-risk",
    about = "Score building footprints for composite seismic risk",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a CSV building layer and optionally write the result
    Score(ScoreArgs),
    /// Print or export the active rule catalog as JSON
    Catalog(CatalogArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Catalog(args) => run_catalog(args),
    }
}
