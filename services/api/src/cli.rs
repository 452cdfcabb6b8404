use crate::report::{
    run_divorce_series, run_income_distribution, run_query, IncomeArgs, QueryArgs, SeriesArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use market_insights::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Market Insights",
    about = "Serve and query composite market-opportunity scores from the command line",
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
    /// Print opportunity reports from the configured reference data
    Insights {
        #[command(subcommand)]
        command: InsightsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum InsightsCommand {
    /// Ranked, paginated opportunity table for a state/city/tier selection
    Query(QueryArgs),
    /// Yearly divorce-rate averages for a state against the national average
    Series(SeriesArgs),
    /// Household totals per income bracket
    Income(IncomeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the reference data directory
    #[arg(long)]
    pub(crate) data_dir: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Insights { command } => match command {
            InsightsCommand::Query(args) => run_query(args).await,
            InsightsCommand::Series(args) => run_divorce_series(args).await,
            InsightsCommand::Income(args) => run_income_distribution(args).await,
        },
    }
}
