use crate::estimate::{run_predict, run_score, PredictArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use price_estimator::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Price Estimation Service",
    about = "Serve and run property price estimates from the command line",
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
    /// Estimate the price of a single property
    Predict(PredictArgs),
    /// Score a JSON batch of property records
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ModelArgs {
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model_path: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Predict(args) => run_predict(args),
        Command::Score(args) => run_score(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["price-estimator-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "price-estimator-api",
            "serve",
            "--port",
            "8080",
            "--model-path",
            "/tmp/model.json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.model.model_path, Some(PathBuf::from("/tmp/model.json")));
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn predict_requires_feature_flags() {
        let parsed = Cli::try_parse_from(["price-estimator-api", "predict", "--bedrooms", "3"]);
        assert!(parsed.is_err());
    }
}
