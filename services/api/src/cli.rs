use crate::commands::{run_classify, run_history, ClassifyArgs, HistoryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use deskroute::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Department Request Router",
    about = "Classify student requests and dispatch them to the owning office",
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
    /// Show which department a text would be routed to, without sending anything
    Classify(ClassifyArgs),
    /// List recorded outcomes for one requester, newest first
    History(HistoryArgs),
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
        Command::Classify(args) => run_classify(args),
        Command::History(args) => run_history(args),
    }
}
