mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::{run_general, run_performance, run_stopwords, run_summary, run_trend};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::General(args) => {
            run_general(args)?;
        }
        Commands::Performance(args) => {
            run_performance(args)?;
        }
        Commands::Trend(args) => {
            run_trend(args)?;
        }
        Commands::Summary(args) => {
            run_summary(args)?;
        }
        Commands::Stopwords(args) => {
            run_stopwords(args)?;
        }
    }

    Ok(())
}
