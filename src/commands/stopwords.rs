use anyhow::{Context, Result};
use log::info;

use super::resolve_config;
use crate::cli::{StopwordsAction, StopwordsArgs};
use techminer::common::setup_logging;
use techminer::stopwords::StopwordsManager;

pub fn run_stopwords(args: StopwordsArgs) -> Result<()> {
    setup_logging(&args.log_level)?;

    let path = match &args.path {
        Some(path) => path.clone(),
        None => resolve_config(args.config.as_deref(), args.root_dir.as_ref())?.stopwords_path(),
    };

    let mut manager = StopwordsManager::open(&path)
        .with_context(|| format!("Failed to open stopwords file: {}", path.display()))?;

    match args.action {
        StopwordsAction::Add { term } => {
            if !manager.add_term(&term)? {
                info!("'{}' is already a stopword", term.trim());
            }
        }
        StopwordsAction::Sort { descending } => {
            manager.sort(descending)?;
            info!(
                "Sorted {} stopwords in {}",
                manager.stopwords().len(),
                path.display()
            );
        }
        StopwordsAction::List => {
            for word in manager.stopwords() {
                println!("{}", word);
            }
        }
    }

    Ok(())
}
