use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TechminerError};

/// User-editable stopword list: one term per line, plain text.
#[derive(Debug, Clone)]
pub struct StopwordsManager {
    path: PathBuf,
    stopwords: Vec<String>,
}

impl StopwordsManager {
    /// `<root_dir>/my_keywords/stopwords.txt`
    pub fn default_path<P: AsRef<Path>>(root_dir: P) -> PathBuf {
        root_dir.as_ref().join("my_keywords").join("stopwords.txt")
    }

    pub fn for_project<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        Self::open(Self::default_path(root_dir))
    }

    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(TechminerError::NotFound(format!(
                "stopwords file {}",
                path.display()
            )));
        }

        let stopwords: Vec<String> = fs::read_to_string(&path)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        debug!("Loaded {} stopwords from {}", stopwords.len(), path.display());

        Ok(Self { path, stopwords })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `term` unless it is already listed. Returns whether the file changed.
    pub fn add_term(&mut self, term: &str) -> Result<bool> {
        let term = term.trim();
        if term.is_empty() || self.contains(term) {
            return Ok(false);
        }
        self.stopwords.push(term.to_string());
        self.save()?;
        info!("Added stopword '{}'", term);
        Ok(true)
    }

    /// Deduplicate and sort the list, then rewrite the file.
    pub fn sort(&mut self, descending: bool) -> Result<()> {
        self.stopwords.sort();
        self.stopwords.dedup();
        if descending {
            self.stopwords.reverse();
        }
        self.save()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.stopwords.iter().any(|w| w == term)
    }

    pub fn stopwords(&self) -> Vec<String> {
        self.stopwords.clone()
    }

    fn save(&self) -> Result<()> {
        fs::write(&self.path, self.stopwords.join("\n"))?;
        Ok(())
    }
}
