//! Codebook & case store — the read-only resources loaded once at startup.
//!
//! Every resource is located by first-match search over an ordered list of
//! candidate roots. Nothing is reloaded or validated after startup.

pub mod loader;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::models::case::Case;
use crate::models::template::TemplateKind;

pub use loader::ResourceLocator;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(
        "Could not find {resource} in any of these locations: {}. Please ensure the file exists in one of these locations.",
        join_paths(.attempted)
    )]
    NotFound {
        resource: String,
        attempted: Vec<PathBuf>,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything the pipeline reads from disk, loaded in one pass.
#[derive(Debug, Clone)]
pub struct Resources {
    pub codebook: String,
    pub cases: Vec<Case>,
    pub base_template: String,
    pub risk_template: String,
}

impl Resources {
    /// Loads the codebook, the case store and both template skeletons.
    /// Fails on the first resource that cannot be found.
    pub fn load(locator: &ResourceLocator) -> Result<Self, ResourceError> {
        let codebook = locator.load_codebook()?;
        let cases = locator.load_cases()?;
        let base_template = locator.load_template(TemplateKind::Base)?;
        let risk_template = locator.load_template(TemplateKind::AssessingRisks)?;

        info!(
            "Resources loaded: codebook={} bytes, cases={}",
            codebook.len(),
            cases.len()
        );

        Ok(Self {
            codebook,
            cases,
            base_template,
            risk_template,
        })
    }

    pub fn template(&self, kind: TemplateKind) -> &str {
        match kind {
            TemplateKind::Base => &self.base_template,
            TemplateKind::AssessingRisks => &self.risk_template,
        }
    }
}
