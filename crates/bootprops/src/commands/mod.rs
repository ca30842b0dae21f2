//! Command implementations for the bootprops CLI
//!
//! Each command loads the metadata named on the command line and delegates
//! to bootprops-editor for the actual work.

pub mod check;
pub mod complete;
pub mod hover;

use anyhow::{Context, Result};
use bootprops_editor::EditorSettings;
use bootprops_metadata::{MetadataIndex, TypeRegistry};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata and settings shared by every command.
#[derive(Debug, Args)]
pub struct Sources {
    /// Configuration-metadata JSON describing the known properties
    #[arg(long, value_name = "FILE")]
    pub metadata: PathBuf,

    /// JSON description of the enum and bean types properties refer to
    #[arg(long, value_name = "FILE")]
    pub types: Option<PathBuf>,

    /// TOML editor settings (indentation, severities)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

/// Everything a request needs besides the document.
pub struct Loaded {
    pub index: MetadataIndex,
    pub types: TypeRegistry,
    pub settings: EditorSettings,
}

impl Sources {
    pub fn load(&self) -> Result<Loaded> {
        let index = MetadataIndex::from_json(&read(&self.metadata)?)
            .with_context(|| format!("Failed to load metadata from {}", self.metadata.display()))?;
        tracing::debug!(properties = index.len(), "loaded metadata index");

        let types = match &self.types {
            Some(path) => TypeRegistry::from_json(&read(path)?)
                .with_context(|| format!("Failed to load types from {}", path.display()))?,
            None => TypeRegistry::new(),
        };

        let settings = match &self.settings {
            Some(path) => EditorSettings::from_toml(&read(path)?)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => EditorSettings::default(),
        };

        Ok(Loaded {
            index,
            types,
            settings,
        })
    }
}

pub fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
