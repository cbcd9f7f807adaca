//! Interview Weaver - A Rust CLI tool for building navigable interview pages
//!
//! This library turns timestamped plain-text interview transcripts (in one or
//! two languages) plus small JSON metadata into static HTML pages with a
//! synchronized audio player, clickable table of contents, and image panel.

pub mod bundle;
pub mod cli;
pub mod config;
pub mod output;
pub mod render;
pub mod section;
pub mod segment;
pub mod sync;
pub mod timestamp;
pub mod utils;

pub use bundle::DocumentBundle;
pub use cli::{Cli, Commands};
pub use config::{Config, PageConfig, RenderOptions};
pub use section::{ImageCatalog, Section, SectionIndex};
pub use segment::{Assignment, Partition};
pub use sync::{Effect, Event, Synchronizer};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the weaver
#[derive(thiserror::Error, Debug)]
pub enum WeaverError {
    #[error("Section index is empty")]
    EmptySectionIndex,

    #[error("Section index out of order: section '{0}' starts before its predecessor")]
    UnsortedSectionIndex(String),

    #[error("Transcript read failed: {0}")]
    TranscriptRead(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Page has no transcript in any language: {0}")]
    NoTranscript(String),
}
