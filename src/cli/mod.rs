use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "weaver",
    about = "Interview Weaver - Build navigable HTML pages from timestamped interview transcripts",
    version,
    long_about = "A CLI tool that turns plain-text, timestamp-annotated interview transcripts plus small JSON metadata into static HTML pages with a synchronized audio player, clickable table of contents, language toggling, and an image gallery."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the configured interview pages
    Build {
        /// Render only the page with this id
        #[arg(short, long, value_name = "PAGE_ID")]
        page: Option<String>,
    },

    /// Validate configuration and inputs without writing any pages
    Check,

    /// Inspect or set up the site configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
