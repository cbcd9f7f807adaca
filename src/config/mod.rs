use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::sync::ImageMode;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Site-wide settings
    #[serde(default)]
    pub site: SiteConfig,

    /// Rendering feature switches
    #[serde(default)]
    pub render: RenderOptions,

    /// Recognized speaker names and their display colors
    #[serde(default)]
    pub speakers: Vec<SpeakerStyle>,

    /// One entry per interview page
    #[serde(default)]
    pub pages: Vec<PageConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Title shown above every page
    pub title: String,

    /// Directory holding per-page section index JSON files
    pub main_points_dir: PathBuf,

    /// Shared image catalog JSON file
    pub images_file: PathBuf,

    /// File name suffix for secondary-language section indices
    /// (`<page_id>_<suffix>.json`)
    pub secondary_suffix: String,

    /// Display labels for the two transcript languages
    pub primary_label: String,
    pub secondary_label: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Family Interviews".to_string(),
            main_points_dir: PathBuf::from("main_points"),
            images_file: PathBuf::from("images.json"),
            secondary_suffix: "es".to_string(),
            primary_label: "English".to_string(),
            secondary_label: "Español".to_string(),
        }
    }
}

/// Feature switches for the single page renderer.
///
/// Earlier generations of this tool kept a near-duplicate generator script
/// per feature combination; these options replace all of them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Show prev/next image controls next to the image panel
    pub show_image_carousel: bool,

    /// Render a table of contents per language with its own toggle
    pub dual_language_toc: bool,

    /// Include the floating gallery popup with catalog thumbnails
    pub gallery_popup: bool,

    /// Page the carousel independently of transcript position instead of
    /// following the current section
    #[serde(default)]
    pub independent_carousel: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_image_carousel: true,
            dual_language_toc: true,
            gallery_popup: true,
            independent_carousel: false,
        }
    }
}

impl RenderOptions {
    pub fn image_mode(&self) -> ImageMode {
        if self.independent_carousel {
            ImageMode::Carousel
        } else {
            ImageMode::Linked
        }
    }
}

/// A speaker whose name is highlighted at line starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerStyle {
    pub name: String,

    /// CSS color for the speaker's name
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Stable identifier, also the base name of the section index files
    pub page_id: String,

    /// Title shown in the navigation bar and the browser tab
    pub page_title: String,

    /// Audio recording referenced by the page's player
    pub audio_file: String,

    /// Primary-language transcript text file
    #[serde(default)]
    pub transcript_file: Option<PathBuf>,

    /// Secondary-language transcript text file
    #[serde(default)]
    pub secondary_transcript_file: Option<PathBuf>,

    /// Where the rendered page is written
    pub output_file: PathBuf,
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("interview-weaver").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for page in &self.pages {
            if page.page_id.trim().is_empty() {
                anyhow::bail!("Every page must have a non-empty page_id");
            }
            if !seen.insert(page.page_id.as_str()) {
                anyhow::bail!("Duplicate page_id: {}", page.page_id);
            }
            if page.transcript_file.is_none() && page.secondary_transcript_file.is_none() {
                anyhow::bail!(
                    "Page '{}' has no transcript file in either language",
                    page.page_id
                );
            }
        }
        Ok(())
    }

    /// Find a page by id
    pub fn page(&self, page_id: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.page_id == page_id)
    }

    /// Speaker names in recognition order
    pub fn speaker_names(&self) -> Vec<String> {
        self.speakers.iter().map(|s| s.name.clone()).collect()
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Site Title: {}", self.site.title);
        println!("  Main Points Dir: {}", self.site.main_points_dir.display());
        println!("  Images File: {}", self.site.images_file.display());
        println!(
            "  Languages: {} / {}",
            self.site.primary_label, self.site.secondary_label
        );
        println!("  Image Carousel: {}", self.render.show_image_carousel);
        println!("  Dual-language TOC: {}", self.render.dual_language_toc);
        println!("  Gallery Popup: {}", self.render.gallery_popup);
        println!("  Speakers: {}", self.speaker_names().join(", "));
        println!("  Pages: {}", self.pages.len());
        for page in &self.pages {
            println!("    • {} ({})", page.page_id, page.page_title);
        }
    }
}
