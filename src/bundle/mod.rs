//! Per-page input assembly.
//!
//! Everything the engine needs for one interview page is collected here into
//! an explicit [`DocumentBundle`] value before any segmentation runs: the
//! validated section index per language, the raw transcript line streams,
//! and the shared image catalog. There is no ambient registry; callers pass
//! bundles into the engine and renderer directly.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{PageConfig, SiteConfig};
use crate::section::{ImageCatalog, Section, SectionIndex};
use crate::utils;
use crate::WeaverError;

/// One language's inputs: its section index and transcript lines.
#[derive(Debug, Clone)]
pub struct LanguageTrack {
    pub index: SectionIndex,
    pub lines: Vec<String>,
}

/// The unit of work for one interview page.
#[derive(Debug, Clone)]
pub struct DocumentBundle {
    pub page: PageConfig,
    pub primary: Option<LanguageTrack>,
    pub secondary: Option<LanguageTrack>,
    pub images: ImageCatalog,
}

impl DocumentBundle {
    /// The track whose section index drives initialization and, when only
    /// one language exists, every view. Secondary-language documents with
    /// no primary transcript are still renderable.
    pub fn authoritative(&self) -> &LanguageTrack {
        self.primary
            .as_ref()
            .or(self.secondary.as_ref())
            .expect("bundle loading guarantees at least one track")
    }

    pub fn has_both_languages(&self) -> bool {
        self.primary.is_some() && self.secondary.is_some()
    }
}

/// Load the shared image catalog.
///
/// A missing catalog file is not fatal: pages render without images, and
/// `check` reports the absence.
pub async fn load_catalog(path: &Path) -> Result<ImageCatalog> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "image catalog not found, continuing without images");
        return Ok(ImageCatalog::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read image catalog {}", path.display()))?;
    let catalog: ImageCatalog = serde_json::from_str(&content)
        .map_err(|e| WeaverError::InvalidMetadata(format!("{}: {}", path.display(), e)))?;

    for (key, info) in catalog.iter() {
        if let Err(e) = utils::validate_image_src(&info.src) {
            tracing::warn!(key = %key, "suspect image src: {}", e);
        }
    }

    Ok(catalog)
}

/// Load and validate one section index JSON file.
pub async fn load_section_index(path: &Path) -> Result<SectionIndex> {
    utils::check_file_accessible(path)?;

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read section index {}", path.display()))?;
    let sections: Vec<Section> = serde_json::from_str(&content)
        .map_err(|e| WeaverError::InvalidMetadata(format!("{}: {}", path.display(), e)))?;

    SectionIndex::new(sections)
        .with_context(|| format!("Invalid section index {}", path.display()))
}

/// Read a transcript file into its line stream.
pub async fn load_lines(path: &Path) -> Result<Vec<String>> {
    utils::check_file_accessible(path)
        .map_err(|e| WeaverError::TranscriptRead(e.to_string()))?;

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| WeaverError::TranscriptRead(format!("{}: {}", path.display(), e)))?;

    Ok(content.lines().map(str::to_string).collect())
}

/// Assemble the bundle for one page.
///
/// Index lookup: the primary track reads `<page_id>.json` from the main
/// points directory; the secondary track prefers `<page_id>_<suffix>.json`
/// and falls back to the primary index when no translated index exists.
/// Any failure here is a configuration problem fatal to this page only.
pub async fn load_bundle(
    page: &PageConfig,
    site: &SiteConfig,
    images: &ImageCatalog,
) -> Result<DocumentBundle> {
    let primary_index_path = site.main_points_dir.join(format!("{}.json", page.page_id));
    let secondary_index_path = site
        .main_points_dir
        .join(format!("{}_{}.json", page.page_id, site.secondary_suffix));

    let primary = match &page.transcript_file {
        Some(path) => {
            let index = load_section_index(&primary_index_path).await?;
            let lines = load_lines(path).await?;
            Some(LanguageTrack { index, lines })
        }
        None => None,
    };

    let secondary = match &page.secondary_transcript_file {
        Some(path) => {
            let index = if secondary_index_path.exists() {
                load_section_index(&secondary_index_path).await?
            } else {
                tracing::debug!(
                    page_id = %page.page_id,
                    "no secondary section index, reusing primary"
                );
                load_section_index(&primary_index_path).await?
            };
            let lines = load_lines(path).await?;
            Some(LanguageTrack { index, lines })
        }
        None => None,
    };

    if primary.is_none() && secondary.is_none() {
        return Err(WeaverError::NoTranscript(page.page_id.clone()).into());
    }

    Ok(DocumentBundle {
        page: page.clone(),
        primary,
        secondary,
        images: images.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::section::ImageInfo;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn track(ids: &[&str]) -> LanguageTrack {
        let sections = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Section {
                id: id.to_string(),
                title: id.to_string(),
                start_time: (i as u32) * 10,
                display_time: crate::timestamp::format_offset((i as u32) * 10),
                image: None,
            })
            .collect();
        LanguageTrack {
            index: SectionIndex::new(sections).unwrap(),
            lines: vec!["line".to_string()],
        }
    }

    fn page() -> PageConfig {
        PageConfig {
            page_id: "ester".to_string(),
            page_title: "Ester".to_string(),
            audio_file: "audio/ester.mp3".to_string(),
            transcript_file: Some(PathBuf::from("transcripts/ester.txt")),
            secondary_transcript_file: None,
            output_file: PathBuf::from("ester.html"),
        }
    }

    #[test]
    fn test_authoritative_prefers_primary() {
        let bundle = DocumentBundle {
            page: page(),
            primary: Some(track(&["p1"])),
            secondary: Some(track(&["s1"])),
            images: ImageCatalog::default(),
        };
        assert_eq!(bundle.authoritative().index.first().id, "p1");
        assert!(bundle.has_both_languages());
    }

    #[test]
    fn test_authoritative_falls_back_to_secondary() {
        let bundle = DocumentBundle {
            page: page(),
            primary: None,
            secondary: Some(track(&["s1"])),
            images: ImageCatalog::default(),
        };
        assert_eq!(bundle.authoritative().index.first().id, "s1");
        assert!(!bundle.has_both_languages());
    }

    #[test]
    fn test_catalog_parses_original_field_name() {
        // The legacy catalog format used "textContent" for captions
        let json = r#"{"portrait": {"src": "images/p.jpg", "textContent": "A portrait."}}"#;
        let catalog: ImageCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.get("portrait").unwrap().caption, "A portrait.");
    }

    #[test]
    fn test_catalog_round_trip_with_caption_field() {
        let mut images = BTreeMap::new();
        images.insert(
            "portrait".to_string(),
            ImageInfo {
                src: "images/p.jpg".to_string(),
                caption: "A portrait.".to_string(),
            },
        );
        let catalog = ImageCatalog::new(images);

        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: ImageCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.get("portrait").unwrap().src, "images/p.jpg");
    }

    #[tokio::test]
    async fn test_missing_catalog_is_empty_not_fatal() {
        let catalog = load_catalog(Path::new("definitely/not/here.json"))
            .await
            .unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_missing_section_index_is_fatal() {
        let result = load_section_index(Path::new("definitely/not/here.json")).await;
        assert!(result.is_err());
    }
}
