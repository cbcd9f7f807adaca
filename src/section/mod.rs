//! Section descriptors and the per-document section index.
//!
//! A section ("main point") marks where a titled part of an interview begins
//! in the recording. The ordered list of sections is supplied as external
//! metadata per document and is the sole authority for segmentation; nothing
//! here is derived from transcript text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::WeaverError;

/// One titled, time-bounded part of an interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Stable unique identifier, used as the anchor id in rendered pages
    pub id: String,

    /// Human-readable section title shown in the table of contents
    pub title: String,

    /// Offset into the recording where the section begins, in seconds
    pub start_time: u32,

    /// The original `H:MM:SS` text, preserved verbatim for display
    pub display_time: String,

    /// Optional key into the image catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Validated, ordered list of sections for one document (one language).
///
/// Construction checks the two configuration invariants that segmentation
/// relies on: the list is non-empty and `start_time` is non-decreasing.
/// Violations are fatal to the document being processed, not to the batch.
#[derive(Debug, Clone)]
pub struct SectionIndex {
    sections: Vec<Section>,
}

impl SectionIndex {
    pub fn new(sections: Vec<Section>) -> Result<Self, WeaverError> {
        if sections.is_empty() {
            return Err(WeaverError::EmptySectionIndex);
        }

        for pair in sections.windows(2) {
            if pair[1].start_time < pair[0].start_time {
                return Err(WeaverError::UnsortedSectionIndex(pair[1].id.clone()));
            }
        }

        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        // A validated index is never empty; kept for API completeness
        self.sections.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Section> {
        self.sections.get(idx)
    }

    /// First section, the initial "current" position for every view.
    pub fn first(&self) -> &Section {
        &self.sections[0]
    }

    /// Position of a section id within the index.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Indices of sections that declare an image key, in section order.
    pub fn image_bearing(&self) -> Vec<usize> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.image.is_some())
            .map(|(i, _)| i)
            .collect()
    }

    /// Resolve the image key in effect at `idx`: the section's own key, or
    /// the nearest preceding section's key when the section has none.
    pub fn effective_image_key(&self, idx: usize) -> Option<&str> {
        self.sections[..=idx.min(self.sections.len() - 1)]
            .iter()
            .rev()
            .find_map(|s| s.image.as_deref())
    }
}

/// Display data for one catalog image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image location, either a site-relative path or an absolute URL
    pub src: String,

    /// Caption text shown under the image
    #[serde(alias = "textContent")]
    pub caption: String,
}

/// Shared catalog of images referenced by section `image` keys.
///
/// Keys are ordered so gallery thumbnails render deterministically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageCatalog {
    images: BTreeMap<String, ImageInfo>,
}

impl ImageCatalog {
    pub fn new(images: BTreeMap<String, ImageInfo>) -> Self {
        Self { images }
    }

    pub fn get(&self, key: &str) -> Option<&ImageInfo> {
        self.images.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.images.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ImageInfo)> {
        self.images.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, start_time: u32) -> Section {
        Section {
            id: id.to_string(),
            title: format!("Title for {}", id),
            start_time,
            display_time: crate::timestamp::format_offset(start_time),
            image: None,
        }
    }

    #[test]
    fn test_empty_index_rejected() {
        let err = SectionIndex::new(Vec::new()).unwrap_err();
        assert!(matches!(err, WeaverError::EmptySectionIndex));
    }

    #[test]
    fn test_unsorted_index_rejected() {
        let err = SectionIndex::new(vec![section("s1", 30), section("s2", 10)]).unwrap_err();
        match err {
            WeaverError::UnsortedSectionIndex(id) => assert_eq!(id, "s2"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_equal_start_times_accepted() {
        let index = SectionIndex::new(vec![
            section("s1", 0),
            section("s2", 19),
            section("s3", 19),
        ])
        .unwrap();
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_position_of() {
        let index = SectionIndex::new(vec![section("s1", 0), section("s2", 19)]).unwrap();
        assert_eq!(index.position_of("s2"), Some(1));
        assert_eq!(index.position_of("ghost"), None);
    }

    #[test]
    fn test_effective_image_key_walks_back() {
        let mut first = section("s1", 0);
        first.image = Some("portrait".to_string());
        let index = SectionIndex::new(vec![first, section("s2", 19), section("s3", 40)]).unwrap();

        assert_eq!(index.effective_image_key(0), Some("portrait"));
        assert_eq!(index.effective_image_key(2), Some("portrait"));
    }

    #[test]
    fn test_effective_image_key_absent() {
        let index = SectionIndex::new(vec![section("s1", 0), section("s2", 19)]).unwrap();
        assert_eq!(index.effective_image_key(1), None);
    }

    #[test]
    fn test_image_bearing_positions() {
        let mut a = section("s1", 0);
        a.image = Some("one".to_string());
        let b = section("s2", 10);
        let mut c = section("s3", 20);
        c.image = Some("two".to_string());

        let index = SectionIndex::new(vec![a, b, c]).unwrap();
        assert_eq!(index.image_bearing(), vec![0, 2]);
    }
}
