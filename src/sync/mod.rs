//! Multi-view synchronization.
//!
//! A rendered page shows several views of the same interview at once: the
//! transcript pane, the table of contents, the image panel, and the audio
//! scrubber. This module is the single source of truth for how those views
//! react to user actions. It is a small synchronous state machine: one event
//! in, an ordered list of effects out, state updated in between. The
//! renderer's client-side script realizes exactly this event→effect table;
//! keeping the machine here lets every transition be tested without a DOM.
//!
//! Hard invariant: audio playback position moves only on [`Event::Seek`].
//! Passive scrolling and language switches never touch it.

use crate::section::{ImageCatalog, SectionIndex};

/// Which transcript language a control refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Primary,
    Secondary,
}

/// Direction for manual image paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

/// How the image panel relates to transcript position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// Image follows the current section; manual paging also moves the
    /// current section and TOC highlight.
    #[default]
    Linked,
    /// Image is paged independently of scroll and seek position.
    Carousel,
}

/// A user or runtime action the synchronizer reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// TOC entry or inline timestamp clicked.
    Seek { section_id: String, seconds: u32 },
    /// Transcript pane scrolled by the user. Carries the observed vertical
    /// distance of each section boundary marker from the viewport reference
    /// line (negative: above the line).
    ScrollObserved { marker_offsets: Vec<(String, f64)> },
    /// Explicit prev/next image control.
    ManualImageStep { direction: Direction },
    /// Transcript language switch control.
    LanguageToggle { language: Language },
}

/// A view update the runtime must apply, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Move audio playback to the offset and resume playing.
    SeekAudio { seconds: u32 },
    /// Smoothly scroll the transcript pane to the section's boundary marker.
    ScrollTranscript { section_id: String },
    /// Restyle the TOC so this entry reads as current, scrolled into view.
    HighlightToc { section_id: String },
    /// Replace the displayed image and caption.
    ShowImage {
        key: String,
        src: String,
        caption: String,
    },
    /// Swap the visible transcript content to the given language.
    SwapTranscript { language: Language },
}

/// Reactive state shared by all views of one rendered page.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    index: SectionIndex,
    catalog: ImageCatalog,
    image_mode: ImageMode,
    has_secondary: bool,
    current_section: usize,
    /// Key of the image currently on screen, if any.
    current_image: Option<String>,
    /// Cursor into the image-bearing section list, carousel mode only.
    carousel_pos: Option<usize>,
    current_language: Language,
}

impl Synchronizer {
    pub fn new(
        index: SectionIndex,
        catalog: ImageCatalog,
        image_mode: ImageMode,
        has_secondary: bool,
    ) -> Self {
        let mut sync = Self {
            index,
            catalog,
            image_mode,
            has_secondary,
            current_section: 0,
            current_image: None,
            carousel_pos: None,
            current_language: if has_secondary {
                Language::Secondary
            } else {
                Language::Primary
            },
        };

        // Initial image: whatever the first section resolves to
        if let Some(key) = sync.resolve_image(0) {
            sync.current_image = Some(key.clone());
            sync.carousel_pos = sync.carousel_position_of(&key);
        }
        sync
    }

    pub fn current_section_id(&self) -> &str {
        &self.index.sections()[self.current_section].id
    }

    pub fn current_image_key(&self) -> Option<&str> {
        self.current_image.as_deref()
    }

    pub fn current_language(&self) -> Language {
        self.current_language
    }

    /// Apply one event, returning the view effects in the order the runtime
    /// must apply them: audio seek before scroll before highlight/image.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Seek {
                section_id,
                seconds,
            } => self.on_seek(&section_id, seconds),
            Event::ScrollObserved { marker_offsets } => self.on_scroll(&marker_offsets),
            Event::ManualImageStep { direction } => self.on_image_step(direction),
            Event::LanguageToggle { language } => self.on_language_toggle(language),
        }
    }

    fn on_seek(&mut self, section_id: &str, seconds: u32) -> Vec<Effect> {
        let Some(target) = self.index.position_of(section_id) else {
            tracing::debug!(section_id, "seek to unknown section ignored");
            return Vec::new();
        };

        let mut effects = vec![
            Effect::SeekAudio { seconds },
            Effect::ScrollTranscript {
                section_id: section_id.to_string(),
            },
        ];
        self.current_section = target;
        effects.push(Effect::HighlightToc {
            section_id: section_id.to_string(),
        });
        effects.extend(self.refresh_image());
        effects
    }

    fn on_scroll(&mut self, marker_offsets: &[(String, f64)]) -> Vec<Effect> {
        let Some(closest) = closest_section(marker_offsets) else {
            return Vec::new();
        };
        let Some(target) = self.index.position_of(closest) else {
            return Vec::new();
        };
        if target == self.current_section {
            return Vec::new();
        }

        // Steps (3)-(5) of a seek, with the audio untouched and the scroll
        // itself already performed by the user.
        self.current_section = target;
        let mut effects = vec![Effect::HighlightToc {
            section_id: closest.to_string(),
        }];
        effects.extend(self.refresh_image());
        effects
    }

    fn on_image_step(&mut self, direction: Direction) -> Vec<Effect> {
        let bearing = self.index.image_bearing();
        if bearing.is_empty() {
            return Vec::new();
        }

        match self.image_mode {
            ImageMode::Linked => self.step_linked(&bearing, direction),
            ImageMode::Carousel => self.step_carousel(&bearing, direction),
        }
    }

    /// Linked paging: jump the current section to the neighbouring
    /// image-bearing section, clamping at either end.
    fn step_linked(&mut self, bearing: &[usize], direction: Direction) -> Vec<Effect> {
        let target = match direction {
            Direction::Forward => bearing.iter().find(|&&i| i > self.current_section),
            Direction::Back => bearing.iter().rev().find(|&&i| i < self.current_section),
        };
        let Some(&target) = target else {
            return Vec::new();
        };

        self.current_section = target;
        let section_id = self.index.sections()[target].id.clone();
        let mut effects = vec![Effect::HighlightToc { section_id }];
        effects.extend(self.refresh_image());
        effects
    }

    /// Carousel paging: move the independent image cursor, clamping at
    /// either end. Section and TOC state stay where they are.
    fn step_carousel(&mut self, bearing: &[usize], direction: Direction) -> Vec<Effect> {
        let pos = self.carousel_pos.unwrap_or(0);
        let next = match direction {
            Direction::Forward => (pos + 1).min(bearing.len() - 1),
            Direction::Back => pos.saturating_sub(1),
        };
        if self.carousel_pos == Some(next) {
            return Vec::new();
        }
        self.carousel_pos = Some(next);

        let section = &self.index.sections()[bearing[next]];
        let key = section.image.as_deref().unwrap_or_default().to_string();
        self.show_image(&key).into_iter().collect()
    }

    fn on_language_toggle(&mut self, language: Language) -> Vec<Effect> {
        if language == Language::Secondary && !self.has_secondary {
            // The control is not rendered at all for absent languages; an
            // event for one is still a safe no-op.
            return Vec::new();
        }
        self.current_language = language;
        vec![Effect::SwapTranscript { language }]
    }

    /// Image key in effect for the current section, linked mode only.
    fn refresh_image(&mut self) -> Option<Effect> {
        if self.image_mode == ImageMode::Carousel {
            return None;
        }
        let key = self.resolve_image(self.current_section)?;
        self.show_image(&key)
    }

    fn resolve_image(&self, section: usize) -> Option<String> {
        self.index.effective_image_key(section).map(str::to_string)
    }

    /// Emit a `ShowImage` for a catalog key, retaining the previous image
    /// when the key is stale or the image is already on screen.
    fn show_image(&mut self, key: &str) -> Option<Effect> {
        if self.current_image.as_deref() == Some(key) {
            return None;
        }
        let Some(info) = self.catalog.get(key) else {
            tracing::debug!(key, "image key missing from catalog, keeping previous");
            return None;
        };

        self.current_image = Some(key.to_string());
        if self.image_mode == ImageMode::Carousel {
            self.carousel_pos = self.carousel_position_of(key).or(self.carousel_pos);
        }
        Some(Effect::ShowImage {
            key: key.to_string(),
            src: info.src.clone(),
            caption: info.caption.clone(),
        })
    }

    fn carousel_position_of(&self, key: &str) -> Option<usize> {
        self.index
            .image_bearing()
            .iter()
            .position(|&i| self.index.sections()[i].image.as_deref() == Some(key))
    }
}

/// The one scroll heuristic used everywhere: the section whose boundary
/// marker sits closest to the viewport reference line wins, measured by
/// absolute distance. Ties keep the earlier marker.
pub fn closest_section(marker_offsets: &[(String, f64)]) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    for (id, offset) in marker_offsets {
        let distance = offset.abs();
        match best {
            Some((_, current)) if distance >= current => {}
            _ => best = Some((id.as_str(), distance)),
        }
    }
    best.map(|(id, _)| id)
}
