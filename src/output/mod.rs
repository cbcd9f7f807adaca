use anyhow::Result;
use console::style;
use std::path::Path;

use crate::bundle::DocumentBundle;
use crate::segment;
use crate::sync::{Event, ImageMode, Synchronizer};

/// Write a rendered page, creating parent directories as needed.
pub async fn write_page(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }
    fs_err::write(path, content)?;
    Ok(())
}

/// What `check` learned about one page without writing anything.
#[derive(Debug, Clone)]
pub struct PageReport {
    pub page_id: String,
    pub section_count: usize,
    pub line_count: usize,
    pub empty_sections: Vec<String>,
    /// (section id, missing catalog key) pairs
    pub stale_images: Vec<(String, String)>,
    pub has_both_languages: bool,
}

/// Analyze a bundle by running the real engine over it: segmentation for
/// coverage, and a synchronizer seek across every TOC entry to surface
/// stale image references the same way a reader clicking through would.
pub fn inspect_bundle(bundle: &DocumentBundle) -> PageReport {
    let track = bundle.authoritative();
    let index = &track.index;

    let assignment = segment::segment(&track.lines, index);
    let partition = segment::partition(&track.lines, &assignment, index);

    let empty_sections = partition
        .iter()
        .filter(|(_, text)| text.is_empty())
        .map(|(id, _)| id.to_string())
        .collect();

    let mut sync = Synchronizer::new(
        index.clone(),
        bundle.images.clone(),
        ImageMode::Linked,
        bundle.has_both_languages(),
    );

    let mut stale_images = Vec::new();
    for section in index.sections() {
        let _ = sync.handle(Event::Seek {
            section_id: section.id.clone(),
            seconds: section.start_time,
        });
        if let Some(key) = &section.image {
            if !bundle.images.contains_key(key) {
                stale_images.push((section.id.clone(), key.clone()));
            }
        }
    }

    PageReport {
        page_id: bundle.page.page_id.clone(),
        section_count: index.len(),
        line_count: track.lines.len(),
        empty_sections,
        stale_images,
        has_both_languages: bundle.has_both_languages(),
    }
}

/// Print one page's check report to the console.
pub fn print_report(report: &PageReport) {
    println!(
        "{} {}: {} sections, {} lines{}",
        style("✓").green(),
        style(&report.page_id).bold(),
        report.section_count,
        report.line_count,
        if report.has_both_languages {
            ", two languages"
        } else {
            ", one language"
        }
    );

    if !report.empty_sections.is_empty() {
        println!(
            "  {} sections with no transcript lines: {}",
            style("·").dim(),
            report.empty_sections.join(", ")
        );
    }

    for (section_id, key) in &report.stale_images {
        println!(
            "  {} section '{}' references missing image '{}'",
            style("!").yellow(),
            section_id,
            key
        );
    }
}

/// Print a failed page with its error chain.
pub fn print_failure(page_id: &str, error: &anyhow::Error) {
    println!("{} {}: {:#}", style("✗").red(), style(page_id).bold(), error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::LanguageTrack;
    use crate::config::PageConfig;
    use crate::section::{ImageCatalog, Section, SectionIndex};
    use std::path::PathBuf;

    fn bundle() -> DocumentBundle {
        let sections = vec![
            Section {
                id: "s1".to_string(),
                title: "Start".to_string(),
                start_time: 0,
                display_time: "0:00:00".to_string(),
                image: Some("ghost".to_string()),
            },
            Section {
                id: "s2".to_string(),
                title: "Later".to_string(),
                start_time: 60,
                display_time: "0:01:00".to_string(),
                image: None,
            },
        ];
        DocumentBundle {
            page: PageConfig {
                page_id: "ester".to_string(),
                page_title: "Ester".to_string(),
                audio_file: "audio/ester.mp3".to_string(),
                transcript_file: Some(PathBuf::from("t.txt")),
                secondary_transcript_file: None,
                output_file: PathBuf::from("ester.html"),
            },
            primary: Some(LanguageTrack {
                index: SectionIndex::new(sections).unwrap(),
                lines: vec!["hello".to_string(), "world".to_string()],
            }),
            secondary: None,
            images: ImageCatalog::default(),
        }
    }

    #[test]
    fn test_inspect_reports_empty_sections_and_stale_images() {
        let report = inspect_bundle(&bundle());
        assert_eq!(report.section_count, 2);
        assert_eq!(report.line_count, 2);
        assert_eq!(report.empty_sections, vec!["s2".to_string()]);
        assert_eq!(
            report.stale_images,
            vec![("s1".to_string(), "ghost".to_string())]
        );
        assert!(!report.has_both_languages);
    }
}
