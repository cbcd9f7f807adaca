//! Transcript segmentation.
//!
//! A single pass over the transcript assigns every line to exactly one
//! section of the [`SectionIndex`]. The assignment is computed once and
//! projected into whichever shape the renderer needs: a partition of the
//! text by section, or the original line stream annotated with section
//! boundaries and per-line tags.

use crate::section::SectionIndex;
use crate::timestamp::{scan_line, TimestampScan};

/// Mapping from line index to owning section index.
///
/// Section assignment is monotonic: once the cursor reaches section `k` it
/// never returns to an earlier section, regardless of repeated, out-of-order,
/// or malformed timestamps later in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    owners: Vec<usize>,
}

impl Assignment {
    /// Owning section index for a line.
    pub fn section_of(&self, line: usize) -> Option<usize> {
        self.owners.get(line).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.owners.iter().copied()
    }
}

/// Assign every transcript line to a section.
///
/// The cursor starts at the first section. A line that is itself a bare
/// timestamp advances the cursor past every section boundary the parsed
/// offset has reached; the timestamp line then belongs to the section it
/// just opened. Non-timestamp and malformed-timestamp lines never move the
/// cursor. Trailing sections the transcript never reaches simply receive no
/// lines; they are not dropped from any projection.
pub fn segment(lines: &[String], index: &SectionIndex) -> Assignment {
    let sections = index.sections();
    let mut owners = Vec::with_capacity(lines.len());
    let mut cursor = 0usize;

    for line in lines {
        match scan_line(line) {
            TimestampScan::Seconds(t) => {
                while cursor + 1 < sections.len() && t >= sections[cursor + 1].start_time {
                    cursor += 1;
                }
            }
            TimestampScan::Malformed => {
                tracing::debug!(line = %line.trim(), "malformed timestamp, not advancing");
            }
            TimestampScan::None => {}
        }
        owners.push(cursor);
    }

    Assignment { owners }
}

/// Per-section text blocks, in section order.
///
/// Every section id of the index is present, including sections that own no
/// lines (empty text). Block text is the owned lines joined verbatim with
/// newlines, trimmed at the block edges for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    entries: Vec<(String, String)>,
}

impl Partition {
    pub fn get(&self, section_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == section_id)
            .map(|(_, text)| text.as_str())
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, text)| (id.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Project an [`Assignment`] into per-section text blocks.
pub fn partition(lines: &[String], assignment: &Assignment, index: &SectionIndex) -> Partition {
    let mut blocks: Vec<Vec<&str>> = vec![Vec::new(); index.len()];

    for (line, owner) in lines.iter().zip(assignment.iter()) {
        blocks[owner].push(line.as_str());
    }

    let entries = index
        .sections()
        .iter()
        .zip(blocks)
        .map(|(section, block)| (section.id.clone(), block.join("\n").trim().to_string()))
        .collect();

    Partition { entries }
}

/// Cosmetic classification of one transcript line.
///
/// Tags are advisory data for the renderer; they never affect segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineTag {
    Plain,
    /// Line opens with a recognized speaker name.
    Speaker(String),
    /// Line is itself a bare timestamp, usable as a seek control.
    SeekControl { seconds: u32 },
}

/// One item of the inline-annotated transcript view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotatedItem {
    /// Synthetic boundary marker, placed immediately before the first line
    /// of the section it names (or at the end, for unreached sections).
    SectionStart { section_id: String },
    /// An original transcript line, verbatim, with its cosmetic tag.
    Line { text: String, tag: LineTag },
}

/// Project an [`Assignment`] into the inline-annotated view.
///
/// A `SectionStart` marker is emitted for every section of the index exactly
/// once: before the first line the section owns, at the point where a dense
/// timestamp skipped past it, or trailing at the end when the transcript
/// never reached it. The first marker always precedes line 0.
pub fn annotate(
    lines: &[String],
    assignment: &Assignment,
    index: &SectionIndex,
    speakers: &[String],
) -> Vec<AnnotatedItem> {
    let mut items = Vec::with_capacity(lines.len() + index.len());
    let mut emitted = 0usize;

    for (line, owner) in lines.iter().zip(assignment.iter()) {
        while emitted <= owner {
            items.push(AnnotatedItem::SectionStart {
                section_id: index.sections()[emitted].id.clone(),
            });
            emitted += 1;
        }
        items.push(AnnotatedItem::Line {
            text: line.clone(),
            tag: tag_line(line, speakers),
        });
    }

    while emitted < index.len() {
        items.push(AnnotatedItem::SectionStart {
            section_id: index.sections()[emitted].id.clone(),
        });
        emitted += 1;
    }

    items
}

fn tag_line(line: &str, speakers: &[String]) -> LineTag {
    if let TimestampScan::Seconds(seconds) = scan_line(line) {
        return LineTag::SeekControl { seconds };
    }

    for name in speakers {
        if let Some(rest) = line.strip_prefix(name.as_str()) {
            // Token match only: "Rosita:" yes, "Rositas" no
            if rest.chars().next().map_or(true, |c| !c.is_alphanumeric()) {
                return LineTag::Speaker(name.clone());
            }
        }
    }

    LineTag::Plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{Section, SectionIndex};

    fn section(id: &str, start_time: u32) -> Section {
        Section {
            id: id.to_string(),
            title: format!("Title for {}", id),
            start_time,
            display_time: crate::timestamp::format_offset(start_time),
            image: None,
        }
    }

    fn index(starts: &[(&str, u32)]) -> SectionIndex {
        SectionIndex::new(starts.iter().map(|(id, t)| section(id, *t)).collect()).unwrap()
    }

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    fn owner_ids(lines: &[String], index: &SectionIndex) -> Vec<String> {
        let assignment = segment(lines, index);
        assignment
            .iter()
            .map(|owner| index.sections()[owner].id.clone())
            .collect()
    }

    #[test]
    fn test_basic_segmentation() {
        // Scenario: three sections, each opened by its own timestamp line
        let index = index(&[("s1", 0), ("s2", 19), ("s3", 122)]);
        let transcript = lines(&["0:00:00", "hello", "0:00:19", "world", "0:02:02", "done"]);

        assert_eq!(
            owner_ids(&transcript, &index),
            vec!["s1", "s1", "s2", "s2", "s3", "s3"]
        );

        let assignment = segment(&transcript, &index);
        let part = partition(&transcript, &assignment, &index);
        assert_eq!(part.get("s1"), Some("0:00:00\nhello"));
        assert_eq!(part.get("s2"), Some("0:00:19\nworld"));
        assert_eq!(part.get("s3"), Some("0:02:02\ndone"));
    }

    #[test]
    fn test_no_timestamps_assigns_everything_to_first_section() {
        let index = index(&[("s1", 0), ("s2", 50)]);
        let transcript = lines(&["just", "text"]);

        assert_eq!(owner_ids(&transcript, &index), vec!["s1", "s1"]);

        let assignment = segment(&transcript, &index);
        let part = partition(&transcript, &assignment, &index);
        assert_eq!(part.get("s1"), Some("just\ntext"));
        // Unreached sections stay present, with empty content
        assert_eq!(part.get("s2"), Some(""));
    }

    #[test]
    fn test_single_timestamp_jumps_multiple_boundaries() {
        let index = index(&[("s1", 0), ("s2", 10), ("s3", 20), ("s4", 30)]);
        let transcript = lines(&["0:00:35", "tail"]);

        assert_eq!(owner_ids(&transcript, &index), vec!["s4", "s4"]);
    }

    #[test]
    fn test_equal_start_times_all_crossed() {
        let index = index(&[("s1", 0), ("s2", 19), ("s3", 19)]);
        let transcript = lines(&["intro", "0:00:19", "after"]);

        assert_eq!(owner_ids(&transcript, &index), vec!["s1", "s3", "s3"]);

        let assignment = segment(&transcript, &index);
        let part = partition(&transcript, &assignment, &index);
        assert_eq!(part.get("s2"), Some(""));
    }

    #[test]
    fn test_out_of_order_timestamp_never_regresses() {
        let index = index(&[("s1", 0), ("s2", 60), ("s3", 120)]);
        let transcript = lines(&["0:02:00", "late", "0:00:30", "early mark", "0:01:00", "end"]);

        // Cursor stays at s3 even though later timestamps fall before it
        assert_eq!(
            owner_ids(&transcript, &index),
            vec!["s3", "s3", "s3", "s3", "s3", "s3"]
        );
    }

    #[test]
    fn test_malformed_timestamp_does_not_advance() {
        let index = index(&[("s1", 0), ("s2", 10)]);
        let transcript = lines(&["start", "99999999999:00:00", "0:00:10", "end"]);

        assert_eq!(owner_ids(&transcript, &index), vec!["s1", "s1", "s2", "s2"]);
    }

    #[test]
    fn test_timestamp_line_belongs_to_section_it_opens() {
        let index = index(&[("s1", 0), ("s2", 19)]);
        let transcript = lines(&["hello", "0:00:19", "world"]);

        assert_eq!(owner_ids(&transcript, &index), vec!["s1", "s2", "s2"]);
    }

    #[test]
    fn test_monotonic_and_total_coverage() {
        let index = index(&[("s1", 0), ("s2", 19), ("s3", 122), ("s4", 122), ("s5", 500)]);
        let transcript = lines(&[
            "0:00:00", "a", "not 0:00:30 a mark", "0:00:19", "b", "0:00:05", "0:02:02", "c",
        ]);

        let assignment = segment(&transcript, &index);
        assert_eq!(assignment.len(), transcript.len());

        let owners: Vec<usize> = assignment.iter().collect();
        assert!(owners.windows(2).all(|w| w[0] <= w[1]));
        assert!(owners.iter().all(|&o| o < index.len()));
    }

    #[test]
    fn test_segmentation_is_idempotent() {
        let index = index(&[("s1", 0), ("s2", 19), ("s3", 122)]);
        let transcript = lines(&["0:00:00", "hello", "0:00:19", "world"]);

        let first = segment(&transcript, &index);
        let second = segment(&transcript, &index);
        assert_eq!(first, second);
    }

    #[test]
    fn test_partition_covers_full_id_set() {
        let index = index(&[("s1", 0), ("s2", 19), ("s3", 122)]);
        let transcript = lines(&["only text"]);

        let assignment = segment(&transcript, &index);
        let part = partition(&transcript, &assignment, &index);

        let ids: Vec<&str> = part.section_ids().collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn test_partition_trims_block_edges_only() {
        let index = index(&[("s1", 0)]);
        let transcript = lines(&["", "  hello  world", ""]);

        let assignment = segment(&transcript, &index);
        let part = partition(&transcript, &assignment, &index);
        assert_eq!(part.get("s1"), Some("hello  world"));
    }

    #[test]
    fn test_annotate_marker_before_first_line() {
        let index = index(&[("s1", 0), ("s2", 19)]);
        let transcript = lines(&["hello", "0:00:19", "world"]);
        let assignment = segment(&transcript, &index);

        let items = annotate(&transcript, &assignment, &index, &[]);
        assert_eq!(
            items[0],
            AnnotatedItem::SectionStart {
                section_id: "s1".to_string()
            }
        );
        assert_eq!(
            items[2],
            AnnotatedItem::SectionStart {
                section_id: "s2".to_string()
            }
        );
        // The timestamp line follows the marker of the section it opens
        assert_eq!(
            items[3],
            AnnotatedItem::Line {
                text: "0:00:19".to_string(),
                tag: LineTag::SeekControl { seconds: 19 },
            }
        );
    }

    #[test]
    fn test_annotate_emits_markers_for_skipped_and_unreached_sections() {
        let index = index(&[("s1", 0), ("s2", 10), ("s3", 20), ("s4", 900)]);
        let transcript = lines(&["0:00:25", "tail"]);
        let assignment = segment(&transcript, &index);

        let items = annotate(&transcript, &assignment, &index, &[]);
        let markers: Vec<&str> = items
            .iter()
            .filter_map(|item| match item {
                AnnotatedItem::SectionStart { section_id } => Some(section_id.as_str()),
                _ => None,
            })
            .collect();

        // Every section appears exactly once; s4 trails at the end
        assert_eq!(markers, vec!["s1", "s2", "s3", "s4"]);
        assert_eq!(
            items.last(),
            Some(&AnnotatedItem::SectionStart {
                section_id: "s4".to_string()
            })
        );
    }

    #[test]
    fn test_annotate_tags_speakers_token_bounded() {
        let index = index(&[("s1", 0)]);
        let speakers = vec!["Rosita".to_string(), "Jaime".to_string()];
        let transcript = lines(&[
            "Rosita: we lived near the river",
            "Rositas well is not a speaker",
            "Jaime",
            "and Rosita said nothing here",
        ]);
        let assignment = segment(&transcript, &index);

        let tags: Vec<LineTag> = annotate(&transcript, &assignment, &index, &speakers)
            .into_iter()
            .filter_map(|item| match item {
                AnnotatedItem::Line { tag, .. } => Some(tag),
                _ => None,
            })
            .collect();

        assert_eq!(tags[0], LineTag::Speaker("Rosita".to_string()));
        assert_eq!(tags[1], LineTag::Plain);
        assert_eq!(tags[2], LineTag::Speaker("Jaime".to_string()));
        assert_eq!(tags[3], LineTag::Plain);
    }

    #[test]
    fn test_annotate_empty_transcript_still_lists_all_sections() {
        let index = index(&[("s1", 0), ("s2", 10)]);
        let transcript: Vec<String> = Vec::new();
        let assignment = segment(&transcript, &index);

        let items = annotate(&transcript, &assignment, &index, &[]);
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|item| matches!(item, AnnotatedItem::SectionStart { .. })));
    }
}
