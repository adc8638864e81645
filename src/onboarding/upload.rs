//! Upload section rendering and file size formatting.

use serde::Serialize;

use super::model::{DocumentSelection, UploadEntry};

/// Extensions the file picker offers. Not enforced on attach.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png", ".doc", ".docx"];

pub const DATE_LABEL: &str = "When did you receive this? (Optional)";
pub const SKIP_LABEL: &str = "Skip - I don't have this document";
pub const SKIPPED_MESSAGE: &str = "Skipped - We'll obtain this document through other means";
pub const EMPTY_SELECTION_MESSAGE: &str = "No documents selected. You can go back and select documents, or continue to complete your onboarding.";

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size: 1024-based buckets, two decimals, trailing zeros trimmed.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    // Exact powers of 1024 belong to the larger unit.
    let mut bucket = 0;
    while bucket + 1 < SIZE_UNITS.len() && bytes >= 1u64 << (10 * (bucket + 1)) {
        bucket += 1;
    }
    let scaled = (bytes as f64 / (1u64 << (10 * bucket)) as f64 * 100.0).round() / 100.0;
    format!("{} {}", trim_number(scaled), SIZE_UNITS[bucket])
}

fn trim_number(n: f64) -> String {
    let fixed = format!("{n:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// What an upload item shows in place of the file picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadAffordance {
    FilePicker {
        input_id: String,
        accept: String,
        multiple: bool,
    },
    Skipped {
        message: String,
    },
}

/// One document's block in the upload section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadItemView {
    pub doc_value: String,
    pub title: String,
    pub affordance: UploadAffordance,
    pub date_input_id: String,
    pub date_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_value: Option<String>,
    pub skip_label: String,
    /// `name (size)` lines for the attached files.
    pub file_listing: Vec<String>,
    /// Rendered at reduced opacity.
    pub dimmed: bool,
}

/// The upload step's body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadSection {
    Placeholder { message: String },
    Items { items: Vec<UploadItemView> },
}

impl UploadSection {
    pub fn items(&self) -> &[UploadItemView] {
        match self {
            Self::Placeholder { .. } => &[],
            Self::Items { items } => items,
        }
    }
}

/// Fresh upload section for a selection set. Same input, same output.
pub fn generate_upload_section(selections: &[DocumentSelection]) -> UploadSection {
    let entries: Vec<UploadEntry> = selections.iter().map(UploadEntry::new).collect();
    render_upload_section(&entries)
}

/// Render the upload section from the current entries.
pub fn render_upload_section(entries: &[UploadEntry]) -> UploadSection {
    if entries.is_empty() {
        return UploadSection::Placeholder {
            message: EMPTY_SELECTION_MESSAGE.to_string(),
        };
    }
    UploadSection::Items {
        items: entries.iter().map(render_item).collect(),
    }
}

fn render_item(entry: &UploadEntry) -> UploadItemView {
    let affordance = if entry.skipped {
        UploadAffordance::Skipped {
            message: SKIPPED_MESSAGE.to_string(),
        }
    } else {
        UploadAffordance::FilePicker {
            input_id: format!("file-{}", entry.doc_value),
            accept: ACCEPTED_EXTENSIONS.join(","),
            multiple: true,
        }
    };

    UploadItemView {
        doc_value: entry.doc_value.clone(),
        title: entry.title.clone(),
        affordance,
        date_input_id: format!("date-{}", entry.doc_value),
        date_label: DATE_LABEL.to_string(),
        date_value: entry
            .received_date
            .map(|d| d.format(super::model::DATE_FORMAT).to_string()),
        skip_label: SKIP_LABEL.to_string(),
        file_listing: entry
            .files
            .iter()
            .map(|f| format!("{} ({})", f.name, format_file_size(f.size_bytes)))
            .collect(),
        dimmed: entry.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::AttachedFile;

    fn selection(value: &str, title: &str) -> DocumentSelection {
        DocumentSelection {
            value: value.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn file_size_formatting() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1048576), "1 MB");
        assert_eq!(format_file_size(1_500_000), "1.43 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1 GB");
    }

    #[test]
    fn file_size_caps_at_gigabytes() {
        assert_eq!(format_file_size(2 * 1024 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn empty_selection_renders_placeholder() {
        let section = generate_upload_section(&[]);
        assert_eq!(
            section,
            UploadSection::Placeholder {
                message: EMPTY_SELECTION_MESSAGE.to_string()
            }
        );
        assert!(section.items().is_empty());
    }

    #[test]
    fn generation_is_idempotent() {
        let selections = vec![
            selection("lease_agreement", "Lease Agreement"),
            selection("eviction_notice", "Eviction Notice"),
        ];
        let first = generate_upload_section(&selections);
        let second = generate_upload_section(&selections);
        assert_eq!(first, second);
        assert_eq!(first.items().len(), 2);
    }

    #[test]
    fn item_offers_picker_date_and_skip() {
        let section = generate_upload_section(&[selection("lease_agreement", "Lease Agreement")]);
        let item = &section.items()[0];

        assert_eq!(item.title, "Lease Agreement");
        assert_eq!(item.date_input_id, "date-lease_agreement");
        assert_eq!(item.date_label, DATE_LABEL);
        assert_eq!(item.skip_label, SKIP_LABEL);
        assert!(!item.dimmed);
        match &item.affordance {
            UploadAffordance::FilePicker {
                input_id,
                accept,
                multiple,
            } => {
                assert_eq!(input_id, "file-lease_agreement");
                assert_eq!(accept, ".pdf,.jpg,.jpeg,.png,.doc,.docx");
                assert!(*multiple);
            }
            other => panic!("expected file picker, got {other:?}"),
        }
    }

    #[test]
    fn skipped_entry_hides_picker_but_lists_files() {
        let mut entry = UploadEntry::new(&selection("lease_agreement", "Lease Agreement"));
        entry.files.push(AttachedFile::new("lease.pdf", 1536));
        entry.skipped = true;

        let section = render_upload_section(&[entry]);
        let item = &section.items()[0];
        assert!(item.dimmed);
        assert_eq!(
            item.affordance,
            UploadAffordance::Skipped {
                message: SKIPPED_MESSAGE.to_string()
            }
        );
        assert_eq!(item.file_listing, vec!["lease.pdf (1.5 KB)"]);
    }
}
