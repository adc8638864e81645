//! Submission payload assembly for the intake endpoint.
//!
//! The payload is built from wizard state alone. File bodies are resolved
//! only when the payload is turned into a multipart form, through an
//! [`AttachmentSource`] supplied by whoever holds the bytes.

use std::collections::HashMap;

use reqwest::multipart::{Form, Part};
use serde::Serialize;

use super::model::{AttachedFile, DATE_FORMAT, DocumentSelection, UploadEntry};
use crate::error::SubmissionError;

pub const SELECTED_DOCUMENTS_FIELD: &str = "selectedDocuments";
pub const ADDITIONAL_NOTES_FIELD: &str = "additionalNotes";

pub fn files_field(doc_value: &str) -> String {
    format!("files_{doc_value}")
}

pub fn date_field(doc_value: &str) -> String {
    format!("date_{doc_value}")
}

/// One multipart field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        doc_value: String,
        file: AttachedFile,
    },
}

impl SubmissionPart {
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// Ordered multipart payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub parts: Vec<SubmissionPart>,
}

impl SubmissionPayload {
    /// Assemble the payload: selection list, then per-document files and
    /// date, then notes.
    pub fn assemble(
        selections: &[DocumentSelection],
        entries: &[UploadEntry],
        notes: &str,
    ) -> Result<Self, SubmissionError> {
        let mut parts = vec![SubmissionPart::Text {
            name: SELECTED_DOCUMENTS_FIELD.to_string(),
            value: serde_json::to_string(selections)?,
        }];

        for selection in selections {
            let Some(entry) = entries.iter().find(|e| e.doc_value == selection.value) else {
                continue;
            };
            for file in &entry.files {
                parts.push(SubmissionPart::File {
                    name: files_field(&entry.doc_value),
                    doc_value: entry.doc_value.clone(),
                    file: file.clone(),
                });
            }
            if let Some(date) = entry.received_date {
                parts.push(SubmissionPart::Text {
                    name: date_field(&entry.doc_value),
                    value: date.format(DATE_FORMAT).to_string(),
                });
            }
        }

        if !notes.is_empty() {
            parts.push(SubmissionPart::Text {
                name: ADDITIONAL_NOTES_FIELD.to_string(),
                value: notes.to_string(),
            });
        }

        Ok(Self { parts })
    }

    /// First text value for a field name.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            SubmissionPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Files attached under a field name, in order.
    pub fn files(&self, name: &str) -> Vec<&AttachedFile> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                SubmissionPart::File { name: n, file, .. } if n == name => Some(file),
                _ => None,
            })
            .collect()
    }

    /// Build the multipart form, pulling file bodies from `source`.
    pub fn into_form(self, source: &dyn AttachmentSource) -> Result<Form, SubmissionError> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                SubmissionPart::Text { name, value } => form.text(name, value),
                SubmissionPart::File {
                    name,
                    doc_value,
                    file,
                } => {
                    let bytes = source.contents(&doc_value, &file).ok_or_else(|| {
                        SubmissionError::MissingContent {
                            doc_value: doc_value.clone(),
                            file_name: file.name.clone(),
                        }
                    })?;
                    let body = Part::bytes(bytes)
                        .file_name(file.name.clone())
                        .mime_str(mime_for(&file.name))
                        .map_err(|e| SubmissionError::ContentType {
                            file_name: file.name.clone(),
                            reason: e.to_string(),
                        })?;
                    form.part(name, body)
                }
            };
        }
        Ok(form)
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Supplies file bodies for attached file metadata.
pub trait AttachmentSource {
    fn contents(&self, doc_value: &str, file: &AttachedFile) -> Option<Vec<u8>>;
}

/// Bodies keyed by `(doc_value, file name)`.
impl AttachmentSource for HashMap<(String, String), Vec<u8>> {
    fn contents(&self, doc_value: &str, file: &AttachedFile) -> Option<Vec<u8>> {
        self.get(&(doc_value.to_string(), file.name.clone())).cloned()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn selection(value: &str, title: &str) -> DocumentSelection {
        DocumentSelection {
            value: value.to_string(),
            title: title.to_string(),
        }
    }

    fn sample() -> (Vec<DocumentSelection>, Vec<UploadEntry>) {
        let selections = vec![
            selection("eviction_notice", "Eviction Notice"),
            selection("lease_agreement", "Lease Agreement"),
        ];
        let mut notice = UploadEntry::new(&selections[0]);
        notice.files.push(AttachedFile::new("notice-front.jpg", 1000));
        notice.files.push(AttachedFile::new("notice-back.jpg", 2000));
        notice.received_date = NaiveDate::from_ymd_opt(2024, 5, 2);
        let lease = UploadEntry::new(&selections[1]);
        (selections, vec![notice, lease])
    }

    #[test]
    fn assembles_fields_in_order() {
        let (selections, entries) = sample();
        let payload = SubmissionPayload::assemble(&selections, &entries, "Hearing next week").unwrap();

        let names: Vec<_> = payload.parts.iter().map(SubmissionPart::name).collect();
        assert_eq!(
            names,
            vec![
                "selectedDocuments",
                "files_eviction_notice",
                "files_eviction_notice",
                "date_eviction_notice",
                "additionalNotes",
            ]
        );
        assert_eq!(payload.text("date_eviction_notice"), Some("2024-05-02"));
        assert_eq!(payload.text("additionalNotes"), Some("Hearing next week"));
        assert_eq!(payload.files("files_eviction_notice").len(), 2);
        assert!(payload.files("files_lease_agreement").is_empty());
    }

    #[test]
    fn selected_documents_is_json() {
        let (selections, entries) = sample();
        let payload = SubmissionPayload::assemble(&selections, &entries, "").unwrap();

        let raw = payload.text(SELECTED_DOCUMENTS_FIELD).unwrap();
        let parsed: Vec<DocumentSelection> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, selections);
    }

    #[test]
    fn empty_notes_are_omitted() {
        let (selections, entries) = sample();
        let payload = SubmissionPayload::assemble(&selections, &entries, "").unwrap();
        assert!(payload.text(ADDITIONAL_NOTES_FIELD).is_none());
    }

    #[test]
    fn form_requires_every_file_body() {
        let (selections, entries) = sample();
        let payload = SubmissionPayload::assemble(&selections, &entries, "").unwrap();

        let mut bodies: HashMap<(String, String), Vec<u8>> = HashMap::new();
        bodies.insert(
            ("eviction_notice".to_string(), "notice-front.jpg".to_string()),
            vec![0xFF, 0xD8],
        );

        let err = payload.clone().into_form(&bodies).unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::MissingContent { ref file_name, .. } if file_name == "notice-back.jpg"
        ));

        bodies.insert(
            ("eviction_notice".to_string(), "notice-back.jpg".to_string()),
            vec![0xFF, 0xD8],
        );
        assert!(payload.into_form(&bodies).is_ok());
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for("Lease.PDF"), "application/pdf");
        assert_eq!(mime_for("photo.jpeg"), "image/jpeg");
        assert_eq!(mime_for("README"), "application/octet-stream");
    }
}
