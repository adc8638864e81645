//! Document selection, upload and snapshot data models.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format produced by a native date input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A document type the user claims to have (or not), as rendered on the
/// selection step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentOption {
    pub value: String,
    pub title: String,
    pub checked: bool,
}

impl DocumentOption {
    pub fn new(value: &str, title: &str) -> Self {
        Self {
            value: value.to_string(),
            title: title.to_string(),
            checked: false,
        }
    }

    /// The selection record for this option.
    pub fn selection(&self) -> DocumentSelection {
        DocumentSelection {
            value: self.value.clone(),
            title: self.title.clone(),
        }
    }
}

/// A checked document type. Only `value` and `title` are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSelection {
    pub value: String,
    pub title: String,
}

/// The tenant document types offered when no catalogue is supplied.
pub fn default_document_options() -> Vec<DocumentOption> {
    [
        ("eviction_notice", "Eviction Notice"),
        ("lease_agreement", "Lease Agreement"),
        ("court_summons", "Court Summons / Complaint"),
        ("rent_receipts", "Rent Receipts"),
        ("landlord_correspondence", "Landlord Correspondence"),
        ("repair_requests", "Repair Requests"),
        ("photos_evidence", "Photos / Evidence"),
        ("not_sure", "Not Sure / Don't Remember"),
    ]
    .into_iter()
    .map(|(value, title)| DocumentOption::new(value, title))
    .collect()
}

/// The form inputs the wizard reads from: document checkboxes and the
/// optional notes field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentForm {
    pub options: Vec<DocumentOption>,
    /// `None` when the page has no notes field.
    pub notes: Option<String>,
}

impl Default for DocumentForm {
    fn default() -> Self {
        Self::new(default_document_options())
    }
}

impl DocumentForm {
    /// Form with the given options and an empty notes field.
    pub fn new(options: Vec<DocumentOption>) -> Self {
        Self {
            options,
            notes: Some(String::new()),
        }
    }

    /// Form with no notes field.
    pub fn without_notes(options: Vec<DocumentOption>) -> Self {
        Self {
            options,
            notes: None,
        }
    }

    pub fn option(&self, value: &str) -> Option<&DocumentOption> {
        self.options.iter().find(|o| o.value == value)
    }

    pub fn option_mut(&mut self, value: &str) -> Option<&mut DocumentOption> {
        self.options.iter_mut().find(|o| o.value == value)
    }

    pub fn checked_count(&self) -> usize {
        self.options.iter().filter(|o| o.checked).count()
    }

    /// Selections in option order, read from checkbox state.
    pub fn selections(&self) -> Vec<DocumentSelection> {
        self.options
            .iter()
            .filter(|o| o.checked)
            .map(DocumentOption::selection)
            .collect()
    }

    /// Checkbox state keyed by option value.
    pub fn checkbox_states(&self) -> BTreeMap<String, bool> {
        self.options
            .iter()
            .map(|o| (o.value.clone(), o.checked))
            .collect()
    }

    /// Notes text, empty when the field is missing.
    pub fn notes_text(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }

    /// Uncheck everything and empty the notes field.
    pub fn reset(&mut self) {
        for option in &mut self.options {
            option.checked = false;
        }
        if let Some(notes) = self.notes.as_mut() {
            notes.clear();
        }
    }
}

/// Metadata for a file picked for upload. Binary content stays with the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachedFile {
    pub name: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

impl AttachedFile {
    pub fn new(name: &str, size_bytes: u64) -> Self {
        Self {
            name: name.to_string(),
            size_bytes,
        }
    }
}

/// Per-document record of the upload step.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadEntry {
    pub doc_value: String,
    pub title: String,
    pub files: Vec<AttachedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    /// Hides the file picker. Attached files are kept.
    pub skipped: bool,
}

impl UploadEntry {
    pub fn new(selection: &DocumentSelection) -> Self {
        Self {
            doc_value: selection.value.clone(),
            title: selection.title.clone(),
            files: Vec::new(),
            received_date: None,
            skipped: false,
        }
    }
}

/// Persisted wizard state. Always written whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardSnapshot {
    pub current_step: u32,
    pub selected_documents: Vec<DocumentSelection>,
    pub checkbox_states: BTreeMap<String, bool>,
    pub dates: BTreeMap<String, String>,
    pub additional_notes: String,
}

impl Default for WizardSnapshot {
    fn default() -> Self {
        Self {
            current_step: 1,
            selected_documents: Vec::new(),
            checkbox_states: BTreeMap::new(),
            dates: BTreeMap::new(),
            additional_notes: String::new(),
        }
    }
}

/// Settings keys used for snapshot persistence.
pub mod settings_keys {
    /// Key for the WizardSnapshot JSON blob.
    pub const ONBOARDING_PROGRESS: &str = "tenantOnboardingProgress";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_includes_not_sure() {
        let options = default_document_options();
        assert_eq!(options.len(), 8);
        assert!(options.iter().all(|o| !o.checked));
        assert!(options.iter().any(|o| o.value == "not_sure"));
    }

    #[test]
    fn selections_follow_option_order() {
        let mut form = DocumentForm::default();
        form.option_mut("rent_receipts").unwrap().checked = true;
        form.option_mut("eviction_notice").unwrap().checked = true;

        let values: Vec<_> = form.selections().into_iter().map(|s| s.value).collect();
        assert_eq!(values, vec!["eviction_notice", "rent_receipts"]);
        assert_eq!(form.checked_count(), 2);
    }

    #[test]
    fn checkbox_states_cover_every_option() {
        let mut form = DocumentForm::default();
        form.option_mut("lease_agreement").unwrap().checked = true;

        let states = form.checkbox_states();
        assert_eq!(states.len(), 8);
        assert_eq!(states["lease_agreement"], true);
        assert_eq!(states["eviction_notice"], false);
    }

    #[test]
    fn reset_clears_checks_and_notes() {
        let mut form = DocumentForm::default();
        form.option_mut("lease_agreement").unwrap().checked = true;
        form.notes = Some("landlord changed locks".to_string());

        form.reset();
        assert_eq!(form.checked_count(), 0);
        assert_eq!(form.notes.as_deref(), Some(""));
    }

    #[test]
    fn missing_notes_field_reads_as_empty() {
        let form = DocumentForm::without_notes(default_document_options());
        assert_eq!(form.notes_text(), "");
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let mut snapshot = WizardSnapshot {
            current_step: 3,
            additional_notes: "call after 5pm".to_string(),
            ..Default::default()
        };
        snapshot
            .checkbox_states
            .insert("lease_agreement".to_string(), true);
        snapshot
            .dates
            .insert("lease_agreement".to_string(), "2024-03-01".to_string());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["currentStep"], 3);
        assert_eq!(json["checkboxStates"]["lease_agreement"], true);
        assert_eq!(json["dates"]["lease_agreement"], "2024-03-01");
        assert_eq!(json["additionalNotes"], "call after 5pm");
        assert!(json["selectedDocuments"].as_array().unwrap().is_empty());
    }

    #[test]
    fn snapshot_missing_keys_default() {
        let parsed: WizardSnapshot = serde_json::from_str(r#"{"currentStep": 2}"#).unwrap();
        assert_eq!(parsed.current_step, 2);
        assert!(parsed.checkbox_states.is_empty());
        assert!(parsed.dates.is_empty());
        assert!(parsed.additional_notes.is_empty());
    }

    #[test]
    fn snapshot_without_step_starts_at_first() {
        let parsed: WizardSnapshot = serde_json::from_str(
            r#"{"checkboxStates": {"lease_agreement": true}, "additionalNotes": "keep me"}"#,
        )
        .unwrap();
        assert_eq!(parsed.current_step, 1);
        assert_eq!(parsed.checkbox_states["lease_agreement"], true);
        assert_eq!(parsed.additional_notes, "keep me");
    }

    #[test]
    fn attached_file_wire_name_is_size() {
        let file: AttachedFile =
            serde_json::from_str(r#"{"name": "lease.pdf", "size": 2048}"#).unwrap();
        assert_eq!(file, AttachedFile::new("lease.pdf", 2048));
    }
}
