//! WizardController — owns the onboarding wizard's state and applies every
//! user action to it.
//!
//! One controller per session. All state (step, checkbox form, selections,
//! upload entries) lives here; views are derived from it, and the persisted
//! snapshot is rewritten whole after each mutating action.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::model::{
    settings_keys, AttachedFile, DocumentForm, DocumentOption, DocumentSelection, UploadEntry,
    WizardSnapshot, DATE_FORMAT,
};
use super::state::{StepIndicator, StepProgress, StepRules, FIRST_STEP, SELECTION_STEP};
use super::submission::SubmissionPayload;
use super::upload::{render_upload_section, UploadSection};
use crate::config::WizardConfig;
use crate::error::{DatabaseError, Result, ValidationError, WizardError};
use crate::store::SnapshotStore;

/// Outcome of a step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: u32,
    pub to: u32,
    /// The view should return to the top of the page.
    pub scroll_to_top: bool,
}

/// Where the user goes once onboarding is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handoff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// Full view of the wizard for adapters.
#[derive(Debug, Clone, Serialize)]
pub struct WizardStatus {
    pub current_step: u32,
    pub step_count: u32,
    pub progress: Vec<StepIndicator>,
    pub documents: Vec<DocumentOption>,
    pub selected_documents: Vec<DocumentSelection>,
    pub upload_section: UploadSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

pub struct WizardController {
    config: WizardConfig,
    rules: StepRules,
    store: Arc<dyn SnapshotStore>,
    form: DocumentForm,
    current_step: u32,
    progress: StepProgress,
    selected: Vec<DocumentSelection>,
    uploads: Vec<UploadEntry>,
}

impl WizardController {
    /// Controller at step 1 with nothing selected. Call [`rehydrate`] to resume.
    ///
    /// [`rehydrate`]: Self::rehydrate
    pub fn new(
        config: WizardConfig,
        form: DocumentForm,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<Self> {
        config.validate()?;
        let progress = StepProgress::new(config.step_count);
        let mut controller = Self {
            config,
            rules: StepRules::default(),
            store,
            form,
            current_step: FIRST_STEP,
            progress,
            selected: Vec::new(),
            uploads: Vec::new(),
        };
        controller.reset_view();
        Ok(controller)
    }

    /// Replace the per-step validation rules.
    pub fn with_rules(mut self, rules: StepRules) -> Self {
        self.rules = rules;
        self
    }

    // ── Read side ───────────────────────────────────────────────────

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    pub fn step_count(&self) -> u32 {
        self.progress.step_count()
    }

    pub fn progress(&self) -> &StepProgress {
        &self.progress
    }

    pub fn form(&self) -> &DocumentForm {
        &self.form
    }

    pub fn selected_documents(&self) -> &[DocumentSelection] {
        &self.selected
    }

    pub fn upload_entries(&self) -> &[UploadEntry] {
        &self.uploads
    }

    pub fn upload_entry(&self, doc_value: &str) -> Option<&UploadEntry> {
        self.uploads.iter().find(|e| e.doc_value == doc_value)
    }

    /// The upload step as currently rendered.
    pub fn upload_section(&self) -> UploadSection {
        render_upload_section(&self.uploads)
    }

    pub fn status(&self) -> WizardStatus {
        WizardStatus {
            current_step: self.current_step,
            step_count: self.step_count(),
            progress: self.progress.indicators().to_vec(),
            documents: self.form.options.clone(),
            selected_documents: self.selected.clone(),
            upload_section: self.upload_section(),
            additional_notes: self.form.notes.clone(),
        }
    }

    // ── Form input ──────────────────────────────────────────────────

    /// Check or uncheck a document type. Past the selection step the upload
    /// entries follow the new selection at once.
    pub async fn toggle_document(
        &mut self,
        doc_value: &str,
        checked: bool,
    ) -> std::result::Result<(), WizardError> {
        let option = self
            .form
            .option_mut(doc_value)
            .ok_or_else(|| WizardError::UnknownDocument {
                value: doc_value.to_string(),
            })?;
        option.checked = checked;
        self.selected = self.form.selections();
        if self.current_step > SELECTION_STEP {
            self.regenerate_uploads();
        } else {
            let selected = &self.selected;
            self.uploads
                .retain(|e| selected.iter().any(|s| s.value == e.doc_value));
        }
        debug!(doc = doc_value, checked, selected = self.selected.len(), "Document checkbox changed");
        self.autosave().await;
        Ok(())
    }

    /// Update the additional-notes field. Ignored when the form has none.
    pub async fn set_notes(&mut self, notes: &str) {
        match self.form.notes.as_mut() {
            Some(field) => {
                *field = notes.to_string();
                self.autosave().await;
            }
            None => debug!("Form has no notes field, ignoring notes"),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Run the rule registered for `step`, if any.
    pub fn validate(&self, step: u32) -> std::result::Result<(), ValidationError> {
        self.rules.validate(step, &self.form)
    }

    /// Leave the current step for `target` after validating the current step.
    ///
    /// Any existing step is a valid target. Leaving the selection step
    /// rebuilds the upload entries from the checked boxes.
    pub async fn advance(&mut self, target: u32) -> std::result::Result<Transition, WizardError> {
        self.ensure_step(target)?;
        if let Err(e) = self.validate(self.current_step) {
            info!(step = self.current_step, target, error = %e, "Step validation failed");
            return Err(e.into());
        }

        if self.current_step == SELECTION_STEP {
            self.selected = self.form.selections();
            self.regenerate_uploads();
        }

        let transition = self.move_to(target, true);
        self.autosave().await;
        Ok(transition)
    }

    /// Go to `target` without validation.
    pub async fn retreat(&mut self, target: u32) -> std::result::Result<Transition, WizardError> {
        self.ensure_step(target)?;
        let transition = self.move_to(target, false);
        self.autosave().await;
        Ok(transition)
    }

    /// Forward targets advance, everything else retreats.
    pub async fn go_to(&mut self, target: u32) -> std::result::Result<Transition, WizardError> {
        if target > self.current_step {
            self.advance(target).await
        } else {
            self.retreat(target).await
        }
    }

    fn ensure_step(&self, step: u32) -> std::result::Result<(), WizardError> {
        if self.progress.contains(step) {
            Ok(())
        } else {
            Err(WizardError::UnknownStep {
                step,
                step_count: self.step_count(),
            })
        }
    }

    fn move_to(&mut self, target: u32, mark_completed: bool) -> Transition {
        let from = self.current_step;
        self.progress.move_active(from, target, mark_completed);
        self.current_step = target;
        info!(from, to = target, "Wizard step changed");
        Transition {
            from,
            to: target,
            scroll_to_top: true,
        }
    }

    /// Rebuild upload entries for the current selections. Entries for
    /// documents still selected are kept; the rest are dropped.
    fn regenerate_uploads(&mut self) {
        let mut previous = std::mem::take(&mut self.uploads);
        self.uploads = self
            .selected
            .iter()
            .map(|selection| {
                match previous.iter().position(|e| e.doc_value == selection.value) {
                    Some(idx) => previous.swap_remove(idx),
                    None => UploadEntry::new(selection),
                }
            })
            .collect();

        if !previous.is_empty() {
            let dropped: Vec<&str> = previous.iter().map(|e| e.doc_value.as_str()).collect();
            debug!(?dropped, "Dropped upload entries for deselected documents");
        }
    }

    // ── Upload step ─────────────────────────────────────────────────

    fn entry_mut(&mut self, doc_value: &str) -> std::result::Result<&mut UploadEntry, WizardError> {
        if self.form.option(doc_value).is_none() {
            return Err(WizardError::UnknownDocument {
                value: doc_value.to_string(),
            });
        }
        self.uploads
            .iter_mut()
            .find(|e| e.doc_value == doc_value)
            .ok_or_else(|| WizardError::NotInUploadSection {
                value: doc_value.to_string(),
            })
    }

    /// Record the files picked for a document. An empty pick keeps the
    /// current list. Type and size are not checked here.
    pub async fn attach_files(
        &mut self,
        doc_value: &str,
        files: Vec<AttachedFile>,
    ) -> std::result::Result<(), WizardError> {
        let entry = self.entry_mut(doc_value)?;
        if !files.is_empty() {
            entry.files = files;
        }
        debug!(doc = doc_value, files = entry.files.len(), "Files attached");
        self.autosave().await;
        Ok(())
    }

    /// Set or clear (`None` / empty) the date a document was received.
    pub async fn set_received_date(
        &mut self,
        doc_value: &str,
        date: Option<&str>,
    ) -> std::result::Result<(), WizardError> {
        let parsed = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                WizardError::InvalidDate {
                    value: doc_value.to_string(),
                    date: raw.to_string(),
                }
            })?),
            None => None,
        };
        let entry = self.entry_mut(doc_value)?;
        entry.received_date = parsed;
        self.autosave().await;
        Ok(())
    }

    /// Mark a document as skipped. Its attached files stay recorded.
    pub async fn skip_document(&mut self, doc_value: &str) -> std::result::Result<(), WizardError> {
        let entry = self.entry_mut(doc_value)?;
        entry.skipped = true;
        debug!(doc = doc_value, kept_files = entry.files.len(), "Document skipped");
        self.autosave().await;
        Ok(())
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// The snapshot `persist` would write.
    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            current_step: self.current_step,
            selected_documents: self.selected.clone(),
            checkbox_states: self.form.checkbox_states(),
            dates: self
                .uploads
                .iter()
                .filter_map(|e| {
                    e.received_date
                        .map(|d| (e.doc_value.clone(), d.format(DATE_FORMAT).to_string()))
                })
                .collect(),
            additional_notes: self.form.notes_text().to_string(),
        }
    }

    /// Overwrite the stored snapshot with the current state.
    pub async fn persist(&self) -> Result<()> {
        let value = serde_json::to_value(self.snapshot())
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        self.store
            .set_setting(
                &self.config.storage_scope,
                settings_keys::ONBOARDING_PROGRESS,
                &value,
            )
            .await?;
        debug!(step = self.current_step, "Onboarding progress saved");
        Ok(())
    }

    async fn autosave(&self) {
        if let Err(e) = self.persist().await {
            warn!("Failed to persist onboarding progress: {}", e);
        }
    }

    /// Restore state from the stored snapshot. Returns whether one was applied.
    ///
    /// Checkbox state is authoritative: selections are re-derived from it,
    /// not copied from the stored list. An unreadable snapshot is deleted
    /// and the wizard starts fresh.
    pub async fn rehydrate(&mut self) -> Result<bool> {
        let scope = self.config.storage_scope.clone();
        let Some(raw) = self
            .store
            .get_setting(&scope, settings_keys::ONBOARDING_PROGRESS)
            .await?
        else {
            debug!(scope = %scope, "No saved onboarding progress");
            self.reset_view();
            return Ok(false);
        };

        self.reset_view();
        match serde_json::from_value::<WizardSnapshot>(raw) {
            Ok(snapshot) => {
                self.apply_snapshot(snapshot);
                Ok(true)
            }
            Err(e) => {
                warn!(scope = %scope, "Error loading onboarding progress: {}", e);
                if let Err(e) = self
                    .store
                    .delete_setting(&scope, settings_keys::ONBOARDING_PROGRESS)
                    .await
                {
                    warn!("Failed to discard unreadable onboarding progress: {}", e);
                }
                Ok(false)
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: WizardSnapshot) {
        for (value, checked) in &snapshot.checkbox_states {
            match self.form.option_mut(value) {
                Some(option) => option.checked = *checked,
                None => debug!(doc = %value, "Saved checkbox has no matching option"),
            }
        }

        if !snapshot.additional_notes.is_empty() {
            if let Some(field) = self.form.notes.as_mut() {
                *field = snapshot.additional_notes.clone();
            }
        }

        self.selected = self.form.selections();
        if snapshot.selected_documents != self.selected {
            debug!("Saved selection list differs from checkbox state, using checkbox state");
        }

        let step = if self.progress.contains(snapshot.current_step) {
            snapshot.current_step
        } else {
            warn!(step = snapshot.current_step, "Saved step does not exist, starting over");
            FIRST_STEP
        };
        self.current_step = step;
        self.progress = StepProgress::resumed_at(self.config.step_count, step);

        if step > SELECTION_STEP {
            self.regenerate_uploads();
            for entry in &mut self.uploads {
                let Some(raw) = snapshot.dates.get(&entry.doc_value) else {
                    continue;
                };
                if raw.is_empty() {
                    continue;
                }
                match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                    Ok(date) => entry.received_date = Some(date),
                    Err(e) => warn!(doc = %entry.doc_value, "Ignoring saved date {:?}: {}", raw, e),
                }
            }
        }

        info!(
            step,
            selected = self.selected.len(),
            "Onboarding progress restored"
        );
    }

    fn reset_view(&mut self) {
        self.form.reset();
        self.current_step = FIRST_STEP;
        self.progress = StepProgress::new(self.config.step_count);
        self.selected.clear();
        self.uploads.clear();
    }

    async fn discard_snapshot(&self) -> Result<()> {
        self.store
            .delete_setting(
                &self.config.storage_scope,
                settings_keys::ONBOARDING_PROGRESS,
            )
            .await?;
        Ok(())
    }

    /// Delete saved progress and restart at step 1.
    pub async fn clear_progress(&mut self) -> Result<()> {
        self.discard_snapshot().await?;
        self.reset_view();
        info!("Onboarding progress cleared");
        Ok(())
    }

    /// Finish: delete saved progress, reset, and hand off to the dashboard.
    pub async fn complete_onboarding(&mut self) -> Result<Handoff> {
        self.discard_snapshot().await?;
        self.reset_view();
        info!(destination = ?self.config.dashboard_url, "Onboarding complete");
        Ok(Handoff {
            destination: self.config.dashboard_url.clone(),
        })
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Assemble the intake payload. Sending it is up to the caller.
    pub fn build_submission(&self) -> Result<SubmissionPayload> {
        let payload =
            SubmissionPayload::assemble(&self.selected, &self.uploads, self.form.notes_text())?;
        Ok(payload)
    }
}
