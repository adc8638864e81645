//! Step numbering, progress indicators and per-step validation rules.

use std::collections::BTreeMap;

use serde::Serialize;

use super::model::DocumentForm;
use crate::error::ValidationError;

/// First step; the wizard starts and restarts here.
pub const FIRST_STEP: u32 = 1;
/// Step where the user ticks the document types they have.
pub const SELECTION_STEP: u32 = 2;
/// Step holding the generated upload section.
pub const UPLOAD_STEP: u32 = 3;
/// Smallest layout that still contains the selection and upload steps.
pub const MIN_STEP_COUNT: u32 = UPLOAD_STEP;

/// Progress bar marker for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepIndicator {
    pub step: u32,
    pub active: bool,
    pub completed: bool,
}

/// The progress bar: one indicator per step panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    indicators: Vec<StepIndicator>,
}

impl StepProgress {
    /// Fresh progress bar with the first step active.
    pub fn new(step_count: u32) -> Self {
        let indicators = (1..=step_count)
            .map(|step| StepIndicator {
                step,
                active: step == FIRST_STEP,
                completed: false,
            })
            .collect();
        Self { indicators }
    }

    /// Progress bar for a session resumed at `current`: earlier steps completed.
    pub fn resumed_at(step_count: u32, current: u32) -> Self {
        let indicators = (1..=step_count)
            .map(|step| StepIndicator {
                step,
                active: step == current,
                completed: step < current,
            })
            .collect();
        Self { indicators }
    }

    pub fn step_count(&self) -> u32 {
        self.indicators.len() as u32
    }

    pub fn contains(&self, step: u32) -> bool {
        (FIRST_STEP..=self.step_count()).contains(&step)
    }

    pub fn indicator(&self, step: u32) -> Option<&StepIndicator> {
        self.indicators.iter().find(|i| i.step == step)
    }

    pub fn indicators(&self) -> &[StepIndicator] {
        &self.indicators
    }

    /// Move the active mark from `from` to `to`. `mark_completed` also flags
    /// the departing step as done.
    pub fn move_active(&mut self, from: u32, to: u32, mark_completed: bool) {
        for indicator in &mut self.indicators {
            if indicator.step == from {
                indicator.active = false;
                if mark_completed {
                    indicator.completed = true;
                }
            }
        }
        for indicator in &mut self.indicators {
            if indicator.step == to {
                indicator.active = true;
            }
        }
    }
}

/// A validation predicate over the form inputs.
pub type StepRule = fn(&DocumentForm) -> Result<(), ValidationError>;

/// At least one document type is checked. "Not sure" counts.
pub fn at_least_one_document(form: &DocumentForm) -> Result<(), ValidationError> {
    if form.checked_count() == 0 {
        return Err(ValidationError::NoDocumentSelected);
    }
    Ok(())
}

/// Validation rules keyed by the step being left. Steps without a rule pass.
#[derive(Debug, Clone)]
pub struct StepRules {
    rules: BTreeMap<u32, StepRule>,
}

impl Default for StepRules {
    fn default() -> Self {
        Self::empty().with_rule(SELECTION_STEP, at_least_one_document)
    }
}

impl StepRules {
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Register (or replace) the rule for `step`.
    pub fn with_rule(mut self, step: u32, rule: StepRule) -> Self {
        self.rules.insert(step, rule);
        self
    }

    pub fn validate(&self, step: u32, form: &DocumentForm) -> Result<(), ValidationError> {
        match self.rules.get(&step) {
            Some(rule) => rule(form),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_progress_starts_at_first_step() {
        let progress = StepProgress::new(4);
        assert_eq!(progress.step_count(), 4);
        assert!(progress.indicator(1).unwrap().active);
        assert!(progress.indicators().iter().all(|i| !i.completed));
        assert_eq!(progress.indicators().iter().filter(|i| i.active).count(), 1);
    }

    #[test]
    fn contains_only_existing_steps() {
        let progress = StepProgress::new(4);
        assert!(!progress.contains(0));
        assert!(progress.contains(1));
        assert!(progress.contains(4));
        assert!(!progress.contains(5));
    }

    #[test]
    fn move_active_with_completion() {
        let mut progress = StepProgress::new(4);
        progress.move_active(1, 2, true);

        let first = progress.indicator(1).unwrap();
        assert!(!first.active);
        assert!(first.completed);
        assert!(progress.indicator(2).unwrap().active);
    }

    #[test]
    fn move_active_without_completion() {
        let mut progress = StepProgress::new(4);
        progress.move_active(1, 3, true);
        progress.move_active(3, 2, false);

        let third = progress.indicator(3).unwrap();
        assert!(!third.active);
        assert!(!third.completed);
        assert!(progress.indicator(2).unwrap().active);
        // Completion marks are never cleared by going back.
        assert!(progress.indicator(1).unwrap().completed);
    }

    #[test]
    fn resumed_progress_marks_earlier_steps() {
        let progress = StepProgress::resumed_at(4, 3);
        assert!(progress.indicator(1).unwrap().completed);
        assert!(progress.indicator(2).unwrap().completed);
        assert!(progress.indicator(3).unwrap().active);
        assert!(!progress.indicator(4).unwrap().completed);
    }

    #[test]
    fn selection_step_needs_a_checked_box() {
        let rules = StepRules::default();
        let mut form = DocumentForm::default();
        assert_eq!(
            rules.validate(SELECTION_STEP, &form),
            Err(ValidationError::NoDocumentSelected)
        );

        form.option_mut("not_sure").unwrap().checked = true;
        assert!(rules.validate(SELECTION_STEP, &form).is_ok());
    }

    #[test]
    fn other_steps_have_no_rule() {
        let rules = StepRules::default();
        let form = DocumentForm::default();
        for step in [1, 3, 4, 99] {
            assert!(rules.validate(step, &form).is_ok(), "step {step} should pass");
        }
    }

    #[test]
    fn custom_rule_can_be_added() {
        fn never(_: &DocumentForm) -> Result<(), ValidationError> {
            Err(ValidationError::NoDocumentSelected)
        }
        let rules = StepRules::default().with_rule(4, never);
        assert!(rules.validate(4, &DocumentForm::default()).is_err());
    }
}
