//! # Page State Machines
//!
//! Pages are thin: they hold one of these machines per concern and render
//! whatever state it is in.
//!
//! ## Form Lifecycle
//! ```text
//!                       ┌─────────┐
//!             ┌───────► │ Invalid │  (field errors inline)
//!   submit    │         └────┬────┘
//!   (invalid) │              │ edit
//!        ┌────┴────┐ ◄───────┘      ┌────────────┐  ok   ┌───────────┐
//!  ────► │ Editing │ ──────────────►│ Submitting │ ────► │ Succeeded │
//!        └─────────┘ submit (valid) └─────┬──────┘       └───────────┘
//!             ▲                           │ err
//!             │ edit                      ▼
//!             │                      ┌────────┐
//!             └──────────────────────│ Failed │  (draft kept, banner shown)
//!                                    └────────┘
//! ```

use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::Page;
use crate::validation::{check, FormErrors, FormSchema};

// =============================================================================
// List Pages
// =============================================================================

/// What a list page renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Idle,
    /// A fetch is in flight. A refresh keeps the rows already on screen.
    Loading { previous: Option<Page<T>> },
    Loaded(Page<T>),
    /// Loaded successfully with no rows; pages show their empty message.
    Empty,
    Failed(String),
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        ListState::Idle
    }
}

impl<T> ListState<T> {
    pub fn from_result<E: fmt::Display>(result: Result<Page<T>, E>) -> Self {
        match result {
            Ok(page) if page.is_empty() => ListState::Empty,
            Ok(page) => ListState::Loaded(page),
            Err(e) => ListState::Failed(e.to_string()),
        }
    }

    /// Moves to `Loading`, carrying loaded rows along.
    pub fn start_loading(&mut self) {
        let previous = match std::mem::replace(self, ListState::Idle) {
            ListState::Loaded(page) => Some(page),
            ListState::Loading { previous } => previous,
            _ => None,
        };
        *self = ListState::Loading { previous };
    }

    pub fn finish<E: fmt::Display>(&mut self, result: Result<Page<T>, E>) {
        *self = ListState::from_result(result);
    }

    pub fn items(&self) -> &[T] {
        match self {
            ListState::Loaded(page) => &page.items,
            ListState::Loading { previous: Some(page) } => &page.items,
            _ => &[],
        }
    }

    pub fn page(&self) -> Option<&Page<T>> {
        match self {
            ListState::Loaded(page) => Some(page),
            ListState::Loading { previous } => previous.as_ref(),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ListState::Empty)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ListState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    /// Last submit was rejected by the schema; errors are shown inline.
    Invalid,
    Submitting,
    Succeeded,
    Failed,
}

impl FormPhase {
    fn as_str(&self) -> &'static str {
        match self {
            FormPhase::Editing => "editing",
            FormPhase::Invalid => "invalid",
            FormPhase::Submitting => "submitting",
            FormPhase::Succeeded => "succeeded",
            FormPhase::Failed => "failed",
        }
    }
}

/// A form draft plus where it is in its lifecycle.
///
/// The draft survives a failed submit untouched, so the user can fix the
/// problem and try again.
#[derive(Debug, Clone)]
pub struct FormState<D> {
    draft: D,
    phase: FormPhase,
    errors: FormErrors,
    server_error: Option<String>,
}

impl<D: FormSchema> FormState<D> {
    pub fn new(draft: D) -> Self {
        FormState {
            draft,
            phase: FormPhase::Editing,
            errors: FormErrors::new(),
            server_error: None,
        }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    /// Mutable access for field edits. Locked while a submit is in flight.
    pub fn edit(&mut self) -> CoreResult<&mut D> {
        match self.phase {
            FormPhase::Submitting | FormPhase::Succeeded => {
                Err(CoreError::transition(self.phase.as_str(), "edit"))
            }
            FormPhase::Editing | FormPhase::Invalid | FormPhase::Failed => {
                self.phase = FormPhase::Editing;
                Ok(&mut self.draft)
            }
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn server_error(&self) -> Option<&str> {
        self.server_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    /// Validates the draft. On success the form moves to `Submitting` and the
    /// payload is handed back for the mutation.
    pub fn submit(&mut self) -> CoreResult<D::Payload> {
        if matches!(self.phase, FormPhase::Submitting | FormPhase::Succeeded) {
            return Err(CoreError::transition(self.phase.as_str(), "submit"));
        }
        match check(&mut self.draft) {
            Ok(payload) => {
                self.errors = FormErrors::new();
                self.server_error = None;
                self.phase = FormPhase::Submitting;
                Ok(payload)
            }
            Err(errors) => {
                self.errors = errors.clone();
                self.phase = FormPhase::Invalid;
                Err(CoreError::Validation(errors))
            }
        }
    }

    pub fn succeed(&mut self) -> CoreResult<()> {
        if self.phase != FormPhase::Submitting {
            return Err(CoreError::transition(self.phase.as_str(), "succeed"));
        }
        self.phase = FormPhase::Succeeded;
        Ok(())
    }

    /// Records a server failure. Field errors reported by the server are
    /// shown inline next to the banner.
    pub fn fail(&mut self, message: impl Into<String>, field_errors: FormErrors) -> CoreResult<()> {
        if self.phase != FormPhase::Submitting {
            return Err(CoreError::transition(self.phase.as_str(), "fail"));
        }
        self.phase = FormPhase::Failed;
        self.server_error = Some(message.into());
        self.errors = field_errors;
        Ok(())
    }

    /// Starts over with a fresh draft.
    pub fn reset(&mut self, draft: D) {
        *self = FormState::new(draft);
    }
}

// =============================================================================
// Dialogs
// =============================================================================

/// Which modal a list page has open, and for which row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogState<T> {
    #[default]
    Closed,
    Create,
    Edit(T),
    Inspect(T),
    Transfer(T),
    ConfirmDelete(T),
}

impl<T> DialogState<T> {
    fn name(&self) -> &'static str {
        match self {
            DialogState::Closed => "closed",
            DialogState::Create => "creating",
            DialogState::Edit(_) => "editing",
            DialogState::Inspect(_) => "inspecting",
            DialogState::Transfer(_) => "transferring",
            DialogState::ConfirmDelete(_) => "confirming delete",
        }
    }

    /// Opens a dialog. Only one dialog may be open at a time.
    pub fn open(&mut self, next: DialogState<T>) -> CoreResult<()> {
        if !matches!(self, DialogState::Closed) {
            return Err(CoreError::transition(self.name(), "open a dialog"));
        }
        *self = next;
        Ok(())
    }

    pub fn close(&mut self) {
        *self = DialogState::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    /// The row the dialog acts on, if any.
    pub fn target(&self) -> Option<&T> {
        match self {
            DialogState::Edit(t)
            | DialogState::Inspect(t)
            | DialogState::Transfer(t)
            | DialogState::ConfirmDelete(t) => Some(t),
            DialogState::Closed | DialogState::Create => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::CategoryForm;
    use assert_matches::assert_matches;

    #[test]
    fn test_list_state_from_result() {
        let empty: ListState<u32> = ListState::from_result(Ok::<_, String>(Page::from_items(vec![])));
        assert!(empty.is_empty());

        let mut ready = ListState::from_result(Ok::<_, String>(Page::from_items(vec![1, 2])));
        assert_eq!(ready.items(), &[1, 2]);

        ready.start_loading();
        assert!(ready.is_loading());
        assert_eq!(ready.items(), &[1, 2]);
        ready.finish(Err("offline"));
        assert_eq!(ready.error(), Some("offline"));

        let failed: ListState<u32> = ListState::from_result(Err("boom"));
        assert_eq!(failed.error(), Some("boom"));
        assert_eq!(ListState::<u32>::default(), ListState::Idle);
    }

    #[test]
    fn test_invalid_submit_stays_editing() {
        let mut form = FormState::new(CategoryForm::default());
        assert_matches!(form.submit(), Err(CoreError::Validation(_)));
        assert_eq!(form.phase(), FormPhase::Invalid);
        assert_eq!(form.errors().first("name"), Some("Category name is required"));
        form.edit().unwrap().name = "Tools".into();
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn test_failure_keeps_draft_and_allows_retry() {
        let mut form = FormState::new(CategoryForm {
            name: "Cameras".into(),
            ..Default::default()
        });
        form.submit().unwrap();
        assert!(form.is_submitting());
        assert_matches!(form.edit(), Err(CoreError::InvalidTransition { .. }));
        assert_matches!(form.submit(), Err(CoreError::InvalidTransition { .. }));

        form.fail("Category already exists", FormErrors::new()).unwrap();
        assert_eq!(form.phase(), FormPhase::Failed);
        assert_eq!(form.draft().name, "Cameras");
        assert_eq!(form.server_error(), Some("Category already exists"));

        form.edit().unwrap().name = "Camera Bodies".into();
        form.submit().unwrap();
        form.succeed().unwrap();
        assert_eq!(form.phase(), FormPhase::Succeeded);
        assert_eq!(form.server_error(), None);
    }

    #[test]
    fn test_succeed_requires_submitting() {
        let mut form = FormState::new(CategoryForm::default());
        let err = form.succeed().unwrap_err();
        assert_eq!(err.to_string(), "Invalid transition: cannot succeed while editing");
    }

    #[test]
    fn test_one_dialog_at_a_time() {
        let mut dialog: DialogState<&str> = DialogState::default();
        dialog.open(DialogState::Edit("b1")).unwrap();
        assert_eq!(dialog.target(), Some(&"b1"));
        assert_matches!(dialog.open(DialogState::Create), Err(CoreError::InvalidTransition { .. }));
        dialog.close();
        dialog.open(DialogState::ConfirmDelete("b2")).unwrap();
        assert!(dialog.is_open());
    }
}
