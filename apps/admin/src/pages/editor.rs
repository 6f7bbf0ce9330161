//! Create / edit / delete dialogs for list pages.
//!
//! One [`Editor`] pairs the page's [`DialogState`] with the form shown in
//! it, so a page can never have a form open without a dialog or two
//! dialogs at once.

use rental_client::ClientError;
use rental_core::{DialogState, FormSchema, FormState};

use super::{failure_message, form_errors};
use crate::error::{AppError, AppResult};

#[derive(Debug)]
pub struct Editor<T, F> {
    dialog: DialogState<T>,
    form: Option<FormState<F>>,
}

impl<T, F> Default for Editor<T, F> {
    fn default() -> Self {
        Editor {
            dialog: DialogState::Closed,
            form: None,
        }
    }
}

impl<T: Clone, F: FormSchema> Editor<T, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialog(&self) -> &DialogState<T> {
        &self.dialog
    }

    pub fn form(&self) -> Option<&FormState<F>> {
        self.form.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_open()
    }

    pub fn open_create(&mut self, draft: F) -> AppResult<()> {
        self.dialog.open(DialogState::Create)?;
        self.form = Some(FormState::new(draft));
        Ok(())
    }

    /// Opens the edit dialog for `row`, prefilled with `draft`.
    pub fn open_edit(&mut self, row: T, draft: F) -> AppResult<()> {
        self.dialog.open(DialogState::Edit(row))?;
        self.form = Some(FormState::new(draft));
        Ok(())
    }

    pub fn open_delete(&mut self, row: T) -> AppResult<()> {
        self.dialog.open(DialogState::ConfirmDelete(row))?;
        self.form = None;
        Ok(())
    }

    pub fn close(&mut self) {
        self.dialog.close();
        self.form = None;
    }

    /// The draft, for field edits.
    pub fn edit(&mut self) -> AppResult<&mut F> {
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| AppError::invalid_state("No form is open"))?;
        Ok(form.edit()?)
    }

    /// Validates the draft. Returns the payload and, for an edit, the row
    /// being edited.
    pub fn begin_submit(&mut self) -> AppResult<(F::Payload, Option<T>)> {
        let target = match &self.dialog {
            DialogState::Create => None,
            DialogState::Edit(row) => Some(row.clone()),
            _ => return Err(AppError::invalid_state("No create or edit dialog is open")),
        };
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| AppError::invalid_state("No form is open"))?;
        let payload = form.submit()?;
        Ok((payload, target))
    }

    /// The write went through: close the dialog.
    pub fn succeed(&mut self) -> AppResult<()> {
        if let Some(form) = self.form.as_mut() {
            form.succeed()?;
        }
        self.close();
        Ok(())
    }

    /// The write failed: keep the dialog and draft, show the banner.
    /// Returns the banner text.
    pub fn fail(
        &mut self,
        err: &ClientError,
        fallback: &str,
        renames: &[(&str, &str)],
    ) -> AppResult<String> {
        let message = failure_message(err, fallback);
        if let Some(form) = self.form.as_mut() {
            form.fail(message.clone(), form_errors(err, renames))?;
        }
        Ok(message)
    }

    /// The row a delete confirmation is open for.
    pub fn pending_delete(&self) -> Option<&T> {
        match &self.dialog {
            DialogState::ConfirmDelete(row) => Some(row),
            _ => None,
        }
    }
}
