//! The form controller: draft, errors, step, loading flag and alerts.
//!
//! Both front ends drive the same controller. It never sleeps and never
//! spawns anything; time enters through the `now` arguments and the pending
//! reset is applied by [`InvoiceForm::tick`].

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::model::{Field, InvoiceDraft, InvoicePayload};
use crate::submit::{SubmitError, Submitter};
use crate::validate::{self, ErrorMap};

pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Details,
    Review,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Details => 1,
            Step::Review => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            title: title.to_string(),
            message: message.into(),
        }
    }

    fn success(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

pub struct InvoiceForm {
    draft: InvoiceDraft,
    errors: ErrorMap,
    step: Step,
    loading: bool,
    alert: Option<Alert>,
    reset_delay: Duration,
    // Deadline of the post-success reset. Owned by the form, so it goes
    // away with it.
    pending_reset: Option<Instant>,
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self::new(DEFAULT_RESET_DELAY)
    }
}

impl InvoiceForm {
    pub fn new(reset_delay: Duration) -> Self {
        Self {
            draft: InvoiceDraft::default(),
            errors: ErrorMap::new(),
            step: Step::Details,
            loading: false,
            alert: None,
            reset_delay,
            pending_reset: None,
        }
    }

    /// Starts from a pre-filled draft, e.g. one loaded from a file.
    pub fn with_draft(draft: InvoiceDraft, reset_delay: Duration) -> Self {
        Self {
            draft,
            ..Self::new(reset_delay)
        }
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn pending_reset(&self) -> Option<Instant> {
        self.pending_reset
    }

    /// Stores a value and re-validates that field alone.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.draft.value_mut(field) = value.into();
        match validate::validate_field(field, self.draft.value(field), &self.draft) {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    /// Checking the box copies the billing address over once.
    pub fn set_shipping_same_as_billing(&mut self, same: bool) {
        self.draft.is_shipping_same_as_billing = same;
        if same {
            self.draft.sync_shipping_from_billing();
        }
    }

    /// Details → Review. Returns whether the step advanced.
    pub fn next(&mut self) -> bool {
        if self.step != Step::Details {
            return false;
        }

        self.errors = validate::validate_all(&self.draft);
        if self.errors.is_empty() {
            debug!("details complete, moving to review");
            self.step = Step::Review;
            true
        } else {
            debug!(count = self.errors.len(), "details incomplete");
            self.alert = Some(Alert::error("Validation Error", validate::summarize(&self.errors)));
            false
        }
    }

    pub fn back(&mut self) {
        self.step = Step::Details;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Marks the form busy and hands out the payload. `None` when not on the
    /// review step or when a submission is already in flight.
    pub fn begin_submit(&mut self) -> Option<InvoicePayload> {
        if self.step != Step::Review || self.loading {
            return None;
        }
        self.cancel_pending_reset();
        self.loading = true;
        Some(self.draft.to_payload())
    }

    /// Records the outcome of the submission started by `begin_submit`.
    pub fn finish_submit(&mut self, outcome: Result<(), SubmitError>, now: Instant) {
        self.loading = false;
        match outcome {
            Ok(()) => {
                let delay_ms = self.reset_delay.as_millis() as u64;
                info!(delay_ms, "invoice submitted, reset scheduled");
                self.alert = Some(Alert::success("Success!", "Invoice submitted successfully!"));
                self.pending_reset = Some(now + self.reset_delay);
            }
            Err(err) => {
                match &err {
                    SubmitError::Status(status) => warn!(%status, "invoice submission rejected"),
                    _ => warn!(error = %err, "invoice submission failed"),
                }
                self.alert =
                    Some(Alert::error("Error", format!("Failed to submit invoice: {err}")));
            }
        }
    }

    /// Synchronous submit. Returns whether a request was made.
    pub fn submit(&mut self, submitter: &dyn Submitter, now: Instant) -> bool {
        let Some(payload) = self.begin_submit() else {
            return false;
        };
        let outcome = submitter.submit(&payload);
        self.finish_submit(outcome, now);
        true
    }

    /// Applies the pending reset once its deadline has passed. Returns
    /// whether it fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending_reset {
            Some(deadline) if now >= deadline => {
                debug!("clearing form after submission");
                self.pending_reset = None;
                self.step = Step::Details;
                self.errors.clear();
                self.draft.clear_after_submit();
                true
            }
            _ => false,
        }
    }

    pub fn cancel_pending_reset(&mut self) {
        self.pending_reset = None;
    }
}
