//! Checkout wizard — the two-step flow gating payment-method selection on
//! a successful remote submission.
//!
//! `Details` is the initial state; `Payment` is only reachable through a
//! validated draft and a successful submission. A single in-flight flag
//! makes `submit_details` non-reentrant, so repeated clicks make exactly
//! one remote call. Submission failure keeps the wizard in `Details` and
//! surfaces a fallback contact instruction; nothing panics or retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use metamech_core::{PlanId, SiteConfig, SiteError, SiteResult};

use crate::draft::{CheckoutFlow, ContactField, OrderDraft};
use crate::routing::PaymentMethod;
use crate::submission::{SubmissionClient, SubmissionRequest};

/// Wizard step. Anything past `Payment` (actual payment completion) is
/// external navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Details,
    Payment,
}

/// Result of a `submit_details` invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Submission succeeded; the wizard advanced to `Payment`.
    Advanced,
    /// A submission is already pending; this call did nothing.
    AlreadyInFlight,
    /// The wizard is already past `Details`; this call did nothing.
    AlreadyConfirmed,
    /// Local validation failed; nothing was sent. Carries missing fields.
    Invalid(Vec<String>),
    /// The remote call failed; the wizard stayed in `Details`.
    Failed { error: String, fallback: String },
}

/// Trial download handle unlocked by a successful trial-request submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialDownload {
    pub file_name: String,
    pub url: String,
}

/// Clears the in-flight flag when the submission path exits, however it
/// exits — a cancelled future cannot leave the wizard wedged.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The checkout flow controller. Exclusive owner of the order draft; all
/// mutation goes through its setters.
pub struct CheckoutWizard {
    flow: CheckoutFlow,
    step: Mutex<CheckoutStep>,
    draft: Mutex<OrderDraft>,
    in_flight: AtomicBool,
    confirmed: AtomicBool,
    last_error: Mutex<Option<String>>,
    client: Arc<dyn SubmissionClient>,
    config: SiteConfig,
}

impl CheckoutWizard {
    pub fn new(flow: CheckoutFlow, client: Arc<dyn SubmissionClient>, config: SiteConfig) -> Self {
        Self {
            flow,
            step: Mutex::new(CheckoutStep::Details),
            draft: Mutex::new(OrderDraft::default()),
            in_flight: AtomicBool::new(false),
            confirmed: AtomicBool::new(false),
            last_error: Mutex::new(None),
            client,
            config,
        }
    }

    pub fn flow(&self) -> CheckoutFlow {
        self.flow
    }

    pub fn step(&self) -> CheckoutStep {
        *self.step.lock()
    }

    /// Snapshot of the current draft.
    pub fn draft(&self) -> OrderDraft {
        self.draft.lock().clone()
    }

    /// The error to show the user, if the last action produced one.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Update a contact field. Only allowed in `Details`; once in
    /// `Payment` the confirmed fields are locked until `go_back`.
    pub fn set_field(&self, field: ContactField, value: impl Into<String>) -> SiteResult<()> {
        if self.step() != CheckoutStep::Details {
            return Err(SiteError::State(format!(
                "{} is locked after details are confirmed",
                field.name()
            )));
        }
        self.draft.lock().set_field(field, value);
        Ok(())
    }

    /// Change the selected plan. Locked in `Payment` like contact fields.
    pub fn select_plan(&self, plan: PlanId) -> SiteResult<()> {
        if self.step() != CheckoutStep::Details {
            return Err(SiteError::State(
                "plan is locked after details are confirmed".into(),
            ));
        }
        self.draft.lock().plan = plan;
        Ok(())
    }

    /// Choose a payment method. Only meaningful in `Payment`.
    pub fn select_payment_method(&self, method: PaymentMethod) -> SiteResult<()> {
        if self.step() != CheckoutStep::Payment {
            return Err(SiteError::State(
                "payment method is selectable only after details are submitted".into(),
            ));
        }
        self.draft.lock().payment_method = Some(method);
        Ok(())
    }

    /// Validate the draft and submit it remotely; advance to `Payment` on
    /// success. Non-reentrant: while one submission is pending, further
    /// calls are no-ops and no second remote call is made.
    pub async fn submit_details(&self) -> SubmitOutcome {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("duplicate submit while in flight, ignoring");
            return SubmitOutcome::AlreadyInFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);

        if self.step() != CheckoutStep::Details {
            return SubmitOutcome::AlreadyConfirmed;
        }

        let draft = self.draft.lock().clone();
        let missing = draft.missing_fields(self.flow);
        if !missing.is_empty() {
            debug!(?missing, "details incomplete, submission blocked");
            *self.last_error.lock() = Some(format!(
                "Please fill in the required fields: {}",
                missing.join(", ")
            ));
            return SubmitOutcome::Invalid(missing);
        }

        let request = SubmissionRequest::build(self.flow, &draft);
        match self.client.submit(&request).await {
            Ok(_receipt) => {
                *self.step.lock() = CheckoutStep::Payment;
                self.confirmed.store(true, Ordering::SeqCst);
                *self.last_error.lock() = None;
                info!(flow = ?self.flow, company = %draft.company_name, "details confirmed");
                SubmitOutcome::Advanced
            }
            Err(e) => {
                let fallback = format!(
                    "Something went wrong. Please email us directly at {}",
                    self.config.payment.sales_email
                );
                warn!(error = %e, "submission failed, staying on details");
                *self.last_error.lock() = Some(fallback.clone());
                SubmitOutcome::Failed {
                    error: e.to_string(),
                    fallback,
                }
            }
        }
    }

    /// Return to `Details`. Always permitted from `Payment`; every contact
    /// field survives. The payment-method selection is cleared so it is
    /// never set while the wizard sits in its initial state.
    pub fn go_back(&self) -> bool {
        let mut step = self.step.lock();
        if *step != CheckoutStep::Payment {
            return false;
        }
        *step = CheckoutStep::Details;
        self.draft.lock().payment_method = None;
        true
    }

    /// The trial download, once a trial-request submission has succeeded.
    pub fn trial_download(&self) -> Option<TrialDownload> {
        if self.flow == CheckoutFlow::TrialRequest && self.confirmed.load(Ordering::SeqCst) {
            Some(TrialDownload {
                file_name: self.config.trial.download_file.clone(),
                url: self.config.trial.download_url.clone(),
            })
        } else {
            None
        }
    }
}
