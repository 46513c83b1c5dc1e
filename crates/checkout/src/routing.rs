//! Payment router — resolves a (plan, payment method) pair to a concrete
//! action. Pure decision logic: it opens nothing and sends nothing itself;
//! invoking the returned action is the caller's side effect.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use metamech_core::config::PaymentConfig;
use metamech_core::{PlanCatalog, PlanId};

use crate::draft::OrderDraft;

/// Encoding set for mailto subject/body, matching browser
/// `encodeURIComponent` output.
const MAILTO_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How the user chose to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card checkout via the plan's provider link.
    CardRedirect,
    /// Plan-independent wallet payment page.
    WalletRedirect,
    /// Invoice request composed as an email.
    InvoiceRequest,
}

/// The resolved action. Exactly one per resolution; no silent fallback
/// from one method to another.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentAction {
    OpenExternalLink(Url),
    ComposeEmail {
        recipient: String,
        subject: String,
        body: String,
    },
    ReportError(String),
}

impl PaymentAction {
    /// Render a compose action as a `mailto:` URI with percent-encoded
    /// subject and body. `None` for the other variants.
    pub fn mailto_uri(&self) -> Option<String> {
        match self {
            PaymentAction::ComposeEmail {
                recipient,
                subject,
                body,
            } => Some(format!(
                "mailto:{recipient}?subject={}&body={}",
                utf8_percent_encode(subject, MAILTO_SET),
                utf8_percent_encode(body, MAILTO_SET),
            )),
            _ => None,
        }
    }
}

/// Resolves payment choices against the plan catalog and payment config.
pub struct PaymentRouter {
    catalog: PlanCatalog,
    config: PaymentConfig,
}

impl PaymentRouter {
    pub fn new(catalog: PlanCatalog, config: PaymentConfig) -> Self {
        Self { catalog, config }
    }

    pub fn resolve(
        &self,
        plan: PlanId,
        method: PaymentMethod,
        draft: &OrderDraft,
    ) -> PaymentAction {
        info!(%plan, ?method, "resolving payment action");
        match method {
            PaymentMethod::CardRedirect => self.resolve_card(plan),
            PaymentMethod::WalletRedirect => match Url::parse(&self.config.wallet_link) {
                Ok(url) => PaymentAction::OpenExternalLink(url),
                Err(e) => PaymentAction::ReportError(format!("wallet link misconfigured: {e}")),
            },
            PaymentMethod::InvoiceRequest => self.compose_invoice(plan, draft),
        }
    }

    fn resolve_card(&self, plan: PlanId) -> PaymentAction {
        match self.catalog.stripe_link(plan) {
            Some(link) => match Url::parse(link) {
                Ok(url) => PaymentAction::OpenExternalLink(url),
                Err(e) => PaymentAction::ReportError(format!("card link misconfigured: {e}")),
            },
            None => PaymentAction::ReportError(
                "Card payment link not configured for this plan yet. \
                 Please use the wallet payment or request an invoice."
                    .into(),
            ),
        }
    }

    /// Invoice request email. No validation re-check here: Details-stage
    /// validation already ran, so every value is rendered present-or-empty.
    fn compose_invoice(&self, plan: PlanId, draft: &OrderDraft) -> PaymentAction {
        let plan_label = self
            .catalog
            .get(plan)
            .map(|p| p.display_name.to_uppercase())
            .unwrap_or_else(|| plan.to_string().to_uppercase());

        let body = format!(
            "Hi MetaMech Team,\n\n\
             I would like to request an invoice for the following:\n\n\
             Plan: {plan_label}\n\
             Company: {}\n\
             Name: {}\n\
             Email: {}\n\
             Country: {}\n\
             Address: {}\n\n\
             Please send the invoice to the email above.\n\n\
             Thank you!",
            draft.company_name, draft.full_name, draft.email, draft.country, draft.address,
        );

        PaymentAction::ComposeEmail {
            recipient: self.config.sales_email.clone(),
            subject: format!("Invoice Request - {}", draft.company_name),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> PaymentRouter {
        PaymentRouter::new(PlanCatalog::builtin(), PaymentConfig::default())
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            full_name: "Ada Lovelace".into(),
            company_name: "Analytical Engines Ltd".into(),
            country: "United Kingdom".into(),
            address: "1 Engine Row, London".into(),
            email: "ada@analytical.example".into(),
            plan: PlanId::Standard,
            ..OrderDraft::default()
        }
    }

    #[test]
    fn test_card_redirect_with_configured_link() {
        let action = router().resolve(PlanId::Standard, PaymentMethod::CardRedirect, &draft());
        match action {
            PaymentAction::OpenExternalLink(url) => {
                assert_eq!(url.host_str(), Some("buy.stripe.com"));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_card_redirect_without_link_reports_error() {
        // Premium Plus ships with a placeholder link; Trial has none
        for plan in [PlanId::Plus, PlanId::Trial] {
            let action = router().resolve(plan, PaymentMethod::CardRedirect, &draft());
            assert!(
                matches!(action, PaymentAction::ReportError(_)),
                "{plan} must not silently fall back"
            );
        }
    }

    #[test]
    fn test_wallet_redirect_is_plan_independent() {
        let router = router();
        let a = router.resolve(PlanId::Trial, PaymentMethod::WalletRedirect, &draft());
        let b = router.resolve(PlanId::Plus, PaymentMethod::WalletRedirect, &draft());
        assert_eq!(a, b);
        match a {
            PaymentAction::OpenExternalLink(url) => {
                assert_eq!(url.as_str(), "https://revolut.me/saviosyl");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_invoice_body_enumerates_order() {
        let action = router().resolve(PlanId::Standard, PaymentMethod::InvoiceRequest, &draft());
        match &action {
            PaymentAction::ComposeEmail {
                recipient,
                subject,
                body,
            } => {
                assert_eq!(recipient, "hi@metamechsolutions.com");
                assert_eq!(subject, "Invoice Request - Analytical Engines Ltd");
                assert!(body.contains("Plan: STANDARD"));
                assert!(body.contains("Company: Analytical Engines Ltd"));
                assert!(body.contains("Name: Ada Lovelace"));
                assert!(body.contains("Email: ada@analytical.example"));
                assert!(body.contains("Country: United Kingdom"));
                assert!(body.contains("Address: 1 Engine Row, London"));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_invoice_values_present_or_empty() {
        // Optional address left empty must still render its line
        let mut d = draft();
        d.address.clear();
        let action = router().resolve(PlanId::Premium, PaymentMethod::InvoiceRequest, &d);
        match action {
            PaymentAction::ComposeEmail { body, .. } => {
                assert!(body.contains("Address: \n"));
                assert!(body.contains("Plan: PREMIUM"));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_mailto_uri_is_percent_encoded() {
        let action = router().resolve(PlanId::Standard, PaymentMethod::InvoiceRequest, &draft());
        let uri = action.mailto_uri().unwrap();
        assert!(uri.starts_with("mailto:hi@metamechsolutions.com?subject=Invoice%20Request"));
        assert!(uri.contains("body=Hi%20MetaMech%20Team"));
        assert!(!uri.contains('\n'));
    }

    #[test]
    fn test_mailto_uri_only_for_compose() {
        let action = router().resolve(PlanId::Standard, PaymentMethod::CardRedirect, &draft());
        assert_eq!(action.mailto_uri(), None);
    }
}
