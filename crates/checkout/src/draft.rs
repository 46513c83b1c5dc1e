//! Order draft — the mutable record of the user's in-progress order, trial,
//! or demo request, with per-flow required-field validation.

use serde::{Deserialize, Serialize};

use metamech_core::{PlanId, SiteError, SiteResult};

use crate::routing::PaymentMethod;

/// Which of the three site forms the draft belongs to. Each flow has its
/// own required-field set and submission subject line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutFlow {
    /// Full order details ahead of payment.
    Order,
    /// Trial download request.
    TrialRequest,
    /// Contact / custom demo request.
    DemoRequest,
}

/// A single contact field, addressable so the wizard can gate mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    FullName,
    CompanyName,
    VatNumber,
    Country,
    Address,
    Email,
    Phone,
    Message,
}

impl ContactField {
    pub fn name(&self) -> &'static str {
        match self {
            ContactField::FullName => "full_name",
            ContactField::CompanyName => "company_name",
            ContactField::VatNumber => "vat_number",
            ContactField::Country => "country",
            ContactField::Address => "address",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Message => "message",
        }
    }
}

/// The in-progress order data. Owned by the wizard; the ROI pipeline never
/// reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub full_name: String,
    pub company_name: String,
    pub vat_number: String,
    pub country: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub plan: PlanId,
    pub payment_method: Option<PaymentMethod>,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            company_name: String::new(),
            vat_number: String::new(),
            country: String::new(),
            address: String::new(),
            email: String::new(),
            phone: String::new(),
            message: String::new(),
            plan: PlanId::Standard,
            payment_method: None,
        }
    }
}

impl OrderDraft {
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::FullName => &self.full_name,
            ContactField::CompanyName => &self.company_name,
            ContactField::VatNumber => &self.vat_number,
            ContactField::Country => &self.country,
            ContactField::Address => &self.address,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Message => &self.message,
        }
    }

    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ContactField::FullName => self.full_name = value,
            ContactField::CompanyName => self.company_name = value,
            ContactField::VatNumber => self.vat_number = value,
            ContactField::Country => self.country = value,
            ContactField::Address => self.address = value,
            ContactField::Email => self.email = value,
            ContactField::Phone => self.phone = value,
            ContactField::Message => self.message = value,
        }
    }

    /// Required fields for a flow. VAT, address, phone, and message are
    /// optional everywhere.
    pub fn required_fields(flow: CheckoutFlow) -> &'static [ContactField] {
        match flow {
            CheckoutFlow::Order => &[
                ContactField::FullName,
                ContactField::CompanyName,
                ContactField::Email,
                ContactField::Country,
            ],
            CheckoutFlow::TrialRequest => &[
                ContactField::FullName,
                ContactField::CompanyName,
                ContactField::Country,
                ContactField::Email,
            ],
            CheckoutFlow::DemoRequest => &[
                ContactField::FullName,
                ContactField::CompanyName,
                ContactField::Email,
            ],
        }
    }

    /// Names of required fields currently empty, in declaration order.
    pub fn missing_fields(&self, flow: CheckoutFlow) -> Vec<String> {
        Self::required_fields(flow)
            .iter()
            .filter(|f| self.field(**f).trim().is_empty())
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Local validation, run before any remote attempt. Reports the full
    /// list of missing fields rather than the first.
    pub fn validate(&self, flow: CheckoutFlow) -> SiteResult<()> {
        let missing = self.missing_fields(flow);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SiteError::Validation(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_draft() -> OrderDraft {
        OrderDraft {
            full_name: "Ada Lovelace".into(),
            company_name: "Analytical Engines Ltd".into(),
            country: "United Kingdom".into(),
            email: "ada@analytical.example".into(),
            ..OrderDraft::default()
        }
    }

    #[test]
    fn test_valid_order_draft() {
        assert!(filled_draft().validate(CheckoutFlow::Order).is_ok());
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let err = OrderDraft::default()
            .validate(CheckoutFlow::Order)
            .unwrap_err();
        match err {
            metamech_core::SiteError::Validation(missing) => {
                assert_eq!(
                    missing,
                    vec!["full_name", "company_name", "email", "country"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_optional_fields_never_block() {
        let mut draft = filled_draft();
        draft.vat_number.clear();
        draft.address.clear();
        draft.phone.clear();
        assert!(draft.validate(CheckoutFlow::Order).is_ok());
        assert!(draft.validate(CheckoutFlow::TrialRequest).is_ok());
        assert!(draft.validate(CheckoutFlow::DemoRequest).is_ok());
    }

    #[test]
    fn test_demo_flow_does_not_require_country() {
        let mut draft = filled_draft();
        draft.country.clear();
        assert!(draft.validate(CheckoutFlow::DemoRequest).is_ok());
        assert!(draft.validate(CheckoutFlow::Order).is_err());
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let mut draft = filled_draft();
        draft.email = "   ".into();
        assert!(draft.validate(CheckoutFlow::Order).is_err());
    }

    #[test]
    fn test_payment_method_unset_by_default() {
        assert_eq!(OrderDraft::default().payment_method, None);
    }
}
