//! Plan catalog — the static table of product tiers, yearly prices, and
//! per-plan card-checkout links. Defined once at process start and shared
//! read-only by the ROI and checkout pipelines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SiteError;

/// Sentinel used in the site build for card links that are not live yet.
const PLACEHOLDER_LINK: &str = "#";

/// Product tier identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    Trial,
    Standard,
    Premium,
    Plus,
}

impl PlanId {
    pub const ALL: [PlanId; 4] = [
        PlanId::Trial,
        PlanId::Standard,
        PlanId::Premium,
        PlanId::Plus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Trial => "trial",
            PlanId::Standard => "standard",
            PlanId::Premium => "premium",
            PlanId::Plus => "plus",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(PlanId::Trial),
            "standard" => Ok(PlanId::Standard),
            "premium" => Ok(PlanId::Premium),
            "plus" => Ok(PlanId::Plus),
            other => Err(SiteError::UnknownPlan(other.to_string())),
        }
    }
}

/// A priced product tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub display_name: String,
    pub price_eur: f64,
    pub period: String,
    pub description: String,
    pub features: Vec<String>,
    /// Card-checkout URL, absent when the link is not configured yet.
    pub stripe_link: Option<String>,
}

/// Immutable table of all plans, in display order.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    /// The catalog shipped with the site. Placeholder links are normalised
    /// to `None` here so downstream routing never sees the sentinel.
    pub fn builtin() -> Self {
        Self::from_plans(vec![
            Plan {
                id: PlanId::Trial,
                display_name: "Trial".into(),
                price_eur: 0.0,
                period: "3 days free".into(),
                description: "Try before you buy".into(),
                features: vec![
                    "Full feature access".into(),
                    "Community support".into(),
                    "Single user license".into(),
                    "All automation tools".into(),
                ],
                stripe_link: None,
            },
            Plan {
                id: PlanId::Standard,
                display_name: "Standard".into(),
                price_eur: 999.0,
                period: "per year".into(),
                description: "Perfect for small teams".into(),
                features: vec![
                    "BOM Automation".into(),
                    "PDF Merge + Index".into(),
                    "Email support".into(),
                    "Single user license".into(),
                    "Quarterly updates".into(),
                ],
                stripe_link: Some("https://buy.stripe.com/28E5kC61J4252sl6vi2Nq00".into()),
            },
            Plan {
                id: PlanId::Premium,
                display_name: "Premium".into(),
                price_eur: 1299.0,
                period: "per year".into(),
                description: "Most popular choice".into(),
                features: vec![
                    "All Standard features".into(),
                    "STEP/DXF Export".into(),
                    "Priority support".into(),
                    "Multi-user discount".into(),
                    "Monthly updates".into(),
                    "Custom templates".into(),
                ],
                stripe_link: Some("https://buy.stripe.com/4gM28qgGnaqteb38Dq2Nq01".into()),
            },
            Plan {
                id: PlanId::Plus,
                display_name: "Premium Plus".into(),
                price_eur: 1599.0,
                period: "per year".into(),
                description: "Enterprise solution".into(),
                features: vec![
                    "All Premium features".into(),
                    "Custom development".into(),
                    "Dedicated support".into(),
                    "Training sessions".into(),
                    "API access".into(),
                    "White-label options".into(),
                ],
                stripe_link: Some(PLACEHOLDER_LINK.into()),
            },
        ])
    }

    /// Build a catalog from explicit plans, normalising placeholder links.
    pub fn from_plans(mut plans: Vec<Plan>) -> Self {
        for plan in &mut plans {
            if plan
                .stripe_link
                .as_deref()
                .is_some_and(|link| link == PLACEHOLDER_LINK || link.is_empty())
            {
                plan.stripe_link = None;
            }
        }
        Self { plans }
    }

    pub fn get(&self, id: PlanId) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Card-checkout link for a plan, if one is configured.
    pub fn stripe_link(&self, id: PlanId) -> Option<&str> {
        self.get(id).and_then(|p| p.stripe_link.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plan> {
        self.plans.iter()
    }

    /// The plan the calculator pre-selects.
    pub fn default_plan(&self) -> PlanId {
        PlanId::Standard
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_prices() {
        let catalog = PlanCatalog::builtin();
        assert_eq!(catalog.get(PlanId::Trial).unwrap().price_eur, 0.0);
        assert_eq!(catalog.get(PlanId::Standard).unwrap().price_eur, 999.0);
        assert_eq!(catalog.get(PlanId::Premium).unwrap().price_eur, 1299.0);
        assert_eq!(catalog.get(PlanId::Plus).unwrap().price_eur, 1599.0);
    }

    #[test]
    fn test_placeholder_link_is_normalised_to_absent() {
        let catalog = PlanCatalog::builtin();
        // Premium Plus ships with the `#` placeholder
        assert_eq!(catalog.stripe_link(PlanId::Plus), None);
        assert_eq!(catalog.stripe_link(PlanId::Trial), None);
        assert!(catalog
            .stripe_link(PlanId::Standard)
            .unwrap()
            .starts_with("https://buy.stripe.com/"));
    }

    #[test]
    fn test_plan_id_round_trip() {
        for id in PlanId::ALL {
            assert_eq!(id.as_str().parse::<PlanId>().unwrap(), id);
        }
        assert!("gold".parse::<PlanId>().is_err());
    }
}
