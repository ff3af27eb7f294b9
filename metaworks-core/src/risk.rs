//! Heat-map banding for per-domain risk levels

use serde::Serialize;

use crate::compliance::{compliance_score, ComplianceSummary, StatusCounts};

/// Five-step risk band used by the heat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskBand {
    /// Classify a 0..=100 risk level. Band upper bounds are inclusive.
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=20 => Self::VeryLow,
            21..=40 => Self::Low,
            41..=60 => Self::Medium,
            61..=80 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainHeat {
    pub domain: String,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub risk_level: u8,
    pub band: RiskBand,
    pub label: &'static str,
}

impl DomainHeat {
    fn new(domain: &str, counts: StatusCounts) -> Self {
        let risk_level = if counts.total == 0 {
            0
        } else {
            100 - compliance_score(&counts)
        };
        let band = RiskBand::from_level(risk_level);
        Self {
            domain: domain.to_owned(),
            counts,
            risk_level,
            band,
            label: band.label(),
        }
    }
}

/// Risk level per domain: the complement of the domain's compliance score.
pub fn domain_heat(summary: &ComplianceSummary) -> Vec<DomainHeat> {
    summary
        .domains
        .iter()
        .map(|(domain, counts)| DomainHeat::new(domain, *counts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(RiskBand::from_level(0), RiskBand::VeryLow);
        assert_eq!(RiskBand::from_level(20), RiskBand::VeryLow);
        assert_eq!(RiskBand::from_level(21), RiskBand::Low);
        assert_eq!(RiskBand::from_level(60), RiskBand::Medium);
        assert_eq!(RiskBand::from_level(80), RiskBand::High);
        assert_eq!(RiskBand::from_level(81), RiskBand::VeryHigh);
        assert_eq!(RiskBand::from_level(100).label(), "Very High");
    }

    #[test]
    fn heat_is_complement_of_score() {
        let mut summary = ComplianceSummary::default();
        summary.domains.insert(
            "Governance".into(),
            StatusCounts {
                total: 4,
                implemented: 1,
                partially_implemented: 1,
                not_implemented: 2,
            },
        );
        summary.domains.insert("ICS".into(), StatusCounts::default());

        let heat = domain_heat(&summary);
        assert_eq!(heat.len(), 2);

        // 1 + 0.5 of 4 => 38% compliant
        assert_eq!(heat[0].domain, "Governance");
        assert_eq!(heat[0].risk_level, 62);
        assert_eq!(heat[0].band, RiskBand::High);

        assert_eq!(heat[1].risk_level, 0);
        assert_eq!(heat[1].band, RiskBand::VeryLow);
    }

    #[test]
    fn heat_keeps_domain_order() {
        use crate::compliance::{summarize, AssessmentEntry, ControlStatus, Priority};

        let entry = |domain: &str| AssessmentEntry {
            domain: domain.into(),
            subdomain: String::new(),
            domain_code: String::new(),
            control_code: "1".into(),
            control_name: String::new(),
            status: ControlStatus::Implemented,
            current_status: String::new(),
            recommendation: String::new(),
            management_response: String::new(),
            target_date: String::new(),
            priority: Priority::Medium,
        };
        let entries = vec![entry("Governance"), entry("Defense"), entry("Resilience")];

        let heat = domain_heat(&summarize(&entries));
        let order: Vec<&str> = heat.iter().map(|h| h.domain.as_str()).collect();
        assert_eq!(order, ["Governance", "Defense", "Resilience"]);
    }
}
