//! Compliance aggregation over control assessment entries
//!
//! Every figure here is derived from an in-memory list of entries. Entries
//! marked Not Applicable are counted separately and never enter a
//! denominator.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Implementation status of a single control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlStatus {
    Implemented,
    PartiallyImplemented,
    NotImplemented,
    NotApplicable,
}

impl ControlStatus {
    pub const ALL: [ControlStatus; 4] = [
        Self::Implemented,
        Self::PartiallyImplemented,
        Self::NotImplemented,
        Self::NotApplicable,
    ];

    /// Storage key (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Implemented => "implemented",
            Self::PartiallyImplemented => "partially_implemented",
            Self::NotImplemented => "not_implemented",
            Self::NotApplicable => "not_applicable",
        }
    }

    /// Human label, also used on the wire.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Implemented => "Implemented",
            Self::PartiallyImplemented => "Partially Implemented",
            Self::NotImplemented => "Not Implemented",
            Self::NotApplicable => "Not Applicable",
        }
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

impl FromStr for ControlStatus {
    type Err = CoreError;

    /// Accepts the label ("Partially Implemented") or the storage key
    /// ("partially_implemented"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|status| status.label().to_ascii_lowercase() == normalized)
            .ok_or_else(|| CoreError::unknown_variant("control status", s))
    }
}

impl TryFrom<String> for ControlStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ControlStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ControlStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Remediation priority attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| CoreError::unknown_variant("priority", s))
    }
}

impl TryFrom<String> for Priority {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of an assessment report: a control and how far it is implemented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentEntry {
    pub domain: String,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub domain_code: String,
    pub control_code: String,
    #[serde(default)]
    pub control_name: String,
    #[serde(rename = "controlStatus", alias = "status")]
    pub status: ControlStatus,
    #[serde(default)]
    pub current_status: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub management_response: String,
    #[serde(default)]
    pub target_date: String,
    #[serde(default)]
    pub priority: Priority,
}

/// Counts of applicable entries by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub implemented: usize,
    pub partially_implemented: usize,
    pub not_implemented: usize,
}

impl StatusCounts {
    /// Count one status. Not Applicable is ignored.
    pub fn record(&mut self, status: ControlStatus) {
        match status {
            ControlStatus::Implemented => self.implemented += 1,
            ControlStatus::PartiallyImplemented => self.partially_implemented += 1,
            ControlStatus::NotImplemented => self.not_implemented += 1,
            ControlStatus::NotApplicable => return,
        }
        self.total += 1;
    }
}

/// Overall and per-domain counts for a set of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub total: usize,
    pub implemented: usize,
    pub partially_implemented: usize,
    pub not_implemented: usize,
    pub not_applicable: usize,
    /// Applicable counts keyed by domain name, in first-seen order
    pub domains: IndexMap<String, StatusCounts>,
}

impl ComplianceSummary {
    /// Overall applicable counts.
    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            total: self.total,
            implemented: self.implemented,
            partially_implemented: self.partially_implemented,
            not_implemented: self.not_implemented,
        }
    }

    /// Overall weighted compliance percentage.
    pub fn score(&self) -> u8 {
        compliance_score(&self.counts())
    }
}

/// Aggregate entries into overall and per-domain counts.
pub fn summarize<'a, I>(entries: I) -> ComplianceSummary
where
    I: IntoIterator<Item = &'a AssessmentEntry>,
{
    let mut overall = StatusCounts::default();
    let mut not_applicable = 0;
    let mut domains: IndexMap<String, StatusCounts> = IndexMap::new();

    for entry in entries {
        if !entry.status.is_applicable() {
            not_applicable += 1;
            continue;
        }
        overall.record(entry.status);
        domains
            .entry(entry.domain.clone())
            .or_default()
            .record(entry.status);
    }

    ComplianceSummary {
        total: overall.total,
        implemented: overall.implemented,
        partially_implemented: overall.partially_implemented,
        not_implemented: overall.not_implemented,
        not_applicable,
        domains,
    }
}

/// Weighted compliance percentage: `(implemented + 0.5 * partial) / total`.
///
/// Rounded half away from zero in integer arithmetic; 0 when nothing is
/// applicable.
pub fn compliance_score(counts: &StatusCounts) -> u8 {
    if counts.total == 0 {
        return 0;
    }
    let weighted_halves = (2 * counts.implemented + counts.partially_implemented) as u64;
    let denominator_halves = 2 * counts.total as u64;
    let score = (weighted_halves * 200 + denominator_halves) / (2 * denominator_halves);
    score.min(100) as u8
}

/// Optional narrowing of a report by domain and priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl ReportFilter {
    pub fn matches(&self, entry: &AssessmentEntry) -> bool {
        if let Some(domain) = &self.domain {
            if &entry.domain != domain {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if entry.priority != priority {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, entries: &'a [AssessmentEntry]) -> Vec<&'a AssessmentEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.priority.is_none()
    }
}

/// One slice of the status distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSlice {
    pub name: &'static str,
    pub value: usize,
    pub color: &'static str,
}

/// Stacked per-domain counts for the domain breakdown chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainBar {
    pub name: String,
    #[serde(rename = "Not Implemented")]
    pub not_implemented: usize,
    #[serde(rename = "Partially Implemented")]
    pub partially_implemented: usize,
    #[serde(rename = "Implemented")]
    pub implemented: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub status_distribution: Vec<StatusSlice>,
    pub domain_breakdown: Vec<DomainBar>,
}

pub fn chart_data(summary: &ComplianceSummary) -> ChartData {
    let status_distribution = vec![
        StatusSlice {
            name: ControlStatus::NotImplemented.label(),
            value: summary.not_implemented,
            color: "#f87171",
        },
        StatusSlice {
            name: ControlStatus::PartiallyImplemented.label(),
            value: summary.partially_implemented,
            color: "#facc15",
        },
        StatusSlice {
            name: ControlStatus::Implemented.label(),
            value: summary.implemented,
            color: "#4ade80",
        },
    ];

    let domain_breakdown = summary
        .domains
        .iter()
        .map(|(name, counts)| DomainBar {
            name: name.clone(),
            not_implemented: counts.not_implemented,
            partially_implemented: counts.partially_implemented,
            implemented: counts.implemented,
        })
        .collect();

    ChartData {
        status_distribution,
        domain_breakdown,
    }
}

/// Distinct domain names in first-seen order.
pub fn unique_domains(entries: &[AssessmentEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| seen.insert(e.domain.as_str()))
        .map(|e| e.domain.clone())
        .collect()
}

/// Everything the report screen shows, for one filter selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub filter: ReportFilter,
    pub summary: ComplianceSummary,
    pub score: u8,
    pub chart: ChartData,
}

pub fn build_report(entries: &[AssessmentEntry], filter: &ReportFilter) -> ComplianceReport {
    let filtered = filter.apply(entries);
    let summary = summarize(filtered);
    let score = summary.score();
    let chart = chart_data(&summary);

    tracing::debug!(
        entries = entries.len(),
        applicable = summary.total,
        score,
        "built compliance report"
    );

    ComplianceReport {
        filter: filter.clone(),
        summary,
        score,
        chart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(domain: &str, status: ControlStatus, priority: Priority) -> AssessmentEntry {
        AssessmentEntry {
            domain: domain.to_string(),
            subdomain: String::new(),
            domain_code: String::new(),
            control_code: "1.1.1".to_string(),
            control_name: String::new(),
            status,
            current_status: String::new(),
            recommendation: String::new(),
            management_response: String::new(),
            target_date: String::new(),
            priority,
        }
    }

    use ControlStatus::*;

    #[test]
    fn weighted_score_rounds_half_up() {
        let entries = vec![
            entry("Governance", Implemented, Priority::High),
            entry("Governance", Implemented, Priority::High),
            entry("Defense", PartiallyImplemented, Priority::Medium),
            entry("Defense", NotImplemented, Priority::Low),
        ];
        let summary = summarize(&entries);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.score(), 63);
    }

    #[test]
    fn all_not_applicable_scores_zero() {
        let entries = vec![
            entry("ICS", NotApplicable, Priority::Low),
            entry("ICS", NotApplicable, Priority::Low),
        ];
        let summary = summarize(&entries);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.not_applicable, 2);
        assert_eq!(summary.score(), 0);
        assert!(summary.domains.is_empty());
    }

    #[test]
    fn empty_input_scores_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary, ComplianceSummary::default());
        assert_eq!(summary.score(), 0);
    }

    #[test]
    fn not_applicable_excluded_from_denominator() {
        let entries = vec![
            entry("Governance", Implemented, Priority::High),
            entry("ICS", NotApplicable, Priority::Low),
        ];
        assert_eq!(summarize(&entries).score(), 100);
    }

    #[test]
    fn per_domain_counts() {
        let entries = vec![
            entry("Governance", NotImplemented, Priority::High),
            entry("Governance", PartiallyImplemented, Priority::High),
            entry("Defense", Implemented, Priority::Medium),
        ];
        let summary = summarize(&entries);

        let governance = summary.domains["Governance"];
        assert_eq!(governance.total, 2);
        assert_eq!(governance.not_implemented, 1);
        assert_eq!(governance.partially_implemented, 1);
        assert_eq!(compliance_score(&governance), 25);
        assert_eq!(summary.domains["Defense"].implemented, 1);
    }

    #[test]
    fn domain_bars_follow_input_order() {
        let entries = vec![
            entry("Governance", Implemented, Priority::High),
            entry("Defense", NotImplemented, Priority::High),
            entry("Resilience", PartiallyImplemented, Priority::Low),
            entry("Defense", Implemented, Priority::Low),
        ];
        let report = build_report(&entries, &ReportFilter::default());

        let bars: Vec<&str> = report
            .chart
            .domain_breakdown
            .iter()
            .map(|bar| bar.name.as_str())
            .collect();
        assert_eq!(bars, ["Governance", "Defense", "Resilience"]);
        assert_eq!(unique_domains(&entries), bars);
    }

    #[test]
    fn filter_by_domain_and_priority() {
        let entries = vec![
            entry("Governance", NotImplemented, Priority::High),
            entry("Governance", Implemented, Priority::Medium),
            entry("Defense", Implemented, Priority::High),
        ];

        let by_domain = ReportFilter {
            domain: Some("Governance".into()),
            priority: None,
        };
        assert_eq!(by_domain.apply(&entries).len(), 2);

        let both = ReportFilter {
            domain: Some("Governance".into()),
            priority: Some(Priority::High),
        };
        let report = build_report(&entries, &both);
        assert_eq!(report.summary.total, 1);
        assert_eq!(report.score, 0);

        assert_eq!(ReportFilter::default().apply(&entries).len(), 3);
    }

    #[test]
    fn chart_slices_in_fixed_order() {
        let entries = vec![
            entry("Governance", Implemented, Priority::High),
            entry("Defense", NotImplemented, Priority::High),
        ];
        let chart = chart_data(&summarize(&entries));

        let names: Vec<_> = chart.status_distribution.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["Not Implemented", "Partially Implemented", "Implemented"]
        );
        assert_eq!(chart.domain_breakdown.len(), 2);
        assert_eq!(chart.domain_breakdown[0].name, "Defense");
    }

    #[test]
    fn unique_domains_keeps_first_seen_order() {
        let entries = vec![
            entry("Resilience", Implemented, Priority::High),
            entry("Governance", Implemented, Priority::High),
            entry("Resilience", NotImplemented, Priority::High),
        ];
        assert_eq!(unique_domains(&entries), vec!["Resilience", "Governance"]);
    }

    #[test]
    fn status_parses_labels_and_keys() {
        assert_eq!(
            "Partially Implemented".parse::<ControlStatus>().unwrap(),
            PartiallyImplemented
        );
        assert_eq!(
            "not_applicable".parse::<ControlStatus>().unwrap(),
            NotApplicable
        );
        assert_eq!("IMPLEMENTED".parse::<ControlStatus>().unwrap(), Implemented);
        assert!("done".parse::<ControlStatus>().is_err());
    }

    #[test]
    fn entry_deserializes_from_report_json() {
        let json = r#"{
            "domain": "Cybersecurity Governance",
            "subdomain": "Cybersecurity Strategy",
            "domainCode": "1",
            "controlCode": "1.1.1",
            "controlName": "A cybersecurity strategy must be defined",
            "controlStatus": "Not Implemented",
            "priority": "High"
        }"#;
        let parsed: AssessmentEntry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.status, NotImplemented);
        assert_eq!(parsed.priority, Priority::High);
        assert!(parsed.recommendation.is_empty());
    }

    #[test]
    fn domain_bar_uses_label_keys() {
        let bar = DomainBar {
            name: "Defense".into(),
            not_implemented: 1,
            partially_implemented: 0,
            implemented: 2,
        };
        let value = serde_json::to_value(&bar).unwrap();
        assert_eq!(value["Implemented"], 2);
        assert_eq!(value["Not Implemented"], 1);
    }
}
