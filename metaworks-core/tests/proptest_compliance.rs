use metaworks_core::{
    build_report, compliance_score, summarize, AssessmentEntry, ControlStatus, Priority,
    ReportFilter,
};
use proptest::prelude::*;

const DOMAINS: [&str; 4] = ["Governance", "Defense", "Resilience", "Third-Party"];

fn arb_status() -> impl Strategy<Value = ControlStatus> {
    prop_oneof![
        Just(ControlStatus::Implemented),
        Just(ControlStatus::PartiallyImplemented),
        Just(ControlStatus::NotImplemented),
        Just(ControlStatus::NotApplicable),
    ]
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
}

fn arb_entry() -> impl Strategy<Value = AssessmentEntry> {
    (0..DOMAINS.len(), arb_status(), arb_priority(), 1u8..20).prop_map(
        |(domain, status, priority, n)| AssessmentEntry {
            domain: DOMAINS[domain].to_string(),
            subdomain: String::new(),
            domain_code: (domain + 1).to_string(),
            control_code: format!("{}.1.{}", domain + 1, n),
            control_name: String::new(),
            status,
            current_status: String::new(),
            recommendation: String::new(),
            management_response: String::new(),
            target_date: String::new(),
            priority,
        },
    )
}

fn arb_filter() -> impl Strategy<Value = ReportFilter> {
    (
        prop::option::of(0..DOMAINS.len()),
        prop::option::of(arb_priority()),
    )
        .prop_map(|(domain, priority)| ReportFilter {
            domain: domain.map(|d| DOMAINS[d].to_string()),
            priority,
        })
}

proptest! {
    /// Property: applicable entries are partitioned by status
    #[test]
    fn prop_counts_partition_applicable(entries in prop::collection::vec(arb_entry(), 0..200)) {
        let summary = summarize(&entries);
        let applicable = entries.iter().filter(|e| e.status.is_applicable()).count();

        prop_assert_eq!(
            summary.implemented + summary.partially_implemented + summary.not_implemented,
            summary.total
        );
        prop_assert_eq!(summary.total, applicable);
        prop_assert_eq!(summary.total + summary.not_applicable, entries.len());
    }

    /// Property: score stays in [0, 100] and is 0 with nothing applicable
    #[test]
    fn prop_score_bounded(entries in prop::collection::vec(arb_entry(), 0..200)) {
        let summary = summarize(&entries);
        let score = summary.score();

        prop_assert!(score <= 100);
        if summary.total == 0 {
            prop_assert_eq!(score, 0);
        }
        for counts in summary.domains.values() {
            prop_assert!(compliance_score(counts) <= 100);
        }
    }

    /// Property: per-domain totals add up to the overall totals
    #[test]
    fn prop_domain_counts_sum_to_total(entries in prop::collection::vec(arb_entry(), 0..200)) {
        let summary = summarize(&entries);

        let total: usize = summary.domains.values().map(|c| c.total).sum();
        let implemented: usize = summary.domains.values().map(|c| c.implemented).sum();
        let partial: usize = summary.domains.values().map(|c| c.partially_implemented).sum();
        let missing: usize = summary.domains.values().map(|c| c.not_implemented).sum();

        prop_assert_eq!(total, summary.total);
        prop_assert_eq!(implemented, summary.implemented);
        prop_assert_eq!(partial, summary.partially_implemented);
        prop_assert_eq!(missing, summary.not_implemented);
    }

    /// Property: filtering never grows the result set
    #[test]
    fn prop_filter_never_grows(
        entries in prop::collection::vec(arb_entry(), 0..200),
        filter in arb_filter(),
    ) {
        let unfiltered = build_report(&entries, &ReportFilter::default());
        let filtered = build_report(&entries, &filter);

        prop_assert!(filter.apply(&entries).len() <= entries.len());
        prop_assert!(filtered.summary.total <= unfiltered.summary.total);
        prop_assert!(filtered.summary.not_applicable <= unfiltered.summary.not_applicable);
    }

    /// Property: the score matches the float formula it is specified by
    #[test]
    fn prop_score_matches_formula(entries in prop::collection::vec(arb_entry(), 1..200)) {
        let summary = summarize(&entries);
        prop_assume!(summary.total > 0);

        // Integer numerator keeps exact halves exact after one division.
        let numerator = (summary.implemented * 100 + summary.partially_implemented * 50) as f64;
        let expected = (numerator / summary.total as f64).round() as u8;
        prop_assert_eq!(summary.score(), expected);
    }
}
