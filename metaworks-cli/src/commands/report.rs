//! `metaworks report`: offline compliance report over exported entries
//!
//! Input is a JSON array of assessment entries, the same shape the report
//! endpoint consumes.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::json;

use metaworks_core::{build_report, domain_heat, unique_domains, AssessmentEntry, ReportFilter};

#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// JSON file holding an array of assessment entries
    pub file: PathBuf,

    /// Only include this domain
    #[arg(long)]
    pub domain: Option<String>,

    /// Only include this priority (low, medium, high)
    #[arg(long)]
    pub priority: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

pub fn run_report(args: ReportArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let entries: Vec<AssessmentEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a list of assessment entries", args.file.display()))?;

    let priority = match args.priority.as_deref() {
        None | Some("all") => None,
        Some(p) => Some(p.parse().context("Invalid --priority")?),
    };
    let filter = ReportFilter {
        domain: args.domain.filter(|d| d != "all"),
        priority,
    };

    let report = build_report(&entries, &filter);
    let heat = domain_heat(&report.summary);

    match args.format {
        ReportFormat::Json => {
            let out = json!({
                "report": report,
                "heat": heat,
                "domains": unique_domains(&entries),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ReportFormat::Text => {
            let s = &report.summary;
            println!("Compliance score: {}%", report.score);
            println!(
                "Applicable controls: {}  (implemented {}, partial {}, not implemented {})",
                s.total, s.implemented, s.partially_implemented, s.not_implemented
            );
            println!("Not applicable: {}", s.not_applicable);
            if !heat.is_empty() {
                println!();
                println!("{:<32} {:>6} {:>6}  {}", "Domain", "Total", "Risk", "Band");
                for row in &heat {
                    println!(
                        "{:<32} {:>6} {:>5}%  {}",
                        row.domain, row.counts.total, row.risk_level, row.label
                    );
                }
            }
        }
    }

    Ok(())
}
