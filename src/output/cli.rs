use crate::model::{PackageRecord, ScanRecord, ScanReport, TamperVerdict};
use std::fmt::Write as _;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Location")]
    location: String,
}

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Tampered")]
    tampered: String,
    #[tabled(rename = "Advisories")]
    advisories: String,
}

/// Renders the console block for one audited package.
pub fn format_record(record: &ScanRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Package: {} ({})",
        record.package.name, record.package.version
    );

    if let Some(hash) = &record.local_hash {
        let _ = writeln!(out, "   Local Hash: {}", hash);
    }
    if let Some(hash) = &record.pypi_hash {
        let _ = writeln!(out, "   PyPI Official Hash: {}", hash);
    }

    let _ = writeln!(out, "   {}", verdict_line(record.tampered));

    if record.vulnerabilities.is_empty() {
        let _ = writeln!(out, "   No known vulnerabilities in OSV database");
    } else {
        let _ = writeln!(out, "   \x1b[31mVulnerabilities Found:\x1b[0m");
        for vuln in &record.vulnerabilities {
            let _ = writeln!(out, "       - {}: {}", vuln.id, vuln.summary);
        }
    }

    out
}

pub fn print_record(record: &ScanRecord) {
    println!("{}", format_record(record));
}

fn verdict_line(verdict: TamperVerdict) -> &'static str {
    match verdict {
        TamperVerdict::Tampered => "\x1b[31mTAMPERING DETECTED - hash mismatch\x1b[0m",
        TamperVerdict::Clean => "\x1b[32mNo tampering detected\x1b[0m",
        TamperVerdict::Unknown => "\x1b[33mUnable to verify tampering\x1b[0m",
    }
}

pub fn print_header() {
    println!();
    println!("=== SUPPLY CHAIN SECURITY SCANNER ===");
    println!();
}

pub fn print_summary(report: &ScanReport, report_path: Option<&Path>) {
    let findings: Vec<FindingRow> = report
        .packages
        .iter()
        .filter(|r| r.tampered == TamperVerdict::Tampered || r.is_vulnerable())
        .map(|r| FindingRow {
            package: truncate(&r.package.name, 40),
            version: r.package.version.clone(),
            tampered: match r.tampered {
                TamperVerdict::Tampered => "yes".to_string(),
                _ => "-".to_string(),
            },
            advisories: if r.vulnerabilities.is_empty() {
                "-".to_string()
            } else {
                truncate(
                    &r.vulnerabilities
                        .iter()
                        .map(|v| v.id.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    50,
                )
            },
        })
        .collect();

    if !findings.is_empty() {
        println!("Findings:");
        println!();
        let table = Table::new(findings).with(Style::rounded()).to_string();
        println!("{}", table);
        println!();
    }

    println!("Summary:");
    println!("  Total packages: {}", report.packages.len());
    println!(
        "  Tamper check: {} clean, {} tampered, {} unverified",
        report.count_verdict(TamperVerdict::Clean),
        report.count_verdict(TamperVerdict::Tampered),
        report.count_verdict(TamperVerdict::Unknown)
    );
    println!(
        "  Vulnerabilities: {} across {} packages",
        report.vulnerability_count(),
        report.vulnerable_count()
    );

    if let Some(path) = report_path {
        println!();
        println!("Scan Complete. Report saved as {}", path.display());
    }
    println!();
}

pub fn print_package_table(packages: &[PackageRecord]) {
    if packages.is_empty() {
        println!("No packages found.");
        return;
    }

    println!("Found {} packages:", packages.len());
    println!();

    let rows: Vec<PackageRow> = packages
        .iter()
        .map(|p| PackageRow {
            name: truncate(&p.name, 40),
            version: p.version.clone(),
            location: p.location.display().to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
