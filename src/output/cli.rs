use crate::model::{Advisory, Severity};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct AdvisoryRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Installed")]
    installed: String,
    #[tabled(rename = "Patched")]
    patched: String,
    #[tabled(rename = "CVE")]
    cves: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Title")]
    title: String,
}

pub fn print_cli_table(advisories: &[Advisory]) -> Result<()> {
    println!();

    if advisories.is_empty() {
        println!("No advisories found.");
        return Ok(());
    }

    println!("Found {} advisories:", advisories.len());
    println!();

    let mut sorted: Vec<&Advisory> = advisories.iter().collect();
    // Stable sort keeps feed order within a severity
    sorted.sort_by_key(|a| std::cmp::Reverse(a.severity_level()));

    let rows: Vec<AdvisoryRow> = sorted.iter().map(|a| advisory_row(a)).collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    println!();
    println!("More info:");
    for advisory in &sorted {
        println!("  {}: {}", advisory.id, advisory.url());
    }

    println!();
    print_summary(advisories);

    Ok(())
}

fn advisory_row(advisory: &Advisory) -> AdvisoryRow {
    AdvisoryRow {
        severity: format_severity(&advisory.severity_level()),
        id: advisory.id,
        module: truncate(or_dash(&advisory.module_name), 30),
        installed: or_dash(&advisory.version).to_string(),
        patched: truncate(or_dash(&advisory.patched_versions), 20),
        cves: if advisory.cves.is_empty() {
            "-".to_string()
        } else {
            advisory.cves.join(", ")
        },
        updated: format_date(advisory),
        title: truncate(or_dash(&advisory.title), 50),
    }
}

/// Last modification date, falling back to the publication date.
fn format_date(advisory: &Advisory) -> String {
    advisory
        .updated_at()
        .or_else(|| advisory.created_at())
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_summary(advisories: &[Advisory]) {
    let count = |severity: Severity| {
        advisories
            .iter()
            .filter(|a| a.severity_level() == severity)
            .count()
    };

    println!("Summary:");
    println!("  Total advisories: {}", advisories.len());
    for severity in [
        Severity::Critical,
        Severity::High,
        Severity::Moderate,
        Severity::Low,
        Severity::Info,
    ] {
        let n = count(severity);
        if n > 0 {
            println!("    {}: {}", format_severity(&severity), n);
        }
    }

    let unresolved = advisories.iter().filter(|a| a.version.is_none()).count();
    if unresolved > 0 {
        println!("  Installed version unresolved: {}", unresolved);
    }
}

fn format_severity(severity: &Severity) -> String {
    match severity {
        Severity::Critical => "\x1b[31mCRITICAL\x1b[0m".to_string(),
        Severity::High => "\x1b[91mHIGH\x1b[0m".to_string(),
        Severity::Moderate => "\x1b[33mMODERATE\x1b[0m".to_string(),
        Severity::Low => "\x1b[32mLOW\x1b[0m".to_string(),
        Severity::Info => "INFO".to_string(),
        Severity::Unknown => "UNKNOWN".to_string(),
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
