//! Console summary of a completed run

use super::RunSummary;
use crate::config::ProcessorConfig;
use crate::report::ReportKind;
use colored::*;

/// Print audit findings, written reports and final statistics to stdout
pub fn print_summary(summary: &RunSummary, config: &ProcessorConfig) {
    println!("\n{}", "Data quality check".bright_yellow().bold());
    if summary.audit.is_clean() {
        println!("  {}", "No data quality issues found".bright_green());
    } else {
        for line in summary.audit.summary_lines() {
            println!("  {} {}", "!".bright_red().bold(), line);
        }
        println!("\n  {}", "Details:".bright_cyan());
        for issue in &summary.audit.issues {
            println!("    {}", issue.message);
        }
    }

    let verb = if summary.dry_run { "would write" } else { "wrote" };
    for (kind, title, folder) in [
        (ReportKind::Vehicle, "Vehicle reports", config.vehicle_output_dir()),
        (ReportKind::Driver, "Driver reports", config.driver_output_dir()),
    ] {
        println!(
            "\n{} {}",
            title.bright_yellow().bold(),
            format!("({})", folder.display()).bright_black()
        );
        for report in summary.reports_of(kind) {
            let file_name = report
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!(
                "  {} {} (records: {}, total: {})",
                verb.bright_green(),
                file_name.bright_white(),
                report.record_count,
                report.total
            );
        }
    }

    println!("\n{}", "Processing complete".bright_green().bold());
    println!(
        "  {} {} of {}",
        "Files parsed:".bright_cyan(),
        summary.files_parsed(),
        summary.files_seen()
    );
    println!(
        "  {} {}",
        "Records:".bright_cyan(),
        summary.record_count().to_string().bright_white().bold()
    );

    let plates = summary.unique_plates();
    let drivers = summary.unique_drivers();
    println!(
        "  {} {} ({})",
        "Vehicles:".bright_cyan(),
        plates.len(),
        plates.join(", ")
    );
    println!(
        "  {} {} ({})",
        "Drivers:".bright_cyan(),
        drivers.len(),
        drivers.join(", ")
    );
    println!(
        "  {} {}",
        "Grand total:".bright_cyan(),
        summary.grand_total().to_string().bright_white().bold()
    );
    println!(
        "  {} {:.2?}",
        "Processing time:".bright_cyan(),
        summary.elapsed
    );
    if summary.dry_run {
        println!("  {}", "Dry run: no files were written".bright_yellow());
    }
}
