//! Presentation of a successfully parsed audit result.

use anyhow::Result;
use colored::*;

use crate::schemas::{AnalysisResult, SeverityLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

pub fn render_report(result: &AnalysisResult, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => render_text(result),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        ReportFormat::Markdown => render_markdown(result),
    }
}

fn score_banner(score: f64) -> ColoredString {
    let text = format!("Safety score: {:.0}/100", score);
    if score >= 80.0 {
        text.bright_green().bold()
    } else if score >= 50.0 {
        text.yellow().bold()
    } else {
        text.red().bold()
    }
}

fn severity_tag(severity: SeverityLevel) -> ColoredString {
    match severity {
        SeverityLevel::Critical => "CRITICAL".red().bold(),
        SeverityLevel::High => "HIGH".bright_red(),
        SeverityLevel::Medium => "MEDIUM".yellow(),
        SeverityLevel::Low => "LOW".bright_yellow(),
        SeverityLevel::Informational => "INFO".bright_blue(),
    }
}

fn render_text(result: &AnalysisResult) -> Result<String> {
    use std::fmt::Write;
    let mut output = String::new();

    writeln!(&mut output, "\n{}", "════════════════════════════════════════".bright_blue())?;
    writeln!(&mut output, "{}", "       SMART CONTRACT AUDIT REPORT".bright_blue().bold())?;
    writeln!(&mut output, "{}", "════════════════════════════════════════".bright_blue())?;

    writeln!(&mut output, "\n{}", score_banner(result.score))?;
    writeln!(&mut output, "\n{}", result.summary)?;
    writeln!(&mut output, "\n{} {}", "Recommendation:".bright_white().bold(), result.recommendation)?;

    if result.vulnerabilities.is_empty() {
        writeln!(&mut output, "\n{}", "✨ No vulnerabilities reported".green())?;
    } else {
        for severity in SeverityLevel::ALL {
            let group: Vec<_> = result
                .vulnerabilities
                .iter()
                .filter(|v| v.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }

            writeln!(&mut output, "\n{} {} ({})", "▶".bright_white(), severity_tag(severity), group.len())?;
            writeln!(&mut output, "{}", "─".repeat(40).bright_black())?;
            for vuln in group {
                writeln!(&mut output, "  {} {}", "•".bright_white(), vuln.name.bright_white().bold())?;
                writeln!(&mut output, "    {}", vuln.description.bright_black())?;
            }
        }
    }

    writeln!(&mut output, "\n{}", "Tokenomics".bright_cyan().bold())?;
    writeln!(&mut output, "{}", "─".repeat(40).bright_black())?;
    let verdict = if result.tokenomics.passed_audit_standards {
        "✓ Passed audit standards".green()
    } else {
        "✗ Did not pass audit standards".red()
    };
    writeln!(&mut output, "  {}", verdict)?;
    writeln!(&mut output, "  {}", result.tokenomics.analysis)?;

    if !result.exchange_red_flags.is_empty() {
        writeln!(&mut output, "\n{}", "Exchange Red Flags".bright_red().bold())?;
        writeln!(&mut output, "{}", "─".repeat(40).bright_black())?;
        for flag in &result.exchange_red_flags {
            writeln!(&mut output, "  {} {}", "⚑".bright_red(), flag.flag.bright_white())?;
            writeln!(&mut output, "    {}", flag.description.bright_black())?;
        }
    }

    Ok(output)
}

fn render_markdown(result: &AnalysisResult) -> Result<String> {
    use std::fmt::Write;
    let mut output = String::new();

    writeln!(&mut output, "# Smart Contract Audit Report")?;
    writeln!(&mut output, "\n**Date:** {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(&mut output, "**Safety score:** {:.0}/100", result.score)?;

    writeln!(&mut output, "\n## Summary\n\n{}", result.summary)?;
    writeln!(&mut output, "\n**Recommendation:** {}", result.recommendation)?;

    writeln!(&mut output, "\n## Vulnerabilities")?;
    if result.vulnerabilities.is_empty() {
        writeln!(&mut output, "\n*None reported.*")?;
    } else {
        writeln!(&mut output, "\n| Severity | Count |")?;
        writeln!(&mut output, "|----------|-------|")?;
        for severity in SeverityLevel::ALL {
            let count = result
                .vulnerabilities
                .iter()
                .filter(|v| v.severity == severity)
                .count();
            if count > 0 {
                writeln!(&mut output, "| {} | {} |", severity, count)?;
            }
        }

        for (i, vuln) in result.vulnerabilities.iter().enumerate() {
            let badge = match vuln.severity {
                SeverityLevel::Critical => "🔴 **CRITICAL**",
                SeverityLevel::High => "🟠 **HIGH**",
                SeverityLevel::Medium => "🟡 **MEDIUM**",
                SeverityLevel::Low => "🟢 **LOW**",
                SeverityLevel::Informational => "🔵 **INFO**",
            };
            writeln!(&mut output, "\n### {}. {} {}", i + 1, badge, vuln.name)?;
            writeln!(&mut output, "\n{}", vuln.description)?;
        }
    }

    writeln!(&mut output, "\n## Tokenomics")?;
    writeln!(
        &mut output,
        "\n**Passed audit standards:** {}",
        if result.tokenomics.passed_audit_standards { "yes" } else { "no" }
    )?;
    writeln!(&mut output, "\n{}", result.tokenomics.analysis)?;

    writeln!(&mut output, "\n## Exchange Red Flags")?;
    if result.exchange_red_flags.is_empty() {
        writeln!(&mut output, "\n*None reported.*")?;
    } else {
        for flag in &result.exchange_red_flags {
            writeln!(&mut output, "\n- **{}**: {}", flag.flag, flag.description)?;
        }
    }

    Ok(output)
}
