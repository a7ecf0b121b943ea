//! Terminal styling utilities for the dashboard and predictor screens

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static CARD: Emoji<'_, '_> = Emoji("💳 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static BRAIN: Emoji<'_, '_> = Emoji("🧠 ", "");

/// Print the application banner
pub fn print_banner(version: &str, screen: &str) {
    println!();
    println!(
        "    {}{}",
        CARD,
        style("Customer Churn Intelligence").color256(208).bold()
    );
    println!(
        "    {} {}",
        style(screen).white().bold(),
        style(format!("v{}", version)).dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print the dataset card shown after loading
pub fn print_dataset_card(input: &Path, target: &str, rows: usize, cols: usize) {
    println!("      {} File:    {}", FOLDER, truncate_path(input, 40));
    println!("      {} Target:  {}", TARGET, truncate_string(target, 40));
    println!("      Rows: {}    Columns: {}", style(rows).yellow(), style(cols).yellow());
}

/// Print a section header with styling
pub fn print_section_header(number: usize, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("{}", number)).color256(208).bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(60)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print a fatal error message to stderr
pub fn print_error(message: &str) {
    eprintln!("    {} {}", style("❌").red(), style(message).red().bold());
}

/// Print a narrative insight line
pub fn print_insight(heading: &str, text: &str) {
    println!(
        "    {} {} {}",
        BRAIN,
        style(format!("{}:", heading)).bold(),
        text
    );
}

/// Format a number rounded to an integer with thousands separators
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Format a fraction in [0, 1] as a percentage
pub fn format_rate(rate: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, rate * 100.0)
}

/// Horizontal bar for a fraction in [0, 1]
pub fn rate_bar(rate: f64, width: usize) -> String {
    let filled = (rate.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
