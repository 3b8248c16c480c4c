//! Terminal output helpers
//!
//! Coloured status lines for the human-facing `validate` and `templates`
//! commands; `render` output stays plain.

use colored::Colorize;

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

// stderr, so an empty template list stays empty on stdout
pub fn print_warning(message: &str) {
    eprintln!("{}", format!("⚠️  {}", message).bright_yellow());
}
