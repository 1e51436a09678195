//! Pure formatting functions for console output.
//!
//! This module contains all display logic for the status lines a workflow log shows.
//! Diagnostic logging goes through `tracing`; these lines are the human-facing summary.

use console::style;

use crate::analyzer::BumpDecision;
use crate::boundary::BoundaryWarning;

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Render the version decision as "From: X -> To: Y (bump, label)"
pub fn format_decision(decision: &BumpDecision) -> String {
    let label = decision.applied_label.as_deref().unwrap_or("no label");
    format!(
        "{} -> {} ({} bump, label: {})",
        decision.previous, decision.next, decision.bump, label
    )
}

/// Display the proposed version change.
pub fn display_decision(decision: &BumpDecision) {
    println!("\n{}", style("Proposed Version Change:").bold());
    println!("  From: {}", style(decision.previous).red());
    println!("  To:   {}", style(decision.next).green());
    println!(
        "  Bump: {} ({})",
        decision.bump,
        decision.applied_label.as_deref().unwrap_or("no label")
    );
}
