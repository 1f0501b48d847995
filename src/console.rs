//! Colorful console output for optimize runs.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::time::Duration;

use crate::domain::OptimizeStatus;
use crate::dto::OptimizeResponse;

/// ASCII art banner for server startup.
pub fn print_banner(solver: &str) {
    let banner = r#"
  ____            _
 |  _ \ ___  ___| |_ ___ _ __
 | |_) / _ \/ __| __/ _ \ '__|
 |  _ < (_) \__ \ ||  __/ |
 |_| \_\___/|___/\__\___|_|
"#;
    println!("{}", banner.cyan().bold());
    println!(
        "  {} {} {}\n",
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black(),
        "Roster Optimizer".bright_cyan(),
        format!("({solver})").bright_black()
    );
}

/// Prints model size once constraints are built.
pub fn print_model_built(
    employees: usize,
    shifts: usize,
    pairs: usize,
    variables: usize,
    constraints: usize,
) {
    println!(
        "{} {} {} Problem: employees ({}), shifts ({}), eligible pairs ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Model]".bright_cyan(),
        employees.to_formatted_string(&Locale::en).bright_yellow(),
        shifts.to_formatted_string(&Locale::en).bright_yellow(),
        pairs.to_formatted_string(&Locale::en).bright_yellow()
    );
    println!(
        "{} {} {} variable count ({}), constraint count ({}), density ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Model]".bright_cyan(),
        variables.to_formatted_string(&Locale::en).bright_yellow(),
        constraints.to_formatted_string(&Locale::en).bright_yellow(),
        format_density(pairs, employees, shifts).bright_magenta()
    );
}

/// Prints the summary box for a finished request.
pub fn print_outcome(response: &OptimizeResponse, elapsed: Duration) {
    let diagnostics = &response.diagnostics;
    println!(
        "{} {} {} Optimize ended: time spent ({}), status ({}), fitness ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Solver]".bright_cyan(),
        format_duration(elapsed).yellow(),
        format_status(response.status),
        format_fitness(response.fitness)
    );

    // 60 chars wide, 56 char content area
    println!();
    println!("{}", "╔══════════════════════════════════════════════════════════╗".bright_cyan());

    let status_text = match response.status {
        OptimizeStatus::Optimal => "✓ OPTIMAL ROSTER FOUND",
        OptimizeStatus::Feasible => "✓ FEASIBLE ROSTER FOUND",
        OptimizeStatus::Infeasible => "✗ INFEASIBLE (no valid roster)",
        OptimizeStatus::Timeout => "✗ TIMEOUT (no roster in budget)",
        OptimizeStatus::OptimalRelaxed => "~ RELAXED ROSTER FOUND",
        OptimizeStatus::Error => "✗ ERROR",
    };
    let status_colored = if response.status.is_solved() {
        status_text.bright_green().bold().to_string()
    } else {
        status_text.bright_red().bold().to_string()
    };
    let status_padding = 56usize.saturating_sub(status_text.chars().count());
    let left_pad = status_padding / 2;
    let right_pad = status_padding - left_pad;
    println!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    );

    println!("{}", "╠══════════════════════════════════════════════════════════╣".bright_cyan());

    let fitness = response
        .fitness
        .map(|f| f.to_string())
        .unwrap_or_else(|| "-".to_string());
    print_row("Fitness:", &fitness);
    print_row(
        "Assigned:",
        &format!(
            "{} / {}",
            diagnostics.assigned_shifts.to_formatted_string(&Locale::en),
            diagnostics.total_shifts.to_formatted_string(&Locale::en)
        ),
    );
    print_row("Solve Time:", &format!("{:.2}s", elapsed.as_secs_f64()));
    if let Some(relaxed) = &response.relaxed_solution {
        print_row(
            "Relaxed Assigned:",
            &relaxed.assignments.len().to_formatted_string(&Locale::en),
        );
    }

    println!("{}", "╚══════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}

fn print_row(label: &str, value: &str) {
    println!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        label,
        value,
        "║".bright_cyan()
    );
}

/// Formats a duration nicely.
fn format_duration(d: Duration) -> String {
    let total_ms = d.as_millis();
    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        let mins = total_ms / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

fn format_status(status: OptimizeStatus) -> String {
    if status.is_solved() {
        status.as_str().bright_green().to_string()
    } else {
        status.as_str().bright_red().to_string()
    }
}

fn format_fitness(fitness: Option<i64>) -> String {
    match fitness {
        Some(n) if n < 0 => n.to_string().yellow().to_string(),
        Some(n) if n > 0 => n.to_string().bright_green().to_string(),
        Some(n) => n.to_string().white().to_string(),
        None => "-".bright_black().to_string(),
    }
}

/// Share of employee×shift pairs that survived filtering.
fn format_density(pairs: usize, employees: usize, shifts: usize) -> String {
    let possible = employees * shifts;
    if possible == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", pairs as f64 * 100.0 / possible as f64)
}

/// Returns a timestamp string.
fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs();
            let millis = d.subsec_millis();
            format!("{}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "0.000".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_format_density() {
        assert_eq!(format_density(0, 0, 5), "0.0%");
        assert_eq!(format_density(3, 2, 3), "50.0%");
    }
}
