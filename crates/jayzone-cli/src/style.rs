//! Terminal styling helpers.

use jayzone_types::DisplayHint;
use owo_colors::OwoColorize;

/// Color `text` according to a zone's display hint.
pub fn paint_hint(text: &str, hint: DisplayHint, no_color: bool) -> String {
    if no_color {
        return text.to_string();
    }
    match hint {
        DisplayHint::Blue => format!("{}", text.blue()),
        DisplayHint::Green => format!("{}", text.green()),
        DisplayHint::Yellow => format!("{}", text.yellow()),
        // Closest ANSI color to orange
        DisplayHint::Orange => format!("{}", text.bright_red()),
        DisplayHint::Red => format!("{}", text.red()),
        DisplayHint::Gray => format!("{}", text.dimmed()),
    }
}

/// Ten-cell bar for a progress ratio in `[0, 1]`.
pub fn progress_bar(progress: f64, hint: DisplayHint, no_color: bool) -> String {
    let filled = (progress.clamp(0.0, 1.0) * 10.0).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled));
    if progress >= 1.0 && !no_color {
        format!("{}", bar.green())
    } else {
        paint_hint(&bar, hint, no_color)
    }
}

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let rule = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, rule)
    } else {
        format!("{}\n{}", title.bold(), rule.dimmed())
    }
}
