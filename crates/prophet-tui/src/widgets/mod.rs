// TUI widget modules for each screen zone.

pub mod help_bar;
pub mod parlay;
pub mod prediction;
pub mod quit_confirm;
pub mod status_bar;
pub mod wizard;

use ratatui::style::{Color, Style};

use prophet_core::payload::{ConfidenceTier, ProbabilityBand};

/// Border style for a panel, highlighted when it has keyboard focus.
pub fn focused_border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Colour for a probability in percent: >= 60 green, >= 45 yellow, else red.
pub fn probability_color(probability: f64) -> Color {
    match ProbabilityBand::of(probability) {
        ProbabilityBand::Favourable => Color::Green,
        ProbabilityBand::CoinFlip => Color::Yellow,
        ProbabilityBand::Unfavourable => Color::Red,
    }
}

pub fn confidence_color(tier: ConfidenceTier) -> Color {
    match tier {
        ConfidenceTier::Top => Color::Green,
        ConfidenceTier::Middle => Color::Yellow,
        ConfidenceTier::Bottom => Color::Red,
    }
}
