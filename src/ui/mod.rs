use std::time::{Duration, Instant};

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub mod client_form;
pub mod components;
pub mod home;
pub mod lead_form;

/// How long the submitted confirmation stays up before the form resets
pub const SUBMITTED_DISPLAY: Duration = Duration::from_secs(3);

/// Input poll timeout; also the tick driving the submitted-state expiry
pub const INPUT_POLL: Duration = Duration::from_millis(200);

/// Submit lifecycle of a form
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmitPhase {
    Editing,
    Submitting,
    Submitted(Instant),
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn render_popup<B: Backend>(
    frame: &mut Frame<B>,
    size: Rect,
    title: &str,
    lines: Vec<Spans>,
    color: Color,
) {
    let popup_area = centered_rect(60, 20, size);

    let popup = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .style(Style::default().fg(color));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

fn render_error<B: Backend>(frame: &mut Frame<B>, size: Rect, error: &str) {
    render_popup(
        frame,
        size,
        "Error",
        vec![
            Spans::from(""),
            Spans::from(error),
            Spans::from(""),
            Spans::from("Press any key to continue"),
        ],
        Color::Red,
    );
}

fn render_success<B: Backend>(frame: &mut Frame<B>, size: Rect, message: &str) {
    render_popup(
        frame,
        size,
        "Success",
        vec![
            Spans::from(""),
            Spans::from(message),
            Spans::from(""),
            Spans::from("The form will clear in a moment"),
        ],
        Color::Green,
    );
}

fn render_submitting<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    render_popup(
        frame,
        size,
        "Sending",
        vec![
            Spans::from(""),
            Spans::from("Sending record to the spreadsheet..."),
        ],
        Color::Yellow,
    );
}
