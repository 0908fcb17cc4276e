//! UI Rendering
//!
//! Main UI layout and rendering logic for the TUI.

use crate::models::{Message, Role};
use crate::tui::app::{App, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const EXAMPLE_QUESTIONS: [&str; 4] = [
    "Which region has the highest total cost?",
    "Show me all incidents from Karachi Plant",
    "How many incidents are recordable?",
    "What are the top 5 most expensive incidents?",
];

/// Render the main UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let banner = app.chat.error().is_some();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                          // Header
            Constraint::Min(8),                             // Messages
            Constraint::Length(if banner { 1 } else { 0 }), // Error banner
            Constraint::Length(4),                          // Input
            Constraint::Length(1),                          // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_messages(frame, chunks[1], app);
    render_banner(frame, chunks[2], app);
    render_input(frame, chunks[3], app);
    render_status_bar(frame, chunks[4], app);

    if app.dataset.is_open() {
        widgets::render_dataset_modal(frame, app);
    }
    if app.view == View::Help {
        render_help(frame);
    }
}

/// Render the header with the active dataset
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let dataset = match &app.active_file {
        Some(file) => Span::styled(file.clone(), Theme::success()),
        None => Span::styled("no dataset", Theme::text_dim()),
    };

    let title = Paragraph::new(Line::from(vec![
        Span::styled("Excel Incident Chatbot", Theme::title()),
        Span::styled("  Dataset: ", Theme::text_secondary()),
        dataset,
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    frame.render_widget(title, area);
}

/// Render the message history
fn render_messages(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .title(" Messages ")
        .borders(Borders::ALL)
        .border_style(if app.view == View::Chat && !app.dataset.is_open() {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();

    if app.active_file.is_none() {
        lines.push(Line::from(Span::styled(
            "Please select or upload a dataset to start (Ctrl+D).",
            Theme::warning(),
        )));
        lines.push(Line::from(""));
    }

    if app.store.messages().is_empty() {
        lines.push(Line::from(Span::styled(
            "Try asking things like:",
            Theme::text_secondary(),
        )));
        for question in EXAMPLE_QUESTIONS {
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", Icons::DOT), Theme::text_dim()),
                Span::styled(format!("\"{}\"", question), Theme::text_dim()),
            ]));
        }
    }

    for msg in app.store.messages() {
        push_message(&mut lines, msg, width);
        lines.push(Line::from("")); // Spacing
    }

    if app.chat.loading() {
        let dots = ".".repeat(app.tick / 3 % 3 + 1);
        lines.push(Line::from(vec![
            Span::styled("Bot: ", Theme::assistant_message()),
            Span::styled(format!("typing{}", dots), Theme::active()),
        ]));
    }

    app.update_scroll_bounds(content_height(lines.len()), inner.height);

    let paragraph = Paragraph::new(lines).scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, inner);
}

fn push_message(lines: &mut Vec<Line<'static>>, msg: &Message, width: usize) {
    let (prefix, style) = match msg.role {
        Role::User => ("You", Theme::user_message()),
        Role::Assistant => ("Bot", Theme::assistant_message()),
    };
    lines.push(Line::from(Span::styled(format!("{}: ", prefix), style)));

    if let Some(rows) = &msg.data {
        lines.extend(widgets::result_lines(rows));
        return;
    }

    let text = msg.text.as_deref().unwrap_or_default();
    for line in text.lines() {
        for chunk in wrap_line(line, width.saturating_sub(2)) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(chunk, Theme::text()),
            ]));
        }
    }
}

/// Line count as a scroll height, saturating instead of wrapping
fn content_height(lines: usize) -> u16 {
    u16::try_from(lines).unwrap_or(u16::MAX)
}

/// Break a line at whitespace so that no piece exceeds `width` characters
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 || line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let needed = if current.is_empty() { 0 } else { 1 } + word.chars().count();
        if !current.is_empty() && current.chars().count() + needed > width {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);

        // Words longer than the viewport are hard-split
        while current.chars().count() > width {
            let split = current
                .char_indices()
                .nth(width)
                .map_or(current.len(), |(idx, _)| idx);
            let rest = current.split_off(split);
            out.push(std::mem::replace(&mut current, rest));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Render the validation/backend error banner
fn render_banner(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(error) = app.chat.error() {
        let line = Line::from(vec![
            Span::styled(format!(" {} ", Icons::ERROR), Theme::error()),
            Span::styled(error.to_string(), Theme::error()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Render the input area
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.view == View::Chat && !app.dataset.is_open();

    let block = Block::default()
        .title(" Input ")
        .borders(Borders::ALL)
        .border_style(if is_focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = if app.chat.loading() {
        Span::styled("Waiting for answer...", Theme::active())
    } else if let Some(notice) = &app.notice {
        Span::styled(notice.clone(), Theme::success())
    } else {
        Span::styled("Ready", Theme::text_secondary())
    };

    let mut spans = vec![status, Span::raw(" │ ")];
    for (key, desc) in [
        ("[Enter]", " Send "),
        ("[Ctrl+D]", " Dataset "),
        ("[Ctrl+R]", " Reset "),
        ("[Ctrl+E]", " Export "),
        ("[Ctrl+Q]", " Quit "),
        ("[F1]", " Help"),
    ] {
        spans.push(Span::styled(key, Theme::shortcut_key()));
        spans.push(Span::styled(desc, Theme::shortcut_desc()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let mut help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
    ];
    for (key, desc) in [
        ("Enter        ", "Send question / Confirm in dataset dialog"),
        ("Shift+Enter  ", "New line"),
        ("Ctrl+D       ", "Open or close the dataset dialog"),
        ("Ctrl+R       ", "Reset the conversation"),
        ("Ctrl+E       ", "Export the latest table as CSV"),
        ("Ctrl+Q       ", "Quit application"),
        ("Ctrl+C       ", "Force quit"),
        ("↑/↓          ", "Scroll messages / Pick a file"),
        ("PageUp/Down  ", "Scroll page"),
        ("Tab          ", "Switch between file list and upload path"),
        ("Esc          ", "Close dialog"),
        ("F1           ", "Show this help"),
    ] {
        help_lines.push(Line::from(vec![
            Span::styled(key, Theme::shortcut_key()),
            Span::styled(desc, Theme::text()),
        ]));
    }
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Theme::text_dim(),
    )));

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
