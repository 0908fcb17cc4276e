//! Dataset Widget
//!
//! Modal dialog for picking or uploading the dataset to chat about.

use crate::flows::ModalState;
use crate::tui::app::{App, ModalFocus};
use crate::tui::theme::{Icons, Theme};
use crate::tui::ui::centered_rect;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the dataset modal
pub fn render_dataset_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Select Dataset ")
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Upload path
            Constraint::Min(5),    // File list
            Constraint::Length(2), // Status
        ])
        .split(inner);

    render_upload(frame, chunks[0], app);
    render_file_list(frame, chunks[1], app);
    render_status(frame, chunks[2], app);
}

fn render_upload(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.modal_focus == ModalFocus::UploadPath;

    let mut spans = vec![];
    if app.dataset.state() == ModalState::Uploading {
        spans.push(Span::styled("Uploading...", Theme::active()));
    } else if app.upload_path.is_empty() {
        spans.push(Span::styled(
            "Path of a .csv or .xlsx file to upload",
            Theme::placeholder(),
        ));
    } else {
        spans.push(Span::styled(app.upload_path.clone(), Theme::text()));
    }
    if focused {
        spans.push(Span::styled(Icons::CURSOR, Theme::active()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Upload ")
            .borders(Borders::ALL)
            .border_style(if focused {
                Theme::border_focused()
            } else {
                Theme::border()
            }),
    );
    frame.render_widget(paragraph, area);
}

fn render_file_list(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.modal_focus == ModalFocus::Files;
    let files = app.dataset.files();

    let mut lines = Vec::new();
    if files.is_empty() && !app.dataset.is_busy() {
        lines.push(Line::from(Span::styled(
            "No files available",
            Theme::text_dim(),
        )));
    }

    for (i, file) in files.iter().enumerate() {
        let is_selected = focused && i == app.dataset.highlighted();
        let is_active = app.active_file.as_deref() == Some(file.filename.as_str());

        let prefix = if is_selected { Icons::SELECTED } else { " " };
        let name_style = if is_selected {
            Theme::selected()
        } else {
            Theme::text()
        };

        let mut spans = vec![
            Span::styled(format!("{} ", prefix), name_style),
            Span::styled(file.filename.clone(), name_style),
        ];
        if is_active {
            spans.push(Span::styled("  (active)", Theme::success()));
        }
        lines.push(Line::from(spans));
    }

    // Keep the highlighted row visible in long lists
    let visible = area.height.saturating_sub(2) as usize;
    let offset = app.dataset.highlighted().saturating_sub(visible.saturating_sub(1));

    let paragraph = Paragraph::new(lines)
        .scroll((offset as u16, 0))
        .block(
            Block::default()
                .title(" Files ")
                .borders(Borders::ALL)
                .border_style(if focused {
                    Theme::border_focused()
                } else {
                    Theme::border()
                }),
        );
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();

    match app.dataset.state() {
        ModalState::Listing | ModalState::Selecting => {
            lines.push(Line::from(Span::styled("Loading...", Theme::active())));
        }
        _ => {
            if let Some(error) = app.dataset.error() {
                lines.push(Line::from(Span::styled(
                    format!("{} {}", Icons::ERROR, error),
                    Theme::error(),
                )));
            }
        }
    }

    lines.push(Line::from(vec![
        Span::styled("[Tab]", Theme::shortcut_key()),
        Span::styled(" Switch ", Theme::shortcut_desc()),
        Span::styled("[↑/↓]", Theme::shortcut_key()),
        Span::styled(" Pick ", Theme::shortcut_desc()),
        Span::styled("[Enter]", Theme::shortcut_key()),
        Span::styled(" Select / Upload ", Theme::shortcut_desc()),
        Span::styled("[Esc]", Theme::shortcut_key()),
        Span::styled(" Close", Theme::shortcut_desc()),
    ]));

    frame.render_widget(Paragraph::new(lines), area);
}
