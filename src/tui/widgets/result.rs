//! Result Widget
//!
//! Styled lines for a query result inside the message history.

use crate::models::RowObject;
use crate::results::{layout_table, ResultView};
use crate::tui::theme::Theme;
use ratatui::text::{Line, Span};

const INDENT: &str = "  ";

/// Lines for the rows of an assistant answer
pub fn result_lines(rows: &[RowObject]) -> Vec<Line<'static>> {
    let view = ResultView::from_rows(rows);

    match &view {
        ResultView::NoData => vec![Line::from(vec![
            Span::raw(INDENT),
            Span::styled(crate::results::NO_DATA, Theme::text_dim()),
        ])],
        ResultView::KeyValue(pairs) => pairs
            .iter()
            .map(|(key, value)| {
                Line::from(vec![
                    Span::raw(INDENT),
                    Span::styled(format!("{}: ", key), Theme::heading()),
                    Span::styled(value.clone(), Theme::text()),
                ])
            })
            .collect(),
        ResultView::Table { headers, rows } => {
            let mut lines = Vec::with_capacity(rows.len() + 3);
            if let Some(title) = view.title() {
                lines.push(Line::from(vec![
                    Span::raw(INDENT),
                    Span::styled(title, Theme::title()),
                    Span::styled("  [Ctrl+E] Download CSV", Theme::text_dim()),
                ]));
            }
            for (i, text) in layout_table(headers, rows).into_iter().enumerate() {
                let style = match i {
                    0 => Theme::heading(),
                    1 => Theme::border(),
                    _ => Theme::text(),
                };
                lines.push(Line::from(vec![Span::raw(INDENT), Span::styled(text, style)]));
            }
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_table_has_title_and_rule() {
        let rows: Vec<RowObject> =
            serde_json::from_value(json!([{"a": 1}, {"a": 2}, {"a": 3}])).unwrap();
        let lines = result_lines(&rows);
        assert_eq!(lines.len(), 6);
        assert!(text(&lines[0]).contains("Results (3 rows)"));
        assert_eq!(text(&lines[1]), "  a");
        assert_eq!(text(&lines[2]), "  ─");
    }

    #[test]
    fn test_empty_result() {
        let lines = result_lines(&[]);
        assert_eq!(lines.len(), 1);
        assert_eq!(text(&lines[0]), "  No data found.");
    }
}
