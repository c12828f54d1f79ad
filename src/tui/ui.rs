use crate::sync::SyncStatus;
use crate::tui::app::App;
use crate::tui::edit::TextInput;
use crate::tui::state::{InputMode, ViewState};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

/// How one todo row looks, derived from the view state alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowView {
    Viewing { content: String },
    Editing { before_cursor: String, after_cursor: String },
}

pub fn rows(state: &ViewState) -> Vec<RowView> {
    state
        .items
        .iter()
        .map(|todo| {
            if state.is_editing(&todo.id) {
                let (before, after) = state.edit_draft.split_at_cursor();
                RowView::Editing {
                    before_cursor: before.to_string(),
                    after_cursor: after.to_string(),
                }
            } else {
                RowView::Viewing {
                    content: todo.content.clone(),
                }
            }
        })
        .collect()
}

pub fn greeting(name: &str) -> String {
    format!("{}'s todos", name)
}

pub fn status_line(state: &ViewState) -> String {
    let mut parts = vec![
        format!("Items: {}", state.items.len()),
        format!("Sync: {}", state.sync_status),
    ];
    if state.in_flight() {
        parts.push("saving...".to_string());
    }
    if state.edit_target_missing() {
        parts.push(format!("Editing a todo missing from the list: {}", state.edit_draft.text()));
    }
    if let Some(notice) = &state.notice {
        parts.push(notice.clone());
    }
    parts.join(" | ")
}

pub fn draw(frame: &mut Frame, app: &App) {
    let show_form = app.state.form_visible;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Greeting
            Constraint::Length(if show_form { 3 } else { 1 }), // Toggle bar / form
            Constraint::Min(0), // List
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], app);
    draw_form(frame, chunks[1], &app.state);
    draw_todo_list(frame, chunks[2], &app.state);
    draw_footer(frame, chunks[3], &app.state);

    if app.help_mode {
        draw_help_window(frame);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(
            greeting(&app.display_name()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("[S] Sign out", Style::default().fg(Color::DarkGray)),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Todo"));

    frame.render_widget(header, area);
}

fn draw_form(frame: &mut Frame, area: Rect, state: &ViewState) {
    if !state.form_visible {
        let toggle = Paragraph::new(Line::from(vec![
            Span::styled("My todos ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("[+]", Style::default().fg(Color::Green)),
        ]));
        frame.render_widget(toggle, area);
        return;
    }

    let focused = state.input_mode() == InputMode::Form;
    let content = if state.draft.is_empty() && !focused {
        Line::from(Span::styled(
            "Enter new todo...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        input_line(&state.draft, Style::default().fg(Color::White))
    };

    let title = if state.create_in_flight {
        "My todos - saving..."
    } else {
        "My todos - Enter: Save Todo | Esc: Hide Form"
    };
    let form = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Blue)),
    );

    frame.render_widget(form, area);
}

fn draw_todo_list(frame: &mut Frame, area: Rect, state: &ViewState) {
    let items: Vec<ListItem> = rows(state)
        .into_iter()
        .map(|row| match row {
            RowView::Viewing { content } => ListItem::new(Line::from(vec![
                Span::styled(content, Style::default().fg(Color::White)),
                Span::styled("  [e]dit [d]elete", Style::default().fg(Color::DarkGray)),
            ])),
            RowView::Editing {
                before_cursor,
                after_cursor,
            } => {
                let style = Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD);
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{}█{}", before_cursor, after_cursor), style),
                    Span::styled(
                        "  Enter: Update | Esc: Cancel",
                        Style::default().fg(Color::Yellow),
                    ),
                ]))
            }
        })
        .collect();

    let title = match &state.sync_status {
        SyncStatus::Stale(_) => "Items (stale)",
        _ => "Items",
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );

    let mut list_state = ListState::default();
    if state.input_mode() == InputMode::Normal && !state.items.is_empty() {
        list_state.select(Some(state.navigation.selected_index));
    }

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn input_line(input: &TextInput, style: Style) -> Line<'static> {
    let (before, after) = input.split_at_cursor();
    Line::from(Span::styled(format!("{}█{}", before, after), style))
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &ViewState) {
    let color = match (&state.sync_status, &state.notice) {
        (SyncStatus::Stale(_), _) | (_, Some(_)) => Color::Red,
        _ => Color::Yellow,
    };
    let footer = Paragraph::new(status_line(state))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(color));

    frame.render_widget(footer, area);
}

fn draw_help_window(frame: &mut Frame) {
    let help_text = [
        "Todo List - Keyboard Commands",
        "",
        "LIST:",
        "  ↑↓ / j/k          Navigate up/down",
        "  e / Enter         Edit selected todo",
        "  d / Delete        Delete selected todo",
        "  + / a             Show or hide the new todo form",
        "",
        "TEXT ENTRY:",
        "  Enter             Save new todo / update edited todo",
        "  Esc               Hide form / cancel edit",
        "  Ctrl+W            Delete previous word",
        "",
        "OTHER:",
        "  Esc               Dismiss message",
        "  S                 Sign out",
        "  ?                 Show this help (press ? or Esc to close)",
        "  q / Ctrl+C        Quit application",
    ];

    let help_paragraph = Paragraph::new(help_text.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help - Keyboard Commands ")
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });

    let area = centered_rect(80, 70, frame.size());

    frame.render_widget(Clear, area);
    frame.render_widget(help_paragraph, area);
}

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
