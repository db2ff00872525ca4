use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use crate::store::ContentStore;

use super::app::{App, Editor, Field, Focus, Screen, ToastKind};
use super::input::Input;

pub(super) fn draw<S: ContentStore>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    draw_header(frame, chunks[0], app);
    match &app.screen {
        Screen::Login { token } => draw_login(frame, chunks[1], token),
        Screen::Editor(ed) => draw_editor(frame, chunks[1], ed, app.is_busy()),
    }
    draw_footer(frame, chunks[2], app);

    if let Screen::Editor(ed) = &app.screen
        && let Some(index) = ed.confirm_delete
    {
        draw_confirm(frame, ed, index);
    }
}

fn draw_header<S: ContentStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let mut spans = vec![
        Span::styled(
            "Afterlife CMS",
            Style::default().fg(Color::Black).bg(Color::White),
        ),
        Span::raw("  "),
    ];
    match app.editor() {
        Some(ed) => {
            let repo = ed.session.repository();
            spans.push(Span::styled(
                ed.session.login().to_string(),
                Style::default().fg(Color::Green),
            ));
            spans.push(Span::raw("  "));
            spans.push(Span::raw(repo.location().to_string()));
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{} entries", repo.len()),
                Style::default().fg(Color::Gray),
            ));
        }
        None => spans.push(Span::styled("not logged in", Style::default().fg(Color::Red))),
    }
    if app.is_busy() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("working…", Style::default().fg(Color::Yellow)));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_login(frame: &mut Frame, area: Rect, token: &Input) {
    let w = area.width.saturating_sub(6).clamp(20, 70);
    let box_area = Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(7) / 2,
        width: w,
        height: 7.min(area.height),
    };
    let block = Block::default().borders(Borders::ALL).title("Login");
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(3)])
        .split(inner);
    frame.render_widget(
        Paragraph::new("Paste a GitHub personal access token with contents access.")
            .wrap(Wrap { trim: true }),
        parts[0],
    );

    let masked = "•".repeat(token.buf.chars().count());
    frame.render_widget(
        Paragraph::new(masked).block(Block::default().borders(Borders::ALL).title("Token")),
        parts[1],
    );
    let col = token.buf[..token.cursor].chars().count() as u16;
    frame.set_cursor_position((parts[1].x + 1 + col, parts[1].y + 1));
}

fn draw_editor<S: ContentStore>(frame: &mut Frame, area: Rect, ed: &Editor<S>, busy: bool) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    draw_entry_list(frame, cols[0], ed);
    draw_form(frame, cols[1], ed, busy);
}

fn draw_entry_list<S: ContentStore>(frame: &mut Frame, area: Rect, ed: &Editor<S>) {
    let entries = ed.session.repository().entries();
    let items: Vec<ListItem> = if entries.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "(no releases)",
            Style::default().fg(Color::Gray),
        )))]
    } else {
        entries
            .iter()
            .map(|e| {
                let mut spans = vec![
                    Span::styled(format!("{: <10}", e.version), Style::default().fg(Color::Yellow)),
                    Span::raw(" "),
                    Span::styled(e.date.as_str(), Style::default().fg(Color::Gray)),
                ];
                if e.is_latest {
                    spans.push(Span::styled(" ★", Style::default().fg(Color::Green)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let border = if ed.focus == Focus::List {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title("Releases"),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    if !entries.is_empty() {
        state.select(Some(ed.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw_form<S: ContentStore>(frame: &mut Frame, area: Rect, ed: &Editor<S>, busy: bool) {
    let block = Block::default().borders(Borders::ALL).title(ed.form.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let focused = match ed.focus {
        Focus::Form(f) => Some(f),
        Focus::List => None,
    };

    frame.render_widget(
        Paragraph::new(ed.version.buf.as_str())
            .block(field_block("Version", focused == Some(Field::Version))),
        parts[0],
    );
    frame.render_widget(
        Paragraph::new(ed.date.buf.as_str())
            .block(field_block("Date", focused == Some(Field::Date))),
        parts[1],
    );

    // Keep the cursor line in view for long change lists.
    let (line, _) = ed.changes.cursor_pos();
    let visible = parts[2].height.saturating_sub(2) as usize;
    let scroll = (line + 1).saturating_sub(visible.max(1)) as u16;
    frame.render_widget(
        Paragraph::new(ed.changes.buf.as_str())
            .scroll((scroll, 0))
            .block(field_block("Changes", focused == Some(Field::Changes))),
        parts[2],
    );

    let check = if ed.form.is_latest { "[x]" } else { "[ ]" };
    let latest_style = if focused == Some(Field::Latest) {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!("{} Latest release", check),
            latest_style,
        ))),
        parts[3],
    );

    let submit = if busy {
        Span::styled("Saving…", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            format!("Ctrl-S: {}", ed.form.submit_label()),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(submit)), parts[4]);

    let cursor = match focused {
        Some(Field::Version) => Some((parts[0], ed.version.cursor_pos(), 0)),
        Some(Field::Date) => Some((parts[1], ed.date.cursor_pos(), 0)),
        Some(Field::Changes) => Some((parts[2], ed.changes.cursor_pos(), scroll)),
        _ => None,
    };
    if let Some((rect, (line, col), scroll)) = cursor
        && ed.confirm_delete.is_none()
    {
        let y = rect.y + 1 + (line as u16).saturating_sub(scroll);
        frame.set_cursor_position((rect.x + 1 + col as u16, y));
    }
}

fn draw_footer<S: ContentStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let line = match app.toast.as_ref().filter(|t| t.is_fresh()) {
        Some(toast) => {
            let color = match toast.kind {
                ToastKind::Info => Color::White,
                ToastKind::Success => Color::Green,
                ToastKind::Error => Color::Red,
            };
            Line::from(Span::styled(toast.text.as_str(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            key_help(app),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        )),
    };
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::TOP)),
        area,
    );
}

fn key_help<S: ContentStore>(app: &App<S>) -> &'static str {
    match &app.screen {
        Screen::Login { .. } => "enter: log in  esc: quit",
        Screen::Editor(ed) if ed.confirm_delete.is_some() => "y: delete  n/esc: keep",
        Screen::Editor(ed) => match ed.focus {
            Focus::List => {
                "↑/↓: select  n: new  e/enter: edit  d: delete  r: reload  L: logout  q: quit"
            }
            Focus::Form(Field::Changes) => {
                "enter: new line  tab: next field  ctrl-s: save  esc: cancel"
            }
            Focus::Form(Field::Latest) => "space: toggle  tab: next field  ctrl-s: save  esc: cancel",
            Focus::Form(_) => "tab/enter: next field  ctrl-s: save  esc: cancel",
        },
    }
}

fn draw_confirm<S: ContentStore>(frame: &mut Frame, ed: &Editor<S>, index: usize) {
    let area = frame.area();
    let w = area.width.saturating_sub(6).clamp(20, 60);
    let h = 5.min(area.height);
    let box_area = Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w,
        height: h,
    };
    frame.render_widget(Clear, box_area);

    let label = ed
        .session
        .repository()
        .get(index)
        .map(|e| {
            let (version, date) = e.identity();
            format!("Delete {} ({})?", version, date)
        })
        .unwrap_or_else(|| "Delete this entry?".to_string());
    let lines = vec![
        Line::from(label),
        Line::from(""),
        Line::from(Span::styled(
            "y: delete  n: keep",
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Confirm")),
        box_area,
    );
}
