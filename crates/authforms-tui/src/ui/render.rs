use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, FieldFocus, FormInputs, Page};

use super::styles;

/// Visible width of the input boxes
const FIELD_WIDTH: usize = 24;

const BANNER: [&str; 3] = [
    "   ╔═╗╦ ╦╔═╗╔═╗╦═╗╔═╗╔╦╗╦╔═╗╔╦╗",
    "   ║╣ ╚╦╝║╣ ╠═╝╠╦╝║╣  ║║║║   ║ ",
    "   ╚═╝ ╩ ╚═╝╩  ╩╚═╚═╝═╩╝╩╚═╝ ╩ ",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Page
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    match app.active_form() {
        Some(form) => render_form(frame, app, form, chunks[1]),
        None => render_landing(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  EyePredict · {}", app.page.title());
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.chars().count() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn banner_lines() -> Vec<Line<'static>> {
    BANNER
        .iter()
        .map(|row| Line::from(Span::styled(*row, styles::title_style())))
        .collect()
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    // Keep the tail visible once the text outgrows the box
    let shown: String = {
        let len = value.chars().count();
        value.chars().skip(len.saturating_sub(FIELD_WIDTH)).collect()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("   "),
        Span::styled(format!("{:<10}[", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_form(frame: &mut Frame, app: &App, form: &FormInputs, area: Rect) {
    let dialog = centered_rect_fixed(48, 15, area);
    frame.render_widget(Clear, dialog);

    let mut lines = banner_lines();
    lines.push(Line::from(""));

    lines.push(field_line("Email:", form.email.clone(), form.focus == FieldFocus::Email));
    let masked = "*".repeat(form.password.chars().count());
    lines.push(field_line("Password:", masked, form.focus == FieldFocus::Password));

    // Submit button (centered)
    let label = form.spec.kind.title();
    let button_focused = form.focus == FieldFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let button_text = if button_focused {
        format!(" ▶ {:^8} ◀ ", label)
    } else {
        format!("   {:^8}   ", label)
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(button_text, button_style),
        Span::raw("]"),
    ]));

    // Status region
    lines.push(Line::from(""));
    if let Some(message) = app.status_message() {
        lines.push(Line::from(Span::styled(
            format!(" {}", message.text),
            styles::message_style(message.kind),
        )));
    } else if app.is_submitting() {
        lines.push(Line::from(Span::styled(" Submitting...", styles::muted_style())));
    }

    let block = Block::default()
        .title(Span::styled(format!(" {} ", app.page.title()), styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, dialog);
}

fn render_landing(frame: &mut Frame, app: &App, area: Rect) {
    let dialog = centered_rect_fixed(48, 11, area);
    frame.render_widget(Clear, dialog);

    let mut lines = banner_lines();
    lines.push(Line::from(""));
    if app.has_token {
        lines.push(Line::from(Span::styled(
            "   Signed in. Session token stored.",
            styles::success_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "   Not signed in.",
            styles::highlight_style(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   [F2]", styles::help_key_style()),
        Span::styled(" Register   ", styles::muted_style()),
        Span::styled("[F3]", styles::help_key_style()),
        Span::styled(" Login   ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" Quit", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let page_hint = match app.page {
        Page::Register => "[F3] Login instead",
        Page::Login => "[F2] Create account",
        Page::Landing => "",
    };
    let line = Line::from(vec![
        Span::raw(" API: "),
        Span::styled(app.api_base().to_string(), styles::highlight_style()),
        Span::raw("   "),
        Span::styled(page_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(styles::muted_style());
    let paragraph = Paragraph::new(line).block(block).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 13, frame.area());
    frame.render_widget(Clear, area);

    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  Keyboard", styles::title_style())),
        Line::from(""),
        entry("Tab / ↓", "Next field"),
        entry("S-Tab / ↑", "Previous field"),
        entry("Enter", "Next field / submit"),
        entry("F2", "Register page"),
        entry("F3", "Login page"),
        entry("Esc", "Quit"),
        entry("Ctrl+C", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
