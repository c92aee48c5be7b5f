//! Frame rendering: the three stage pages plus the shared chrome.

use std::path::Path;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, ConfirmFocus, SelectingFocus, SubtopicChoice};
use crate::session::TopicStage;

/// Maximum length for the topic shown in the report page title.
pub const TITLE_TOPIC_MAX_LEN: usize = 60;

/// Truncates a string to the given maximum length in chars, appending "..."
/// if truncated. Newlines are flattened for single-line display.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let single_line: String = s.chars().map(|c| if c == '\n' { ' ' } else { c }).collect();

    if single_line.chars().count() <= max_len {
        single_line
    } else {
        let kept: String = single_line.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Shortens a path for display by folding the home directory into `~`.
fn contract_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(suffix) = path.strip_prefix(&home)
    {
        return format!("~/{}", suffix.display());
    }
    path.display().to_string()
}

/// Rectangle of the requested size centered inside `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Top-level draw: the active stage page, notice line, command panel,
/// and the help overlay when open.
pub fn draw_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Stage page (flexible)
            Constraint::Length(1), // Notice line
            Constraint::Length(3), // Command panel (one row inside its border)
        ])
        .split(f.area());

    match app.session.stage {
        TopicStage::Selecting => draw_selecting_page(f, app, chunks[0]),
        TopicStage::Confirm => draw_confirm_page(f, app, chunks[0]),
        TopicStage::Generate => draw_report_page(f, app, chunks[0]),
    }

    draw_notice_line(f, app, chunks[1]);
    draw_command_panel(f, app, chunks[2]);

    if app.show_help {
        draw_help_modal(f, app);
    }
}

/// Outer frame shared by the selection and confirmation pages.
fn page_frame(session_id: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Line::from(" ScholarMind - AI Co-Author for Academic Research ").left_aligned())
        .title(Line::from(format!(" {} ", session_id)).right_aligned())
}

/// Border style for a panel depending on whether it has focus.
fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Draw the topic selection page: trending list, free-text input, confirm button.
fn draw_selecting_page(f: &mut Frame, app: &App, area: Rect) {
    let frame_block = page_frame(&app.session_id);
    let inner = frame_block.inner(area);
    f.render_widget(frame_block, area);

    let list_height = (app.session.trending_topics.len().max(1) as u16) + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(list_height), // Trending list
            Constraint::Length(3),           // Custom topic input
            Constraint::Length(1),           // Confirm button
            Constraint::Min(0),              // Spacer
        ])
        .split(inner);

    draw_trending_list(f, app, chunks[0]);
    draw_custom_input(f, app, chunks[1]);
    draw_confirm_button(f, app, chunks[2]);
}

fn draw_trending_list(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.selecting_focus == SelectingFocus::TrendingList;
    let inner_width = area.width.saturating_sub(2) as usize;

    let mut content: Vec<Line> = Vec::new();
    if app.session.trending_topics.is_empty() {
        content.push(Line::from(Span::styled(
            "  No trending topics",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for (i, topic) in app.session.trending_topics.iter().enumerate() {
            let is_cursor = i == app.trending_cursor;
            let is_marked = app.trending_selected == Some(i);

            let marker = if is_marked { "(\u{2022}) " } else { "( ) " };
            let text = truncate_str(topic, inner_width.saturating_sub(5));
            let line_content = format!(" {}{}", marker, text);
            let padding = inner_width.saturating_sub(line_content.width());

            let line_style = if is_cursor && focused {
                Style::default().fg(Color::Black).bg(Color::White)
            } else if is_marked {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            };

            content.push(Line::from(Span::styled(
                format!("{}{}", line_content, " ".repeat(padding)),
                line_style,
            )));
        }
    }

    let list = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(focused))
            .title(" Trending Topics (Pick One) "),
    );
    f.render_widget(list, area);
}

fn draw_custom_input(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.selecting_focus == SelectingFocus::CustomInput;
    let field_width = area.width.saturating_sub(4) as usize;

    let mut spans = vec![Span::raw(" ")];
    spans.extend(render_input_spans(
        &app.custom_topic,
        focused,
        app.custom_cursor,
        field_width,
    ));

    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(focused))
            .title(" Or Enter Your Own Topic "),
    );
    f.render_widget(input, area);
}

fn draw_confirm_button(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.selecting_focus == SelectingFocus::ConfirmButton;
    let button_style = if focused {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let button = Paragraph::new(Line::from(vec![
        Span::raw("   "),
        Span::styled("[ Confirm Topic ]", button_style),
    ]));
    f.render_widget(button, area);
}

/// Draw the confirmation page: final topic banner, three-way choice,
/// and the subtopic panel when it is open.
fn draw_confirm_page(f: &mut Frame, app: &App, area: Rect) {
    let frame_block = page_frame(&app.session_id);
    let inner = frame_block.inner(area);
    f.render_widget(frame_block, area);

    let panel_open = app.applied_choice == Some(SubtopicChoice::GenerateSubtopics)
        && app.session.show_subtopic_section;
    let subtopic_height = if panel_open {
        (app.session.subtopics.len().max(1) as u16) + 3
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),               // Final topic banner
            Constraint::Length(1),               // Spacer
            Constraint::Length(5),               // Choice list (3 rows + borders)
            Constraint::Length(subtopic_height), // Subtopic panel (0 when closed)
            Constraint::Min(0),                  // Spacer
        ])
        .split(inner);

    let topic = app.session.topic().unwrap_or("");
    let banner = Paragraph::new(Line::from(Span::styled(
        format!(" \u{2713} Final Selected Topic: {}", topic),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));
    f.render_widget(banner, chunks[0]);

    draw_choice_list(f, app, chunks[2]);
    if panel_open {
        draw_subtopic_panel(f, app, chunks[3]);
    }
}

fn draw_choice_list(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.confirm_focus == ConfirmFocus::ChoiceList;
    let inner_width = area.width.saturating_sub(2) as usize;

    let mut content: Vec<Line> = Vec::new();
    for (i, choice) in SubtopicChoice::ALL.iter().enumerate() {
        let is_cursor = i == app.choice_cursor;
        let is_applied = app.applied_choice == Some(*choice);

        let marker = if is_applied { "(\u{2022}) " } else { "( ) " };
        let line_content = format!(" {}{}", marker, choice.label());
        let padding = inner_width.saturating_sub(line_content.width());

        let line_style = if is_cursor && focused {
            Style::default().fg(Color::Black).bg(Color::White)
        } else if is_applied {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };

        content.push(Line::from(Span::styled(
            format!("{}{}", line_content, " ".repeat(padding)),
            line_style,
        )));
    }

    let list = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(focused))
            .title(" Do you want to generate subtopics? "),
    );
    f.render_widget(list, area);
}

fn draw_subtopic_panel(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.confirm_focus == ConfirmFocus::SubtopicList;
    let inner_width = area.width.saturating_sub(2) as usize;

    let mut content: Vec<Line> = Vec::new();
    if app.session.subtopics.is_empty() {
        content.push(Line::from(Span::styled(
            "  No subtopics yet",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for (i, subtopic) in app.session.subtopics.iter().enumerate() {
            // The cursor row is the selection, so it always carries the mark
            let is_cursor = i == app.subtopic_cursor;

            let marker = if is_cursor { "(\u{2022}) " } else { "( ) " };
            let text = truncate_str(subtopic, inner_width.saturating_sub(5));
            let line_content = format!(" {}{}", marker, text);
            let padding = inner_width.saturating_sub(line_content.width());

            let line_style = if is_cursor && focused {
                Style::default().fg(Color::Black).bg(Color::White)
            } else if is_cursor {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            };

            content.push(Line::from(Span::styled(
                format!("{}{}", line_content, " ".repeat(padding)),
                line_style,
            )));
        }
    }

    content.push(Line::from(Span::styled(
        " [m] More Subtopics   [Enter] Confirm this Subtopic",
        Style::default().fg(Color::DarkGray),
    )));

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_border(focused))
            .title(format!(" Subtopic Round {} ", app.session.subtopic_round)),
    );
    f.render_widget(panel, area);
}

/// Draw the report page: scrollable output with the final topic as title.
fn draw_report_page(f: &mut Frame, app: &mut App, area: Rect) {
    // The scroll math runs between frames, so it needs the pane size
    app.main_pane_height = area.height.saturating_sub(2); // minus borders
    app.main_pane_width = area.width;

    let content: Vec<Line> = app.output_lines.iter().map(Line::raw).collect();

    let topic = app.session.topic().unwrap_or("");
    let output_block = Block::default()
        .borders(Borders::ALL)
        .title(
            Line::from(format!(
                " Final Research Topic: {} ",
                truncate_str(topic, TITLE_TOPIC_MAX_LEN)
            ))
            .left_aligned(),
        )
        .title(Line::from(format!(" {} ", app.session_id)).right_aligned());

    let output_panel = Paragraph::new(content)
        .block(output_block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset, 0));

    f.render_widget(output_panel, area);

    // Scrollbar appears once the output no longer fits the pane
    let visual_lines = app.visual_line_count();
    if visual_lines > app.main_pane_height {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));

        let mut scrollbar_state = ScrollbarState::default()
            .content_length(visual_lines as usize)
            .position(app.scroll_offset as usize)
            .viewport_content_length(app.main_pane_height as usize);

        f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

/// Draw the one-row notice line. Errors win over warnings.
fn draw_notice_line(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let notice = if let Some(error) = &app.error_banner {
        Some((
            format!(" \u{2717} {}", truncate_str(error, width.saturating_sub(4))),
            Color::Red,
        ))
    } else {
        app.warning.as_ref().map(|warning| {
            (
                format!(" \u{26a0} {}", truncate_str(warning, width.saturating_sub(4))),
                Color::Yellow,
            )
        })
    };

    if let Some((text, color)) = notice {
        let line = Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(color),
        )));
        f.render_widget(line, area);
    }
}

/// Draw the command panel: shortcuts on the left, busy state on the right.
fn draw_command_panel(f: &mut Frame, app: &App, area: Rect) {
    let panel_open = app.applied_choice == Some(SubtopicChoice::GenerateSubtopics)
        && app.session.show_subtopic_section;

    let shortcuts = match app.session.stage {
        TopicStage::Selecting => "[Tab] Focus  [Space] Mark  [Enter] Confirm  [?] Help  [q] Quit",
        TopicStage::Confirm if panel_open => {
            "[Tab] Focus  [m] More  [Enter] Confirm  [?] Help  [q] Quit"
        }
        TopicStage::Confirm => "[j/k] Move  [Enter] Apply  [?] Help  [q] Quit",
        TopicStage::Generate => "[j/k] Scroll  [Ctrl+u/d] Half page  [?] Help  [q] Quit",
    };

    // Status indicator: colored dot + busy label or READY
    let status_dot = "\u{25cf} ";
    let (status_text, status_color) = match &app.busy {
        Some(label) => (label.as_str(), Color::Yellow),
        None => ("READY", Color::Green),
    };

    // Right side shows the active model next to the status indicator
    let model = app.config.gemini.model.as_str();
    let inner_width = area.width.saturating_sub(2) as usize;
    let right_len = model.width() + 2 + status_dot.width() + status_text.width();
    let spacing = inner_width.saturating_sub(shortcuts.width() + right_len);

    let command_line = Line::from(vec![
        Span::styled(shortcuts, Style::default().fg(Color::DarkGray)),
        Span::raw(" ".repeat(spacing)),
        Span::styled(model, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(status_dot, Style::default().fg(status_color)),
        Span::styled(status_text, Style::default().fg(status_color)),
    ]);

    let command_panel =
        Paragraph::new(command_line).block(Block::default().borders(Borders::ALL));

    f.render_widget(command_panel, area);
}

/// Render a text input's value with a block cursor, windowed around the
/// cursor when the value is wider than the field.
fn render_input_spans(
    value: &str,
    focused: bool,
    cursor_pos: usize,
    field_width: usize,
) -> Vec<Span<'static>> {
    let chars: Vec<char> = value.chars().collect();

    let (window_start, window_end) = if field_width > 0 && chars.len() > field_width {
        let start = cursor_pos.saturating_sub(field_width / 2);
        let end = (start + field_width).min(chars.len());
        let start = end.saturating_sub(field_width);
        (start, end)
    } else {
        (0, chars.len())
    };

    if focused {
        let cursor_at = cursor_pos.clamp(window_start, window_end);
        let before: String = chars[window_start..cursor_at].iter().collect();
        let cursor_char = chars
            .get(cursor_at)
            .map(|c| c.to_string())
            .unwrap_or_else(|| " ".to_string());
        let rest: String = if cursor_at + 1 < window_end {
            chars[cursor_at + 1..window_end].iter().collect()
        } else {
            String::new()
        };

        vec![
            Span::styled(before, Style::default().fg(Color::White)),
            Span::styled(
                cursor_char,
                Style::default().fg(Color::Black).bg(Color::White),
            ),
            Span::styled(rest, Style::default().fg(Color::White)),
        ]
    } else {
        let display_value: String = chars[window_start..window_end].iter().collect();
        vec![Span::styled(
            display_value,
            Style::default().fg(Color::White),
        )]
    }
}

/// Keymap overlay, opened with '?'.
fn draw_help_modal(f: &mut Frame, app: &App) {
    let modal_width: u16 = 50;
    let modal_height: u16 = 22;
    let modal_area = centered_rect(modal_width, modal_height, f.area());

    // Blank out whatever the overlay covers
    f.render_widget(Clear, modal_area);

    let key_style = Style::default().fg(Color::Cyan);
    let desc_style = Style::default().fg(Color::DarkGray);
    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let inner_width = modal_width.saturating_sub(4) as usize;

    // The close hint sits right-aligned on the bottom row
    let footer_text = "? or Esc to close";
    let footer_padding = inner_width.saturating_sub(footer_text.len());

    let logs_path = match &app.log_directory {
        Some(dir) => contract_path(dir),
        None => "unavailable".to_string(),
    };
    let logs_path = truncate_str(&logs_path, inner_width.saturating_sub(10));

    let content: Vec<Line> = vec![
        Line::from(Span::styled("  Pick a topic", header_style)),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Tab", key_style),
            Span::styled("  Move between list, input, button", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("j/k ↑/↓", key_style),
            Span::styled("  Move the list cursor", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Space", key_style),
            Span::styled("  Mark the trending topic", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Enter", key_style),
            Span::styled("  Confirm the topic", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Subtopics", header_style)),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Enter", key_style),
            Span::styled("  Apply choice / confirm subtopic", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("m", key_style),
            Span::styled("  More subtopics", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Report", header_style)),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("j/k", key_style),
            Span::styled("  Scroll down/up", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Ctrl+u/d", key_style),
            Span::styled("  Half page up/down", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Ctrl+b/f", key_style),
            Span::styled("  Full page up/down", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("  General", header_style)),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("q", key_style),
            Span::styled("  Quit", desc_style),
        ]),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("Logs", key_style),
            Span::styled(format!("  {}", logs_path), desc_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" ".repeat(footer_padding)),
            Span::styled(footer_text, desc_style),
        ]),
    ];

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(modal, modal_area);
}
