use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(action),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame, base_url: &str) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("o", 11, "Choose an image (type a path)"),
        key_line("a", 11, "Analyze the selected image"),
        key_line("Enter", 7, "Analyze (or confirm the path while typing)"),
        key_line("r", 11, "Reset selection and result"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("While typing a path:"),
        key_line("Esc", 9, "Cancel"),
        key_line("Backspace", 3, "Delete last character"),
        Line::from(""),
        Line::from("Accepted files: PNG, JPG, JPEG (max 16 MiB)"),
        Line::from(""),
        Line::from("Inference service:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(base_url.to_string(), Style::default().fg(Color::Cyan)),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
