mod help;
mod state;

use crate::cli::Cli;
use crate::engine::DetectorClient;
use crate::model::AppEvent;
use crate::orchestrator::{self, UiCommand};
use crate::preview::Thumbnail;
use crate::session::AnalysisState;
use crate::verdict::{self, Verdict};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Tabs, Wrap},
    Terminal,
};
use state::{push_wrapped_status_kv, KeyAction, UiState};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const AI_COLOR: Color = Color::Magenta;
const REAL_COLOR: Color = Color::Green;

pub async fn run(args: Cli, client: DetectorClient) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    if let Some(path) = args.image.clone() {
        let _ = cmd_tx.send(UiCommand::Select(path));
    }

    // Terminal I/O blocks, so the UI gets its own OS thread.
    let base_url = args.base_url.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(base_url, event_rx, cmd_tx));

    let res = orchestrator::run_controller(client, true, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

fn run_threaded(
    base_url: String,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState {
        base_url,
        info: "Press o to choose an image".into(),
        ..Default::default()
    };

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            match ev {
                AppEvent::Snapshot(s) => state.apply_snapshot(*s),
                AppEvent::Info(info) => state.apply_info(info),
            }
        }

        if last_tick.elapsed() >= tick_rate {
            state.spinner_frame = state.spinner_frame.wrapping_add(1);
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Short poll so snapshots keep rendering between key presses.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match state.handle_key(k.modifiers, k.code) {
                    KeyAction::None => {}
                    KeyAction::Send(cmd) => {
                        let _ = cmd_tx.send(cmd);
                    }
                    KeyAction::Quit => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Detector"), Line::from("Help")])
        .select(state.tab)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("ai-image-detector"),
        )
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_detector(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f, &state.base_url),
    }
}

fn draw_detector(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(6)].as_ref())
        .split(area);

    draw_path_input(rows[0], f, state);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[1]);
    draw_preview(panes[0], f, state);
    draw_result(panes[1], f, state);

    draw_status(rows[2], f, state);
}

fn draw_path_input(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let line = if state.editing {
        Line::from(vec![
            Span::raw(state.input.clone()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ])
    } else {
        match state.file.as_ref() {
            Some(file) => Line::from(file.name.clone()),
            None => Line::from(Span::styled(
                "Press o to choose an image (PNG, JPG, JPEG, max 16 MiB)",
                Style::default().fg(Color::Gray),
            )),
        }
    };
    let title = if state.editing { "Image path" } else { "Image" };
    let border = if state.editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    f.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        ),
        area,
    );
}

/// Render a thumbnail with half blocks: each cell shows two stacked pixels.
fn thumbnail_lines(thumb: &Thumbnail) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(thumb.height.div_ceil(2) as usize);
    for y in (0..thumb.height).step_by(2) {
        let spans: Vec<Span<'static>> = (0..thumb.width)
            .map(|x| {
                let top = thumb.pixel(x, y).map(rgb).unwrap_or(Color::Reset);
                let bottom = thumb.pixel(x, y + 1).map(rgb).unwrap_or(Color::Reset);
                Span::styled("▀", Style::default().fg(top).bg(bottom))
            })
            .collect();
        lines.push(Line::from(spans));
    }
    lines
}

fn rgb(p: [u8; 3]) -> Color {
    Color::Rgb(p[0], p[1], p[2])
}

fn draw_preview(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let mut lines: Vec<Line<'static>> = Vec::new();

    match (state.file.as_ref(), state.preview.as_ref()) {
        (Some(file), Some(preview)) => {
            match preview.thumbnail.as_ref() {
                Some(thumb) => lines.extend(thumbnail_lines(thumb)),
                None => lines.push(Line::from(Span::styled(
                    "(preview unavailable)",
                    Style::default().fg(Color::Gray),
                ))),
            }
            lines.push(Line::from(""));
            push_wrapped_status_kv(&mut lines, "Name", &file.name, area.width);
            lines.push(Line::from(vec![
                Span::styled("Type: ", Style::default().fg(Color::Gray)),
                Span::raw(file.media_type.as_mime()),
                Span::raw("   "),
                Span::styled("Size: ", Style::default().fg(Color::Gray)),
                Span::raw(format_size(file.size)),
            ]));
            if let Some((w, h)) = preview.dimensions {
                lines.push(Line::from(vec![
                    Span::styled("Dimensions: ", Style::default().fg(Color::Gray)),
                    Span::raw(format!("{w}x{h}")),
                ]));
            }
        }
        _ => {
            lines.push(Line::from("No image selected."));
            lines.push(Line::from(""));
            lines.push(Line::from("Press o and type the path of a PNG or JPEG file."));
        }
    }

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Preview")),
        area,
    );
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

fn draw_result(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Detection Result");

    let result = match &state.analysis {
        AnalysisState::Idle => {
            let hint = if state.file.is_some() {
                "Press a to analyze the image."
            } else {
                "Select an image to get started."
            };
            f.render_widget(Paragraph::new(hint).block(block), area);
            return;
        }
        AnalysisState::Running => {
            let frame = SPINNER[state.spinner_frame % SPINNER.len()];
            f.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(frame, Style::default().fg(Color::Yellow)),
                    Span::raw(" Analyzing..."),
                ]))
                .block(block),
                area,
            );
            return;
        }
        AnalysisState::Failed(err) => {
            f.render_widget(
                Paragraph::new(Span::styled(
                    err.user_message(),
                    Style::default().fg(Color::Red),
                ))
                .wrap(Wrap { trim: true })
                .block(block.border_style(Style::default().fg(Color::Red))),
                area,
            );
            return;
        }
        AnalysisState::Succeeded(result) => result,
    };

    let v = verdict::verdict(result);
    let color = match v {
        Verdict::AiGenerated => AI_COLOR,
        Verdict::Real => REAL_COLOR,
    };
    let block = block.border_style(Style::default().fg(color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(inner);

    let headline = Line::from(vec![
        Span::styled(
            v.label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            verdict::display_percentage(result),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(headline), parts[0]);

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Confidence"))
            .gauge_style(Style::default().fg(color))
            .ratio(verdict::progress_bar_fraction(result))
            .label(verdict::display_percentage(result)),
        parts[1],
    );

    let mut lines = Vec::new();
    if let Some(rows) = verdict::detail_rows(result) {
        lines.push(Line::from(Span::styled(
            "Detailed Probabilities:",
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(vec![
            Span::styled("  AI-Generated: ", Style::default().fg(AI_COLOR)),
            Span::raw(rows.ai_generated),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  Real Image:   ", Style::default().fg(REAL_COLOR)),
            Span::raw(rows.real_image),
        ]));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        verdict::advisory_text(result),
        Style::default().fg(Color::Cyan),
    )));
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }),
        parts[2],
    );
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let backend = match state.backend_healthy {
        Some(true) => Span::styled("healthy", Style::default().fg(Color::Green)),
        Some(false) => Span::styled("unreachable", Style::default().fg(Color::Red)),
        None => Span::styled("checking…", Style::default().fg(Color::Gray)),
    };
    let mut lines = vec![Line::from(vec![
        Span::styled("Backend: ", Style::default().fg(Color::Gray)),
        Span::raw(state.base_url.clone()),
        Span::raw(" ("),
        backend,
        Span::raw(")"),
    ])];
    push_wrapped_status_kv(&mut lines, "Info", &state.info, area.width);

    let analyze_hint = if state.can_analyze() {
        "a analyze"
    } else {
        "a analyze (needs image)"
    };
    lines.push(Line::from(format!(
        "Keys: q quit | o open | {analyze_hint} | r reset | tab switch | ? help"
    )));

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Status")),
        area,
    );
}
