use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use house_price_estimator::{Field, FormState, ServiceMode, Session};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use tokio::runtime::Runtime;

pub struct App {
    pub session: Session,
    pub state: TableState,
    /// Text being typed into the selected field, `None` when not editing
    pub editing: Option<String>,
}

impl App {
    pub fn new(session: Session) -> Self {
        let mut state = TableState::default();
        state.select(Some(0));

        Self {
            session,
            state,
            editing: None,
        }
    }

    pub fn selected_field(&self) -> Field {
        let i = self.state.selected().unwrap_or(0);
        Field::ALL[i.min(Field::ALL.len() - 1)]
    }

    pub fn next(&mut self) {
        let len = Field::ALL.len();
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = Field::ALL.len();
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Start editing the selected field, seeded with its current value
    pub fn start_edit(&mut self) {
        let value = self.session.state().attributes.get(self.selected_field());
        self.editing = Some(format_value(value));
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(buf) = self.editing.as_mut() {
            if c.is_ascii_digit() || c == '.' || c == '-' {
                buf.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(buf) = self.editing.as_mut() {
            buf.pop();
        }
    }

    pub fn commit_edit(&mut self) {
        if let Some(buf) = self.editing.take() {
            let field = self.selected_field();
            self.session.input(field, &buf);
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }
}

pub fn run_ui(app: &mut App, rt: &Runtime) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app, rt);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rt: &Runtime,
) -> io::Result<()> {
    // Startup health probe, shown as "Connecting..." until it settles
    terminal.draw(|f| ui(f, app))?;
    if app.session.mode() == ServiceMode::Detecting {
        rt.block_on(app.session.detect_mode());
    }

    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if app.editing.is_some() {
            match key.code {
                KeyCode::Enter => app.commit_edit(),
                KeyCode::Esc => app.cancel_edit(),
                KeyCode::Backspace => app.pop_char(),
                KeyCode::Char(c) => app.push_char(c),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Enter | KeyCode::Char('e') => app.start_edit(),
            KeyCode::Char('r') => app.session.reset(),
            KeyCode::Char('s') => {
                if let Some(attrs) = app.session.begin_submit() {
                    // Draw the busy state before blocking on the estimate
                    terminal.draw(|f| ui(f, app))?;
                    rt.block_on(app.session.finish_submit(attrs));
                }
            }
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with service mode
            Constraint::Min(0),    // Form + result
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app.session.state());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60), // Field table
            Constraint::Percentage(40), // Estimate panel
        ])
        .split(chunks[1]);

    render_form(f, content_chunks[0], app);
    render_result_panel(f, content_chunks[1], app.session.state());
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, state: &FormState) {
    let mode_color = match state.mode {
        ServiceMode::Detecting => Color::DarkGray,
        ServiceMode::Remote => Color::Green,
        ServiceMode::Fallback => Color::Yellow,
    };

    let mut spans = vec![
        Span::styled(
            "House Price Estimator",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(state.mode.label(), Style::default().fg(mode_color)),
    ];

    if let Some(m) = &state.model_metrics {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("R² {:.4}  MAE ${:.0}  RMSE ${:.0}", m.r2_score, m.mae, m.rmse),
            Style::default().fg(Color::White),
        ));
    }

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Field", "Value", "Error"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let selected = app.selected_field();
    let state = app.session.state();

    let rows = state.attributes.iter().map(|(field, value)| {
        let value_text = match &app.editing {
            Some(buf) if field == selected => format!("{}▏", buf),
            _ => format_value(value),
        };
        let error = state.errors.get(field).unwrap_or("");

        let cells = vec![
            Cell::from(field.label()),
            Cell::from(value_text).style(Style::default().fg(if error.is_empty() {
                Color::White
            } else {
                Color::Red
            })),
            Cell::from(error.to_string()).style(Style::default().fg(Color::Red)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(14),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Property "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_result_panel(f: &mut Frame, area: Rect, state: &FormState) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let content = if state.busy {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Analyzing property...",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            )),
        ]
    } else if let Some(error) = &state.error {
        vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", error), Style::default().fg(Color::Red))),
        ]
    } else if let Some(result) = &state.result {
        let m = &result.metrics;
        vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Estimated price: ", label),
                Span::styled(
                    format_price(result.predicted_price),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![Span::styled("  Model: ", label), Span::raw(&result.model_info.model_type)]),
            Line::from(vec![
                Span::styled("  Features: ", label),
                Span::raw(
                    result
                        .model_info
                        .features_used
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]),
            Line::from(""),
            Line::from("  ─────────────────────────────────────"),
            Line::from(vec![Span::styled("  R²:   ", label), Span::raw(format!("{:.4}", m.r2_score))]),
            Line::from(vec![Span::styled("  MAE:  ", label), Span::raw(format_price(m.mae))]),
            Line::from(vec![Span::styled("  RMSE: ", label), Span::raw(format_price(m.rmse))]),
            Line::from(vec![Span::styled("  MAPE: ", label), Span::raw(format!("{:.2}%", m.mape))]),
        ]
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Press s to estimate the price",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ]
    };

    let panel = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Estimate "),
    );

    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = Style::default().fg(Color::Yellow);

    let spans = if app.editing.is_some() {
        vec![
            Span::styled(" Enter", key),
            Span::raw(" Apply | "),
            Span::styled("Esc", key),
            Span::raw(" Cancel"),
        ]
    } else {
        vec![
            Span::styled(" ↑/↓", key),
            Span::raw(" Field | "),
            Span::styled("Enter", key),
            Span::raw(" Edit | "),
            Span::styled("s", key),
            Span::raw(" Estimate | "),
            Span::styled("r", key),
            Span::raw(" Reset | "),
            Span::styled("q", Style::default().fg(Color::Red)),
            Span::raw(" Quit"),
        ]
    };

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

/// Integers without decimals, everything else as typed
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// `$1,234,567`
fn format_price(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if whole < 0 {
        format!("-${}", out)
    } else {
        format!("${}", out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use house_price_estimator::{Config, Session};

    fn app() -> App {
        App::new(Session::new(&Config::default()))
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        app.previous();
        assert_eq!(app.selected_field(), Field::AirportDistance);
        app.next();
        assert_eq!(app.selected_field(), Field::Bedrooms);
    }

    #[test]
    fn test_edit_commits_through_session() {
        let mut app = app();
        app.next();
        app.next(); // living area
        app.start_edit();
        assert_eq!(app.editing.as_deref(), Some("1800"));

        for _ in 0..4 {
            app.pop_char();
        }
        for c in "2500x".chars() {
            app.push_char(c);
        }
        app.commit_edit();

        let attrs = app.session.state().attributes;
        assert_eq!(attrs.living_area, 2500.0);
        assert_eq!(attrs.house_area, 2250.0);
        assert!(app.editing.is_none());
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(342_123.6), "$342,124");
        assert_eq!(format_price(999.0), "$999");
        assert_eq!(format_price(1_000_000.0), "$1,000,000");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(-122.2), "-122.2");
    }
}
