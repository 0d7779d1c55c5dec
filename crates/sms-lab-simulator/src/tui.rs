use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, List, ListItem, Paragraph},
};
use sms_lab_abstract::{ProgressReport, SimConfig};
use tokio::sync::mpsc::{self, error::TryRecvError};

/// A tracing writer that keeps recent log lines for the dashboard.
#[derive(Clone)]
pub struct MemoryLogBuffer {
    logs: Arc<Mutex<Vec<String>>>,
}

impl Default for MemoryLogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLogBuffer {
    const CAPACITY: usize = 1000;

    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, msg: String) {
        let mut logs = self.logs.lock().unwrap_or_else(|p| p.into_inner());
        logs.push(msg);
        if logs.len() > Self::CAPACITY {
            logs.remove(0);
        }
    }

    /// Up to `n` most recent lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let logs = self.logs.lock().unwrap_or_else(|p| p.into_inner());
        logs[logs.len().saturating_sub(n)..].to_vec()
    }
}

impl io::Write for MemoryLogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let line = s.trim();
        if !line.is_empty() {
            self.push(line.to_string());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Live dashboard fed by a [`crate::ChannelSink`].
///
/// The run itself happens elsewhere; this only consumes reports until the
/// sink is dropped, then keeps the final picture on screen until `q`.
pub struct TuiApp {
    config: SimConfig,
    scenario_name: Option<String>,
    reports: Vec<ProgressReport>,
    rx: mpsc::UnboundedReceiver<ProgressReport>,
    logs: Option<MemoryLogBuffer>,
    finished: bool,
}

impl TuiApp {
    pub fn new(
        config: SimConfig,
        scenario_name: Option<String>,
        rx: mpsc::UnboundedReceiver<ProgressReport>,
        logs: Option<MemoryLogBuffer>,
    ) -> Self {
        Self {
            config,
            scenario_name,
            reports: Vec::new(),
            rx,
            logs,
            finished: false,
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(100);

        loop {
            self.drain_reports();
            terminal.draw(|f| self.ui(f))?;

            if crossterm::event::poll(tick_rate)?
                && let Event::Key(key) = event::read()?
                && key.code == KeyCode::Char('q')
            {
                break;
            }
        }

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    pub fn reports(&self) -> &[ProgressReport] {
        &self.reports
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pull every pending report without blocking.
    pub fn drain_reports(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(report) => self.reports.push(report),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }
    }

    fn ui(&self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Control bar
                Constraint::Length(3), // Progress gauge
                Constraint::Min(0),    // Stats + latency chart
                Constraint::Length(8), // Logs
            ])
            .split(f.area());

        self.render_control(f, rows[0]);
        self.render_gauge(f, rows[1]);

        let mid = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[2]);
        self.render_stats(f, mid[0]);
        self.render_latency_chart(f, mid[1]);

        self.render_logs(f, rows[3]);
    }

    fn render_control(&self, f: &mut Frame, area: Rect) {
        let scenario = self.scenario_name.as_deref().unwrap_or("Ad-hoc Simulation");
        let elapsed = self.reports.last().map(|r| r.elapsed_secs).unwrap_or(0.0);
        let status_text = format!(
            "Scenario: {} | Elapsed: {:.1} s | Status: {} | (q)uit",
            scenario,
            elapsed,
            if self.finished { "COMPLETE" } else { "RUNNING" },
        );
        let block = Paragraph::new(status_text)
            .block(Block::default().borders(Borders::ALL).title("Control"));
        f.render_widget(block, area);
    }

    fn render_gauge(&self, f: &mut Frame, area: Rect) {
        let sent = self.reports.last().map(|r| r.sent).unwrap_or(0);
        let ratio = (sent as f64 / self.config.message_count as f64).clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Processed"))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(ratio)
            .label(format!("{} / {}", sent, self.config.message_count));
        f.render_widget(gauge, area);
    }

    fn render_stats(&self, f: &mut Frame, area: Rect) {
        let cfg = &self.config;
        let mut lines = vec![
            Line::from("Configuration:"),
            Line::from(format!("  Messages:      {}", cfg.message_count)),
            Line::from(format!("  Senders:       {}", cfg.sender_count)),
            Line::from(format!(
                "  Latency:       {:.3} s ± {:.3} s",
                cfg.mean_processing_time, cfg.latency_spread
            )),
            Line::from(format!("  Error rate:    {:.2}", cfg.error_rate)),
            Line::from(""),
        ];

        match self.reports.last() {
            Some(r) => {
                lines.push(Line::from("Latest report:"));
                lines.push(Line::from(format!("  Succeeded:     {}", r.successfully_sent)));
                lines.push(Line::from(Span::styled(
                    format!("  Failed:        {}", r.failed),
                    Style::default().fg(Color::Red),
                )));
                lines.push(Line::from(format!(
                    "  Avg latency:   {:.4} s",
                    r.average_processing_time
                )));
            }
            None => lines.push(Line::from("Waiting for first report…")),
        }

        let block =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Dashboard"));
        f.render_widget(block, area);
    }

    fn render_latency_chart(&self, f: &mut Frame, area: Rect) {
        if self.reports.is_empty() {
            let block = Paragraph::new("No reports yet")
                .block(Block::default().borders(Borders::ALL).title("Average latency"));
            f.render_widget(block, area);
            return;
        }

        let pts: Vec<(f64, f64)> = self
            .reports
            .iter()
            .map(|r| (r.elapsed_secs, r.average_processing_time))
            .collect();

        let x_max = pts.last().map(|(x, _)| *x).unwrap_or(1.0).max(1.0);
        let mut y_max = pts.iter().map(|(_, y)| *y).fold(0.0, f64::max);
        if y_max < f64::EPSILON {
            y_max = 1.0;
        }

        let datasets = vec![
            Dataset::default()
                .name("avg s")
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(Color::Cyan))
                .graph_type(GraphType::Line)
                .data(&pts),
        ];

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Average latency"),
            )
            .x_axis(
                Axis::default()
                    .title("elapsed s")
                    .bounds([0.0, x_max])
                    .labels(vec![Span::raw("0"), Span::raw(format!("{:.0}", x_max))]),
            )
            .y_axis(
                Axis::default()
                    .title("s")
                    .bounds([0.0, y_max])
                    .labels(vec![Span::raw("0"), Span::raw(format!("{:.3}", y_max))]),
            );

        f.render_widget(chart, area);
    }

    fn render_logs(&self, f: &mut Frame, area: Rect) {
        let visible = (area.height.max(3) - 2) as usize;
        let items: Vec<ListItem> = match &self.logs {
            Some(logs) => logs
                .tail(visible)
                .into_iter()
                .map(|line| ListItem::new(Line::from(line)))
                .collect(),
            None => Vec::new(),
        };

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Logs"));
        f.render_widget(list, area);
    }
}
