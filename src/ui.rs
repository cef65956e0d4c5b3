use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use tcoa_dashboard::format;
use tcoa_dashboard::{ComparisonView, Dashboard, Metric, TrendSeries, ViewRequest};

const USF_GREEN: Color = Color::Rgb(0, 84, 60);
const SECONDARY_GRAY: Color = Color::Rgb(211, 211, 211);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Comparison,
    Schools,
    Trends,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Comparison => Page::Schools,
            Page::Schools => Page::Trends,
            Page::Trends => Page::Comparison,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Comparison => Page::Trends,
            Page::Schools => Page::Comparison,
            Page::Trends => Page::Schools,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Comparison => "Cost Comparison",
            Page::Schools => "Select Schools",
            Page::Trends => "Trend Analysis",
        }
    }
}

pub struct App {
    pub dashboard: Dashboard,
    pub metric: Metric,
    pub year_index: usize,
    /// Aligned with the dataset's institution order
    pub selected: Vec<bool>,
    pub current_page: Page,
    pub comparison_state: TableState,
    pub schools_state: TableState,
    pub trends_state: TableState,
    pub view: Option<ComparisonView>,
    pub trends: Vec<TrendSeries>,
    pub error: Option<String>,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let year_index = dashboard
            .dataset()
            .year_index(dashboard.default_year())
            .unwrap_or(0);
        let selected = vec![true; dashboard.dataset().len()];

        let mut schools_state = TableState::default();
        schools_state.select(Some(0));

        let mut app = Self {
            dashboard,
            metric: Metric::Annual,
            year_index,
            selected,
            current_page: Page::Comparison,
            comparison_state: TableState::default(),
            schools_state,
            trends_state: TableState::default(),
            view: None,
            trends: Vec::new(),
            error: None,
        };
        app.refresh();
        app
    }

    pub fn year(&self) -> &str {
        &self.dashboard.dataset().years()[self.year_index]
    }

    pub fn metric_label(&self) -> String {
        self.dashboard.metric_label(self.metric)
    }

    pub fn selection(&self) -> Vec<String> {
        self.dashboard
            .dataset()
            .names()
            .into_iter()
            .zip(&self.selected)
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Recompute every view from the current settings
    pub fn refresh(&mut self) {
        let request = ViewRequest {
            metric: self.metric,
            year: Some(self.year().to_string()),
            selection: self.selection(),
        };

        match self.dashboard.render_view(&request) {
            Ok(view) => {
                self.error = None;
                select_first(&mut self.comparison_state, view.rows.len());
                self.view = Some(view);
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.view = None;
                self.comparison_state.select(None);
            }
        }

        self.trends = self.dashboard.trends(&request.selection);
        select_first(&mut self.trends_state, self.trends.len());
    }

    pub fn toggle_metric(&mut self) {
        self.metric = self.metric.toggle();
        self.refresh();
    }

    pub fn next_year(&mut self) {
        let len = self.dashboard.dataset().years().len();
        self.year_index = (self.year_index + 1) % len;
        self.refresh();
    }

    pub fn previous_year(&mut self) {
        let len = self.dashboard.dataset().years().len();
        self.year_index = (self.year_index + len - 1) % len;
        self.refresh();
    }

    pub fn toggle_school(&mut self) {
        if let Some(i) = self.schools_state.selected() {
            if let Some(on) = self.selected.get_mut(i) {
                *on = !*on;
                self.refresh();
            }
        }
    }

    pub fn select_all(&mut self, on: bool) {
        self.selected.iter_mut().for_each(|s| *s = on);
        self.refresh();
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn active_table(&mut self) -> (&mut TableState, usize) {
        match self.current_page {
            Page::Comparison => {
                let len = self.view.as_ref().map(|v| v.rows.len()).unwrap_or(0);
                (&mut self.comparison_state, len)
            }
            Page::Schools => (&mut self.schools_state, self.selected.len()),
            Page::Trends => (&mut self.trends_state, self.trends.len()),
        }
    }

    pub fn next(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i < len - 1 => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = state.selected().map(|i| (i + 10).min(len - 1)).unwrap_or(0);
        state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let (state, len) = self.active_table();
        if len == 0 {
            return;
        }
        let i = state.selected().map(|i| i.saturating_sub(10)).unwrap_or(0);
        state.select(Some(i));
    }

    pub fn home(&mut self) {
        let (state, len) = self.active_table();
        if len > 0 {
            state.select(Some(0));
        }
    }

    pub fn end(&mut self) {
        let (state, len) = self.active_table();
        if len > 0 {
            state.select(Some(len - 1));
        }
    }
}

fn select_first(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else if state.selected().map_or(true, |i| i >= len) {
        state.select(Some(0));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('m') => app.toggle_metric(),
                KeyCode::Char('y') => app.next_year(),
                KeyCode::Char('Y') => app.previous_year(),
                KeyCode::Char(' ') if app.current_page == Page::Schools => app.toggle_school(),
                KeyCode::Char('a') => app.select_all(true),
                KeyCode::Char('n') => app.select_all(false),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.home(),
                KeyCode::End => app.end(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(4), // Info + status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Comparison => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            render_bar_chart(f, content_chunks[0], app);
            render_comparison_table(f, content_chunks[1], app);
        }
        Page::Schools => render_schools(f, chunks[1], app),
        Page::Trends => render_trends(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Comparison, Page::Schools, Page::Trends];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    let selected_count = app.selected.iter().filter(|s| **s).count();

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Year: {}", app.year()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Metric: {}", app.metric_label()),
        Style::default().fg(Color::Cyan),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Schools: {}/{}", selected_count, app.selected.len()),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Jesuit University Cost Comparison "),
    );

    f.render_widget(header, area);
}

fn render_bar_chart(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" Cost Comparison ({}) ", app.year()));

    let view = match &app.view {
        Some(view) if !view.rows.is_empty() => view,
        _ => {
            f.render_widget(Paragraph::new("  No schools selected").block(block), area);
            return;
        }
    };

    let bars: Vec<Bar> = view
        .rows
        .iter()
        .map(|row| {
            let color = if row.institution == view.baseline {
                USF_GREEN
            } else {
                SECONDARY_GRAY
            };

            Bar::default()
                .value(row.metric_value.max(0.0) as u64)
                .label(Line::from(truncate(&row.institution, 22)))
                .text_value(format::compact_usd(row.metric_value))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn render_comparison_table(f: &mut Frame, area: Rect, app: &mut App) {
    let metric_title = app.metric_label();
    let delta_title = app.dashboard.difference_label();
    let header = table_header(&["Institution", metric_title.as_str(), delta_title.as_str()]);

    let baseline = app.dashboard.baseline().to_string();
    let rows: Vec<Row> = app
        .view
        .as_ref()
        .map(|view| {
            view.rows
                .iter()
                .map(|row| {
                    let delta_color = if row.difference_from_baseline > 0.0 {
                        Color::Red
                    } else if row.difference_from_baseline < 0.0 {
                        Color::Green
                    } else {
                        Color::White
                    };

                    let mut cells_row = Row::new(vec![
                        Cell::from(truncate(&row.institution, 24)),
                        Cell::from(format::usd(row.metric_value)),
                        Cell::from(format::signed_usd(row.difference_from_baseline))
                            .style(Style::default().fg(delta_color)),
                    ])
                    .height(1);

                    if row.is_baseline(&baseline) {
                        cells_row = cells_row
                            .style(Style::default().fg(USF_GREEN).add_modifier(Modifier::BOLD));
                    }
                    cells_row
                })
                .collect()
        })
        .unwrap_or_default();

    let table = Table::new(
        rows,
        [
            Constraint::Length(26),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Comparison Table "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.comparison_state);
}

fn render_schools(f: &mut Frame, area: Rect, app: &mut App) {
    let cost_title = format!("TCOA {}", app.year());
    let header = table_header(&["", "Institution", &cost_title]);

    let year = app.year().to_string();
    let baseline = app.dashboard.baseline().to_string();
    let rows: Vec<Row> = app
        .dashboard
        .dataset()
        .institutions()
        .iter()
        .zip(&app.selected)
        .map(|(inst, on)| {
            let cost = app
                .dashboard
                .dataset()
                .annual_cost_for(&inst.name, &year)
                .map(format::usd)
                .unwrap_or_default();
            let mark = if *on { "[x]" } else { "[ ]" };
            let style = if inst.name == baseline {
                Style::default().fg(USF_GREEN).add_modifier(Modifier::BOLD)
            } else if *on {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            Row::new(vec![
                Cell::from(mark),
                Cell::from(inst.name.clone()),
                Cell::from(cost),
            ])
            .style(style)
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(30),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Schools - Space toggles, a all, n none "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.schools_state);
}

fn render_trends(f: &mut Frame, area: Rect, app: &mut App) {
    let years: Vec<String> = app
        .trends
        .first()
        .map(|s| s.points.iter().map(|p| p.year.clone()).collect())
        .unwrap_or_default();

    let mut titles: Vec<&str> = vec!["Institution"];
    titles.extend(years.iter().map(String::as_str));
    titles.push("Change");
    let header = table_header(&titles);

    let baseline = app.dashboard.baseline().to_string();
    let rows: Vec<Row> = app
        .trends
        .iter()
        .map(|series| {
            let mut cells = vec![Cell::from(truncate(&series.institution, 24))];
            cells.extend(series.points.iter().map(|p| Cell::from(format::usd(p.cost))));
            cells.push(Cell::from(format!("{:+.1}%", series.change_pct)));

            let style = if series.institution == baseline {
                Style::default().fg(USF_GREEN).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(cells).style(style).height(1)
        })
        .collect();

    let mut widths = vec![Constraint::Length(26)];
    widths.extend(years.iter().map(|_| Constraint::Length(11)));
    widths.push(Constraint::Length(9));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Tuition Growth Trends - bold row is the baseline "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.trends_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let info = match (&app.error, &app.view) {
        (Some(err), _) => Span::styled(format!(" {}", err), Style::default().fg(Color::Red)),
        (None, Some(view)) => Span::styled(
            format!(" {}", view.baseline_summary()),
            Style::default().fg(Color::Green),
        ),
        (None, None) => Span::raw(""),
    };

    let hint = |key: &'static str, label: &'static str| {
        vec![
            Span::styled(key, Style::default().fg(Color::Yellow)),
            Span::raw(label),
        ]
    };

    let mut status_spans = vec![Span::raw(" ")];
    status_spans.extend(hint("Tab", " Page | "));
    status_spans.extend(hint("m", " Metric | "));
    status_spans.extend(hint("y/Y", " Year | "));
    status_spans.extend(hint("a/n", " All/None | "));
    status_spans.extend(hint("↑/↓", " Nav | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(info), Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn table_header<'a>(titles: &[&'a str]) -> Row<'a> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    Row::new(cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcoa_dashboard::{Dataset, ProjectionParams, Settings, DEFAULT_BASELINE};

    fn app() -> App {
        let dashboard =
            Dashboard::new(Dataset::builtin(), DEFAULT_BASELINE, ProjectionParams::default())
                .unwrap();
        App::new(dashboard)
    }

    #[test]
    fn test_starts_with_everything_selected() {
        let app = app();

        assert_eq!(app.year(), "2025-26");
        assert_eq!(app.selection().len(), 27);
        assert_eq!(app.view.as_ref().unwrap().rows.len(), 27);
        assert_eq!(app.trends.len(), 27);
        assert!(app.error.is_none());
    }

    #[test]
    fn test_toggle_metric_recomputes() {
        let mut app = app();
        app.toggle_metric();

        let view = app.view.as_ref().unwrap();
        assert_eq!(view.metric, Metric::Projected);
        assert_eq!(view.baseline_value, 390312.0);
    }

    #[test]
    fn test_labels_follow_settings() {
        let settings = Settings::from_toml(
            "[dashboard]\nbaseline = \"Fordham\"\n\n[projection]\nyears = 5\n",
        )
        .unwrap();
        let dashboard = Dashboard::from_settings(Dataset::builtin(), &settings).unwrap();
        let mut app = App::new(dashboard);

        assert_eq!(app.metric_label(), "Annual Cost");
        app.toggle_metric();
        assert_eq!(app.metric_label(), "Projected 5-Year Total");
        assert_eq!(app.dashboard.difference_label(), "Difference from Fordham");
    }

    #[test]
    fn test_year_cycles() {
        let mut app = app();

        app.next_year();
        assert_eq!(app.year(), "2024-25");
        assert_eq!(app.view.as_ref().unwrap().baseline_value, 89470.0);

        app.previous_year();
        app.previous_year();
        assert_eq!(app.year(), "2022-23");
    }

    #[test]
    fn test_toggle_school_and_select_none() {
        let mut app = app();
        app.current_page = Page::Schools;

        // First row is the baseline
        app.toggle_school();
        assert_eq!(app.selection().len(), 26);
        assert!(!app.selection().contains(&DEFAULT_BASELINE.to_string()));
        // Baseline value stays available when the baseline is deselected
        assert_eq!(app.view.as_ref().unwrap().baseline_value, 92602.0);

        app.select_all(false);
        assert!(app.view.as_ref().unwrap().rows.is_empty());
        assert!(app.trends.is_empty());
        assert_eq!(app.trends_state.selected(), None);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        app.current_page = Page::Schools;

        app.previous();
        assert_eq!(app.schools_state.selected(), Some(26));
        app.next();
        assert_eq!(app.schools_state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.schools_state.selected(), Some(10));
        app.end();
        app.page_down();
        assert_eq!(app.schools_state.selected(), Some(26));
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Comparison.next(), Page::Schools);
        assert_eq!(Page::Trends.next(), Page::Comparison);
        assert_eq!(Page::Comparison.previous(), Page::Trends);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Fordham", 10), "Fordham");
        assert_eq!(truncate("College of the Holy Cross", 10), "College...");
        assert_eq!(truncate("St. Joseph’s", 12), "St. Joseph’s");
    }
}
