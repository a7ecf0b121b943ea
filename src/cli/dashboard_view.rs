//! Interactive dashboard viewer using ratatui
//!
//! One tab for the key metrics and insights, one tab per dashboard section.
//! The viewer only renders; filter editing happens back on the prompt.

use std::io::{self, stdout};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart as ChartWidget, Dataset,
        GraphType, Paragraph, Row, Table, Tabs, Wrap,
    },
};

use crate::pipeline::{ChartBody, ChartData, ChurnSummary, Dashboard, FilterSelection, Section};
use crate::report::{insight_section, metric_lines, Heatmap};

/// What the user asked for when leaving the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    EditFilters,
    Quit,
}

#[derive(Debug, Default)]
struct ViewState {
    tab: usize,
}

const TAB_COUNT: usize = Section::ALL.len() + 1;

impl ViewState {
    fn handle_key(&mut self, code: KeyCode) -> Option<ViewAction> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(ViewAction::Quit),
            KeyCode::Char('f') | KeyCode::Char('F') => Some(ViewAction::EditFilters),
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.tab = (self.tab + 1) % TAB_COUNT;
                None
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.tab = (self.tab + TAB_COUNT - 1) % TAB_COUNT;
                None
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let n = c as usize - '0' as usize;
                if (1..=TAB_COUNT).contains(&n) {
                    self.tab = n - 1;
                }
                None
            }
            _ => None,
        }
    }
}

/// One-line description of which filters narrow the table
pub fn filter_summary(current: &FilterSelection, all: &FilterSelection) -> String {
    let narrowed: Vec<String> = current
        .selections()
        .iter()
        .filter(|s| all.get(&s.column) != Some(s.values.as_slice()))
        .map(|s| {
            if s.values.is_empty() {
                format!("{}: (none)", s.column)
            } else {
                format!("{}: {}", s.column, s.values.join(", "))
            }
        })
        .collect();

    if narrowed.is_empty() {
        "No filters (all customers)".to_string()
    } else {
        narrowed.join(" | ")
    }
}

/// Show the dashboard until the user quits or asks to change filters
pub fn run_dashboard_view(dashboard: &Dashboard, filters: &str) -> Result<ViewAction> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_view_loop(&mut terminal, dashboard, filters);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_view_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    dashboard: &Dashboard,
    filters: &str,
) -> Result<ViewAction> {
    let mut state = ViewState::default();

    loop {
        terminal.draw(|frame| draw_dashboard(frame, dashboard, &state, filters))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = state.handle_key(key.code) {
                return Ok(action);
            }
        }
    }
}

fn tab_titles() -> Vec<&'static str> {
    let mut titles = vec!["Overview"];
    titles.extend(Section::ALL.iter().map(|s| match s {
        Section::Demographics => "Demographics",
        Section::Behavior => "Behavior",
        Section::Lifecycle => "Lifecycle",
        Section::Retention => "Retention",
    }));
    titles
}

fn draw_dashboard(frame: &mut Frame, dashboard: &Dashboard, state: &ViewState, filters: &str) {
    let [tabs_area, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .areas(frame.area());

    let tabs = Tabs::new(tab_titles())
        .select(state.tab)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Customer Churn Intelligence ")
                .title_style(Style::default().fg(Color::Cyan).bold()),
        )
        .highlight_style(Style::default().fg(Color::Yellow).bold());
    frame.render_widget(tabs, tabs_area);

    match state.tab.checked_sub(1).and_then(|i| Section::ALL.get(i)) {
        None => draw_overview(frame, body, dashboard),
        Some(section) => draw_section(frame, body, dashboard, *section),
    }

    let help = vec![
        Line::from(vec![
            Span::styled("Filters: ", Style::default().fg(Color::DarkGray)),
            Span::raw(filters.to_string()),
        ]),
        Line::from(vec![
            Span::styled("←/→", Style::default().fg(Color::Cyan)),
            Span::raw(" switch tab  "),
            Span::styled("f", Style::default().fg(Color::Cyan)),
            Span::raw(" edit filters  "),
            Span::styled("q", Style::default().fg(Color::Cyan)),
            Span::raw(" quit"),
        ]),
    ];
    frame.render_widget(Paragraph::new(help), footer);
}

fn draw_overview(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let [metrics_area, insights_area] =
        Layout::vertical([Constraint::Length(10), Constraint::Min(0)]).areas(area);

    let rows: Vec<Row> = metric_lines(&dashboard.metrics)
        .into_iter()
        .map(|(metric, value)| {
            Row::new(vec![
                Cell::from(metric.label()),
                Cell::from(value).style(Style::default().fg(Color::Yellow).bold()),
            ])
        })
        .collect();
    let metrics = Table::new(rows, [Constraint::Length(20), Constraint::Min(10)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Key Metrics "),
    );
    frame.render_widget(metrics, metrics_area);

    let mut lines: Vec<Line> = dashboard
        .insights
        .iter()
        .flat_map(|insight| {
            [
                Line::from(Span::styled(
                    insight.kind.heading(),
                    Style::default().fg(Color::Magenta).bold(),
                )),
                Line::from(insight.text.clone()),
                Line::from(""),
            ]
        })
        .collect();
    if !dashboard.skipped.is_empty() {
        let names: Vec<&str> = dashboard.skipped.iter().map(|c| c.title()).collect();
        lines.push(Line::from(Span::styled(
            format!("Skipped (missing columns): {}", names.join(", ")),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let insights = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Insights "));
    frame.render_widget(insights, insights_area);
}

fn draw_section(frame: &mut Frame, area: Rect, dashboard: &Dashboard, section: Section) {
    let charts: Vec<&ChartData> = dashboard.charts_in(section).collect();
    let insight = dashboard
        .insights
        .iter()
        .find(|i| insight_section(i.kind) == section);

    let [charts_area, insight_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(if insight.is_some() { 4 } else { 0 }),
    ])
    .areas(area);

    if charts.is_empty() {
        let message = Paragraph::new("Not enough columns in this dataset for this section")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", section.title())));
        frame.render_widget(message, charts_area);
    } else {
        let areas = Layout::vertical(vec![Constraint::Ratio(1, charts.len() as u32); charts.len()])
            .split(charts_area);
        for (chart, chart_area) in charts.iter().zip(areas.iter()) {
            draw_chart(frame, *chart_area, chart);
        }
    }

    if let Some(insight) = insight {
        let text = Paragraph::new(vec![
            Line::from(Span::styled(
                insight.kind.heading(),
                Style::default().fg(Color::Magenta).bold(),
            )),
            Line::from(insight.text.clone()),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(text, insight_area);
    }
}

fn draw_chart(frame: &mut Frame, area: Rect, chart: &ChartData) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", chart.chart.title()));

    match &chart.body {
        ChartBody::Rates(summary) if summary.is_empty() => {
            let message = Paragraph::new("No data for the current filters")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(message, area);
        }
        ChartBody::Rates(summary) if summary.group_by.len() == 2 => {
            frame.render_widget(heatmap_widget(summary).block(block), area);
        }
        ChartBody::Rates(summary) => {
            frame.render_widget(bar_widget(summary).block(block), area);
        }
        ChartBody::Scatter { points } => {
            let retained: Vec<(f64, f64)> = points
                .iter()
                .filter(|p| !p.churned)
                .map(|p| (p.utilization, p.spend))
                .collect();
            let churned: Vec<(f64, f64)> = points
                .iter()
                .filter(|p| p.churned)
                .map(|p| (p.utilization, p.spend))
                .collect();
            let max_x = points.iter().map(|p| p.utilization).fold(1.0, f64::max);
            let max_y = points.iter().map(|p| p.spend).fold(1.0, f64::max);

            let datasets = vec![
                Dataset::default()
                    .name("Retained")
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(Color::Green))
                    .data(&retained),
                Dataset::default()
                    .name("Churned")
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(Color::Red))
                    .data(&churned),
            ];
            let widget = ChartWidget::new(datasets)
                .block(block)
                .x_axis(
                    Axis::default()
                        .title("Utilization")
                        .bounds([0.0, max_x])
                        .labels(["0".to_string(), format!("{:.2}", max_x)]),
                )
                .y_axis(
                    Axis::default()
                        .title("Spend")
                        .bounds([0.0, max_y])
                        .labels(["0".to_string(), format!("{:.0}", max_y)]),
                );
            frame.render_widget(widget, area);
        }
    }
}

fn bar_widget(summary: &ChurnSummary) -> BarChart<'_> {
    let bars: Vec<Bar> = summary
        .groups
        .iter()
        .map(|g| {
            Bar::default()
                .value((g.churn_rate * 1000.0).round() as u64)
                .text_value(format!("{:.1}%", g.churn_rate * 100.0))
                .label(Line::from(g.label()))
                .style(Style::default().fg(rate_color(g.churn_rate)))
        })
        .collect();

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(2)
        .max(1000)
}

fn heatmap_widget(summary: &ChurnSummary) -> Table<'static> {
    let heatmap = Heatmap::from_summary(summary);

    let mut header = vec![Cell::from(summary.group_by.join(" \\ "))];
    header.extend(heatmap.columns.iter().map(|c| Cell::from(c.clone())));

    let rows: Vec<Row> = heatmap
        .rows
        .iter()
        .zip(&heatmap.cells)
        .map(|(row, cells)| {
            let mut line = vec![Cell::from(row.clone()).style(Style::default().bold())];
            line.extend(cells.iter().map(|cell| match cell {
                Some(rate) => Cell::from(format!("{:.1}%", rate * 100.0))
                    .style(Style::default().fg(Color::Black).bg(rate_color(*rate))),
                None => Cell::from("·"),
            }));
            Row::new(line)
        })
        .collect();

    let widths = vec![Constraint::Length(14); heatmap.columns.len() + 1];
    Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().bold()))
        .column_spacing(1)
}

fn rate_color(rate: f64) -> Color {
    if rate >= 0.3 {
        Color::Red
    } else if rate >= 0.15 {
        Color::Yellow
    } else {
        Color::Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{
        Chart, ChurnSummary, GroupRate, Insight, InsightKind, KeyMetrics, ScatterPoint,
    };
    use ratatui::backend::TestBackend;

    fn dashboard() -> Dashboard {
        let by_gender = ChurnSummary {
            group_by: vec!["gender".into()],
            groups: vec![
                GroupRate {
                    key: vec!["F".into()],
                    churn_rate: 0.25,
                    customers: 4,
                },
                GroupRate {
                    key: vec!["M".into()],
                    churn_rate: 0.5,
                    customers: 2,
                },
            ],
        };
        Dashboard {
            metrics: KeyMetrics {
                total_customers: 6,
                attrition_rate_pct: Some(33.33),
                avg_credit_limit: None,
                avg_utilization_pct: None,
                avg_spend: None,
                avg_transactions: None,
            },
            charts: vec![
                ChartData {
                    chart: Chart::ChurnByGender,
                    body: ChartBody::Rates(by_gender),
                },
                ChartData {
                    chart: Chart::SpendVsUtilization,
                    body: ChartBody::Scatter {
                        points: vec![ScatterPoint {
                            utilization: 0.4,
                            spend: 900.0,
                            churned: true,
                        }],
                    },
                },
            ],
            skipped: vec![Chart::ChurnByTenure],
            insights: vec![Insight {
                kind: InsightKind::Demographic,
                text: "M customers churn the most".into(),
            }],
        }
    }

    fn render(state: &ViewState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|frame| draw_dashboard(frame, &dashboard(), state, "No filters"))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_overview_shows_metrics_and_insights() {
        let screen = render(&ViewState::default());
        assert!(screen.contains("Total Customers"));
        assert!(screen.contains("33.33%"));
        assert!(screen.contains("M customers churn the most"));
    }

    #[test]
    fn test_section_tab_draws_chart_titles() {
        let screen = render(&ViewState { tab: 1 });
        assert!(screen.contains("Churn by Gender"));
    }

    #[test]
    fn test_key_handling() {
        let mut state = ViewState::default();
        assert_eq!(state.handle_key(KeyCode::Right), None);
        assert_eq!(state.tab, 1);
        assert_eq!(state.handle_key(KeyCode::Left), None);
        assert_eq!(state.handle_key(KeyCode::Left), None);
        assert_eq!(state.tab, TAB_COUNT - 1);
        assert_eq!(state.handle_key(KeyCode::Char('3')), None);
        assert_eq!(state.tab, 2);
        assert_eq!(state.handle_key(KeyCode::Char('f')), Some(ViewAction::EditFilters));
        assert_eq!(state.handle_key(KeyCode::Char('q')), Some(ViewAction::Quit));
    }

    #[test]
    fn test_filter_summary() {
        let all = FilterSelection::default();
        assert_eq!(filter_summary(&all, &all), "No filters (all customers)");
    }
}
