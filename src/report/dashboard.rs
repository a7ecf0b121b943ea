//! Plain-text dashboard report using comfy-table

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{
    ChartBody, ChartData, ChurnSummary, Dashboard, KeyMetrics, Metric, ScatterPoint, Section,
};
use crate::utils::{
    format_rate, format_thousands, print_info, print_insight, print_section_header, rate_bar,
};

/// Width of the churn-rate bar column
const BAR_WIDTH: usize = 24;

/// Display value of a metric, `None` when the metric is unavailable
pub fn metric_value(metrics: &KeyMetrics, metric: Metric) -> Option<String> {
    match metric {
        Metric::TotalCustomers => Some(format_thousands(metrics.total_customers as f64)),
        Metric::AttritionRate => Some(
            metrics
                .attrition_rate_pct
                .map(|r| format!("{:.2}%", r))
                .unwrap_or_else(|| "n/a".to_string()),
        ),
        Metric::AvgCreditLimit => metrics
            .avg_credit_limit
            .map(|v| format!("${}", format_thousands(v))),
        Metric::AvgUtilization => metrics.avg_utilization_pct.map(|v| format!("{:.1}%", v)),
        Metric::AvgSpend => metrics.avg_spend.map(|v| format!("${}", format_thousands(v))),
        Metric::AvgTransactions => metrics.avg_transactions.map(|v| format!("{:.0}", v)),
    }
}

/// Available metrics with their display values, in display order
pub fn metric_lines(metrics: &KeyMetrics) -> Vec<(Metric, String)> {
    Metric::ALL
        .iter()
        .filter_map(|m| metric_value(metrics, *m).map(|v| (*m, v)))
        .collect()
}

/// Persona × income grid: (row labels, column labels, rates[row][col])
pub struct Heatmap {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    /// Lay out a two-column summary; keys are (row, column)
    pub fn from_summary(summary: &ChurnSummary) -> Self {
        let mut rows: Vec<String> = Vec::new();
        let mut columns: Vec<String> = Vec::new();
        for g in &summary.groups {
            if let [r, c] = g.key.as_slice() {
                if !rows.contains(r) {
                    rows.push(r.clone());
                }
                if !columns.contains(c) {
                    columns.push(c.clone());
                }
            }
        }
        columns.sort();

        let cells = rows
            .iter()
            .map(|r| {
                columns
                    .iter()
                    .map(|c| summary.rate_of(&[r.as_str(), c.as_str()]))
                    .collect()
            })
            .collect();

        Self {
            rows,
            columns,
            cells,
        }
    }
}

/// Churned vs retained averages of the scatter points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterGroup {
    pub customers: usize,
    pub avg_utilization: f64,
    pub avg_spend: f64,
}

pub fn scatter_groups(points: &[ScatterPoint]) -> [(bool, Option<ScatterGroup>); 2] {
    let group = |churned: bool| {
        let members: Vec<&ScatterPoint> = points.iter().filter(|p| p.churned == churned).collect();
        if members.is_empty() {
            return None;
        }
        let n = members.len() as f64;
        Some(ScatterGroup {
            customers: members.len(),
            avg_utilization: members.iter().map(|p| p.utilization).sum::<f64>() / n,
            avg_spend: members.iter().map(|p| p.spend).sum::<f64>() / n,
        })
    };
    [(false, group(false)), (true, group(true))]
}

fn heat_color(rate: f64) -> Color {
    if rate >= 0.3 {
        Color::Red
    } else if rate >= 0.15 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        header
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

pub fn metrics_table(metrics: &KeyMetrics) -> Table {
    let mut table = new_table(vec!["Metric", "Value"]);
    for (metric, value) in metric_lines(metrics) {
        let cell = Cell::new(value).set_alignment(CellAlignment::Right);
        let cell = if metric == Metric::AttritionRate {
            cell.fg(Color::Red).add_attribute(Attribute::Bold)
        } else {
            cell
        };
        table.add_row(vec![Cell::new(metric.label()), cell]);
    }
    table
}

pub fn rates_table(summary: &ChurnSummary) -> Table {
    let group_header = summary.group_by.join(" × ");
    let mut table = new_table(vec![group_header.as_str(), "Customers", "Churn Rate", ""]);
    for g in &summary.groups {
        table.add_row(vec![
            Cell::new(g.label()),
            Cell::new(g.customers).set_alignment(CellAlignment::Right),
            Cell::new(format_rate(g.churn_rate, 1))
                .fg(heat_color(g.churn_rate))
                .set_alignment(CellAlignment::Right),
            Cell::new(rate_bar(g.churn_rate, BAR_WIDTH)).fg(Color::DarkYellow),
        ]);
    }
    table
}

pub fn heatmap_table(summary: &ChurnSummary) -> Table {
    let heatmap = Heatmap::from_summary(summary);
    let corner = summary.group_by.join(" \\ ");
    let mut header = vec![corner.as_str()];
    header.extend(heatmap.columns.iter().map(|c| c.as_str()));
    let mut table = new_table(header);

    for (row, cells) in heatmap.rows.iter().zip(&heatmap.cells) {
        let mut line = vec![Cell::new(row).add_attribute(Attribute::Bold)];
        line.extend(cells.iter().map(|cell| match cell {
            Some(rate) => Cell::new(format_rate(*rate, 1))
                .fg(heat_color(*rate))
                .set_alignment(CellAlignment::Right),
            None => Cell::new("·").set_alignment(CellAlignment::Center),
        }));
        table.add_row(line);
    }
    table
}

pub fn scatter_table(points: &[ScatterPoint]) -> Table {
    let mut table = new_table(vec!["Outcome", "Customers", "Avg Utilization", "Avg Spend"]);
    for (churned, group) in scatter_groups(points) {
        let Some(group) = group else { continue };
        let outcome = if churned {
            Cell::new("Churned").fg(Color::Red)
        } else {
            Cell::new("Retained").fg(Color::Green)
        };
        table.add_row(vec![
            outcome,
            Cell::new(group.customers).set_alignment(CellAlignment::Right),
            Cell::new(format_rate(group.avg_utilization, 1)).set_alignment(CellAlignment::Right),
            Cell::new(format!("${}", format_thousands(group.avg_spend)))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn chart_table(chart: &ChartData) -> Table {
    match &chart.body {
        ChartBody::Scatter { points } => scatter_table(points),
        ChartBody::Rates(summary) if summary.group_by.len() == 2 => heatmap_table(summary),
        ChartBody::Rates(summary) => rates_table(summary),
    }
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Print the whole dashboard as plain terminal tables
pub fn print_dashboard(dashboard: &Dashboard) {
    println!();
    println!(
        "    {} {}",
        style("📊").cyan(),
        style("KEY METRICS").white().bold()
    );
    println!("    {}", style("─".repeat(60)).dim());
    print_indented(&metrics_table(&dashboard.metrics));

    for (i, section) in Section::ALL.iter().enumerate() {
        print_section_header(i + 1, section.title());

        let mut drawn = 0;
        for chart in dashboard.charts_in(*section) {
            println!();
            println!("      {}", style(chart.chart.title()).bold());
            if chart.rates().is_some_and(|s| s.is_empty()) {
                print_info("No data for the current filters");
                continue;
            }
            print_indented(&chart_table(chart));
            drawn += 1;
        }
        if drawn == 0 {
            print_info("Not enough columns in this dataset for this section");
        }

        for insight in dashboard
            .insights
            .iter()
            .filter(|i| insight_section(i.kind) == *section)
        {
            println!();
            print_insight(insight.kind.heading(), &insight.text);
        }
    }

    if !dashboard.skipped.is_empty() {
        println!();
        let names: Vec<&str> = dashboard.skipped.iter().map(|c| c.title()).collect();
        print_info(&format!("Skipped (missing columns): {}", names.join(", ")));
    }
}

/// Section an insight is printed under
pub fn insight_section(kind: crate::pipeline::InsightKind) -> Section {
    use crate::pipeline::InsightKind;
    match kind {
        InsightKind::Demographic => Section::Demographics,
        InsightKind::Behavioral => Section::Behavior,
        InsightKind::EarlyWarning => Section::Lifecycle,
        InsightKind::Retention => Section::Retention,
    }
}
