//! Static HTML reports with inline SVG charts.
//!
//! Two outputs: a per-run report (metrics table, equity curve, drawdown) and
//! an analysis page comparing headline metrics across runs.

use std::fs;
use std::path::Path;

use crate::domain::analysis::{RunRecord, Summary};
use crate::domain::backtest::BacktestResult;
use crate::domain::error::GaptraderError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::EquityPoint;

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 240.0;
const PADDING: f64 = 40.0;

/// Polyline SVG of a numeric series, scaled into the plot box.
pub fn svg_line_chart(values: &[f64], title: &str, color: &str) -> String {
    if values.is_empty() {
        return format!("<p>No data for {title}.</p>");
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let plot_width = CHART_WIDTH - 2.0 * PADDING;
    let plot_height = CHART_HEIGHT - 2.0 * PADDING;

    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 0.0 };
    let scale_x = if values.len() > 1 {
        plot_width / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = PADDING + i as f64 * scale_x;
            let y = CHART_HEIGHT - PADDING - (v - min) * scale_y;
            format!("{x:.1},{y:.1}")
        })
        .collect();

    format!(
        r#"<figure>
<svg width="{w:.0}" height="{h:.0}" xmlns="http://www.w3.org/2000/svg">
<rect width="{w:.0}" height="{h:.0}" fill="white"/>
<line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{y2:.0}" stroke="black"/>
<line x1="{p:.0}" y1="{y2:.0}" x2="{x2:.0}" y2="{y2:.0}" stroke="black"/>
<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{points}"/>
<text x="{p:.0}" y="20" font-size="14">{title}</text>
</svg>
<figcaption>{title}</figcaption>
</figure>"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        p = PADDING,
        y2 = CHART_HEIGHT - PADDING,
        x2 = CHART_WIDTH - PADDING,
        points = points.join(" "),
    )
}

/// Bar chart SVG, one bar per run. Bars are anchored at zero so negative
/// values hang below the axis.
pub fn svg_bar_chart(values: &[f64], labels: &[String], title: &str, color: &str) -> String {
    if values.is_empty() {
        return format!("<p>No data for {title}.</p>");
    }

    let min = values.iter().cloned().fold(0.0_f64, f64::min);
    let max = values.iter().cloned().fold(0.0_f64, f64::max);

    let plot_width = CHART_WIDTH - 2.0 * PADDING;
    let plot_height = CHART_HEIGHT - 2.0 * PADDING;

    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 0.0 };
    let zero_y = CHART_HEIGHT - PADDING - (0.0 - min) * scale_y;

    let slot = plot_width / values.len() as f64;
    let bar_width = (slot * 0.7).max(1.0);

    let mut bars = String::new();
    for (i, &v) in values.iter().enumerate() {
        let x = PADDING + i as f64 * slot + (slot - bar_width) / 2.0;
        let v_y = CHART_HEIGHT - PADDING - (v - min) * scale_y;
        let (y, height) = if v >= 0.0 {
            (v_y, zero_y - v_y)
        } else {
            (zero_y, v_y - zero_y)
        };
        let label = labels.get(i).cloned().unwrap_or_default();
        bars.push_str(&format!(
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{color}"><title>{label}: {v:.2}</title></rect>
"#,
        ));
    }

    format!(
        r#"<figure>
<svg width="{w:.0}" height="{h:.0}" xmlns="http://www.w3.org/2000/svg">
<rect width="{w:.0}" height="{h:.0}" fill="white"/>
<line x1="{p:.0}" y1="{zero_y:.1}" x2="{x2:.0}" y2="{zero_y:.1}" stroke="black"/>
{bars}<text x="{p:.0}" y="20" font-size="14">{title}</text>
</svg>
<figcaption>{title}</figcaption>
</figure>"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        p = PADDING,
        x2 = CHART_WIDTH - PADDING,
    )
}

fn drawdown_series(equity_curve: &[EquityPoint]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity_curve
        .iter()
        .map(|p| {
            if p.equity > peak {
                peak = p.equity;
            }
            if peak > 0.0 {
                -(peak - p.equity) / peak * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #ccc; padding: 4px 10px; text-align: right; }}
th {{ background: #f0f0f0; }}
figure {{ margin: 1.5em 0; }}
</style>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#
    )
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Per-run report: headline metrics plus equity and drawdown charts.
    pub fn write_run_report(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_path: &Path,
    ) -> Result<(), GaptraderError> {
        let equity: Vec<f64> = result
            .portfolio
            .equity_curve
            .iter()
            .map(|p| p.equity)
            .collect();

        let rows = [
            ("Ticker", result.ticker.clone()),
            ("Period", format!("{} to {}", result.start_date, result.end_date)),
            ("Bars", result.bars_processed.to_string()),
            ("Total Return", format!("{:.2}%", metrics.total_return * 100.0)),
            (
                "Annualized Return",
                format!("{:.2}%", metrics.annualized_return * 100.0),
            ),
            ("Sharpe Ratio", format!("{:.2}", metrics.sharpe_ratio)),
            ("Sortino Ratio", format!("{:.2}", metrics.sortino_ratio)),
            (
                "Max Drawdown",
                format!("-{:.1}%", metrics.max_drawdown * 100.0),
            ),
            ("# Trades", metrics.total_trades.to_string()),
            ("Win Rate", format!("{:.1}%", metrics.win_rate * 100.0)),
            ("Profit Factor", format!("{:.2}", metrics.profit_factor)),
            ("Final Equity", format!("{:.2}", metrics.final_equity)),
        ];

        let table_rows: String = rows
            .iter()
            .map(|(k, v)| format!("<tr><th>{k}</th><td>{v}</td></tr>\n"))
            .collect();

        let body = format!(
            "<table>\n{table_rows}</table>\n{}\n{}",
            svg_line_chart(&equity, "Equity Curve", "steelblue"),
            svg_line_chart(
                &drawdown_series(&result.portfolio.equity_curve),
                "Drawdown (%)",
                "firebrick"
            ),
        );

        let title = format!("Backtest Report: {}", result.ticker);
        fs::write(output_path, html_page(&title, &body))?;
        Ok(())
    }

    /// Cross-run comparison: one bar per run for each headline metric.
    pub fn write_analysis_report(
        &self,
        records: &[RunRecord],
        summary: &Summary,
        output_path: &Path,
    ) -> Result<(), GaptraderError> {
        let labels: Vec<String> = records
            .iter()
            .map(|r| r.recorded_at.format("%Y-%m-%d %H:%M").to_string())
            .collect();

        let chart = |f: fn(&RunRecord) -> f64, title: &str, color: &str| {
            let values: Vec<f64> = records.iter().map(f).collect();
            svg_bar_chart(&values, &labels, title, color)
        };

        let body = format!(
            "<p>{} runs, average return {:.2}%, average Sharpe {:.2}.</p>\n{}\n{}\n{}\n{}",
            summary.num_runs,
            summary.avg_return_pct,
            summary.avg_sharpe_ratio,
            chart(|r| r.stats.return_pct, "Total Return (%)", "seagreen"),
            chart(|r| r.stats.sharpe_ratio, "Sharpe Ratio", "steelblue"),
            chart(|r| -r.stats.max_drawdown_pct, "Max Drawdown (%)", "firebrick"),
            chart(|r| r.stats.win_rate_pct, "Win Rate (%)", "rebeccapurple"),
        );

        let title = format!("Strategy Performance: {}", summary.ticker);
        fs::write(output_path, html_page(&title, &body))?;
        Ok(())
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}
