//! SVG and page-layout builders shared by the scenario tests.

#![allow(dead_code)]

use chartmine_core::text::{PageLayout, TextBox};

pub const AXIS_STYLE: &str = r##"stroke="#dadce0" stroke-width="1.19""##;
pub const TREND_STYLE: &str = r##"style="fill:none;stroke:#4285f4;stroke-width:2px""##;

/// One chart as drawn by the report renderer: five horizontal reference
/// lines `spacing` apart starting at `top`, spanning `x0..x1`, followed by
/// one trend polyline.
pub fn chart_svg(x0: f64, x1: f64, top: f64, spacing: f64, trend: &[(f64, f64)]) -> String {
    let mut out = String::new();
    for i in 0..5 {
        let y = top + spacing * i as f64;
        out.push_str(&format!(
            r#"<line x1="{x0}" y1="{y}" x2="{x1}" y2="{y}" {AXIS_STYLE}/>"#
        ));
        out.push('\n');
    }
    let points: Vec<String> = trend.iter().map(|(x, y)| format!("{x},{y}")).collect();
    out.push_str(&format!(
        r#"<polyline points="{}" {TREND_STYLE}/>"#,
        points.join(" ")
    ));
    out.push('\n');
    out
}

/// A chart 420 wide and 160 tall whose trend falls linearly from `+start`
/// to `end` percent over the 43 days.
pub fn simple_chart_svg(x0: f64, top: f64, start: f64, end: f64) -> String {
    let baseline = top + 80.0;
    let trend: Vec<(f64, f64)> = (0..43)
        .map(|day| {
            let value = start + (end - start) * day as f64 / 42.0;
            (x0 + 10.0 * day as f64, baseline - value)
        })
        .collect();
    chart_svg(x0, x0 + 420.0, top, 40.0, &trend)
}

pub fn svg_document(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n\
         <rect x=\"0\" y=\"0\" width=\"100\" height=\"100\" fill=\"#ffffff\"/>\n\
         <g>\n{body}</g>\n</svg>\n"
    )
}

/// Text of one chart on a one-chart-per-row page, placed around the
/// "Baseline" tick at `(left, bottom)`.
pub fn summary_chart_boxes(left: f64, bottom: f64, title: &str, headline: &str, xlabels: (&str, &str)) -> Vec<TextBox> {
    vec![
        TextBox::new((left, bottom, left + 30.0, bottom + 8.0), "Baseline"),
        TextBox::new((left - 160.0, bottom + 45.0, left - 60.0, bottom + 55.0), title),
        TextBox::new(
            (left - 160.0, bottom - 10.0, left - 60.0, bottom + 20.0),
            format!("{headline}\ncompared to baseline"),
        ),
        TextBox::new((left + 10.0, bottom - 42.0, left + 50.0, bottom - 34.0), xlabels.0),
        TextBox::new((left + 120.0, bottom - 42.0, left + 165.0, bottom - 34.0), xlabels.1),
    ]
}

/// First report page: heading plus one chart per `(title, headline)`,
/// stacked top to bottom.
pub fn first_page(charts: &[(&str, &str)], xlabels: (&str, &str)) -> PageLayout {
    let mut boxes = vec![TextBox::new((30.0, 750.0, 400.0, 770.0), "Ruritania March 29, 2020")];
    for (i, (title, headline)) in charts.iter().enumerate() {
        let bottom = 600.0 - 150.0 * i as f64;
        boxes.extend(summary_chart_boxes(300.0, bottom, title, headline, xlabels));
    }
    PageLayout { page: 1, boxes }
}
