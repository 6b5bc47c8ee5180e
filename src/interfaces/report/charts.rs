// ============================================================
// CHARTS
// ============================================================
// Plotly.js figures built as JSON traces, rendered to standalone HTML

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{json, Value as JsonValue};
use tracing::info;

use crate::domain::enrollment::{group_sum, top_n, EnrollmentRecord, EnrollmentTable};
use crate::domain::error::{AppError, Result};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

pub const TOP_COURSES: usize = 10;
pub const TOP_INSTRUCTORS: usize = 15;
pub const RATE_BINS: usize = 30;

/// One Plotly figure
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// Output file stem, also the element id when embedded
    pub name: &'static str,
    pub title: String,
    pub data: JsonValue,
    pub layout: JsonValue,
}

impl Chart {
    fn new(name: &'static str, title: &str, data: JsonValue, x_title: &str, y_title: &str) -> Self {
        let layout = json!({
            "title": { "text": title },
            "xaxis": { "title": { "text": x_title } },
            "yaxis": { "title": { "text": y_title } },
            "template": "plotly_white",
        });
        Self {
            name,
            title: title.to_string(),
            data,
            layout,
        }
    }

    /// `<div>` plus the script that draws into it; needs Plotly on the page
    pub fn embed(&self) -> String {
        format!(
            "<div id=\"{id}\" class=\"chart\"></div>\n\
             <script>Plotly.newPlot(\"{id}\", {data}, {layout}, {{\"responsive\": true}});</script>",
            id = self.name,
            data = script_json(&self.data),
            layout = script_json(&self.layout),
        )
    }

    /// Self-contained page loading Plotly from the CDN
    pub fn to_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<script src=\"{cdn}\"></script>\n</head>\n\
             <body>\n{body}\n</body>\n</html>\n",
            title = escape_html(&self.title),
            cdn = PLOTLY_CDN,
            body = self.embed(),
        )
    }

    pub fn file_name(&self) -> String {
        format!("{}.html", self.name)
    }
}

/// JSON safe to inline inside a `<script>` element
fn script_json(value: &JsonValue) -> String {
    value.to_string().replace("</", "<\\/")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn bar(labels: Vec<String>, values: Vec<i64>) -> JsonValue {
    json!([{ "type": "bar", "x": labels, "y": values }])
}

fn unzip(pairs: Vec<(String, i64)>) -> (Vec<String>, Vec<i64>) {
    pairs.into_iter().unzip()
}

/// Total enrollment per term, as a line in term order
pub fn term_enrollment(records: &[EnrollmentRecord]) -> Chart {
    let (terms, totals) = unzip(group_sum(records, |r| r.term.as_ref()).into_iter().collect());
    Chart::new(
        "term_enrollment",
        "Enrollment Trends by Term",
        json!([{ "type": "scatter", "mode": "lines+markers", "x": terms, "y": totals }]),
        "term",
        "enrolled",
    )
}

/// Total enrollment per department, largest first
pub fn department_enrollment(records: &[EnrollmentRecord]) -> Chart {
    let groups = group_sum(records, |r| r.department_name.as_ref());
    let (names, totals) = unzip(top_n(&groups, groups.len()));
    Chart::new(
        "department_enrollment",
        "Enrollment by Department",
        bar(names, totals),
        "department_name",
        "enrolled",
    )
}

pub fn top_courses(records: &[EnrollmentRecord]) -> Chart {
    let groups = group_sum(records, |r| r.course_name.as_ref());
    let (names, totals) = unzip(top_n(&groups, TOP_COURSES));
    Chart::new(
        "top_courses",
        "Top 10 Courses by Enrollment",
        bar(names, totals),
        "course_name",
        "enrolled",
    )
}

pub fn instructor_workload(records: &[EnrollmentRecord]) -> Chart {
    let groups = group_sum(records, |r| r.instructor_name.as_ref());
    let (names, totals) = unzip(top_n(&groups, TOP_INSTRUCTORS));
    Chart::new(
        "instructor_workload",
        "Top 15 Instructors by Student Count",
        bar(names, totals),
        "instructor_name",
        "enrolled",
    )
}

/// Histogram of the defined rates; null rates are left out
pub fn enrollment_rate_distribution(records: &[EnrollmentRecord]) -> Chart {
    let rates: Vec<f64> = records.iter().filter_map(|r| r.enrollment_rate).collect();
    Chart::new(
        "enrollment_rate_distribution",
        "Distribution of Enrollment Rates",
        json!([{ "type": "histogram", "x": rates, "nbinsx": RATE_BINS }]),
        "enrollment_rate",
        "count",
    )
}

/// One box per department over the defined rates
pub fn enrollment_rate_by_department(records: &[EnrollmentRecord]) -> Chart {
    let mut by_department: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let (Some(department), Some(rate)) = (&record.department_name, record.enrollment_rate) {
            by_department.entry(department.as_str()).or_default().push(rate);
        }
    }
    let traces: Vec<JsonValue> = by_department
        .into_iter()
        .map(|(department, rates)| json!({ "type": "box", "name": department, "y": rates }))
        .collect();
    Chart::new(
        "enrollment_rate_by_department",
        "Enrollment Rate Distribution by Department",
        JsonValue::Array(traces),
        "department_name",
        "enrollment_rate",
    )
}

/// Term trend and department totals on one figure, written as
/// `enrollment_dashboard.html` next to the individual charts
pub fn enrollment_overview(records: &[EnrollmentRecord]) -> Chart {
    let mut traces = Vec::new();
    for (chart, name) in [
        (term_enrollment(records), "Enrollment Trends"),
        (department_enrollment(records), "Department Enrollment"),
    ] {
        if let JsonValue::Array(chart_traces) = chart.data {
            for mut trace in chart_traces {
                trace["name"] = json!(name);
                traces.push(trace);
            }
        }
    }

    let mut chart = Chart::new(
        "enrollment_dashboard",
        "University Enrollment Dashboard",
        JsonValue::Array(traces),
        "Term / Department",
        "Number of Students",
    );
    chart.layout["barmode"] = json!("group");
    chart.layout["height"] = json!(800);
    chart
}

/// All six figures in report order
pub fn build_charts(table: &EnrollmentTable) -> Vec<Chart> {
    let records = table.records();
    vec![
        term_enrollment(&records),
        department_enrollment(&records),
        top_courses(&records),
        instructor_workload(&records),
        enrollment_rate_distribution(&records),
        enrollment_rate_by_department(&records),
    ]
}

/// Write each chart as `<name>.html` under `dir`
pub fn write_charts(charts: &[Chart], dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let path = dir.join(chart.file_name());
        std::fs::write(&path, chart.to_html()).map_err(|e| {
            AppError::IoError(format!("Failed to write {}: {}", path.display(), e))
        })?;
        written.push(path);
    }
    info!(dir = %dir.display(), charts = written.len(), "Visualizations saved");
    Ok(written)
}
