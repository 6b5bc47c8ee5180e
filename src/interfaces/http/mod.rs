use actix_web::{dev::Server, get, web, App, HttpResponse, HttpServer, Responder};
use chrono::Local;
use once_cell::sync::OnceCell;
use std::fmt::Write as _;
use tracing::{error, info};

use crate::application::use_cases::enrollment_pipeline::{EnrollmentPipeline, ProcessedEnrollment};
use crate::application::use_cases::enrollment_summary::summarize;
use crate::domain::enrollment::{
    columns, EnrollmentFilter, EnrollmentTable, DEPARTMENTS_PARAM, TERMS_PARAM,
};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;
use crate::interfaces::report::charts::{build_charts, escape_html, PLOTLY_CDN};
use crate::interfaces::report::summary_report::{one_decimal, percent, thousands};

/// Shared dashboard state. The processed data is loaded on first use and
/// kept for the life of the process.
pub struct DashboardState {
    config: AppConfig,
    cache: OnceCell<ProcessedEnrollment>,
}

impl DashboardState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cache: OnceCell::new(),
        }
    }

    /// State whose cache is already filled
    pub fn with_data(config: AppConfig, processed: ProcessedEnrollment) -> Self {
        Self {
            config,
            cache: OnceCell::with_value(processed),
        }
    }

    /// Cached data, loading it on the blocking pool the first time. Two racing
    /// first requests may both load; the first stored result is kept.
    async fn data(&self) -> Result<&ProcessedEnrollment> {
        if let Some(processed) = self.cache.get() {
            return Ok(processed);
        }

        info!(data_dir = %self.config.data_dir.display(), "Loading dashboard data");
        let config = self.config.clone();
        let processed = web::block(move || EnrollmentPipeline::new(&config).run())
            .await
            .map_err(|e| AppError::IoError(format!("Dashboard loader did not finish: {}", e)))??;
        Ok(self.cache.get_or_init(|| processed))
    }
}

/// Raw query pairs, so repeated keys and commas inside labels survive
type FilterQuery = web::Query<Vec<(String, String)>>;

fn filter_from(query: &FilterQuery) -> EnrollmentFilter {
    EnrollmentFilter::from_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

#[get("/")]
async fn dashboard(data: web::Data<DashboardState>, query: FilterQuery) -> impl Responder {
    match data.data().await {
        Ok(processed) => {
            let filter = filter_from(&query);
            let filtered = filter.apply(&processed.enrollment);
            HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(render_dashboard(&processed.enrollment, &filtered, &filter))
        }
        Err(e) => {
            error!(error = %e, "Failed to load dashboard data");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

#[get("/enrollment")]
async fn enrollment_api(data: web::Data<DashboardState>, query: FilterQuery) -> impl Responder {
    match data.data().await {
        Ok(processed) => {
            let filtered = filter_from(&query).apply(&processed.enrollment);
            HttpResponse::Ok().json(filtered.table())
        }
        Err(e) => {
            error!(error = %e, "Failed to load dashboard data");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

#[get("/summary")]
async fn summary_api(data: web::Data<DashboardState>, query: FilterQuery) -> impl Responder {
    match data.data().await {
        Ok(processed) => {
            let filtered = filter_from(&query).apply(&processed.enrollment);
            HttpResponse::Ok().json(summarize(&filtered))
        }
        Err(e) => {
            error!(error = %e, "Failed to load dashboard data");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard)
        .service(web::scope("/api").service(enrollment_api).service(summary_api));
}

pub fn start_server(state: DashboardState) -> std::io::Result<Server> {
    let host = state.config.server.host.clone();
    let port = state.config.server.port;
    let state = web::Data::new(state);

    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .bind((host.as_str(), port))?
        .run();

    info!(%host, port, "Dashboard listening");
    Ok(server)
}

fn checkbox_group(name: &str, options: &[String], selected: &Option<Vec<String>>) -> String {
    let mut out = String::new();
    for option in options {
        let checked = selected
            .as_ref()
            .map(|list| list.contains(option))
            .unwrap_or(true);
        let _ = write!(
            out,
            "<label><input type=\"checkbox\" name=\"{}\" value=\"{}\"{}> {}</label><br>",
            name,
            escape_html(option),
            if checked { " checked" } else { "" },
            escape_html(option)
        );
    }
    out
}

fn data_table(table: &EnrollmentTable) -> String {
    let inner = table.table();
    let mut out = String::from("<table class=\"data\">\n<thead><tr>");
    for column in inner.columns() {
        let _ = write!(out, "<th>{}</th>", escape_html(column));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in inner.rows() {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape_html(&cell.to_string()));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>");
    out
}

// One parameter per checked box; an empty value when nothing is checked
const FILTER_SCRIPT: &str = r#"<script>
document.getElementById("filters").addEventListener("submit", function (event) {
  event.preventDefault();
  var params = new URLSearchParams();
  ["departments", "terms"].forEach(function (name) {
    var picked = Array.from(document.querySelectorAll("input[name=" + name + "]:checked"))
      .map(function (box) { return box.value; });
    if (picked.length === 0) {
      params.append(name, "");
    }
    picked.forEach(function (value) { params.append(name, value); });
  });
  window.location.search = params.toString();
});
</script>"#;

/// Full dashboard page for the filtered rows; the filter options come from
/// the unfiltered table
pub fn render_dashboard(
    all: &EnrollmentTable,
    filtered: &EnrollmentTable,
    filter: &EnrollmentFilter,
) -> String {
    let summary = summarize(filtered);
    let departments = all.distinct(columns::DEPARTMENT_NAME);
    let terms = all.distinct(columns::TERM);

    let mut charts = String::new();
    for chart in build_charts(filtered) {
        charts.push_str(&chart.embed());
        charts.push('\n');
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>University Enrollment Dashboard</title>
<script src="{cdn}"></script>
<style>
body {{ font-family: sans-serif; margin: 0; display: flex; }}
aside {{ width: 240px; padding: 1rem; background: #f4f4f6; min-height: 100vh; }}
main {{ flex: 1; padding: 1rem 2rem; }}
.metrics {{ display: flex; gap: 2rem; }}
.metric {{ padding: 0.5rem 1rem; border: 1px solid #ddd; border-radius: 6px; }}
.metric strong {{ display: block; font-size: 1.6rem; }}
table.data {{ border-collapse: collapse; font-size: 0.85rem; }}
table.data td, table.data th {{ border: 1px solid #ddd; padding: 2px 6px; }}
</style>
</head>
<body>
<aside>
<h2>Filters</h2>
<form id="filters">
<h3>Select Departments</h3>
{department_boxes}
<h3>Select Terms</h3>
{term_boxes}
<button type="submit">Apply</button>
</form>
</aside>
<main>
<h1>University Enrollment Dashboard</h1>
<p>Course popularity, department enrollment patterns, and instructor workload.</p>
<div class="metrics">
<div class="metric">Total Enrollments<strong>{total}</strong></div>
<div class="metric">Average Class Size<strong>{average}</strong></div>
<div class="metric">Enrollment Rate<strong>{rate}</strong></div>
</div>
{charts}
<h2>Detailed Enrollment Data</h2>
{table}
<footer><p>Generated {generated}</p></footer>
</main>
{script}
</body>
</html>
"#,
        cdn = PLOTLY_CDN,
        department_boxes = checkbox_group(DEPARTMENTS_PARAM, &departments, &filter.departments),
        term_boxes = checkbox_group(TERMS_PARAM, &terms, &filter.terms),
        total = thousands(summary.total_enrollments),
        average = one_decimal(summary.average_class_size),
        rate = percent(summary.overall_enrollment_rate),
        charts = charts,
        table = data_table(filtered),
        generated = Local::now().format("%Y-%m-%d %H:%M:%S"),
        script = FILTER_SCRIPT,
    )
}
