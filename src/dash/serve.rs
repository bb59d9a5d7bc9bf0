//! Interactive mode: the dashboard over HTTP.
//!
//! Every request re-renders the dashboard for the selection in its query string.
//! The parsed workbook is kept in memory for the duration of the TTL.

use serde::Serialize;
use std::time::Instant;
use tiny_http::{Header, Method, Response, Server};

use crate::dash::*;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>specdash</title></head>
<body>
<h1>Spectrum assignments</h1>
<ul>
<li><a href="/api/dashboard">/api/dashboard</a></li>
<li><a href="/api/options">/api/options</a></li>
<li><a href="/api/export.csv">/api/export.csv</a></li>
</ul>
<p>Query parameters: period, venue, service, stakeholder, failureStatus, powerUnit.</p>
</body>
</html>
"#;

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn json<T: Serialize>(status: u16, resp: &ApiResponse<T>) -> Reply {
        match serde_json::to_string(resp) {
            Ok(body) => Reply {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => Reply::text(500, format!("Error serializing the response: {}", e)),
        }
    }

    fn error(status: u16, message: String) -> Reply {
        Reply::json::<()>(status, &ApiResponse::failure(message))
    }

    fn text(status: u16, body: String) -> Reply {
        Reply {
            status,
            content_type: "text/plain",
            body,
        }
    }
}

struct CachedData {
    stored_at: Instant,
    data: Dataset,
}

pub struct DashServer {
    settings: Settings,
    cache: Option<CachedData>,
}

/// Reads the selection and the view overrides of a query string.
pub fn parse_query(
    pairs: &[(String, String)],
    base: &ViewOptions,
) -> Result<(FilterContext, ViewOptions), DashboardErrors> {
    let values = |key: &str| -> Vec<String> {
        pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    };
    let ctx = FilterContext {
        period: Selection::from_values(values("period")),
        venues: Selection::from_values(values("venue")),
        services: Selection::from_values(values("service")),
        stakeholders: Selection::from_values(values("stakeholder")),
    };
    let mut view = base.clone();
    if let Some(s) = values("powerUnit").last() {
        view.power_unit = PowerUnit::parse(s)?;
    }
    if let Some(s) = values("failureStatus").last() {
        view.failure_status = parse_failure_status(s)?;
    }
    Ok((ctx, view))
}

impl DashServer {
    pub fn new(settings: Settings) -> DashServer {
        DashServer {
            settings,
            cache: None,
        }
    }

    fn dataset(&mut self) -> BDashResult<&Dataset> {
        let fresh = match &self.cache {
            Some(c) => c.stored_at.elapsed() < self.settings.ttl,
            None => false,
        };
        let cached = match self.cache.take() {
            Some(c) if fresh => c,
            _ => {
                debug!("dataset: reloading the workbook");
                CachedData {
                    stored_at: Instant::now(),
                    data: load_dataset(&self.settings)?,
                }
            }
        };
        Ok(&self.cache.insert(cached).data)
    }

    pub fn route(&mut self, path: &str, query: &str) -> Reply {
        if path == "/" {
            return Reply {
                status: 200,
                content_type: "text/html",
                body: INDEX_HTML.to_string(),
            };
        }
        if !matches!(path, "/api/dashboard" | "/api/options" | "/api/export.csv") {
            return Reply::text(404, "Not found".to_string());
        }
        let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
            Ok(p) => p,
            Err(e) => return Reply::error(400, format!("Invalid query string: {}", e)),
        };
        let (ctx, view) = match parse_query(&pairs, &self.settings.view) {
            Ok(x) => x,
            Err(e) => return Reply::error(400, e.to_string()),
        };
        let data = match self.dataset() {
            Ok(d) => d,
            Err(e) => {
                warn!("route: {}", e);
                return Reply::error(500, e.to_string());
            }
        };
        match path {
            "/api/dashboard" => {
                let dash = build_dashboard(data, &ctx, &view);
                Reply::json(200, &ApiResponse::success(dash))
            }
            "/api/options" => {
                let options = filter::cascade_options(&data.assignments, &ctx);
                Reply::json(200, &ApiResponse::success(options))
            }
            _ => {
                let filtered = filter::apply(&data.assignments, &ctx);
                match io_csv::to_csv_string(&filtered) {
                    Ok(body) => Reply {
                        status: 200,
                        content_type: "text/csv",
                        body,
                    },
                    Err(e) => Reply::error(500, e.to_string()),
                }
            }
        }
    }
}

pub fn serve(port: u16, settings: Settings) -> BDashResult<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| {
        Box::new(DashError::StartingServer {
            port,
            message: e.to_string(),
        })
    })?;
    info!("Serving the dashboard on http://localhost:{}", port);

    let mut dash = DashServer::new(settings);
    for request in server.incoming_requests() {
        let url = request.url().to_string();
        let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
        let reply = if *request.method() == Method::Get {
            dash.route(path, query)
        } else {
            Reply::text(404, "Not found".to_string())
        };
        debug!("serve: {} {}", reply.status, url);
        let mut response = Response::from_string(reply.body).with_status_code(reply.status);
        if let Ok(h) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
            response = response.with_header(h);
        }
        if let Err(e) = request.respond(response) {
            warn!("Error responding to {}: {}", url, e);
        }
    }
    Ok(())
}
