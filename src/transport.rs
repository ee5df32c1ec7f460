use crate::error::ReporterError;

/// A fully prepared outbound POST.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub timeout_secs: Option<u64>,
}

impl HttpRequest {
    /// JSON POST carrying the crate's User-Agent unless `user_agent` is given.
    pub fn json<T: serde::Serialize>(
        url: &str,
        body: &T,
        user_agent: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, ReporterError> {
        let body = serde_json::to_string(body)?;
        let user_agent = user_agent
            .map(str::to_string)
            .unwrap_or_else(default_user_agent);

        Ok(Self {
            url: url.to_string(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), user_agent),
            ],
            body,
            timeout_secs,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: i32,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status_code: i32, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

pub fn default_user_agent() -> String {
    format!("umami-reporter/{}", env!("CARGO_PKG_VERSION"))
}

/// Performs the single outbound call for a send.
pub trait Transport: Send + Sync {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, ReporterError>;
}

/// Blocking HTTP transport backed by `minreq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinreqTransport;

impl Transport for MinreqTransport {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, ReporterError> {
        let mut outbound = minreq::post(&request.url).with_body(request.body.clone());

        for (name, value) in &request.headers {
            outbound = outbound.with_header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = request.timeout_secs {
            outbound = outbound.with_timeout(timeout);
        }

        let response = outbound.send()?;
        let status_code = response.status_code;
        let body = response.as_str()?.to_string();

        Ok(HttpResponse { status_code, body })
    }
}
