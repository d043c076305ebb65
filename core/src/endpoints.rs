use url::Url;

use crate::error::EndpointError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";

/// REST and stream locations derived from the single configured backend URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    rest: Url,
    stream: Url,
}

impl Endpoints {
    /// `http` maps to `ws` and `https` to `wss`; both bases gain the `/api` prefix.
    pub fn from_base(base: &str) -> Result<Self, EndpointError> {
        let mut rest = Url::parse(base.trim()).map_err(|err| EndpointError::InvalidBaseUrl {
            url: base.to_string(),
            reason: err.to_string(),
        })?;

        let stream_scheme = match rest.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
        };

        rest.set_query(None);
        rest.set_fragment(None);
        {
            let mut segments =
                rest.path_segments_mut()
                    .map_err(|_| EndpointError::InvalidBaseUrl {
                        url: base.to_string(),
                        reason: "url cannot be a base".to_string(),
                    })?;
            segments.pop_if_empty().push("api");
        }

        let mut stream = rest.clone();
        stream
            .set_scheme(stream_scheme)
            .map_err(|_| EndpointError::UnsupportedScheme(stream_scheme.to_string()))?;

        Ok(Self { rest, stream })
    }

    pub fn rest_base(&self) -> &str {
        self.rest.as_str()
    }

    pub fn stream_base(&self) -> &str {
        self.stream.as_str()
    }

    pub fn symbols(&self) -> String {
        self.rest_url(&["symbols"])
    }

    pub fn alerts(&self) -> String {
        self.rest_url(&["alerts"])
    }

    pub fn analysis(&self, symbol: &str) -> String {
        self.rest_url(&["analysis", symbol])
    }

    pub fn indicators(&self, symbol: &str) -> String {
        self.rest_url(&["indicators", symbol])
    }

    pub fn health(&self) -> String {
        self.rest_url(&["health"])
    }

    pub fn meetings(&self) -> String {
        self.rest_url(&["meetings"])
    }

    pub fn meeting(&self, id: &str) -> String {
        self.rest_url(&["meetings", id])
    }

    pub fn summarize_text(&self) -> String {
        self.rest_url(&["summarize-text"])
    }

    pub fn summarize_file(&self) -> String {
        self.rest_url(&["summarize-file"])
    }

    pub fn market_stream(&self, symbol: &str) -> String {
        join_segments(&self.stream, &["ws", "market", symbol])
    }

    fn rest_url(&self, segments: &[&str]) -> String {
        join_segments(&self.rest, segments)
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> String {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url.into()
}
