use serde::{Deserialize, Serialize};

/// Identifier assigned by the transaction store. Never reused.
pub type TransactionId = u64;

const DEFAULT_HTTP_VERSION: &str = "HTTP/1.1";

/// A single header line. Name casing is kept exactly as recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A recorded HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    #[serde(default = "default_version")]
    pub version: String,
    /// Ordered, duplicates allowed.
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default, with = "body_base64")]
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Build a request for `url` carrying `body`.
    ///
    /// The method is `POST` when a body is present and `GET` otherwise; use
    /// [`HttpRequest::with_method`] to override it.
    pub fn new(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let method = if body.is_empty() { "GET" } else { "POST" };
        Self {
            method: method.into(),
            url: url.into(),
            version: default_version(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// `<METHOD> <URL> <VERSION>`
    pub fn status_line(&self) -> String {
        format!("{} {} {}", self.method, self.url, self.version)
    }
}

/// A recorded HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    #[serde(default = "default_version")]
    pub version: String,
    pub code: u16,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default, with = "body_base64")]
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response with the standard reason phrase for `code`.
    pub fn new(code: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            version: default_version(),
            code,
            reason: reason_phrase(code).into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// `<VERSION> <STATUS-CODE> <REASON>`
    pub fn status_line(&self) -> String {
        format!("{} {} {}", self.version, self.code, self.reason)
    }
}

/// A persisted request/response pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub request: HttpRequest,
    pub response: HttpResponse,
}

impl Transaction {
    pub fn new(id: TransactionId, request: HttpRequest, response: HttpResponse) -> Self {
        Self {
            id,
            request,
            response,
        }
    }
}

fn default_version() -> String {
    DEFAULT_HTTP_VERSION.into()
}

/// Standard reason phrases. Unknown codes map to an empty string.
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => "",
    }
}

/// Raw bodies travel through JSON as standard base64 strings.
mod body_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}
