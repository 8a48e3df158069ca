use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Credentials;
use crate::domain::twitter::{QueryError, QueryType};
use crate::services::oauth::{self, percent_encode};

const USER_TIMELINE_URL: &str = "https://api.twitter.com/1.1/statuses/user_timeline.json";
const LIST_STATUSES_URL: &str = "https://api.twitter.com/1.1/lists/statuses.json";
const SEARCH_URL: &str = "https://api.twitter.com/1.1/search/tweets.json";
const STATUS_UPDATE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

/// A read endpoint plus its query parameters (unencoded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn for_query(kind: QueryType, value: &str) -> Self {
        match kind {
            QueryType::User => Self {
                url: USER_TIMELINE_URL,
                params: vec![
                    ("screen_name", value.trim_start_matches('@').to_string()),
                    ("include_rts", "true".to_string()),
                ],
            },
            QueryType::List => Self {
                url: LIST_STATUSES_URL,
                params: vec![
                    ("list_id", value.to_string()),
                    ("include_rts", "true".to_string()),
                ],
            },
            QueryType::Search => Self {
                url: SEARCH_URL,
                params: vec![("q", value.to_string())],
            },
        }
    }

    /// URL with the parameters encoded the same way they are signed
    pub fn full_url(&self) -> String {
        if self.params.is_empty() {
            return self.url.to_string();
        }
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.url, query)
    }
}

/// Where raw status JSON comes from. The HTTP client in production,
/// canned responses in tests.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> Result<Value, QueryError>;
}

#[derive(Clone, Default)]
pub struct TwitterClient {
    http: Client,
}

impl TwitterClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Post a status update, returning the id of the created status
    pub async fn post_status(
        &self,
        credentials: &Credentials,
        text: &str,
    ) -> Result<String, QueryError> {
        let params = [("status", text.to_string())];
        let auth_header = oauth::authorization_header("POST", STATUS_UPDATE_URL, &params, credentials);

        let resp = self
            .http
            .post(STATUS_UPDATE_URL)
            .header(AUTHORIZATION, auth_header)
            .form(&params)
            .send()
            .await?;

        let body: Value = resp.json().await?;
        check_api_error(&body)?;
        remote_id(&body)
    }
}

#[async_trait]
impl StatusSource for TwitterClient {
    async fn fetch(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> Result<Value, QueryError> {
        let auth_header =
            oauth::authorization_header("GET", endpoint.url, &endpoint.params, credentials);

        // Error responses carry a JSON `errors` envelope, so the body is
        // parsed whatever the status code
        let resp = self
            .http
            .get(endpoint.full_url())
            .header(AUTHORIZATION, auth_header)
            .send()
            .await?;

        Ok(resp.json().await?)
    }
}

/// Fail with the API's own message when the body is an `errors` envelope
pub fn check_api_error(body: &Value) -> Result<(), QueryError> {
    let message = body
        .get("errors")
        .and_then(|errors| errors.get(0))
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str);

    match message {
        Some(message) => Err(QueryError::Api(message.to_string())),
        None => Ok(()),
    }
}

/// Pull the list of status entries out of a response body.
///
/// Timelines return a bare array; search wraps it in `statuses`.
pub fn status_entries(kind: QueryType, body: Value) -> Result<Vec<Value>, QueryError> {
    check_api_error(&body)?;

    let list = match (kind, body) {
        (QueryType::Search, Value::Object(mut map)) => map.remove("statuses").unwrap_or(Value::Null),
        (_, body) => body,
    };

    match list {
        Value::Array(entries) => Ok(entries),
        other => Err(QueryError::Retrieve(format!(
            "expected a list of statuses, got {}",
            json_kind(&other)
        ))),
    }
}

/// The status id as text; the API sends it as a number
pub fn remote_id(entry: &Value) -> Result<String, QueryError> {
    match entry.get("id") {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(QueryError::Retrieve("status without an id".to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One status as returned by the 1.1 API
#[derive(Debug, Deserialize)]
pub struct Status {
    pub created_at: String,
    pub text: String,
    pub user: StatusUser,
    #[serde(default)]
    pub retweeted_status: Option<Box<Status>>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUser {
    pub screen_name: String,
    pub name: String,
    pub profile_image_url: String,
}
