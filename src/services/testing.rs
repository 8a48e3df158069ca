//! Canned API responses for tests

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::{Credentials, FeedSettings};
use crate::domain::twitter::{QueryError, QueryType};
use crate::services::twitter::{Endpoint, StatusSource};

/// Serves a fixed body per endpoint URL; unknown URLs fail like a dead network
#[derive(Default)]
pub struct FixtureSource {
    responses: HashMap<String, Value>,
    calls: AtomicUsize,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: QueryType, value: &str, body: Value) -> Self {
        self.responses
            .insert(Endpoint::for_query(kind, value).full_url(), body);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for FixtureSource {
    async fn fetch(
        &self,
        endpoint: &Endpoint,
        _credentials: &Credentials,
    ) -> Result<Value, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = endpoint.full_url();
        self.responses
            .get(&url)
            .cloned()
            .ok_or_else(|| QueryError::Retrieve(format!("connection refused: {}", url)))
    }
}

pub fn settings_with_credentials() -> FeedSettings {
    FeedSettings {
        credentials: Some(Credentials {
            consumer_key: "ck".to_string(),
            consumer_secret: "cs".to_string(),
            access_token: "at".to_string(),
            access_token_secret: "ats".to_string(),
        }),
        ..FeedSettings::default()
    }
}

/// A 1.1 API status entry
pub fn status_json(id: u64, screen_name: &str, text: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "created_at": created_at,
        "text": text,
        "user": {
            "screen_name": screen_name,
            "name": format!("Full {}", screen_name),
            "profile_image_url": format!("http://img.example/{}.png", screen_name),
        },
    })
}
