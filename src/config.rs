//! Runtime configuration for the feed importer
//!
//! Every option can come from the command line or the environment.

use clap::Args;
use std::fmt;

use crate::domain::twitter::{QueryError, QueryType};

/// Default query shown by the default feed
pub const DEFAULT_QUERY: &str = "#django";

/// Number of tweets in the default feed
pub const DEFAULT_NUM_TWEETS: usize = 3;

/// The four OAuth1 fields used to sign API requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Credentials {
    /// Build credentials only when all four fields are present and non-empty.
    pub fn from_parts(
        consumer_key: Option<String>,
        consumer_secret: Option<String>,
        access_token: Option<String>,
        access_token_secret: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Some(Self {
            consumer_key: non_empty(consumer_key)?,
            consumer_secret: non_empty(consumer_secret)?,
            access_token: non_empty(access_token)?,
            access_token_secret: non_empty(access_token_secret)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// Resolved settings used by runs, polls and feeds
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub credentials: Option<Credentials>,
    /// Read-only credentials that may only be used for `default_query`
    pub fallback_credentials: Option<Credentials>,
    pub default_query_type: QueryType,
    pub default_query: String,
    pub default_num_tweets: usize,
    /// Drop characters at or above U+0800 from tweet text
    pub strip_high_multibyte: bool,
    /// Rendered feeds are cached upstream, so every feed access refreshes
    pub cache_active: bool,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            credentials: None,
            fallback_credentials: None,
            default_query_type: QueryType::Search,
            default_query: DEFAULT_QUERY.to_string(),
            default_num_tweets: DEFAULT_NUM_TWEETS,
            strip_high_multibyte: false,
            cache_active: false,
        }
    }
}

impl FeedSettings {
    /// Pick the credentials a run for `query_value` should sign with.
    pub fn resolve_credentials(&self, query_value: &str) -> Result<&Credentials, QueryError> {
        if let Some(credentials) = &self.credentials {
            return Ok(credentials);
        }
        match &self.fallback_credentials {
            Some(fallback) if query_value == self.default_query => Ok(fallback),
            _ => Err(QueryError::MissingCredentials),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TwitterArgs {
    #[arg(long, env = "TWITTER_CONSUMER_KEY", hide_env_values = true)]
    pub consumer_key: Option<String>,

    #[arg(long, env = "TWITTER_CONSUMER_SECRET", hide_env_values = true)]
    pub consumer_secret: Option<String>,

    #[arg(long, env = "TWITTER_ACCESS_TOKEN_KEY", hide_env_values = true)]
    pub access_token_key: Option<String>,

    #[arg(long, env = "TWITTER_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub access_token_secret: Option<String>,

    #[arg(long, env = "TWITTER_FALLBACK_CONSUMER_KEY", hide_env_values = true)]
    pub fallback_consumer_key: Option<String>,

    #[arg(long, env = "TWITTER_FALLBACK_CONSUMER_SECRET", hide_env_values = true)]
    pub fallback_consumer_secret: Option<String>,

    #[arg(long, env = "TWITTER_FALLBACK_ACCESS_TOKEN_KEY", hide_env_values = true)]
    pub fallback_access_token_key: Option<String>,

    #[arg(long, env = "TWITTER_FALLBACK_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub fallback_access_token_secret: Option<String>,

    /// Query type of the default feed (user, list or search)
    #[arg(long, env = "TWITTER_DEFAULT_QUERY_TYPE", default_value = "search")]
    pub default_query_type: String,

    #[arg(long, env = "TWITTER_DEFAULT_QUERY", default_value = DEFAULT_QUERY)]
    pub default_query: String,

    #[arg(long, env = "TWITTER_DEFAULT_NUM_TWEETS", default_value_t = DEFAULT_NUM_TWEETS)]
    pub default_num_tweets: usize,

    #[arg(long, env = "TWITTER_STRIP_HIGH_MULTIBYTE")]
    pub strip_high_multibyte: bool,

    #[arg(long, env = "TWITTER_CACHE_ACTIVE")]
    pub cache_active: bool,
}

impl TwitterArgs {
    pub fn into_settings(self) -> Result<FeedSettings, QueryError> {
        Ok(FeedSettings {
            credentials: Credentials::from_parts(
                self.consumer_key,
                self.consumer_secret,
                self.access_token_key,
                self.access_token_secret,
            ),
            fallback_credentials: Credentials::from_parts(
                self.fallback_consumer_key,
                self.fallback_consumer_secret,
                self.fallback_access_token_key,
                self.fallback_access_token_secret,
            ),
            default_query_type: self.default_query_type.parse()?,
            default_query: self.default_query,
            default_num_tweets: self.default_num_tweets,
            strip_high_multibyte: self.strip_high_multibyte,
            cache_active: self.cache_active,
        })
    }
}
