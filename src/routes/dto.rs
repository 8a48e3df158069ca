//! API response DTOs for feeds and queries

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::twitter::{Query, Tweet};

/// Who retweeted a status into the feed
#[derive(Debug, Clone, Serialize)]
pub struct RetweeterResponse {
    pub user_name: String,
    pub full_name: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Tweet API response
#[derive(Debug, Clone, Serialize)]
pub struct TweetResponse {
    pub remote_id: String,
    pub created_at: DateTime<Utc>,
    /// Rendered HTML
    pub text: String,
    pub user_name: String,
    pub full_name: String,
    pub profile_image_url: String,
    pub retweeted_by: Option<RetweeterResponse>,
}

impl From<Tweet> for TweetResponse {
    fn from(t: Tweet) -> Self {
        let retweeted_by = t.retweeter_user_name.map(|user_name| RetweeterResponse {
            user_name,
            full_name: t.retweeter_full_name,
            profile_image_url: t.retweeter_profile_image_url,
        });
        Self {
            remote_id: t.remote_id,
            created_at: t.created_at,
            text: t.text,
            user_name: t.user_name,
            full_name: t.full_name,
            profile_image_url: t.profile_image_url,
            retweeted_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub tweets: Vec<TweetResponse>,
}

impl From<Vec<Tweet>> for FeedResponse {
    fn from(tweets: Vec<Tweet>) -> Self {
        Self {
            tweets: tweets.into_iter().map(TweetResponse::from).collect(),
        }
    }
}

/// Query with its stored tweets
#[derive(Debug, Serialize)]
pub struct QueryDetailResponse {
    pub query: Query,
    pub tweets: Vec<TweetResponse>,
}
