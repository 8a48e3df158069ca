//! Tweet model definitions

use chrono::{DateTime, Utc};

/// A stored status, possibly a retweet, owned by one query
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tweet {
    pub id: i64,
    pub query_id: i64,
    pub remote_id: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub profile_image_url: String,
    pub user_name: String,
    pub full_name: String,
    pub retweeter_profile_image_url: Option<String>,
    pub retweeter_user_name: Option<String>,
    pub retweeter_full_name: Option<String>,
}

impl Tweet {
    pub fn is_retweet(&self) -> bool {
        self.retweeter_user_name.is_some()
    }
}

/// Tweet data built from an API status, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewTweet {
    pub remote_id: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub profile_image_url: String,
    pub user_name: String,
    pub full_name: String,
    pub retweeter_profile_image_url: Option<String>,
    pub retweeter_user_name: Option<String>,
    pub retweeter_full_name: Option<String>,
}
