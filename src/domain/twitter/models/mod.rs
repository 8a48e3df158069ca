//! Twitter domain models

mod query;
mod tweet;

pub use query::{Query, QueryType};
pub use tweet::{NewTweet, Tweet};
