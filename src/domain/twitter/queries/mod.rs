//! DB queries for the twitter domain

pub mod feed_queries;
pub mod tweets;
