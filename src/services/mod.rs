pub mod db;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod markup;
pub mod oauth;
pub mod poller;
pub mod publish;
#[cfg(test)]
pub mod testing;
pub mod twitter;
