//! Announcing content as a status update

use tracing::info;

use crate::config::FeedSettings;
use crate::domain::twitter::QueryError;
use crate::services::twitter::TwitterClient;

/// Longest status the API accepts
pub const MAX_STATUS_CHARS: usize = 140;

const ELLIPSIS: char = '…';

/// Status text for `title` followed by its short URL.
///
/// The title is cut so the whole status fits in [`MAX_STATUS_CHARS`].
pub fn compose_status(title: &str, short_url: Option<&str>) -> String {
    match short_url {
        Some(url) => {
            let budget = MAX_STATUS_CHARS.saturating_sub(url.chars().count() + 1);
            format!("{} {}", truncate_chars(title.trim(), budget), url)
        }
        None => truncate_chars(title.trim(), MAX_STATUS_CHARS),
    }
}

/// Cut `text` to at most `max` chars, the ellipsis included.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    cut.push(ELLIPSIS);
    cut
}

/// Post `title` (and its URL) with the configured account.
///
/// Fallback credentials are read-only and never used here.
pub async fn publish(
    client: &TwitterClient,
    settings: &FeedSettings,
    title: &str,
    short_url: Option<&str>,
) -> Result<String, QueryError> {
    let credentials = settings
        .credentials
        .as_ref()
        .ok_or(QueryError::MissingCredentials)?;
    let status = compose_status(title, short_url);
    let id = client.post_status(credentials, &status).await?;
    info!("Published status {}: {}", id, status);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;

    #[test]
    fn test_short_title_is_kept_whole() {
        assert_eq!(
            compose_status("New release", Some("http://t.co/x")),
            "New release http://t.co/x"
        );
        assert_eq!(compose_status("  Plain  ", None), "Plain");
    }

    #[test]
    fn test_long_title_fits_with_url() {
        let title = "word ".repeat(60);
        let url = "http://t.co/abcdef";
        let status = compose_status(&title, Some(url));

        assert_eq!(status.chars().count(), MAX_STATUS_CHARS);
        assert!(status.ends_with(" http://t.co/abcdef"));
        assert!(status.contains('…'));
    }

    #[test]
    fn test_long_title_without_url() {
        let status = compose_status(&"é".repeat(200), None);
        assert_eq!(status.chars().count(), MAX_STATUS_CHARS);
        assert!(status.ends_with('…'));
    }

    #[tokio::test]
    async fn test_publish_refuses_fallback_credentials() {
        let settings = FeedSettings {
            fallback_credentials: Some(Credentials {
                consumer_key: "a".into(),
                consumer_secret: "b".into(),
                access_token: "c".into(),
                access_token_secret: "d".into(),
            }),
            ..FeedSettings::default()
        };
        let err = publish(&TwitterClient::new(), &settings, "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::MissingCredentials));
    }
}
