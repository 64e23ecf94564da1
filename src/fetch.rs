use tracing::debug;

use crate::error::PipelineError;

/// Fetch the raw CSV feed. This is the pipeline's only suspension point;
/// a failed request or non-success status is fatal to the load and is
/// reported once, with no retry.
pub async fn fetch_feed(url: &str) -> Result<String, PipelineError> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::FeedStatus { status });
    }

    let text = response.text().await?;
    debug!(bytes = text.len(), "fetched device stats feed");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_url_fails_without_touching_the_network() {
        let result = fetch_feed("not a url").await;
        assert!(matches!(result, Err(PipelineError::Request(_))));
    }
}
