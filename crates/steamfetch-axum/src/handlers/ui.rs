//! Embedded web UI.

use axum::response::Html;

/// Single-page UI served at the root. The page is compiled into the binary
/// so the server ships as one file.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn page_mentions_the_api_it_talks_to() {
        let Html(page) = index().await;
        assert!(page.contains("/api/job"));
        assert!(page.contains("/api/events"));
    }
}
