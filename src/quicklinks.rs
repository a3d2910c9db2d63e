//! One-shot loader for the quick-links shortcut list.
//!
//! The list is a static `{ "data": [...] }` snapshot read from a local file
//! or fetched over HTTP. It is loaded once at startup and never mutated; a
//! failed load leaves the list empty.

use crate::error::Result;
use crate::events::Event;
use crate::models::{QuickLink, QuickLinksResponse};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub enum QuickLinksSource {
    File(PathBuf),
    Http(String),
}

impl QuickLinksSource {
    /// `http://` and `https://` sources are fetched, anything else is a path.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            QuickLinksSource::Http(source.to_string())
        } else {
            QuickLinksSource::File(PathBuf::from(source))
        }
    }

    /// Loads the list, logging and swallowing any failure.
    pub async fn load(&self) -> Vec<QuickLink> {
        match self.try_load().await {
            Ok(links) => {
                info!("Loaded {} quick links", links.len());
                links
            }
            Err(e) => {
                error!("Failed to load quick links from {:?}: {}", self, e);
                Vec::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Vec<QuickLink>> {
        let response: QuickLinksResponse = match self {
            QuickLinksSource::File(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                serde_json::from_str(&content)?
            }
            QuickLinksSource::Http(url) => {
                reqwest::get(url)
                    .await?
                    .error_for_status()?
                    .json::<QuickLinksResponse>()
                    .await?
            }
        };
        Ok(response.data)
    }
}

/// Loads the list in the background and posts [`Event::QuickLinksLoaded`].
pub fn spawn_load(source: QuickLinksSource, tx: mpsc::UnboundedSender<Event>) {
    tokio::spawn(async move {
        let links = source.load().await;
        tx.send(Event::QuickLinksLoaded(links)).ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parse_picks_source_kind() {
        assert_eq!(
            QuickLinksSource::parse("https://example.com/quickLinks.json"),
            QuickLinksSource::Http("https://example.com/quickLinks.json".to_string())
        );
        assert_eq!(
            QuickLinksSource::parse("data/quick_links.json"),
            QuickLinksSource::File(PathBuf::from("data/quick_links.json"))
        );
    }

    #[tokio::test]
    async fn loads_from_file_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("quick_links.json");
        std::fs::write(
            &file,
            json!({ "data": [
                { "display_name": "City Hall", "lat": 1.293, "lon": 103.852, "type": "landmark" },
                { "display_name": "Changi Airport", "lat": "1.3644", "lon": "103.9915", "type": "aerodrome" }
            ]})
            .to_string(),
        )
        .unwrap();

        let links = QuickLinksSource::File(file).load().await;
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].display_name.as_deref(), Some("City Hall"));
        assert_eq!(links[1].lat, Some(1.3644));
        assert_eq!(links[1].raw["lat"], json!("1.3644"));
    }

    #[tokio::test]
    async fn missing_file_yields_empty_list() {
        let links = QuickLinksSource::File(PathBuf::from("/nonexistent/quick_links.json"))
            .load()
            .await;
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn loads_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quickLinks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "display_name": "Merlion Park", "lat": 1.2868, "lon": 103.8545, "type": "attraction" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/quickLinks.json", server.uri());
        let links = QuickLinksSource::parse(&url).load().await;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].type_label(), "ATTRACTION");
    }

    #[tokio::test]
    async fn http_error_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/quickLinks.json", server.uri());
        assert!(QuickLinksSource::parse(&url).load().await.is_empty());
    }
}
