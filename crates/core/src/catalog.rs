//! Catalog retrieval and normalization.
//!
//! The backend serves raw snake_case records with a delimited genre
//! string and origin-relative image paths; [`CatalogClient`] fetches
//! them and maps each one into the normalized [`Game`] shape.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{config::AppConfig, models::Game};

const USER_AGENT: &str = concat!("storetui/", env!("CARGO_PKG_VERSION"));

/// Fetches the game catalog from the configured storefront backend.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    origin: String,
    endpoint: String,
}

impl CatalogClient {
    /// Build a client targeting the configured origin and endpoint.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            origin: config.api_origin.clone(),
            endpoint: config.games_endpoint.clone(),
        })
    }

    /// Origin that relative image paths are resolved against.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Full URL of the catalog endpoint.
    pub fn games_url(&self) -> String {
        format!("{}{}", self.origin, self.endpoint)
    }

    /// Fetch the catalog and normalize every record, preserving
    /// backend order.
    ///
    /// Any transport failure, non-success status, or decode failure
    /// propagates to the caller; there is no retry and no partial
    /// result.
    pub async fn fetch_games(&self) -> Result<Vec<Game>> {
        let url = self.games_url();
        let raw = self.fetch_raw(&url).await?;
        info!(count = raw.len(), "catalog fetched");
        Ok(raw
            .into_iter()
            .map(|record| build_game(record, &self.origin))
            .collect())
    }

    async fn fetch_raw(&self, url: &str) -> Result<Vec<RawGame>> {
        debug!(url = %url, "requesting catalog");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("request to {url} returned {status}");
        }

        response
            .json::<Vec<RawGame>>()
            .await
            .with_context(|| format!("failed to decode catalog from {url}"))
    }
}

fn build_game(raw: RawGame, origin: &str) -> Game {
    Game {
        id: raw.id,
        title: raw.title,
        original_price: raw.original_price,
        discount_percentage: raw.discount_percentage,
        genres: split_genres(&raw.genres),
        platform: raw.platform,
        image_url: format!("{}{}", origin, raw.image_url),
    }
}

fn split_genres(raw: &str) -> Vec<String> {
    raw.split(", ").map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_value, json, Value};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    fn test_config(origin: &str) -> AppConfig {
        AppConfig {
            api_origin: origin.to_string(),
            games_endpoint: "/api/games".to_string(),
            start_path: "/".to_string(),
        }
    }

    fn reference_record() -> Value {
        json!({
            "id": 1,
            "title": "A",
            "original_price": 10,
            "discount_percentage": 20,
            "genres": "Action, RPG",
            "platform": "PC",
            "image_url": "/img/a.png"
        })
    }

    async fn serve_once(status_line: &'static str, body: String) -> Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let origin = format!("http://{}", listener.local_addr()?);
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 2048];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len(),
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Ok(origin)
    }

    #[test]
    fn normalizes_the_reference_record() -> Result<()> {
        let raw: RawGame = from_value(reference_record())?;
        let game = build_game(raw, "http://localhost:3001");

        assert_eq!(game.id, 1);
        assert_eq!(game.title, "A");
        assert_eq!(game.original_price, 10.0);
        assert_eq!(game.discount_percentage, Some(20.0));
        assert_eq!(game.genres, vec!["Action", "RPG"]);
        assert_eq!(game.platform, "PC");
        assert_eq!(game.image_url, "http://localhost:3001/img/a.png");
        Ok(())
    }

    #[test]
    fn genre_split_yields_one_more_label_than_separators() {
        assert_eq!(split_genres("Action"), vec!["Action"]);
        assert_eq!(split_genres("Action, RPG"), vec!["Action", "RPG"]);
        assert_eq!(
            split_genres("Action, RPG, Indie"),
            vec!["Action", "RPG", "Indie"]
        );
    }

    #[test]
    fn empty_genre_string_yields_a_single_empty_label() {
        assert_eq!(split_genres(""), vec![""]);
    }

    #[test]
    fn absent_discount_stays_absent() -> Result<()> {
        let mut record = reference_record();
        record.as_object_mut().unwrap().remove("discount_percentage");
        let raw: RawGame = from_value(record)?;
        assert_eq!(build_game(raw, "http://localhost:3001").discount_percentage, None);

        let mut record = reference_record();
        record["discount_percentage"] = Value::Null;
        let raw: RawGame = from_value(record)?;
        assert_eq!(build_game(raw, "http://localhost:3001").discount_percentage, None);
        Ok(())
    }

    #[test]
    fn missing_required_field_fails_decoding() {
        let mut record = reference_record();
        record.as_object_mut().unwrap().remove("genres");
        assert!(from_value::<RawGame>(record).is_err());
    }

    #[test]
    fn image_locator_is_exact_concatenation() -> Result<()> {
        let mut record = reference_record();
        record["image_url"] = json!("/covers/7.png?v=2");
        let raw: RawGame = from_value(record)?;
        let game = build_game(raw, "http://store.example:8080");
        assert_eq!(game.image_url, "http://store.example:8080/covers/7.png?v=2");
        Ok(())
    }

    #[test]
    fn backend_order_is_preserved() -> Result<()> {
        let records = [3u32, 1, 2]
            .iter()
            .map(|id| {
                let mut record = reference_record();
                record["id"] = json!(id);
                from_value::<RawGame>(record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<u32> = records
            .into_iter()
            .map(|raw| build_game(raw, "http://localhost:3001").id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn fetches_and_normalizes_a_served_catalog() -> Result<()> {
        let mut second = reference_record();
        second["id"] = json!(2);
        second["title"] = json!("B");
        second.as_object_mut().unwrap().remove("discount_percentage");
        let body = Value::Array(vec![reference_record(), second]).to_string();

        let origin = serve_once("HTTP/1.1 200 OK", body).await?;
        let client = CatalogClient::new(&test_config(&origin))?;
        let games = client.fetch_games().await?;

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, 1);
        assert_eq!(games[0].genres, vec!["Action", "RPG"]);
        assert_eq!(games[0].image_url, format!("{origin}/img/a.png"));
        assert_eq!(games[1].id, 2);
        assert_eq!(games[1].discount_percentage, None);
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() -> Result<()> {
        let origin = serve_once("HTTP/1.1 500 Internal Server Error", "[]".to_string()).await?;
        let client = CatalogClient::new(&test_config(&origin))?;

        let err = client.fetch_games().await.unwrap_err();
        assert!(err.to_string().contains("500"));
        Ok(())
    }

    #[tokio::test]
    async fn connection_refused_fails_rather_than_returning_empty() -> Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let origin = format!("http://{}", listener.local_addr()?);
        drop(listener);

        let client = CatalogClient::new(&test_config(&origin))?;
        assert!(client.fetch_games().await.is_err());
        Ok(())
    }
}

/// Catalog record as served by the backend, before normalization.
#[derive(Debug, Deserialize)]
struct RawGame {
    id: u32,
    title: String,
    original_price: f64,
    #[serde(default)]
    discount_percentage: Option<f64>,
    genres: String,
    platform: String,
    image_url: String,
}
