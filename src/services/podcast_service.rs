// src/services/podcast_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::YouTubeConfig;

#[derive(Debug, Error)]
pub enum PodcastError {
    #[error("falha de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    NotFound(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LatestEpisode {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub published_at: String,
    pub duration: Option<String>,
}

/// Fonte do último episódio publicado.
#[async_trait]
pub trait PodcastFeed: Send + Sync {
    async fn latest_episode(&self) -> Result<LatestEpisode, PodcastError>;
}

// =============================================================================
//  YOUTUBE DATA API v3
// =============================================================================

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Channel {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: String,
    resource_id: ResourceId,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    maxres: Option<Thumbnail>,
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    // maxres → high → medium
    fn best(&self) -> Option<String> {
        [&self.maxres, &self.high, &self.medium]
            .into_iter()
            .flatten()
            .next()
            .map(|t| t.url.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Video {
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

fn episode_from(item: PlaylistItem, video: Option<Video>) -> LatestEpisode {
    let snippet = item.snippet;
    LatestEpisode {
        id: snippet.resource_id.video_id,
        title: snippet.title,
        description: snippet.description,
        thumbnail: snippet.thumbnails.best(),
        published_at: snippet.published_at,
        duration: video
            .and_then(|v| v.content_details)
            .and_then(|d| d.duration),
    }
}

#[derive(Clone)]
pub struct YouTubeFeed {
    http: reqwest::Client,
    config: YouTubeConfig,
}

impl YouTubeFeed {
    pub fn new(http: reqwest::Client, config: YouTubeConfig) -> Self {
        Self { http, config }
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<Page<T>, PodcastError> {
        let url = format!(
            "{}/youtube/v3/{}",
            self.config.api_base.trim_end_matches('/'),
            resource
        );
        let page = self
            .http
            .get(url)
            .query(query)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(page)
    }
}

#[async_trait]
impl PodcastFeed for YouTubeFeed {
    async fn latest_episode(&self) -> Result<LatestEpisode, PodcastError> {
        // 1. Playlist de uploads do canal
        let channels: Page<Channel> = self
            .get(
                "channels",
                &[("part", "contentDetails"), ("id", self.config.channel_id.as_str())],
            )
            .await?;
        let uploads = channels
            .items
            .into_iter()
            .next()
            .and_then(|c| c.content_details.related_playlists.uploads)
            .ok_or(PodcastError::NotFound("Could not find uploads playlist"))?;

        // 2. Último item da playlist
        let playlist: Page<PlaylistItem> = self
            .get(
                "playlistItems",
                &[
                    ("part", "snippet"),
                    ("playlistId", uploads.as_str()),
                    ("maxResults", "1"),
                ],
            )
            .await?;
        let item = playlist
            .items
            .into_iter()
            .next()
            .ok_or(PodcastError::NotFound("No videos found"))?;

        // 3. Detalhes (duração). Falha aqui não derruba o episódio.
        let video_id = item.snippet.resource_id.video_id.clone();
        let video = match self
            .get::<Video>("videos", &[("part", "contentDetails"), ("id", video_id.as_str())])
            .await
        {
            Ok(page) => page.items.into_iter().next(),
            Err(e) => {
                tracing::warn!("⚠️ Falha ao buscar detalhes do vídeo {}: {}", video_id, e);
                None
            }
        };

        Ok(episode_from(item, video))
    }
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct PodcastService {
    feed: Option<Arc<dyn PodcastFeed>>,
}

impl PodcastService {
    pub fn new(feed: Option<Arc<dyn PodcastFeed>>) -> Self {
        Self { feed }
    }

    /// Último episódio, ou `None` se não configurado ou se a API falhar.
    pub async fn latest(&self) -> Option<LatestEpisode> {
        let Some(feed) = &self.feed else {
            tracing::warn!("⚠️ YouTube API key ou channel id não configurados");
            return None;
        };

        match feed.latest_episode().await {
            Ok(episode) => Some(episode),
            Err(e) => {
                tracing::error!("🔥 Erro ao buscar o último episódio: {}", e);
                None
            }
        }
    }
}
