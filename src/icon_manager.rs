use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use url::Url;

use crate::modules::navigation::{default_favicon_url, find_og_image, short_display_string};
use crate::settings::Settings;
use crate::state::{ImageKind, ImageSource, Site, SiteImage};

/// Fetches images for a site. Completion latency and thread are unspecified.
pub trait IconProvider: Send + Sync {
    fn fetch_icon(&self, site: &Site, kind: ImageKind, allow_fallback: bool) -> BoxFuture<'static, Option<SiteImage>>;
}

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("no usable image url for {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(u16),
    #[error("empty response body")]
    EmptyBody,
    #[error("response is not an image ({0})")]
    NotAnImage(String),
}

/// HTTP backed icon provider with an in-memory cache.
#[derive(Clone)]
pub struct SiteImageHelper {
    client: reqwest::Client,
    // Keyed by page url, only successful downloads are stored
    cache: Arc<DashMap<(String, ImageKind), SiteImage>>,
    timeout: Duration,
}

impl SiteImageHelper {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache: Arc::new(DashMap::new()),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(Duration::from_secs(settings.icon_request_timeout_secs))
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn fetch(&self, site: &Site, kind: ImageKind) -> Result<SiteImage, IconError> {
        let key = (site.url.clone(), kind);
        let cached = self.cache.get(&key).map(|hit| hit.clone());
        if let Some(hit) = cached {
            log::debug!("[Icons] Cache hit for {} ({:?})", site.url, kind);
            return Ok(hit);
        }

        let image_url = match kind {
            ImageKind::Favicon => self.favicon_url(site)?,
            ImageKind::HeroImage => self.hero_image_url(site).await?,
        };

        let image = self.download(image_url, kind).await?;
        self.cache.insert(key, image.clone());
        Ok(image)
    }

    fn favicon_url(&self, site: &Site) -> Result<Url, IconError> {
        let declared = site
            .metadata
            .as_ref()
            .and_then(|m| m.icon_url.as_deref())
            .and_then(|u| Url::parse(u).ok());

        declared
            .or_else(|| default_favicon_url(&site.url))
            .ok_or_else(|| IconError::InvalidUrl(site.url.clone()))
    }

    async fn hero_image_url(&self, site: &Site) -> Result<Url, IconError> {
        if let Some(media) = site.metadata.as_ref().and_then(|m| m.media_url.as_deref()) {
            if let Ok(url) = Url::parse(media) {
                return Ok(url);
            }
        }

        let page_url = Url::parse(&site.url).map_err(|_| IconError::InvalidUrl(site.url.clone()))?;
        let response = self.client.get(page_url.clone()).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(IconError::Status(response.status().as_u16()));
        }
        let html = response.text().await?;

        // og:image is allowed to be relative to the page
        find_og_image(&html)
            .and_then(|src| page_url.join(&src).ok())
            .ok_or_else(|| IconError::InvalidUrl(site.url.clone()))
    }

    async fn download(&self, url: Url, kind: ImageKind) -> Result<SiteImage, IconError> {
        log::debug!("[Icons] Fetching {:?} from {}", kind, url);
        let response = self.client.get(url.clone()).timeout(self.timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IconError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .or_else(|| mime_guess::from_path(url.path()).first_raw().map(|m| m.to_string()));

        if let Some(ct) = content_type.as_deref() {
            if ct.starts_with("text/html") {
                return Err(IconError::NotAnImage(ct.to_string()));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(IconError::EmptyBody);
        }

        Ok(SiteImage {
            kind,
            source: ImageSource::Remote {
                url: url.to_string(),
                bytes: Arc::from(bytes.as_ref()),
                content_type,
            },
        })
    }
}

/// Letter placeholder used when fallback images are allowed.
pub fn letter_fallback(site: &Site, kind: ImageKind) -> SiteImage {
    let name = site.provider_name().map(|n| n.to_string()).unwrap_or_else(|| short_display_string(&site.url));
    let letter = name
        .chars()
        .chain(site.title.chars())
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().next().unwrap_or(c))
        .unwrap_or('?');

    SiteImage {
        kind,
        source: ImageSource::Letter(letter),
    }
}

impl IconProvider for SiteImageHelper {
    fn fetch_icon(&self, site: &Site, kind: ImageKind, allow_fallback: bool) -> BoxFuture<'static, Option<SiteImage>> {
        let helper = self.clone();
        let site = site.clone();

        Box::pin(async move {
            match helper.fetch(&site, kind).await {
                Ok(image) => Some(image),
                Err(e) => {
                    log::info!("[Icons] No {:?} for {}: {}", kind, site.url, e);
                    allow_fallback.then(|| letter_fallback(&site, kind))
                }
            }
        })
    }
}
