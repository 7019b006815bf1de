// Test doubles shared by the unit test modules.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures_util::future::{BoxFuture, FutureExt};

use crate::icon_manager::IconProvider;
use crate::state::{ImageKind, ImageSource, Site, SiteImage, Tab};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Tab whose `last_executed` is `minutes_ago` before `base_time()`.
pub fn create_test_tab(id: &str, minutes_ago: i64) -> Tab {
    let mut tab = Tab::new(id, format!("https://example.com/{}", id), base_time() - Duration::minutes(minutes_ago));
    tab.title = format!("Tab {}", id);
    tab
}

pub fn remote_image(kind: ImageKind) -> SiteImage {
    SiteImage {
        kind,
        source: ImageSource::Remote {
            url: "https://example.com/favicon.ico".to_string(),
            bytes: Arc::from(&[1u8, 2, 3][..]),
            content_type: Some("image/x-icon".to_string()),
        },
    }
}

/// Answers every request with the same result and records what was asked.
pub struct StaticIconProvider {
    result: Option<SiteImage>,
    pub requests: Mutex<Vec<(String, ImageKind, bool)>>,
}

impl StaticIconProvider {
    pub fn new(result: Option<SiteImage>) -> Arc<Self> {
        Arc::new(Self {
            result,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<(String, ImageKind, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

impl IconProvider for StaticIconProvider {
    fn fetch_icon(&self, site: &Site, kind: ImageKind, allow_fallback: bool) -> BoxFuture<'static, Option<SiteImage>> {
        self.requests.lock().unwrap().push((site.url.clone(), kind, allow_fallback));
        let result = self.result.clone().map(|mut image| {
            image.kind = kind;
            image
        });
        futures_util::future::ready(result).boxed()
    }
}

/// Never completes until the matching sender fires.
pub struct PendingIconProvider {
    receiver: Mutex<Option<tokio::sync::oneshot::Receiver<Option<SiteImage>>>>,
}

impl PendingIconProvider {
    pub fn new() -> (Arc<Self>, tokio::sync::oneshot::Sender<Option<SiteImage>>) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let provider = Arc::new(Self {
            receiver: Mutex::new(Some(rx)),
        });
        (provider, tx)
    }
}

impl IconProvider for PendingIconProvider {
    fn fetch_icon(&self, _site: &Site, _kind: ImageKind, _allow_fallback: bool) -> BoxFuture<'static, Option<SiteImage>> {
        let receiver = self.receiver.lock().unwrap().take();
        async move {
            match receiver {
                Some(rx) => rx.await.unwrap_or(None),
                None => None,
            }
        }
        .boxed()
    }
}
