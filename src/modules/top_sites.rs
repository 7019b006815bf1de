// Top site tile model used by the home screen Top Sites section.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::icon_manager::IconProvider;
use crate::modules::navigation::short_display_string;
use crate::settings::SearchProviderConstants;
use crate::state::{ImageKind, Site, SiteImage, SiteKind};

type IconCallback = Box<dyn FnOnce(Option<SiteImage>) + Send>;

#[derive(Default)]
struct IconSlot {
    // Outer None while the fetch is still running
    result: Option<Option<SiteImage>>,
    callback: Option<IconCallback>,
    // Set by cancel; later results are discarded
    cancelled: bool,
}

fn lock_slot(slot: &Mutex<IconSlot>) -> MutexGuard<'_, IconSlot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Stores the fetch result and hands it to the pending callback, if any.
/// Does nothing once the slot has been cancelled.
fn deliver(slot: &Mutex<IconSlot>, image: Option<SiteImage>) {
    let callback = {
        let mut guard = lock_slot(slot);
        if guard.cancelled {
            return;
        }
        guard.result = Some(image.clone());
        guard.callback.take()
    };

    if let Some(callback) = callback {
        callback(image);
    }
}

/// A site tile with a derived title and a favicon that loads in the background.
///
/// The favicon fetch is owned by the tile: dropping the tile, or calling
/// [`HomeTopSite::cancel_icon_fetch`], aborts a fetch that has not finished yet.
pub struct HomeTopSite {
    pub site: Site,
    pub title: String,
    pub identifier: String,
    constants: SearchProviderConstants,
    slot: Arc<Mutex<IconSlot>>,
    fetch_task: Option<JoinHandle<()>>,
}

impl HomeTopSite {
    pub fn new(site: Site, icon_provider: Arc<dyn IconProvider>) -> Self {
        Self::with_constants(site, icon_provider, SearchProviderConstants::default())
    }

    /// Must be called from within a tokio runtime for the favicon to load.
    /// Outside of one the tile resolves straight away without an icon.
    pub fn with_constants(site: Site, icon_provider: Arc<dyn IconProvider>, constants: SearchProviderConstants) -> Self {
        let title = match site.provider_name() {
            Some(provider) => provider.to_lowercase(),
            None => short_display_string(&site.url),
        };

        let slot = Arc::new(Mutex::new(IconSlot::default()));
        let fetch = icon_provider.fetch_icon(&site, ImageKind::Favicon, false);

        let fetch_task = match Handle::try_current() {
            Ok(handle) => {
                let task_slot = slot.clone();
                let url = site.url.clone();
                Some(handle.spawn(async move {
                    let image = fetch.await;
                    log::debug!("[TopSites] Favicon for {} loaded: {}", url, image.is_some());
                    deliver(&task_slot, image);
                }))
            }
            Err(_) => {
                log::warn!("[TopSites] No async runtime, skipping favicon for {}", site.url);
                deliver(&slot, None);
                None
            }
        };

        Self {
            site,
            title,
            identifier: uuid::Uuid::new_v4().to_string(),
            constants,
            slot,
            fetch_task,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.site.kind == SiteKind::Pinned
    }

    pub fn is_suggested(&self) -> bool {
        self.site.kind == SiteKind::Suggested
    }

    pub fn is_sponsored_tile(&self) -> bool {
        self.site.kind == SiteKind::Sponsored
    }

    pub fn is_google_guid(&self) -> bool {
        self.site.guid.as_deref() == Some(self.constants.guid.as_str())
    }

    pub fn is_google_url(&self) -> bool {
        self.site.url == self.constants.us_url || self.site.url == self.constants.row_url
    }

    /// The loaded favicon. None while loading, or when the site has none.
    pub fn icon(&self) -> Option<SiteImage> {
        lock_slot(&self.slot).result.clone().flatten()
    }

    pub fn is_icon_loaded(&self) -> bool {
        lock_slot(&self.slot).result.is_some()
    }

    /// Register the callback fired when the favicon fetch finishes.
    ///
    /// Runs on whichever thread completes the fetch; UI work must be re-dispatched
    /// by the caller. If the fetch already finished, the callback runs immediately.
    /// Registering again before completion replaces the previous callback.
    pub fn on_icon_loaded<F>(&self, callback: F)
    where
        F: FnOnce(Option<SiteImage>) + Send + 'static,
    {
        let mut guard = lock_slot(&self.slot);
        if let Some(result) = guard.result.clone() {
            drop(guard);
            callback(result);
        } else if guard.cancelled {
            log::debug!("[TopSites] Fetch for {} was cancelled, dropping callback", self.site.url);
        } else {
            guard.callback = Some(Box::new(callback));
        }
    }

    /// Abort an in-flight favicon fetch. The pending callback is dropped unfired,
    /// even if the fetch is completing on another worker thread right now.
    /// A result stored before the cancel stays available.
    pub fn cancel_icon_fetch(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            if !task.is_finished() {
                log::debug!("[TopSites] Cancelling favicon fetch for {}", self.site.url);
            }
            task.abort();
        }
        let mut guard = lock_slot(&self.slot);
        guard.cancelled = true;
        guard.callback = None;
    }
}

impl Drop for HomeTopSite {
    fn drop(&mut self) {
        self.cancel_icon_fetch();
    }
}

impl std::fmt::Debug for HomeTopSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeTopSite")
            .field("site", &self.site)
            .field("title", &self.title)
            .field("identifier", &self.identifier)
            .field("icon_loaded", &self.is_icon_loaded())
            .finish()
    }
}
