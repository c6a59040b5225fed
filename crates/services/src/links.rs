use std::io;
use std::sync::Arc;

use crate::error::LinkError;

pub const PRIVACY_POLICY_URL: &str =
    "https://abraham1515.github.io/Licencia-de-armas/privacidad.html";
pub const STORE_PACKAGE: &str = "com.abrahamperez.licencia.premium";

/// Opens a URL with whatever the platform provides.
pub trait LinkOpener: Send + Sync {
    /// # Errors
    ///
    /// Returns an I/O error if the URL could not be handed off.
    fn open(&self, url: &str) -> io::Result<()>;
}

#[must_use]
pub fn store_market_url() -> String {
    format!("market://details?id={STORE_PACKAGE}")
}

#[must_use]
pub fn store_web_url() -> String {
    format!("https://play.google.com/store/apps/details?id={STORE_PACKAGE}")
}

/// External links shown on the profile screen.
#[derive(Clone)]
pub struct LinkService {
    opener: Arc<dyn LinkOpener>,
}

impl LinkService {
    #[must_use]
    pub fn new(opener: Arc<dyn LinkOpener>) -> Self {
        Self { opener }
    }

    /// # Errors
    ///
    /// Returns `LinkError::Open` if the URL cannot be opened.
    pub fn open_privacy_policy(&self) -> Result<(), LinkError> {
        self.open(PRIVACY_POLICY_URL)
    }

    /// Open the store listing, falling back to the web page when the store
    /// app cannot handle the `market://` URL.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Open` for the web URL if both attempts fail.
    pub fn open_store_page(&self) -> Result<(), LinkError> {
        let market = store_market_url();
        if let Err(err) = self.opener.open(&market) {
            log::debug!("market link failed ({err}), trying web");
            return self.open(&store_web_url());
        }
        Ok(())
    }

    fn open(&self, url: &str) -> Result<(), LinkError> {
        self.opener.open(url).map_err(|source| {
            log::error!("could not open {url}: {source}");
            LinkError::Open {
                url: url.to_string(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every URL and fails for the ones that start with a rejected prefix.
    #[derive(Default)]
    struct RecordingOpener {
        rejected: Vec<&'static str>,
        opened: Mutex<Vec<String>>,
    }

    impl LinkOpener for RecordingOpener {
        fn open(&self, url: &str) -> io::Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            if self.rejected.iter().any(|prefix| url.starts_with(prefix)) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no handler"));
            }
            Ok(())
        }
    }

    #[test]
    fn store_prefers_market_url() {
        let opener = Arc::new(RecordingOpener::default());
        LinkService::new(opener.clone()).open_store_page().unwrap();
        assert_eq!(*opener.opened.lock().unwrap(), [store_market_url()]);
    }

    #[test]
    fn store_falls_back_to_web() {
        let opener = Arc::new(RecordingOpener {
            rejected: vec!["market://"],
            ..RecordingOpener::default()
        });
        LinkService::new(opener.clone()).open_store_page().unwrap();
        assert_eq!(
            *opener.opened.lock().unwrap(),
            [store_market_url(), store_web_url()]
        );
    }

    #[test]
    fn failures_are_reported_not_panicked() {
        let opener = Arc::new(RecordingOpener {
            rejected: vec!["market://", "https://"],
            ..RecordingOpener::default()
        });
        let service = LinkService::new(opener);

        let err = service.open_store_page().unwrap_err();
        assert!(matches!(err, LinkError::Open { ref url, .. } if *url == store_web_url()));
        assert!(service.open_privacy_policy().is_err());
    }
}
