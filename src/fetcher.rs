use reqwest::blocking::Client;
use reqwest::redirect;
use scraper::Html;
use tracing::debug;

use crate::config::Settings;
use crate::error::{CrawlError, Result};

/// Source of page bodies. The HTTP implementation is [`HttpFetcher`]; tests
/// plug in canned pages.
pub trait Fetch: Send + Sync {
    fn fetch_html(&self, url: &str) -> Result<String>;

    fn fetch(&self, url: &str) -> Result<Html> {
        let body = self.fetch_html(url)?;
        Ok(Html::parse_document(&body))
    }
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let max_redirects = settings.max_redirects;
        let redirect_policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error(format!("Too many redirects (>{max_redirects})"))
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .redirect(redirect_policy)
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .build()
            .map_err(|e| CrawlError::Network {
                url: settings.base_url.clone(),
                reason: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch_html(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let network = |e: reqwest::Error| CrawlError::Network { url: url.to_string(), reason: e.to_string() };

        let resp = self.client.get(url).send().map_err(network)?;
        let resp = resp.error_for_status().map_err(network)?;

        resp.text().map_err(|e| CrawlError::Parse { url: url.to_string(), reason: e.to_string() })
    }
}
