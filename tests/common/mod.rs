#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crossbeam_channel::Receiver;

use workua_job_archiver::{CancelToken, CrawlError, CrawlOptions, Fetch, ItemFailurePolicy, Result};
use workua_job_archiver::retry::RetryPolicy;
use workua_job_archiver::work_ua::WorkUa;

pub const BASE: &str = "https://www.work.ua";

#[derive(Default)]
struct State {
    bodies: HashMap<String, String>,
    requests: Vec<String>,
    failures_left: HashMap<String, u32>,
    cancel_on: Option<(String, CancelToken)>,
    block_on: Option<(String, Receiver<()>)>,
}

/// Canned pages keyed by URL. Unknown URLs answer like a 404.
#[derive(Clone, Default)]
pub struct Pages(Arc<Mutex<State>>);

impl Pages {
    pub fn insert(&self, url: impl Into<String>, body: impl Into<String>) -> &Self {
        self.0.lock().unwrap().bodies.insert(url.into(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.0.lock().unwrap().requests.clone()
    }

    /// The next `times` fetches of `url` fail with a network error.
    pub fn fail(&self, url: &str, times: u32) {
        self.0.lock().unwrap().failures_left.insert(url.to_string(), times);
    }

    pub fn cancel_on(&self, url: &str, token: CancelToken) {
        self.0.lock().unwrap().cancel_on = Some((url.to_string(), token));
    }

    /// Fetching `url` waits until something is sent on (or drops) the gate.
    pub fn block_on(&self, url: &str, gate: Receiver<()>) {
        self.0.lock().unwrap().block_on = Some((url.to_string(), gate));
    }

    pub fn site(&self) -> Arc<WorkUa> {
        Arc::new(WorkUa::with_fetcher(BASE, Box::new(self.clone())).unwrap())
    }
}

impl Fetch for Pages {
    fn fetch_html(&self, url: &str) -> Result<String> {
        let gate = {
            let mut state = self.0.lock().unwrap();
            state.requests.push(url.to_string());
            if let Some((target, token)) = &state.cancel_on {
                if target == url {
                    token.cancel();
                }
            }
            state.block_on.as_ref().filter(|(target, _)| target == url).map(|(_, gate)| gate.clone())
        };
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        let mut state = self.0.lock().unwrap();
        if let Some(left) = state.failures_left.get_mut(url) {
            if *left > 0 {
                *left -= 1;
                return Err(CrawlError::Network { url: url.to_string(), reason: "connection reset".into() });
            }
        }
        state
            .bodies
            .get(url)
            .cloned()
            .ok_or_else(|| CrawlError::Network { url: url.to_string(), reason: "404 Not Found".into() })
    }
}

pub fn listing_url(slug: &str) -> String {
    format!("{BASE}/jobs-{slug}/")
}

pub fn page_url(slug: &str, page: u32) -> String {
    format!("{BASE}/jobs-{slug}/?page={page}")
}

pub fn job_url(id: u32) -> String {
    format!("{BASE}/jobs/{id}/")
}

/// A search results page: headline, optional pagination entries, job cards.
pub fn listing_page(headline: &str, pagination: &[&str], job_ids: &[u32]) -> String {
    let pagination = if pagination.is_empty() {
        String::new()
    } else {
        let items: String = pagination.iter().map(|e| format!("<li><a href=\"#\">{e}</a></li>")).collect();
        format!("<nav><ul class=\"pagination hidden-xs\">{items}</ul></nav>")
    };
    let cards: String = job_ids
        .iter()
        .map(|id| {
            format!(
                "<div class=\"card card-hover card-visited wordwrap job-link\">\
                 <h2><a href=\"/jobs/{id}/\">Job {id}</a></h2></div>"
            )
        })
        .collect();
    format!(
        "<html><body>\
         <div class=\"card\"><div><h1>Search</h1></div><h2> {headline} </h2></div>\
         {cards}{pagination}\
         </body></html>"
    )
}

pub fn empty_listing_page() -> String {
    "<html><body><div class=\"card card-hover\"><p>Nothing found</p></div></body></html>".to_string()
}

pub fn job_page(title: &str) -> String {
    format!(
        "<html><body>\
         <h1 id=\"h1-name\" class=\"add-top-sm\">{title}</h1>\
         <p><span title=\"Зарплата\"></span><b>40 000 грн</b></p>\
         <p><span title=\"Дані про компанію\"></span><a href=\"/company/\">Acme</a></p>\
         <p><span title=\"Адреса роботи\"></span>Kyiv</p>\
         <p><span title=\"Умови й вимоги\"></span>Full-time</p>\
         <div id=\"job-description\">Do things.</div>\
         </body></html>"
    )
}

pub fn options(dir: &Path) -> CrawlOptions {
    CrawlOptions {
        max_delay: std::time::Duration::ZERO,
        on_item_error: ItemFailurePolicy::Abort,
        retry: RetryPolicy::NONE,
        output_dir: dir.to_path_buf(),
    }
}
