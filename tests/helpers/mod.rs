//! Shared fixtures for integration tests: a scripted portal and results pages.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use da_tracker::data::ApplicationStore;
use da_tracker::portal::{PortalClient, PortalError, SessionContext, Transport};
use std::sync::Mutex;
use url::Url;

pub const MAIN_URL: &str = "https://portal.example/Pages/XC.Track/SearchApplication.aspx";
pub const SEARCH_URL: &str =
    "https://portal.example/Pages/XC.Track/SearchApplication.aspx?d={date_from}&de={date_to}&k=LodgementDate";
pub const SESSION_COOKIE: &str = "ASP.NET_SessionId=abc123";

/// A request as seen by [`ScriptedPortal`].
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub url: Url,
    /// Whether the caller handed over an existing session.
    pub had_session: bool,
    /// The `Cookie` header the session would have sent.
    pub cookie: Option<String>,
}

/// Transport double mimicking the portal: the main page issues a session
/// cookie, and the search page only returns results to requests carrying it.
pub struct ScriptedPortal {
    main_url: Url,
    search_page: String,
    issue_cookie: bool,
    requests: Mutex<Vec<SeenRequest>>,
}

impl ScriptedPortal {
    pub fn new(search_page: impl Into<String>) -> Self {
        Self {
            main_url: Url::parse(MAIN_URL).unwrap(),
            search_page: search_page.into(),
            issue_cookie: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A portal whose main page never sets a session cookie.
    pub fn without_cookie(mut self) -> Self {
        self.issue_cookie = false;
        self
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedPortal {
    async fn get(
        &self,
        url: &Url,
        session: Option<&SessionContext>,
    ) -> Result<(String, SessionContext), PortalError> {
        let cookie = session.and_then(|s| s.cookie_header(url));
        self.requests.lock().unwrap().push(SeenRequest {
            url: url.clone(),
            had_session: session.is_some(),
            cookie: cookie.clone(),
        });

        let session = session.cloned().unwrap_or_default();

        if *url == self.main_url {
            if self.issue_cookie {
                session.add_cookie_str(&format!("{SESSION_COOKIE}; Path=/; HttpOnly"), url);
            }
            return Ok(("<html><body>Application tracking</body></html>".to_owned(), session));
        }

        let body = match cookie {
            Some(c) if c.contains(SESSION_COOKIE) => self.search_page.clone(),
            _ => "<html><body></body></html>".to_owned(),
        };
        Ok((body, session))
    }
}

pub fn portal<T: Transport>(transport: T) -> PortalClient<T> {
    PortalClient::new(transport, MAIN_URL, SEARCH_URL).unwrap()
}

pub async fn memory_store() -> ApplicationStore {
    ApplicationStore::in_memory().await.unwrap()
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One application heading on a results page.
pub struct Entry<'a> {
    pub address: &'a str,
    pub rows: &'a [(&'a str, &'a str)],
}

/// Render a search results page the way the portal lays it out.
pub fn results_page(entries: &[Entry<'_>]) -> String {
    let mut body = String::new();
    for entry in entries {
        body.push_str(&format!(
            "<h4 class=\"non_table_headers\"><a href=\"/Application/1\">{}</a></h4>\n<div>\n",
            entry.address
        ));
        for (key, value) in entry.rows {
            body.push_str(&format!(
                "  <p class=\"rowDataOnly\">\n    <span class=\"key\">{key}</span>\n    <span class=\"inputField\">{value}</span>\n  </p>\n"
            ));
        }
        body.push_str("</div>\n");
    }
    format!(
        "<!DOCTYPE html><html><head><title>Search</title></head><body><div id=\"searchresult\">\n{body}</div></body></html>"
    )
}
