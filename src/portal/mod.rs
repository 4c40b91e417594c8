//! Client for the council's application tracking portal.
//!
//! The portal hands out a session cookie on its main page and refuses to
//! return search results to anyone who hasn't picked one up first, so a
//! search is always a two-step affair: [`PortalClient::fetch_main_page`],
//! then [`PortalClient::fetch_search_page`] with the session it returned.

pub mod errors;
pub mod extract;
pub mod models;
pub mod session;

pub use errors::PortalError;
pub use extract::{Applications, extract_applications};
pub use models::DevelopmentApplication;
pub use session::{ReqwestTransport, SessionContext, Transport};

use chrono::NaiveDate;
use tracing::{debug, warn};
use url::Url;

/// Date format expected by the search endpoint.
const SEARCH_DATE_FORMAT: &str = "%d/%m/%Y";

/// Render a date the way the search endpoint expects it, URL-encoded.
pub fn encode_search_date(date: NaiveDate) -> String {
    urlencoding::encode(&date.format(SEARCH_DATE_FORMAT).to_string()).into_owned()
}

pub struct PortalClient<T = ReqwestTransport> {
    transport: T,
    main_url: Url,
    search_url_template: String,
}

impl<T: Transport> PortalClient<T> {
    /// `search_url_template` must contain `{date_from}` and `{date_to}`.
    pub fn new(
        transport: T,
        main_url: &str,
        search_url_template: impl Into<String>,
    ) -> Result<Self, PortalError> {
        Ok(Self {
            transport,
            main_url: Url::parse(main_url)?,
            search_url_template: search_url_template.into(),
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn main_url(&self) -> &Url {
        &self.main_url
    }

    /// Build the search URL for a lodgement date range.
    pub fn search_url(&self, date_from: NaiveDate, date_to: NaiveDate) -> Result<Url, PortalError> {
        let url = self
            .search_url_template
            .replace("{date_from}", &encode_search_date(date_from))
            .replace("{date_to}", &encode_search_date(date_to));
        Ok(Url::parse(&url)?)
    }

    /// GET the main page in a fresh session and return that session.
    pub async fn fetch_main_page(&self) -> Result<(String, SessionContext), PortalError> {
        let (body, session) = self.transport.get(&self.main_url, None).await?;

        if session.is_established_for(&self.main_url) {
            debug!(url = %self.main_url, "Portal session established");
        } else {
            warn!(url = %self.main_url, "Main page did not set a session cookie");
        }

        Ok((body, session))
    }

    /// GET the search results for `date_from..=date_to` within `session`.
    ///
    /// Fails with [`PortalError::InvalidSession`] if `session` holds no cookie
    /// for the search URL; the portal would answer such a request with an
    /// empty result set.
    pub async fn fetch_search_page(
        &self,
        session: &SessionContext,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<String, PortalError> {
        let url = self.search_url(date_from, date_to)?;

        if !session.is_established_for(&url) {
            return Err(PortalError::InvalidSession(format!(
                "no session cookie for {}; fetch the main page first",
                url.host_str().unwrap_or_default()
            )));
        }

        let (body, _) = self.transport.get(&url, Some(session)).await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait::async_trait]
    impl Transport for Unreachable {
        async fn get(
            &self,
            url: &Url,
            _session: Option<&SessionContext>,
        ) -> Result<(String, SessionContext), PortalError> {
            panic!("unexpected request to {url}");
        }
    }

    fn client() -> PortalClient<Unreachable> {
        PortalClient::new(
            Unreachable,
            "https://portal.example/Pages/XC.Track/SearchApplication.aspx",
            "https://portal.example/Pages/XC.Track/SearchApplication.aspx?d={date_from}&de={date_to}&k=LodgementDate",
        )
        .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_encode_search_date() {
        assert_eq!(encode_search_date(ymd(2023, 8, 5)), "05%2F08%2F2023");
    }

    #[test]
    fn test_search_url_substitutes_both_dates() {
        let url = client()
            .search_url(ymd(2023, 7, 5), ymd(2023, 8, 5))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://portal.example/Pages/XC.Track/SearchApplication.aspx?d=05%2F07%2F2023&de=05%2F08%2F2023&k=LodgementDate"
        );
    }

    #[test]
    fn test_new_rejects_bad_main_url() {
        let result = PortalClient::new(Unreachable, "not a url", "{date_from}{date_to}");
        assert!(matches!(result, Err(PortalError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_search_without_session_is_rejected_before_sending() {
        let result = client()
            .fetch_search_page(&SessionContext::new(), ymd(2023, 7, 5), ymd(2023, 8, 5))
            .await;
        assert!(matches!(result, Err(PortalError::InvalidSession(_))));
    }
}
