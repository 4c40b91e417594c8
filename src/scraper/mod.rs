//! The one-shot scrape: search the portal for the last month of lodgements
//! and upsert every complete application found.

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate};
use html_scraper::Html;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::data::ApplicationStore;
use crate::portal::{PortalClient, Transport, extract_applications};
use crate::utils::{fmt_duration, log_if_slow};

/// Fetches slower than this are logged as slow.
const SLOW_FETCH: Duration = Duration::from_secs(5);

/// Lodgement date range searched by a run ending on `today`: one calendar
/// month back, both ends inclusive.
pub fn search_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let date_from = today.checked_sub_months(Months::new(1)).unwrap_or(today);
    (date_from, today)
}

/// Outcome counts for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Candidates produced by extraction.
    pub extracted: usize,
    pub saved: usize,
    /// Candidates missing an application number or address.
    pub skipped: usize,
    /// Candidates the store rejected.
    pub failed: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// A single scrape run against one portal and one store.
pub struct ScrapeRun<'a, T: Transport> {
    portal: &'a PortalClient<T>,
    store: &'a ApplicationStore,
    today: NaiveDate,
}

impl<'a, T: Transport> ScrapeRun<'a, T> {
    /// `today` is both the end of the search window and the scrape date.
    pub fn new(portal: &'a PortalClient<T>, store: &'a ApplicationStore, today: NaiveDate) -> Self {
        Self {
            portal,
            store,
            today,
        }
    }

    /// Run to completion.
    ///
    /// Schema and portal failures abort the run with an error. Storage
    /// failures are logged per record and counted in the summary; the
    /// remaining records are still written.
    pub async fn execute(&self) -> Result<RunSummary> {
        self.store.ensure_schema().await?;

        let (date_from, date_to) = search_window(self.today);
        info!(%date_from, %date_to, "Searching portal for lodged applications");

        let body = self.fetch_results(date_from, date_to).await?;

        // Parsed documents aren't Send; this future is driven on the caller's task.
        let html = Html::parse_document(&body);
        let info_url = self.portal.main_url().to_string();
        let mut summary = RunSummary::default();

        for da in extract_applications(&html, &info_url, self.today) {
            summary.extracted += 1;

            if !da.is_complete() {
                warn!(
                    application_number = da.application_number.as_str(),
                    address = da.address.as_str(),
                    "Skipping incomplete application"
                );
                summary.skipped += 1;
                continue;
            }

            match self.store.upsert(&da).await {
                Ok(()) => {
                    debug!(
                        application_number = da.application_number.as_str(),
                        address = da.address.as_str(),
                        received = da.received_date_str(),
                        "Saved application"
                    );
                    summary.saved += 1;
                }
                Err(e) => {
                    error!(
                        application_number = da.application_number.as_str(),
                        error = ?e,
                        "Failed to save application"
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(
            extracted = summary.extracted,
            saved = summary.saved,
            skipped = summary.skipped,
            failed = summary.failed,
            "Scrape run complete"
        );
        Ok(summary)
    }

    async fn fetch_results(&self, date_from: NaiveDate, date_to: NaiveDate) -> Result<String> {
        let start = Instant::now();

        let (_, session) = self
            .portal
            .fetch_main_page()
            .await
            .context("Failed to fetch portal main page")?;

        let body = self
            .portal
            .fetch_search_page(&session, date_from, date_to)
            .await
            .context("Failed to fetch portal search results")?;

        log_if_slow(start, SLOW_FETCH, "portal search");
        info!(
            bytes = body.len(),
            duration = fmt_duration(start.elapsed()),
            "Fetched search results"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_search_window_one_month() {
        assert_eq!(
            search_window(ymd(2023, 8, 15)),
            (ymd(2023, 7, 15), ymd(2023, 8, 15))
        );
    }

    #[test]
    fn test_search_window_crosses_year() {
        assert_eq!(
            search_window(ymd(2024, 1, 10)),
            (ymd(2023, 12, 10), ymd(2024, 1, 10))
        );
    }

    #[test]
    fn test_search_window_clamps_month_end() {
        assert_eq!(
            search_window(ymd(2023, 3, 31)),
            (ymd(2023, 2, 28), ymd(2023, 3, 31))
        );
    }

    #[test]
    fn test_run_summary_success() {
        assert!(RunSummary::default().is_success());
        let failed = RunSummary {
            failed: 1,
            ..RunSummary::default()
        };
        assert!(!failed.is_success());
    }
}
