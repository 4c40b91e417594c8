use crate::config::Config;
use crate::data::ApplicationStore;
use crate::portal::{PortalClient, ReqwestTransport};
use crate::scraper::ScrapeRun;
use anyhow::{Context, anyhow};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::process::ExitCode;
use tracing::{error, info};

/// Everything a scrape run needs, wired from configuration.
pub struct App {
    store: ApplicationStore,
    portal: PortalClient,
    timezone: Tz,
}

impl App {
    /// Open the database and build the portal client.
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let timezone: Tz = config
            .portal_timezone
            .parse()
            .map_err(|e| anyhow!("Invalid PORTAL_TIMEZONE {:?}: {e}", config.portal_timezone))?;

        let store = ApplicationStore::connect(&config.database_url).await?;

        let portal = PortalClient::new(
            ReqwestTransport::new(config.user_agent.clone()),
            &config.portal_url,
            config.search_url.clone(),
        )
        .context("Failed to create portal client")?;

        info!(
            portal_url = config.portal_url.as_str(),
            timezone = %timezone,
            "portal client configured"
        );

        Ok(App {
            store,
            portal,
            timezone,
        })
    }

    /// The current date at the council.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// Run one scrape and map its outcome to a process exit code.
    pub async fn run(self) -> ExitCode {
        let run = ScrapeRun::new(&self.portal, &self.store, self.today());

        match run.execute().await {
            Ok(summary) if summary.is_success() => {
                info!(saved = summary.saved, "Complete");
                ExitCode::SUCCESS
            }
            Ok(summary) => {
                error!(
                    saved = summary.saved,
                    failed = summary.failed,
                    "Completed with storage failures"
                );
                ExitCode::FAILURE
            }
            Err(e) => {
                error!(error = ?e, "Scrape run failed");
                ExitCode::FAILURE
            }
        }
    }
}
