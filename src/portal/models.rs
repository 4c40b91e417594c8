//! Development application records and the label resolver that fills them.

use chrono::NaiveDate;

use crate::normalize::{format_date, parse_lenient_date};

/// Pattern the portal uses for "Date Lodged" values.
pub const LODGED_DATE_PATTERN: &str = "D/MM/YYYY";

/// A development application as published on the council portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevelopmentApplication {
    /// Council reference, e.g. `DA/123/2023`. Primary key in storage.
    pub application_number: String,
    pub address: String,
    /// Description of the proposed work; empty when the portal omits it.
    pub reason: String,
    pub info_url: String,
    /// `None` when the lodged date was missing or unparseable.
    pub received_date: Option<NaiveDate>,
    pub scrape_date: NaiveDate,
}

impl DevelopmentApplication {
    /// Whether the record carries enough to be persisted.
    pub fn is_complete(&self) -> bool {
        !self.application_number.is_empty() && !self.address.is_empty()
    }

    /// `YYYY-MM-DD`, or empty when unknown.
    pub fn received_date_str(&self) -> String {
        format_date(self.received_date)
    }

    pub fn scrape_date_str(&self) -> String {
        format_date(Some(self.scrape_date))
    }
}

/// Record fields addressable by a detail-row label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ApplicationNumber,
    Reason,
    ReceivedDate,
}

impl Field {
    /// Resolve a detail-row label. Matching is exact and case-sensitive;
    /// labels the portal adds later simply resolve to `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Application No." => Some(Self::ApplicationNumber),
            "Type of Work" => Some(Self::Reason),
            "Date Lodged" => Some(Self::ReceivedDate),
            _ => None,
        }
    }
}

/// Accumulates labelled values for one application heading.
#[derive(Debug, Clone, Default)]
pub struct ApplicationBuilder {
    address: String,
    application_number: String,
    reason: String,
    received_date: Option<NaiveDate>,
}

impl ApplicationBuilder {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Apply one label/value row. Returns `false` if the label is unknown.
    pub fn apply(&mut self, label: &str, value: &str) -> bool {
        let Some(field) = Field::from_label(label) else {
            return false;
        };

        match field {
            Field::ApplicationNumber => self.application_number = value.to_owned(),
            Field::Reason => self.reason = value.to_owned(),
            Field::ReceivedDate => {
                self.received_date = parse_lenient_date(value, LODGED_DATE_PATTERN)
            }
        }
        true
    }

    pub fn build(self, info_url: &str, scrape_date: NaiveDate) -> DevelopmentApplication {
        DevelopmentApplication {
            application_number: self.application_number,
            address: self.address,
            reason: self.reason,
            info_url: info_url.to_owned(),
            received_date: self.received_date,
            scrape_date,
        }
    }
}
