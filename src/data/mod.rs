//! Durable storage for scraped applications.

pub mod applications;

pub use applications::{ApplicationStore, StoredApplication};
