use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{blocking::Client, redirect::Policy};

pub(crate) const USER_AGENT: &str = "hexpop/0.1 (+https://github.com/dkorzhov/hexpop)";

/// Build a blocking client for the OSM web services.
pub(crate) fn blocking_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::limited(10))
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}
