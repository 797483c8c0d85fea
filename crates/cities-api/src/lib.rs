// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use cities_app::{CITIES_PATH, FetchRequest, ResultPage};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use std::time::Duration;
use url::Url;

pub const API_KEY_HEADER: &str = "x-rapidapi-key";
pub const API_HOST_HEADER: &str = "x-rapidapi-host";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    api_host: String,
    http: HttpClient,
}

impl Client {
    /// `timeout` of `None` keeps the HTTP client's default.
    pub fn new(
        base_url: &str,
        api_key: &str,
        api_host: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "api.base_url {base_url:?} must use http or https, got {}",
                parsed.scheme()
            );
        }

        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("build HTTP client")?;

        Ok(Self {
            base_url,
            api_key: api_key.to_owned(),
            api_host: api_host.to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    pub fn cities_url(&self, request: &FetchRequest) -> Result<Url> {
        let endpoint = format!("{}{CITIES_PATH}", self.base_url);
        Url::parse_with_params(&endpoint, request.query_pairs())
            .with_context(|| format!("build cities URL from {endpoint:?}"))
    }

    pub fn fetch_cities(&self, request: &FetchRequest) -> Result<ResultPage> {
        let url = self.cities_url(request)?;
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_HOST_HEADER, &self.api_host)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let body = response.text().context("read cities response")?;
        serde_json::from_str(&body).context("decode cities response")
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check api.base_url / API_BASE_URL ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = parsed.get("message").and_then(serde_json::Value::as_str)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}
