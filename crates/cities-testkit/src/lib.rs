// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use cities_app::{CityRecord, ResultMetadata, ResultPage};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

/// How long the mock server waits for each expected request before giving up.
pub const REQUEST_WAIT: Duration = Duration::from_secs(5);

const SAMPLE_CITIES: [(&str, &str); 12] = [
    ("Paris", "FR"),
    ("Parma", "IT"),
    ("Pasadena", "US"),
    ("Patna", "IN"),
    ("Perth", "AU"),
    ("Porto", "PT"),
    ("Prague", "CZ"),
    ("Pretoria", "ZA"),
    ("Puebla", "MX"),
    ("Pune", "IN"),
    ("Pusan", "KR"),
    ("Palermo", "IT"),
];

pub fn sample_city(name: &str, country_code: &str) -> CityRecord {
    CityRecord {
        name: name.to_owned(),
        country_code: country_code.to_owned(),
    }
}

/// First `count` sample cities (cycling once the list runs out).
pub fn sample_cities(count: usize) -> Vec<CityRecord> {
    SAMPLE_CITIES
        .iter()
        .cycle()
        .take(count)
        .map(|(name, code)| sample_city(name, code))
        .collect()
}

pub fn sample_page(count: usize, total_count: u64) -> ResultPage {
    ResultPage {
        data: sample_cities(count),
        metadata: ResultMetadata { total_count },
    }
}

/// Response body in the shape the cities API returns, including fields the
/// client ignores.
pub fn page_json(page: &ResultPage) -> String {
    let data = page
        .data
        .iter()
        .enumerate()
        .map(|(index, city)| {
            serde_json::json!({
                "id": index + 1,
                "type": "CITY",
                "name": city.name,
                "country": city.country_code,
                "countryCode": city.country_code,
                "population": 100_000 + index * 1_000,
            })
        })
        .collect::<Vec<_>>();
    serde_json::json!({
        "data": data,
        "links": [],
        "metadata": {
            "currentOffset": 0,
            "totalCount": page.metadata.total_count,
        },
    })
    .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: String,
}

impl MockReply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn page(page: &ResultPage) -> Self {
        Self::json(200, page_json(page))
    }
}

/// One-shot HTTP server answering each incoming request with the next reply.
/// Replies nobody asks for within the wait are dropped, so `finish` returns.
pub struct MockCitiesServer {
    base_url: String,
    requests: Receiver<RecordedRequest>,
    handle: Option<JoinHandle<()>>,
}

impl MockCitiesServer {
    pub fn start(replies: Vec<MockReply>) -> Result<Self> {
        Self::start_with_wait(replies, REQUEST_WAIT)
    }

    pub fn start_with_wait(replies: Vec<MockReply>, wait: Duration) -> Result<Self> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}/v1", server.server_addr());
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            for reply in replies {
                let Ok(Some(request)) = server.recv_timeout(wait) else {
                    return;
                };
                let recorded = RecordedRequest {
                    url: request.url().to_owned(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|header| {
                            (
                                header.field.as_str().as_str().to_owned(),
                                header.value.as_str().to_owned(),
                            )
                        })
                        .collect(),
                };
                let _ = tx.send(recorded);

                let mut response =
                    Response::from_string(reply.body).with_status_code(reply.status);
                if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
                    response = response.with_header(header);
                }
                let _ = request.respond(response);
            }
        });

        Ok(Self {
            base_url,
            requests: rx,
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for the server thread and returns every request it answered.
    pub fn finish(mut self) -> Result<Vec<RecordedRequest>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("mock server thread panicked"))?;
        }
        Ok(self.requests.try_iter().collect())
    }
}
