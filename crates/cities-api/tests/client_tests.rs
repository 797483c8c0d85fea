// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use cities_api::{API_HOST_HEADER, API_KEY_HEADER, Client};
use cities_app::FetchRequest;
use cities_testkit::{MockCitiesServer, MockReply, sample_page};
use std::time::Duration;

fn request(limit: u32, search: &str, page: u32) -> FetchRequest {
    FetchRequest {
        request_id: 1,
        limit,
        search: search.to_owned(),
        page,
    }
}

#[test]
fn fetch_cities_sends_query_and_rapidapi_headers() -> Result<()> {
    let server = MockCitiesServer::start(vec![MockReply::page(&sample_page(2, 23))])?;
    let client = Client::new(
        server.base_url(),
        "secret-key",
        "geo.example.com",
        Some(Duration::from_secs(2)),
    )?;

    let page = client.fetch_cities(&request(7, "Paris", 2))?;
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].name, "Paris");
    assert_eq!(page.data[0].country_code, "FR");
    assert_eq!(page.total_count(), 23);

    let requests = server.finish()?;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "/v1/geo/cities?limit=7&namePrefix=Paris&offset=1"
    );
    assert_eq!(requests[0].header(API_KEY_HEADER), Some("secret-key"));
    assert_eq!(requests[0].header(API_HOST_HEADER), Some("geo.example.com"));
    Ok(())
}

#[test]
fn fetch_cities_returns_empty_page() -> Result<()> {
    let server = MockCitiesServer::start(vec![MockReply::page(&sample_page(0, 0))])?;
    let client = Client::new(server.base_url(), "key", "host", None)?;

    let page = client.fetch_cities(&request(5, "Qqq", 1))?;
    assert!(page.is_empty());
    assert_eq!(page.total_count(), 0);
    server.finish()?;
    Ok(())
}

#[test]
fn fetch_cities_fails_on_non_success_status() -> Result<()> {
    let server = MockCitiesServer::start(vec![MockReply::json(
        429,
        r#"{"message":"Too many requests"}"#,
    )])?;
    let client = Client::new(server.base_url(), "key", "host", None)?;

    let error = client
        .fetch_cities(&request(5, "", 1))
        .expect_err("429 should fail");
    assert_eq!(error.to_string(), "server error (429): Too many requests");
    server.finish()?;
    Ok(())
}

#[test]
fn fetch_cities_fails_on_malformed_body() -> Result<()> {
    let server = MockCitiesServer::start(vec![MockReply::json(200, "<html>nope</html>")])?;
    let client = Client::new(server.base_url(), "key", "host", None)?;

    let error = client
        .fetch_cities(&request(5, "", 1))
        .expect_err("non-JSON body should fail");
    assert!(error.to_string().contains("decode cities response"));
    server.finish()?;
    Ok(())
}

#[test]
fn fetch_cities_reports_unreachable_server() -> Result<()> {
    let client = Client::new(
        "http://127.0.0.1:1/v1",
        "key",
        "host",
        Some(Duration::from_millis(200)),
    )?;

    let error = client
        .fetch_cities(&request(5, "", 1))
        .expect_err("unreachable server should fail");
    assert!(error.to_string().contains("cannot reach http://127.0.0.1:1/v1"));
    Ok(())
}
