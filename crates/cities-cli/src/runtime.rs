// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use cities_api::Client;
use cities_app::{FetchRequest, ResultPage};
use cities_tui::{AppRuntime, FetchEvent, InternalEvent};
use std::sync::mpsc::Sender;
use std::thread;

pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl AppRuntime for ApiRuntime {
    fn fetch_cities(&mut self, request: &FetchRequest) -> Result<ResultPage> {
        self.client.fetch_cities(request)
    }

    fn spawn_fetch(&mut self, request: FetchRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("fetch-{}", request.request_id))
            .spawn(move || {
                let event = match client.fetch_cities(&request) {
                    Ok(page) => FetchEvent::Loaded {
                        request_id: request.request_id,
                        page,
                    },
                    Err(error) => FetchEvent::Failed {
                        request_id: request.request_id,
                        error: format!("{error:#}"),
                    },
                };
                // The UI may already be gone; nothing is waiting for this.
                let _ = tx.send(InternalEvent::Fetch(event));
            })
            .context("spawn fetch worker")?;
        Ok(())
    }
}
