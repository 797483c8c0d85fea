// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{DEFAULT_LIMIT, FetchRequest, PaginationProps, ResultPage, parse_limit, total_pages};

pub const LIMIT_ALERT: &str = "Max limit is 10. Please enter a value between 1 and 10";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub results: ResultPage,
    pub total_count: u64,
    pub limit_input: String,
    pub applied_limit: u32,
    pub current_page: u32,
    pub search: String,
    pub loading: bool,
    pub alert: Option<String>,
    mounted: bool,
    latest_request_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Mount,
    SubmitSearch(String),
    EditLimit(String),
    SubmitLimit,
    ChangePage(u32),
    ResponseReceived { request_id: u64, page: ResultPage },
    RequestFailed { request_id: u64, error: String },
    DismissAlert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    FetchRequested(FetchRequest),
    LoadingChanged(bool),
    SearchChanged(String),
    PageChanged(u32),
    LimitEdited(String),
    AlertRaised(String),
    AlertDismissed,
    ResultsReplaced {
        request_id: u64,
        rows: usize,
        total_count: u64,
    },
    StaleResponseDiscarded {
        request_id: u64,
        latest: u64,
    },
    FetchFailed {
        request_id: u64,
        error: String,
    },
}

impl AppState {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            results: ResultPage::default(),
            total_count: 0,
            limit_input: limit.to_string(),
            applied_limit: limit,
            current_page: 1,
            search: String::new(),
            loading: false,
            alert: None,
            mounted: false,
            latest_request_id: 0,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::Mount => {
                if self.mounted {
                    return Vec::new();
                }
                self.mounted = true;
                vec![self.request_fetch(self.applied_limit, self.current_page)]
            }
            AppCommand::SubmitSearch(term) => {
                self.loading = true;
                self.search = term.clone();
                self.current_page = 1;
                vec![
                    AppEvent::LoadingChanged(true),
                    AppEvent::SearchChanged(term),
                    AppEvent::PageChanged(1),
                    self.request_fetch(self.effective_limit(), 1),
                ]
            }
            AppCommand::EditLimit(raw) => {
                self.limit_input = raw.clone();
                vec![AppEvent::LimitEdited(raw)]
            }
            AppCommand::SubmitLimit => match parse_limit(&self.limit_input) {
                Ok(limit) => vec![self.request_fetch(limit, self.current_page)],
                Err(_) => {
                    self.alert = Some(LIMIT_ALERT.to_owned());
                    vec![AppEvent::AlertRaised(LIMIT_ALERT.to_owned())]
                }
            },
            AppCommand::ChangePage(page) => {
                self.current_page = page;
                vec![
                    AppEvent::PageChanged(page),
                    self.request_fetch(self.effective_limit(), page),
                ]
            }
            AppCommand::ResponseReceived { request_id, page } => {
                if request_id != self.latest_request_id {
                    return vec![AppEvent::StaleResponseDiscarded {
                        request_id,
                        latest: self.latest_request_id,
                    }];
                }
                self.total_count = page.total_count();
                let rows = page.data.len();
                self.results = page;
                let mut events = vec![AppEvent::ResultsReplaced {
                    request_id,
                    rows,
                    total_count: self.total_count,
                }];
                if self.loading {
                    self.loading = false;
                    events.push(AppEvent::LoadingChanged(false));
                }
                events
            }
            AppCommand::RequestFailed { request_id, error } => {
                vec![AppEvent::FetchFailed { request_id, error }]
            }
            AppCommand::DismissAlert => {
                if self.alert.take().is_some() {
                    vec![AppEvent::AlertDismissed]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Limit used for paging and page counts: the typed value when it is a
    /// valid limit, otherwise the one last sent to the API.
    pub fn effective_limit(&self) -> u32 {
        parse_limit(&self.limit_input).unwrap_or(self.applied_limit)
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.effective_limit())
    }

    pub fn pagination(&self) -> PaginationProps {
        PaginationProps::new(self.current_page, self.total_pages())
    }

    /// Limit input and pagination are only shown alongside results.
    pub fn shows_controls(&self) -> bool {
        !self.results.is_empty()
    }

    pub const fn latest_request_id(&self) -> u64 {
        self.latest_request_id
    }

    fn request_fetch(&mut self, limit: u32, page: u32) -> AppEvent {
        self.latest_request_id = self.latest_request_id.saturating_add(1);
        self.applied_limit = limit;
        AppEvent::FetchRequested(FetchRequest {
            request_id: self.latest_request_id,
            limit,
            search: self.search.clone(),
            page,
        })
    }
}
