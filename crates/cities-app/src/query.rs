// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::ops::RangeInclusive;

pub const DEFAULT_LIMIT: u32 = 5;
pub const LIMIT_RANGE: RangeInclusive<u32> = 1..=10;
pub const CITIES_PATH: &str = "/geo/cities";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub request_id: u64,
    pub limit: u32,
    pub search: String,
    pub page: u32,
}

impl FetchRequest {
    pub const fn offset(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("limit", self.limit.to_string()),
            ("namePrefix", self.search.clone()),
            ("offset", self.offset().to_string()),
        ]
    }
}

/// Parses user-entered limit text; anything outside the accepted range fails.
pub fn parse_limit(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    let Ok(limit) = trimmed.parse::<u32>() else {
        bail!("limit {raw:?} is not a whole number");
    };
    if !LIMIT_RANGE.contains(&limit) {
        bail!(
            "limit {limit} is outside {}..={}",
            LIMIT_RANGE.start(),
            LIMIT_RANGE.end()
        );
    }
    Ok(limit)
}
