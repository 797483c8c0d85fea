// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

pub const FLAG_IMAGE_HOST: &str = "https://flagsapi.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRecord {
    pub name: String,
    pub country_code: String,
}

impl CityRecord {
    pub fn flag(&self) -> FlagImage<'_> {
        FlagImage::new(&self.country_code)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub total_count: u64,
}

/// One page of cities as returned by `GET /geo/cities`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    #[serde(default)]
    pub data: Vec<CityRecord>,
    #[serde(default)]
    pub metadata: ResultMetadata,
}

impl ResultPage {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.metadata.total_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagImage<'a> {
    country_code: &'a str,
}

impl<'a> FlagImage<'a> {
    pub const fn new(country_code: &'a str) -> Self {
        Self { country_code }
    }

    pub const fn alt(&self) -> &'a str {
        self.country_code
    }

    pub fn url(&self) -> String {
        format!("{FLAG_IMAGE_HOST}/{}/flat/24.png", self.country_code)
    }

    /// Regional indicator pair for a two-letter code, or the code itself.
    pub fn emoji(&self) -> String {
        let code = self.country_code.as_bytes();
        if code.len() != 2 || !code.iter().all(u8::is_ascii_alphabetic) {
            return self.country_code.to_owned();
        }

        code.iter()
            .filter_map(|letter| {
                let offset = u32::from(letter.to_ascii_uppercase() - b'A');
                char::from_u32(0x1F1E6 + offset)
            })
            .collect()
    }
}
