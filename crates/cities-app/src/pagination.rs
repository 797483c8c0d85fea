// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Previous,
    Next,
}

impl PageButton {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Previous => "Previous",
            Self::Next => "Next",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationProps {
    pub current_page: u32,
    pub total_pages: u32,
}

impl PaginationProps {
    pub const fn new(current_page: u32, total_pages: u32) -> Self {
        Self {
            current_page,
            total_pages,
        }
    }

    pub const fn is_enabled(&self, button: PageButton) -> bool {
        match button {
            PageButton::Previous => self.current_page != 1,
            PageButton::Next => self.current_page != self.total_pages,
        }
    }

    /// Target page for a press, or `None` when the button is disabled.
    pub fn press(&self, button: PageButton) -> Option<u32> {
        if !self.is_enabled(button) {
            return None;
        }
        match button {
            PageButton::Previous => self.current_page.checked_sub(1),
            PageButton::Next => self.current_page.checked_add(1),
        }
    }

    pub fn indicator(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }
}

pub fn total_pages(total_count: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(limit));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
