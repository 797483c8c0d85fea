// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use cities_app::{PageButton, PaginationProps};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Pagination line cached on its inputs; rebuilt only when they change.
#[derive(Debug, Default)]
pub struct PaginationView {
    key: Option<(PaginationProps, bool)>,
    line: Line<'static>,
    #[cfg(test)]
    builds: u64,
}

impl PaginationView {
    pub fn update(&mut self, props: PaginationProps, focused: bool) {
        if self.key == Some((props, focused)) {
            return;
        }
        self.key = Some((props, focused));
        self.line = build_line(props, focused);
        #[cfg(test)]
        {
            self.builds += 1;
        }
    }

    pub fn line(&self) -> &Line<'static> {
        &self.line
    }

    #[cfg(test)]
    pub const fn builds(&self) -> u64 {
        self.builds
    }
}

fn build_line(props: PaginationProps, focused: bool) -> Line<'static> {
    let button = |button: PageButton| {
        let style = if !props.is_enabled(button) {
            Style::default().fg(Color::DarkGray)
        } else if focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        Span::styled(format!("[{}]", button.label()), style)
    };

    Line::from(vec![
        button(PageButton::Previous),
        Span::raw(format!(" {} ", props.indicator())),
        button(PageButton::Next),
    ])
}
