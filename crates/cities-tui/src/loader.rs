// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn loader_line(tick: u64) -> Line<'static> {
    let frame = FRAMES[(tick % FRAMES.len() as u64) as usize];
    Line::from(vec![
        Span::styled(frame, Style::default().fg(Color::Cyan)),
        Span::raw(" loading"),
    ])
}
