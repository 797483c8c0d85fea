// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Focus;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type ShortcutMatcher = fn(&KeyEvent) -> bool;

#[derive(Debug)]
struct Listener {
    id: u64,
    matches: ShortcutMatcher,
    target: Focus,
}

#[derive(Debug, Default)]
struct ListenerTable {
    next_id: u64,
    listeners: Vec<Listener>,
}

/// Screen-wide shortcut listeners, consulted before the focused widget sees
/// a key.
#[derive(Debug, Clone, Default)]
pub struct KeyListeners {
    table: Rc<RefCell<ListenerTable>>,
}

impl KeyListeners {
    pub fn register(&self, matches: ShortcutMatcher, target: Focus) -> ListenerGuard {
        let mut table = self.table.borrow_mut();
        table.next_id = table.next_id.saturating_add(1);
        let id = table.next_id;
        table.listeners.push(Listener {
            id,
            matches,
            target,
        });
        ListenerGuard {
            id,
            table: Rc::downgrade(&self.table),
        }
    }

    /// Focus target of the first listener matching `key`.
    pub fn dispatch(&self, key: &KeyEvent) -> Option<Focus> {
        self.table
            .borrow()
            .listeners
            .iter()
            .find(|listener| (listener.matches)(key))
            .map(|listener| listener.target)
    }

    pub fn len(&self) -> usize {
        self.table.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unregisters its listener when dropped.
#[derive(Debug)]
pub struct ListenerGuard {
    id: u64,
    table: Weak<RefCell<ListenerTable>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table
                .borrow_mut()
                .listeners
                .retain(|listener| listener.id != self.id);
        }
    }
}

/// Ctrl+/ (or Cmd+/). Most terminals deliver Ctrl+/ as Ctrl+7.
pub fn is_focus_shortcut(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('/') => key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META),
        KeyCode::Char('7') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    Submit(String),
}

#[derive(Debug)]
pub struct SearchInput {
    query: String,
    _shortcut: ListenerGuard,
}

impl SearchInput {
    pub fn mount(listeners: &KeyListeners) -> Self {
        Self {
            query: String::new(),
            _shortcut: listeners.register(is_focus_shortcut, Focus::Search),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<SearchAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => return Some(SearchAction::Submit(self.query.clone())),
            (KeyCode::Backspace, _) => {
                self.query.pop();
            }
            (KeyCode::Char(ch), modifiers) => {
                if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT {
                    self.query.push(ch);
                }
            }
            _ => {}
        }
        None
    }
}
