//! Scripted terminal input for non-interactive runs.
//!
//! When `HABIT_CORE_TEST_TEXT_INPUTS` or `HABIT_CORE_TEST_MENU_EVENTS` is set,
//! prompts and menus consume queued entries instead of reading the terminal.
//! Entries are separated by `|`; menu entries are comma-separated key names.

use once_cell::sync::Lazy;
use std::{
    collections::VecDeque,
    env,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::warn;

pub const TEXT_INPUTS_ENV: &str = "HABIT_CORE_TEST_TEXT_INPUTS";
pub const MENU_EVENTS_ENV: &str = "HABIT_CORE_TEST_MENU_EVENTS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTestEvent {
    Up,
    Down,
    Home,
    End,
    Enter,
    Esc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextTestInput {
    Value(String),
    Keep,
    Back,
    Forward,
    Help,
    Resize,
    Cancel,
}

struct Queue<T> {
    enabled: bool,
    entries: VecDeque<T>,
}

impl<T> Queue<T> {
    fn from_env(var: &str, parse: impl Fn(&str) -> VecDeque<T>) -> Self {
        match env::var(var) {
            Ok(raw) => Self {
                enabled: true,
                entries: parse(&raw),
            },
            Err(_) => Self {
                enabled: false,
                entries: VecDeque::new(),
            },
        }
    }

    fn install(&mut self, entries: Vec<T>) {
        self.enabled = true;
        self.entries = entries.into();
    }

    fn reset(&mut self) {
        self.enabled = false;
        self.entries.clear();
    }
}

static MENU_EVENTS: Lazy<Mutex<Queue<Vec<MenuTestEvent>>>> =
    Lazy::new(|| Mutex::new(Queue::from_env(MENU_EVENTS_ENV, parse_menu_sequences)));

static TEXT_INPUTS: Lazy<Mutex<Queue<TextTestInput>>> =
    Lazy::new(|| Mutex::new(Queue::from_env(TEXT_INPUTS_ENV, parse_text_sequences)));

fn lock<T>(queue: &'static Lazy<Mutex<Queue<T>>>) -> MutexGuard<'static, Queue<T>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Next scripted key sequence for a menu. An exhausted script cancels.
pub fn next_menu_events(label: &str) -> Option<Vec<MenuTestEvent>> {
    let mut guard = lock(&MENU_EVENTS);
    if !guard.enabled {
        return None;
    }
    Some(guard.entries.pop_front().unwrap_or_else(|| {
        warn!(menu = label, "scripted menu events exhausted");
        vec![MenuTestEvent::Esc]
    }))
}

/// Next scripted answer for a text prompt. An exhausted script cancels.
pub fn next_text_input(label: &str) -> Option<TextTestInput> {
    let mut guard = lock(&TEXT_INPUTS);
    if !guard.enabled {
        return None;
    }
    Some(guard.entries.pop_front().unwrap_or_else(|| {
        warn!(prompt = label, "scripted text inputs exhausted");
        TextTestInput::Cancel
    }))
}

pub fn install_menu_events(events: Vec<Vec<MenuTestEvent>>) {
    lock(&MENU_EVENTS).install(events);
}

pub fn reset_menu_events() {
    lock(&MENU_EVENTS).reset();
}

pub fn install_text_inputs(inputs: Vec<TextTestInput>) {
    lock(&TEXT_INPUTS).install(inputs);
}

pub fn reset_text_inputs() {
    lock(&TEXT_INPUTS).reset();
}

fn parse_menu_event(token: &str) -> Option<MenuTestEvent> {
    match token.to_ascii_uppercase().as_str() {
        "UP" => Some(MenuTestEvent::Up),
        "DOWN" => Some(MenuTestEvent::Down),
        "HOME" => Some(MenuTestEvent::Home),
        "END" => Some(MenuTestEvent::End),
        "ENTER" | "RETURN" => Some(MenuTestEvent::Enter),
        "ESC" | "ESCAPE" => Some(MenuTestEvent::Esc),
        _ => None,
    }
}

pub fn parse_text_input(token: &str) -> TextTestInput {
    match token.to_ascii_uppercase().as_str() {
        "<ESC>" | "<CANCEL>" => TextTestInput::Cancel,
        "<BACK>" => TextTestInput::Back,
        "<NEXT>" | "<FORWARD>" => TextTestInput::Forward,
        "<HELP>" => TextTestInput::Help,
        "<KEEP>" => TextTestInput::Keep,
        "<RESIZE>" => TextTestInput::Resize,
        "<BLANK>" | "<EMPTY>" => TextTestInput::Value(String::new()),
        _ => TextTestInput::Value(token.replace("\\n", "\n")),
    }
}

pub fn parse_menu_sequences(raw: &str) -> VecDeque<Vec<MenuTestEvent>> {
    raw.split('|')
        .filter_map(|segment| {
            let events = segment
                .split(',')
                .filter_map(|token| parse_menu_event(token.trim()))
                .collect::<Vec<_>>();
            (!events.is_empty()).then_some(events)
        })
        .collect()
}

pub fn parse_text_sequences(raw: &str) -> VecDeque<TextTestInput> {
    raw.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_text_input)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_tokens_map_to_inputs() {
        let parsed = parse_text_sequences("Read | <KEEP>|<back>| <BLANK> |line one\\nline two|<RESIZE>");
        assert_eq!(
            parsed,
            VecDeque::from(vec![
                TextTestInput::Value("Read".into()),
                TextTestInput::Keep,
                TextTestInput::Back,
                TextTestInput::Value(String::new()),
                TextTestInput::Value("line one\nline two".into()),
                TextTestInput::Resize,
            ])
        );
    }

    #[test]
    fn menu_sequences_skip_unknown_tokens() {
        let parsed = parse_menu_sequences("DOWN,DOWN,ENTER|bogus|ESC");
        assert_eq!(
            parsed,
            VecDeque::from(vec![
                vec![MenuTestEvent::Down, MenuTestEvent::Down, MenuTestEvent::Enter],
                vec![MenuTestEvent::Esc],
            ])
        );
    }
}
