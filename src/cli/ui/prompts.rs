use std::io::{self, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType},
    ExecutableCommand,
};
use dialoguer::Editor;

use crate::cli::ui::menu_renderer::{MenuRenderError, MenuRenderer, MenuUI, MenuUIItem};
use crate::cli::ui::raw_mode::RawModeGuard;
use crate::cli::ui::test_mode::{self, TextTestInput};

const BACK_KEY: &str = "__back";
const FORWARD_KEY: &str = "__next";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPromptResult {
    Value(String),
    Keep,
    Back,
    Forward,
    Help,
    Resize,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoicePromptResult {
    Value(String),
    Back,
    Forward,
    Cancel,
}

impl From<TextTestInput> for TextPromptResult {
    fn from(input: TextTestInput) -> Self {
        match input {
            TextTestInput::Value(value) => TextPromptResult::Value(value),
            TextTestInput::Keep => TextPromptResult::Keep,
            TextTestInput::Back => TextPromptResult::Back,
            TextTestInput::Forward => TextPromptResult::Forward,
            TextTestInput::Help => TextPromptResult::Help,
            TextTestInput::Resize => TextPromptResult::Resize,
            TextTestInput::Cancel => TextPromptResult::Cancel,
        }
    }
}

/// Single-line input. An empty line keeps `current` when there is one.
pub fn text_input(label: &str, current: Option<&str>) -> io::Result<TextPromptResult> {
    if let Some(scripted) = test_mode::next_text_input(label) {
        return Ok(scripted.into());
    }

    let mut guard = RawModeGuard::activate()?;
    let mut stdout = io::stdout();
    let mut buffer = String::new();
    redraw_input(&mut stdout, &buffer)?;

    loop {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    match key.code {
                        KeyCode::Char('c') | KeyCode::Char('C') => {
                            guard.deactivate();
                            println!();
                            return Ok(TextPromptResult::Cancel);
                        }
                        KeyCode::Char('u') | KeyCode::Char('U') => {
                            buffer.clear();
                            redraw_input(&mut stdout, &buffer)?;
                        }
                        _ => {}
                    }
                    continue;
                }

                match key.code {
                    KeyCode::Esc => {
                        guard.deactivate();
                        println!();
                        return Ok(TextPromptResult::Cancel);
                    }
                    KeyCode::Enter => {
                        guard.deactivate();
                        println!();
                        return Ok(interpret_buffer(&buffer, current));
                    }
                    KeyCode::Backspace => {
                        buffer.pop();
                        redraw_input(&mut stdout, &buffer)?;
                    }
                    KeyCode::Char(ch) => {
                        buffer.push(ch);
                        redraw_input(&mut stdout, &buffer)?;
                    }
                    _ => {}
                }
            }
            Event::Resize(_, _) => {
                guard.deactivate();
                println!();
                return Ok(TextPromptResult::Resize);
            }
            _ => {}
        }
    }
}

/// Multi-line input through the user's editor. Closing the editor without
/// saving keeps `current`.
pub fn multiline_input(label: &str, current: Option<&str>) -> io::Result<TextPromptResult> {
    if let Some(scripted) = test_mode::next_text_input(label) {
        return Ok(scripted.into());
    }

    match text_input(label, current)? {
        TextPromptResult::Value(raw) if raw.trim() == ":edit" => {
            let edited = Editor::new()
                .edit(current.unwrap_or_default())
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
            Ok(match edited {
                Some(text) => TextPromptResult::Value(text.trim_end().to_string()),
                None => TextPromptResult::Keep,
            })
        }
        other => Ok(other),
    }
}

pub fn choice_menu(
    title: &str,
    context_lines: &[String],
    items: Vec<MenuUIItem>,
    default_key: Option<&str>,
    enable_back: bool,
    enable_forward: bool,
) -> io::Result<ChoicePromptResult> {
    if items.is_empty() {
        return Ok(ChoicePromptResult::Cancel);
    }

    let initial = default_key
        .and_then(|key| items.iter().position(|item| item.key.eq_ignore_ascii_case(key)))
        .unwrap_or(0);
    let mut items = items;
    if enable_back {
        items.push(MenuUIItem::new(BACK_KEY, "← Back", "Return to the previous question"));
    }
    if enable_forward {
        items.push(MenuUIItem::new(FORWARD_KEY, "→ Next", "Skip ahead to the next step"));
    }

    let mut menu = MenuUI::new(title, items).with_initial_index(initial);
    if let Some(context) = join_context(context_lines) {
        menu = menu.with_context(context);
    }

    let selection = match MenuRenderer::new().show(&menu) {
        Ok(selection) => selection,
        Err(MenuRenderError::Interrupted) => return Ok(ChoicePromptResult::Cancel),
        Err(MenuRenderError::Io(err)) => return Err(err),
    };
    Ok(match selection.as_deref() {
        Some(BACK_KEY) => ChoicePromptResult::Back,
        Some(FORWARD_KEY) => ChoicePromptResult::Forward,
        Some(key) => ChoicePromptResult::Value(key.to_string()),
        None => ChoicePromptResult::Cancel,
    })
}

fn redraw_input(stdout: &mut Stdout, buffer: &str) -> io::Result<()> {
    stdout.execute(cursor::MoveToColumn(0))?;
    stdout.execute(terminal::Clear(ClearType::CurrentLine))?;
    write!(stdout, "> {}", buffer)?;
    stdout.flush()
}

/// Maps a submitted line to a prompt result. Colon commands navigate; an
/// empty line keeps the shown value.
pub fn interpret_buffer(buffer: &str, current: Option<&str>) -> TextPromptResult {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return if current.is_some() {
            TextPromptResult::Keep
        } else {
            TextPromptResult::Value(String::new())
        };
    }

    match trimmed.to_ascii_lowercase().as_str() {
        ":cancel" => TextPromptResult::Cancel,
        ":back" => TextPromptResult::Back,
        ":next" => TextPromptResult::Forward,
        ":help" => TextPromptResult::Help,
        ":clear" => TextPromptResult::Value(String::new()),
        _ => TextPromptResult::Value(buffer.to_string()),
    }
}

fn join_context(lines: &[String]) -> Option<String> {
    let trimmed: Vec<&str> = lines.iter().map(|line| line.trim_end()).collect();
    if trimmed.iter().all(|line| line.is_empty()) {
        None
    } else {
        Some(trimmed.join("\n"))
    }
}
