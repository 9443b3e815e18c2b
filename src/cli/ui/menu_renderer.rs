use std::io::{self, Stdout, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    style::{Attribute, SetAttribute},
    terminal::{self, ClearType},
    ExecutableCommand,
};

use crate::cli::ui::formatting::Formatter;
use crate::cli::ui::raw_mode::RawModeGuard;
use crate::cli::ui::test_mode::{self, MenuTestEvent};

#[derive(Clone, Debug)]
pub struct MenuUI {
    pub title: String,
    pub context: Option<String>,
    pub items: Vec<MenuUIItem>,
    pub initial_index: Option<usize>,
}

impl MenuUI {
    pub fn new(title: impl Into<String>, items: Vec<MenuUIItem>) -> Self {
        Self {
            title: title.into(),
            context: None,
            items,
            initial_index: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_initial_index(mut self, index: usize) -> Self {
        self.initial_index = Some(index);
        self
    }

    fn start_index(&self) -> usize {
        self.initial_index
            .unwrap_or(0)
            .min(self.items.len().saturating_sub(1))
    }

    fn label_width(&self) -> usize {
        self.items
            .iter()
            .map(|item| item.label.chars().count())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub struct MenuUIItem {
    pub key: String,
    pub label: String,
    pub description: String,
}

impl MenuUIItem {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug)]
pub enum MenuRenderError {
    Interrupted,
    Io(io::Error),
}

impl From<io::Error> for MenuRenderError {
    fn from(err: io::Error) -> Self {
        MenuRenderError::Io(err)
    }
}

/// Arrow-key menu. `show` yields the key of the chosen item, or `None` when
/// the menu was dismissed with Esc.
#[derive(Default)]
pub struct MenuRenderer {
    formatter: Formatter,
}

impl MenuRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, menu: &MenuUI) -> Result<Option<String>, MenuRenderError> {
        if menu.items.is_empty() {
            return Ok(None);
        }
        if let Some(events) = test_mode::next_menu_events(&menu.title) {
            return Ok(self.show_with_script(menu, events));
        }

        let guard = RawModeGuard::with_hidden_cursor()?;
        let mut stdout = io::stdout();

        let len = menu.items.len();
        let mut selected = menu.start_index();
        let result = loop {
            self.render(&mut stdout, menu, selected)?;
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
                    {
                        break Err(MenuRenderError::Interrupted);
                    }
                    match key.code {
                        KeyCode::Up => selected = selected.checked_sub(1).unwrap_or(len - 1),
                        KeyCode::Down => selected = (selected + 1) % len,
                        KeyCode::Home => selected = 0,
                        KeyCode::End => selected = len - 1,
                        KeyCode::Enter => break Ok(Some(menu.items[selected].key.clone())),
                        KeyCode::Esc => break Ok(None),
                        _ => {}
                    }
                }
                // Redrawn at the top of the loop.
                Event::Resize(_, _) => {}
                _ => {}
            }
        };

        let clear_status = clear_screen(&mut stdout);
        drop(guard);
        clear_status?;
        result
    }

    fn show_with_script(&self, menu: &MenuUI, events: Vec<MenuTestEvent>) -> Option<String> {
        let len = menu.items.len();
        let mut selected = menu.start_index();
        for event in events {
            match event {
                MenuTestEvent::Up => selected = selected.checked_sub(1).unwrap_or(len - 1),
                MenuTestEvent::Down => selected = (selected + 1) % len,
                MenuTestEvent::Home => selected = 0,
                MenuTestEvent::End => selected = len - 1,
                MenuTestEvent::Enter => {
                    self.print_snapshot(menu, selected);
                    return Some(menu.items[selected].key.clone());
                }
                MenuTestEvent::Esc => {
                    self.print_snapshot(menu, selected);
                    return None;
                }
            }
        }
        // A sequence without Enter selects whatever it stopped on.
        self.print_snapshot(menu, selected);
        Some(menu.items[selected].key.clone())
    }

    fn lines(&self, menu: &MenuUI, selected: usize) -> Vec<(bool, String)> {
        let width = menu.label_width();
        let mut lines = Vec::new();
        if let Some(context) = &menu.context {
            lines.push((false, self.formatter.detail_text(context)));
            lines.push((false, String::new()));
        }
        lines.push((false, self.formatter.header_text(&menu.title)));
        for (index, item) in menu.items.iter().enumerate() {
            let pointer = if index == selected {
                self.formatter.pointer()
            } else {
                " "
            };
            let row = self
                .formatter
                .format_two_column_row(&item.label, &item.description, width);
            lines.push((index == selected, format!(" {pointer} {row}")));
        }
        lines.push((false, String::new()));
        lines.push((false, self.formatter.detail_text(self.formatter.menu_hint())));
        lines
    }

    fn print_snapshot(&self, menu: &MenuUI, selected: usize) {
        for (_, line) in self.lines(menu, selected) {
            println!("{line}");
        }
    }

    fn render(&self, stdout: &mut Stdout, menu: &MenuUI, selected: usize) -> io::Result<()> {
        clear_screen(stdout)?;
        for (highlight, line) in self.lines(menu, selected) {
            if highlight {
                stdout.execute(SetAttribute(Attribute::Reverse))?;
            }
            write!(stdout, "{line}")?;
            stdout.execute(SetAttribute(Attribute::Reset))?;
            // Raw mode needs an explicit carriage return.
            write!(stdout, "\r\n")?;
        }
        stdout.flush()
    }
}

fn clear_screen(stdout: &mut Stdout) -> io::Result<()> {
    stdout.execute(terminal::Clear(ClearType::All))?;
    stdout.execute(cursor::MoveTo(0, 0))?;
    Ok(())
}
