//! Terminal implementation of the wizard's [`Prompter`] boundary.

use std::io;

use crate::cli::output;
use crate::cli::ui::formatting::Formatter;
use crate::cli::ui::menu_renderer::MenuUIItem;
use crate::cli::ui::prompts::{
    choice_menu, multiline_input, text_input, ChoicePromptResult, TextPromptResult,
};
use crate::errors::WizardError;
use crate::wizard::{Choice, InputKind, Prompter, StepEvent, StepView};

const YES: &str = "true";
const NO: &str = "false";

#[derive(Default)]
pub struct TerminalPrompter {
    formatter: Formatter,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    fn print_header(&self, view: &StepView) {
        println!();
        println!("{}", self.formatter.header_text(view.heading()));
        if view.question_count > 1 {
            println!(
                "{}",
                self.formatter.detail_text(format!(
                    "Question {} of {}",
                    view.question_index + 1,
                    view.question_count
                ))
            );
        }
        for message in &view.feedback {
            output::warning(message);
        }
    }

    fn ask_text(&self, view: &StepView, multiline: bool) -> io::Result<StepEvent> {
        for line in &view.context {
            println!("{line}");
        }
        let question = &view.question;
        println!("{}", question.label);
        if let Some(current) = view.current.as_deref().filter(|value| !value.is_empty()) {
            println!("{}", self.formatter.detail_text(format!("Current: {current}")));
        }
        if !question.required {
            println!("{}", self.formatter.detail_text("Optional."));
        }
        if multiline {
            println!("{}", self.formatter.detail_text("Type :edit to open your editor."));
        }
        println!("{}", self.formatter.detail_text(self.formatter.text_hint()));

        let result = if multiline {
            multiline_input(&question.label, view.current.as_deref())?
        } else {
            text_input(&question.label, view.current.as_deref())?
        };
        Ok(text_event(result))
    }

    fn ask_choice(&self, view: &StepView, choices: &[Choice]) -> io::Result<StepEvent> {
        let items = choices
            .iter()
            .map(|choice| MenuUIItem::new(&choice.value, &choice.label, &choice.detail))
            .collect();
        let result = choice_menu(
            &format!("{}: {}", view.heading(), view.question.label),
            &self.menu_context(view),
            items,
            view.current.as_deref(),
            view.can_go_back,
            view.can_go_forward,
        )?;
        Ok(choice_event(result))
    }

    fn ask_confirm(&self, view: &StepView) -> io::Result<StepEvent> {
        let choices = [Choice::new(YES, "Yes"), Choice::new(NO, "No")];
        self.ask_choice(view, &choices)
    }

    fn menu_context(&self, view: &StepView) -> Vec<String> {
        let mut lines = view.context.clone();
        for message in &view.feedback {
            lines.push(self.formatter.warning_text(message));
        }
        lines
    }
}

impl Prompter for TerminalPrompter {
    fn prompt(&mut self, view: &StepView) -> Result<StepEvent, WizardError> {
        let event = match &view.question.input {
            InputKind::Select(choices) => self.ask_choice(view, choices)?,
            InputKind::Confirm => self.ask_confirm(view)?,
            InputKind::Text => {
                self.print_header(view);
                self.ask_text(view, false)?
            }
            InputKind::Multiline => {
                self.print_header(view);
                self.ask_text(view, true)?
            }
            InputKind::Note => {
                self.print_header(view);
                for line in &view.context {
                    println!("{line}");
                }
                println!("{}", view.question.label);
                println!("{}", self.formatter.detail_text("Press Enter to continue."));
                text_event(text_input(&view.question.label, Some(""))?)
            }
        };
        Ok(event)
    }
}

fn text_event(result: TextPromptResult) -> StepEvent {
    match result {
        TextPromptResult::Value(value) => StepEvent::Answer(value),
        TextPromptResult::Keep => StepEvent::Keep,
        TextPromptResult::Back => StepEvent::Back,
        TextPromptResult::Forward => StepEvent::Forward,
        TextPromptResult::Help => StepEvent::Help,
        TextPromptResult::Resize => StepEvent::Resize,
        TextPromptResult::Cancel => StepEvent::Cancel,
    }
}

fn choice_event(result: ChoicePromptResult) -> StepEvent {
    match result {
        ChoicePromptResult::Value(value) => StepEvent::Answer(value),
        ChoicePromptResult::Back => StepEvent::Back,
        ChoicePromptResult::Forward => StepEvent::Forward,
        ChoicePromptResult::Cancel => StepEvent::Cancel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_results_map_to_step_events() {
        assert_eq!(
            text_event(TextPromptResult::Value("Walk".into())),
            StepEvent::Answer("Walk".into())
        );
        assert_eq!(text_event(TextPromptResult::Resize), StepEvent::Resize);
        assert_eq!(choice_event(ChoicePromptResult::Forward), StepEvent::Forward);
        assert_eq!(choice_event(ChoicePromptResult::Cancel), StepEvent::Cancel);
    }
}
