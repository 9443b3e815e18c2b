pub mod formatting;
pub mod menu_renderer;
pub mod prompts;
mod raw_mode;
pub mod test_mode;
