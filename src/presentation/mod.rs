// Presentation layer - Command line, console and terminal rendering
pub mod app_state;
pub mod cli;
pub mod console;
pub mod handlers;
pub mod login_redirect;
pub mod terminal_renderer;
