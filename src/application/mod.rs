//! Application layer - use cases, CLI and HTTP surface

pub mod commands;
pub mod form_controller;
pub mod http;
pub mod services;

pub use commands::{Cli, CommandExecutor, Commands};
pub use form_controller::FormController;
pub use services::{ServiceParts, SwapService};
