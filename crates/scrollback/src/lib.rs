pub mod cli;
pub mod commands;
pub mod dump;
pub mod error;
pub mod layout;
