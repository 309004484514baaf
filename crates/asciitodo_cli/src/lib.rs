pub mod cli;
pub mod commands;
pub mod controller;
pub mod interactive;
pub mod prompt;
pub mod render;
