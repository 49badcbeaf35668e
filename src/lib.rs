pub mod bot;
pub mod config;
pub mod console;
pub mod constants;
pub mod data;
pub mod input;
pub mod parser;
