pub mod logger;

pub mod app;
pub mod cli;
pub mod components;
pub mod error;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;
