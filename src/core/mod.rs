pub mod catalog;
pub mod config;
pub mod error;
pub mod io;
pub mod state;
