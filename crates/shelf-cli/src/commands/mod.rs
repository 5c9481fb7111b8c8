//! Command handlers

pub mod book;
pub mod config;
pub mod genres;
pub mod status;
