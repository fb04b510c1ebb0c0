// src/handlers/mod.rs

pub mod ai;
pub mod auth;
pub mod dashboard;
pub mod exam;
pub mod misc;
pub mod prompt;
pub mod question;
pub mod taxonomy;
