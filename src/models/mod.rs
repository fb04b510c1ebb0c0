// src/models/mod.rs

pub mod exam;
pub mod prompt;
pub mod question;
pub mod result;
pub mod taxonomy;
pub mod user;
