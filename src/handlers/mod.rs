// src/handlers/mod.rs
pub mod health;
pub mod oauth;
pub mod upload;
