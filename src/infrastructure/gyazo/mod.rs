//! Gyazo API adapter.

mod client;
mod dto;

pub use client::GyazoClient;
