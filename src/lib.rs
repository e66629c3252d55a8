pub mod admin;
pub mod auth;
pub mod config;
pub mod escape;
pub mod filter;
pub mod http;
pub mod nonce;
pub mod pages;
pub mod settings;
pub mod types;
