//! Apotheca application layer.
//!
//! Backend access with retries, the persisted cart and product cache, authentication and the
//! checkout workflow, built over the `apotheca` domain core.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod domain;
pub mod storage;

#[cfg(test)]
mod test;
