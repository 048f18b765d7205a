//! Qianfan HTTP layer.
//!
//! - [`types`] -- Completion result and usage types.
//! - [`client`] -- Chat-completion client (`/v2/chat/completions`).
//! - [`image`] -- Text-to-image client (`/v2/images/generations`).
//!
//! Both clients make exactly one attempt per call. Callers that want
//! retries must add them around the client.

pub mod client;
pub mod image;
pub mod types;

pub use client::{CompletionClient, CompletionClientConfig};
pub use image::{ImageClient, ImageClientConfig};
pub use types::{Completion, Usage};
