//! # plughub-adapter-kasa
//!
//! Device adapter for TP-Link Kasa multi-outlet smart strips (HS300 and
//! friends) — implements the `StripClient` port over the Kasa TCP protocol.
//!
//! ## Dependency rule
//!
//! Depends on `plughub-app` (port traits) and `plughub-domain` only.

mod client;
mod codec;

pub use client::KasaStrip;
pub use codec::{decrypt, encrypt};
