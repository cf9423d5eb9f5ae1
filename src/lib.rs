// src/lib.rs

//! Passive/active reconnaissance engine for a root domain: subdomain
//! discovery across independent producers, DNS resolution, reverse-IP and
//! registry enrichment, and optional port probing, sequenced by a cached
//! pipeline. The binary in `main.rs` is a thin CLI in front of this crate.

pub mod core;
pub mod logging;
