//! Concertq - look up an artist or track across music metadata APIs
//!
//! This library merges Spotify catalog data with MusicBrainz release and credit
//! records, Internet Archive live recordings and lyrics into flat view-models,
//! and ships the token relay that hands out Spotify bearer tokens.

/// Client modules for interacting with external services and the token cache
pub mod clients;
/// Query tool configuration and upstream endpoints
pub mod config;
/// Search orchestration across every upstream
pub mod query;
/// Terminal rendering of search results
pub mod render;
/// Client-credentials token relay
pub mod relay;
