//! Purpose: Library crate for fetching JSON documents over HTTP GET.
//! Exports: `api` (sync and async fetch entry points), `core` (errors, JSON aliases).
//! Role: Backs the `reqjson` binary and is usable on its own.
//! Invariants: One request per call; nothing is cached or shared between calls.
pub mod api;
pub mod core;
