//! Purpose: Blocking client library for the Yandex Audience segment API.
//! Exports: `api` (client facade, transport seam), `core` (records, decoding, paging, errors).
//! Role: Thin typed layer over the remote REST surface; one request per call.
//! Invariants: No retries, no caching; every failure surfaces to the caller.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
