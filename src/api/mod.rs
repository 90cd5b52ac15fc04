//! Purpose: Define the stable public API boundary for the audience client.
//! Exports: Client facade, record kinds, transport seam, and core types.
//! Role: Public, additive-only surface; callers should not reach into `core`
//! module internals directly.
//! Invariants: Everything a host application needs is re-exported here.

mod audience;
mod segment;
mod transport;

pub use crate::core::decode::Decoded;
pub use crate::core::error::{ApiResult, Error, ErrorKind};
pub use crate::core::page::{PageQuery, fetch_all_pages};
pub use crate::core::record::{
    Coercion, FieldValue, Record, coerce_bool, coerce_datetime, coerce_int, coerce_str,
    parse_offset_timestamp,
};
pub use audience::{AudienceClient, HOST, OAUTH_TOKEN_URL};
pub use segment::{Segment, SegmentFile};
pub use transport::{Transport, TransportResponse, UreqTransport, urlencode};
