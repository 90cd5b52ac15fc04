// Core modules implementing typed records, payload decoding, paging, and
// error modeling.
pub mod decode;
pub mod error;
pub mod page;
pub mod record;
