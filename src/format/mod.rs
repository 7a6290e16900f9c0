// BSDIFF40 patch format.
//
// # Modules
//
// - `int`: 64-bit sign-magnitude little-endian integers
// - `header`: 32-byte patch header (magic + three lengths)
// - `control`: (copy, extra, seek) control triples

pub mod control;
pub mod header;
pub mod int;

pub use control::Control;
pub use header::{HEADER_LEN, MAGIC, PatchHeader};
