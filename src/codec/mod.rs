// Patch container: drives the delta scan on write and the applier on read.
//
// - `block`: bzip2 compression of the three sub-streams
// - `create`: write path (header placeholder, blocks, header rewrite)
// - `apply`: read path and the `PatchApplier` state machine

pub mod apply;
pub mod block;
pub mod create;

pub use apply::{ApplyOptions, PatchApplier, apply, read_controls};
pub use block::BlockCompression;
pub use create::{DiffOptions, create};
