#![deny(unsafe_code)]
//! ATOM trail
//!
//! Append-only provenance records of engine decisions.
//!
//! - [`AtomEntry`]: one decision with rationale, outcome, subjects and tags.
//! - [`AtomSink`]: the injected store abstraction. Entries are appended as a
//!   single unit; nothing in this crate edits or removes an entry.
//! - [`AtomTrailRecorder`]: the write path used by the gates and the bump
//!   validator. Sink failures are logged and swallowed so provenance never
//!   blocks the decision it records.

pub mod entry;
pub mod error;
pub mod recorder;
pub mod sink;

pub use entry::{AtomEntry, AtomEntryBuilder, AtomOutcome};
pub use error::AtomError;
pub use recorder::AtomTrailRecorder;
pub use sink::{AtomSink, FileAtomSink, MemoryAtomSink, NullAtomSink, ATOM_TRAIL_FILE};
