//! # plughub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `StripClient` — read/set outlet relay states on one strip
//!   - `TrackerStore` — compare-and-swap store of pending cycle transitions
//!   - `AuditLog` — append-only record of issued commands
//! - Provide the **use-case engines**:
//!   - `Evaluator` — schedule → desired state, advancing repeating cycles
//!   - `Reconciler` — observed vs. desired, minimal corrective commands
//! - Provide **in-process port backends** (memory) that don't need IO
//! - Orchestrate domain objects without knowing *how* persistence or device
//!   IO works
//!
//! ## Dependency rule
//! Depends on `plughub-domain` only. Never imports adapter crates.
//! Adapters depend on *this* crate, not the reverse.

pub mod evaluator;
pub mod memory;
pub mod ports;
pub mod reconciler;
