//! Data layer: instrument logs, index derivation, and windowing.
//!
//! Architecture:
//! ```text
//!  .csv (cycler / Bitrode)        .lvm (thermocouples)
//!        │                               │
//!        ▼                               ▼
//!   ┌──────────┐                   ┌──────────┐
//!   │  loader   │  file → logs     │  loader   │  time = index × 3 s
//!   └──────────┘                   └──────────┘
//!        │                               │
//!        ▼                               │
//!   ┌──────────┐                         │
//!   │  segment  │  S/Q flags → index groups
//!   └──────────┘                         │
//!        │                               │
//!        ▼                               ▼
//!   ┌──────────┐   TimeWindow    ┌──────────┐
//!   │  window   │ ─────────────▶ │  align    │  nearest-sample lookup
//!   └──────────┘                 └──────────┘
//! ```

pub mod align;
pub mod error;
pub mod loader;
pub mod model;
pub mod segment;
pub mod window;

pub use error::{DataError, Result};
