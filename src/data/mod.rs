/// Data layer: core types, loading, filtering and export.
///
/// Architecture:
/// ```text
///   CSV text / sheet values
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → Table (one type per column)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  trim headers and text cells
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐     ┌──────────┐
///   │ controls  │ ──▶ │  filter   │  FilterMapping → filtered Table
///   └──────────┘     └──────────┘
///        (coerce shared by both)  │
///                                 ▼
///                           ┌──────────┐
///                           │  export   │  Table → CSV bytes
///                           └──────────┘
/// ```

pub mod coerce;
pub mod controls;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
