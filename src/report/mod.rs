/// Per-session comparison report.
pub mod comparison;
