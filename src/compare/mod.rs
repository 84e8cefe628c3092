/// Comparison lifecycle.
pub mod orchestrator;
/// JSON-loadable tunables.
pub mod settings;
