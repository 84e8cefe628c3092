/// Artifact and page naming.
pub mod naming;
/// Atomic artifact writes.
pub mod persist;
/// Reading source images.
pub mod source;
