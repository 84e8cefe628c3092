use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PageDiffError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PageDiffError::report("x")
            .to_string()
            .contains("report error:")
    );
    assert!(
        PageDiffError::ShapeMismatch {
            a: (1, 2),
            b: (3, 4)
        }
        .to_string()
        .contains("shape mismatch:")
    );
}

#[test]
fn persist_names_artifact_and_path() {
    let err = PageDiffError::persist(
        ArtifactKind::MarksB,
        "/out/marks/a_vs_b_b.png",
        std::io::Error::other("disk full"),
    );
    let msg = err.to_string();
    assert!(msg.contains("persist error:"));
    assert!(msg.contains("marks_b"));
    assert!(msg.contains("a_vs_b_b.png"));
    assert!(msg.contains("disk full"));
}

#[test]
fn unreadable_names_path_and_stage() {
    let source = image::ImageError::IoError(std::io::Error::other("garbage"));
    let err = PageDiffError::unreadable("/in/page.jpg", "validating", source);
    let msg = err.to_string();
    assert!(msg.contains("unreadable image"));
    assert!(msg.contains("/in/page.jpg"));
    assert!(msg.contains("validating"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PageDiffError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
