use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SceneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SceneError::audio("x").to_string().contains("audio error:"));
    assert!(SceneError::render("x").to_string().contains("render error:"));
    assert!(
        SceneError::MarkerNotFound {
            marker: "firstscene..".to_string()
        }
        .to_string()
        .contains("firstscene..")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SceneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn short_reads_count_as_not_found() {
    let eof = SceneError::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
    assert!(eof.is_not_found());

    let missing = SceneError::MarkerNotFound {
        marker: "x".to_string(),
    };
    assert!(missing.is_not_found());

    let denied = SceneError::from(std::io::Error::from(
        std::io::ErrorKind::PermissionDenied,
    ));
    assert!(!denied.is_not_found());
    assert!(!SceneError::validation("bad").is_not_found());
}
