use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(MintError::config("x").to_string().contains("config error:"));
    assert!(
        MintError::composition("x")
            .to_string()
            .contains("composition error:")
    );
    assert!(MintError::render("x").to_string().contains("render error:"));
    assert!(MintError::encode("x").to_string().contains("encode error:"));
    assert!(
        MintError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MintError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn io_and_json_errors_convert() {
    let io: MintError = std::io::Error::other("disk gone").into();
    assert!(matches!(io, MintError::Other(_)));

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: MintError = json_err.into();
    assert!(matches!(err, MintError::Serde(_)));
}
