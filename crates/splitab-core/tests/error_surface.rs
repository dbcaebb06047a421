use splitab_core::errors::{AbError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("experiment", "7")
        .with_context("reason", "example")
}

#[test]
fn definition_error_surface() {
    let err = AbError::Definition(sample_info("D001", "too few alternatives"));
    assert_eq!(err.info().code, "D001");
    assert!(err.info().context.contains_key("experiment"));
}

#[test]
fn invalid_override_error_surface() {
    let err = AbError::InvalidOverride(sample_info("O001", "no such value"));
    assert_eq!(err.info().code, "O001");
    assert!(err.info().context.contains_key("reason"));
}

#[test]
fn out_of_range_error_surface() {
    let err = AbError::OutOfRange(sample_info("R001", "stale override"));
    assert_eq!(err.info().code, "R001");
}

#[test]
fn store_error_carries_key() {
    let err = AbError::store("S001", "7:alts:0:participants", "connection refused");
    assert_eq!(err.info().code, "S001");
    assert_eq!(
        err.info().context.get("key").map(String::as_str),
        Some("7:alts:0:participants")
    );
    assert_eq!(err.info().hint.as_deref(), Some("connection refused"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = AbError::Config(ErrorInfo::new("C001", "bad catalog").with_hint("check yaml"));
    assert_eq!(
        err.to_string(),
        "config error: bad catalog (code: C001) | hint: check yaml"
    );
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = AbError::Definition(ErrorInfo::new("D002", "uncommitted"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "Definition");
    assert_eq!(json["detail"]["code"], "D002");
    let decoded: AbError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, err);
}
