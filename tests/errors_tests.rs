use org_secrets::errors::{
    ConfigError, EncryptionError, GitHubError, ReconcileError, SchemaError, ValidationError,
};

#[test]
fn test_error_enum_display_messages() {
    let g1 = GitHubError::ApiError {
        status_code: 500,
        message: "Server blew up".to_string(),
        documentation_url: None,
    };
    assert!(g1.to_string().contains("500"));
    assert!(g1.to_string().contains("Server blew up"));

    let g2 = GitHubError::HttpError("conn failed".to_string());
    assert_eq!(g2.to_string(), "HTTP error: conn failed");

    let c1 = ConfigError::ReadError("no file".to_string());
    assert!(c1.to_string().contains("Failed to read config file"));

    let e1 = EncryptionError::InvalidKeyLength(16);
    assert!(e1.to_string().contains("got 16"));

    let s1 = SchemaError::Malformed {
        line: 7,
        message: "expected 7 fields, found 4".to_string(),
    };
    assert!(s1.to_string().contains("line 7"));
}

#[test]
fn test_reconcile_error_is_transparent() {
    let err: ReconcileError = ValidationError::Name("'2FA' must not start with a number".into()).into();
    assert_eq!(
        err.to_string(),
        "Name validation failed: '2FA' must not start with a number"
    );

    let err: ReconcileError = SchemaError::InvalidRepositoryId {
        name: "DB_PASS".into(),
        value: "abc".into(),
    }
    .into();
    assert!(matches!(err, ReconcileError::Schema(_)));
    assert!(err.to_string().contains("'abc'"));
}

#[test]
fn test_not_found_detection() {
    assert!(GitHubError::NotFound("repository acme/x".into()).is_not_found());
    assert!(
        GitHubError::ApiError {
            status_code: 404,
            message: "Not Found".into(),
            documentation_url: None,
        }
        .is_not_found()
    );
    assert!(!GitHubError::GraphQl("rate limited".into()).is_not_found());
}
