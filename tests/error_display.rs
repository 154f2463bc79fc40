use bex_lib::{BexError, ErrorCategory};

#[test]
fn validation_messages_name_the_rule() {
    assert_eq!(format!("{}", BexError::UrlTooLong), "URL too long");
    assert_eq!(format!("{}", BexError::InvalidUrl), "Invalid URL");
    assert_eq!(
        format!("{}", BexError::SchemeNotAllowed),
        "Only HTTP/HTTPS allowed"
    );
}

#[test]
fn policy_messages_stay_generic() {
    // These must not reveal which range or resolution step rejected the
    // target.
    assert_eq!(format!("{}", BexError::HostNotAllowed), "URL not allowed");
    assert_eq!(
        format!("{}", BexError::BlockedIp),
        "URL resolves to blocked IP"
    );
}

#[test]
fn io_error_display_wraps_source() {
    let io_err = std::io::Error::other("disk full");
    let err: BexError = io_err.into();
    let rendered = format!("{}", err);

    assert!(rendered.starts_with("IO error: "));
    assert!(rendered.contains("disk full"));
}

#[test]
fn browser_helper_includes_phase_and_message() {
    let err = BexError::browser("navigate", "net::ERR_NAME_NOT_RESOLVED");

    assert_eq!(
        format!("{}", err),
        "Browser error (navigate): net::ERR_NAME_NOT_RESOLVED"
    );
}

#[test]
fn request_helper_uses_message() {
    let err = BexError::request("Invalid base64 image data: bad padding");

    assert_eq!(
        format!("{}", err),
        "Invalid request: Invalid base64 image data: bad padding"
    );
}

#[test]
fn payload_splits_client_and_server_categories() {
    assert_eq!(
        BexError::UrlTooLong.to_payload().category,
        ErrorCategory::Validation
    );
    assert_eq!(
        BexError::HostnameUnresolved.to_payload().category,
        ErrorCategory::Policy
    );
    assert_eq!(
        BexError::browser("timeout", "render exceeded 45s")
            .to_payload()
            .category,
        ErrorCategory::Render
    );
}
