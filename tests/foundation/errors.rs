//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use herd_foundation::{Error, ErrorContext, ErrorKind};

#[test]
fn no_active_entity_kind() {
    let err = Error::no_active_entity();
    assert_eq!(err.kind, ErrorKind::NoActiveEntity);
    assert!(err.is_no_active_entity());
    assert!(err.context.is_none());
}

#[test]
fn error_display_names_the_problem() {
    let msg = Error::no_active_entity().to_string();
    assert!(msg.contains("no active entity"));
}

#[test]
fn error_with_context() {
    let err = Error::no_active_entity().with_context(
        ErrorContext::new()
            .with_store("todos")
            .with_operation("select_active"),
    );

    let context = err.context.as_ref().unwrap();
    assert_eq!(context.to_string(), "in select_active on store todos");
}

#[test]
fn partial_context_display() {
    assert_eq!(ErrorContext::new().with_store("todos").to_string(), "on store todos");
    assert_eq!(ErrorContext::new().with_operation("get_active").to_string(), "in get_active");
    assert_eq!(ErrorContext::new().to_string(), "");
}

#[test]
fn error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&Error::no_active_entity());
}
