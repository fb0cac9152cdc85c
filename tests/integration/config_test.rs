//! Integration tests for the shipped configuration files.

use recordhub_core::config::AppConfig;

#[test]
fn test_production_keeps_development_identity_off() {
    let config = AppConfig::load("production").unwrap();
    assert!(!config.auth.development_mode);
    assert_eq!(config.idempotency.ttl_seconds, 300);
    assert!(config.collection("contacts").has_soft_delete);
}

#[test]
fn test_development_overlay_enables_development_identity() {
    let config = AppConfig::load("development").unwrap();
    assert!(config.auth.development_mode);
    assert_eq!(config.logging.level, "debug");
}
