/// Operator service driving the round lifecycle.
pub mod admin_service;
/// Buzz handling service bridging HTTP onto the arbitration engine.
pub mod buzz_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Public service for read-only round information.
pub mod public_service;
