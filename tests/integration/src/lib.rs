//! End-to-end tests for the SAML IdP metadata crates live under `tests/`.
