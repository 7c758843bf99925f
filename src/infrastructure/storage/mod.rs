//! Credential storage adapters.

mod toml_credential_store;

pub use toml_credential_store::{CREDENTIALS_FILE_NAME, TomlCredentialStore};
