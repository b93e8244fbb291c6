//! Password file loading.

use std::path::Path;

use secrecy::SecretString;

use crate::{Error, Result};

/// Read a password file.
///
/// The whole file is the password, minus at most one trailing `\n`. Nothing
/// else is trimmed, so a `\r\n` ending keeps its `\r`.
pub async fn load_password_file(path: &Path) -> Result<SecretString> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::PasswordFile {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), "Loaded password file");
    Ok(SecretString::from(strip_trailing_newline(content)))
}

fn strip_trailing_newline(mut content: String) -> String {
    if content.ends_with('\n') {
        content.pop();
    }
    content
}
