//! Reading claude.ai rows from a Chrome cookie database.

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use crate::core::cookies::CookieError;
use crate::core::models::credential::{CF_CLEARANCE, SESSION_KEY};

/// One row from the `cookies` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    pub encrypted_value: Vec<u8>,
}

const CLAUDE_COOKIES_QUERY: &str = "SELECT name, value, encrypted_value FROM cookies \
     WHERE host_key IN ('.claude.ai', 'claude.ai') AND name IN (?1, ?2)";

/// Newer Chrome builds keep the database under `Network/`.
pub fn locate_cookie_db(profile_dir: &Path) -> Result<PathBuf, CookieError> {
    let candidates = [
        profile_dir.join("Cookies"),
        profile_dir.join("Network").join("Cookies"),
    ];
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| CookieError::DatabaseNotFound(candidates[0].clone()))
}

/// Copy the database aside and read the session cookies from the copy.
///
/// A running Chrome holds a lock on the live file, so it is never opened
/// directly.
pub fn read_claude_cookies(db_path: &Path) -> Result<Vec<RawCookie>, CookieError> {
    let copy = tempfile::Builder::new()
        .prefix("cud-cookies-")
        .suffix(".db")
        .tempfile()?;
    std::fs::copy(db_path, copy.path())?;
    tracing::debug!("copied cookie database to {}", copy.path().display());

    let conn = Connection::open_with_flags(
        copy.path(),
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let mut stmt = conn.prepare(CLAUDE_COOKIES_QUERY)?;
    let rows = stmt.query_map([SESSION_KEY, CF_CLEARANCE], |row| {
        Ok(RawCookie {
            name: row.get(0)?,
            value: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            encrypted_value: row.get::<_, Option<Vec<u8>>>(2)?.unwrap_or_default(),
        })
    })?;

    let cookies = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(cookies)
}
