//! Queries for the `SourceCookie` session-cookie cache.

use rusqlite::Connection;

use avmeta_common::{Error, Result};

use crate::models::SourceCookie;

/// Look up the cached session cookie for a source.
pub fn get(conn: &Connection, source: &str) -> Result<Option<SourceCookie>> {
    let result = conn.query_row(
        "SELECT source, cookie FROM SourceCookie WHERE source = :source",
        rusqlite::named_params! { ":source": source },
        |row| {
            Ok(SourceCookie {
                source: row.get(0)?,
                cookie: row.get(1)?,
            })
        },
    );

    match result {
        Ok(cookie) => Ok(Some(cookie)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Insert or refresh the session cookie for a source.
pub fn upsert(conn: &Connection, cookie: &SourceCookie) -> Result<()> {
    conn.execute(
        "INSERT INTO SourceCookie (source, cookie) VALUES (:source, :cookie)
         ON CONFLICT(source) DO UPDATE SET cookie = excluded.cookie",
        rusqlite::named_params! {
            ":source": &cookie.source,
            ":cookie": &cookie.cookie,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}
