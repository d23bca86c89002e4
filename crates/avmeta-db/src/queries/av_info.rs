//! Queries for the `AVInfo` metadata cache.
//!
//! Records are keyed on `(avid, source)`; `upsert` is idempotent for a given
//! input and updates all non-key fields on conflict.

use rusqlite::Connection;

use avmeta_common::{Error, Result};

use crate::models::AvInfo;

/// Parse an AvInfo from a database row.
///
/// Expects columns in order: avid, title, source, release_date, duration,
/// director, image_url.
fn parse_row(row: &rusqlite::Row) -> rusqlite::Result<AvInfo> {
    Ok(AvInfo {
        avid: row.get(0)?,
        title: row.get(1)?,
        source: row.get(2)?,
        release_date: row.get(3)?,
        duration: row.get(4)?,
        director: row.get(5)?,
        image_url: row.get(6)?,
    })
}

/// Look up a cached record by avid, optionally narrowed to one source.
///
/// Without a source, the first matching row is returned (one row per source
/// may exist for the same avid).
///
/// # Returns
///
/// * `Ok(Some(AvInfo))` - A cached record was found
/// * `Ok(None)` - No record for this key
/// * `Err(Error)` - If a database error occurs
pub fn get(conn: &Connection, avid: &str, source: Option<&str>) -> Result<Option<AvInfo>> {
    let result = match source {
        Some(source) => conn.query_row(
            "SELECT avid, title, source, release_date, duration, director, image_url
             FROM AVInfo WHERE avid = :avid AND source = :source",
            rusqlite::named_params! { ":avid": avid, ":source": source },
            parse_row,
        ),
        None => conn.query_row(
            "SELECT avid, title, source, release_date, duration, director, image_url
             FROM AVInfo WHERE avid = :avid",
            rusqlite::named_params! { ":avid": avid },
            parse_row,
        ),
    };

    match result {
        Ok(info) => Ok(Some(info)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Insert or update a record keyed on `(avid, source)`.
///
/// On conflict every non-key field is overwritten with the new values, so
/// upserting the same record twice leaves the table unchanged.
pub fn upsert(conn: &Connection, info: &AvInfo) -> Result<()> {
    conn.execute(
        "INSERT INTO AVInfo (avid, title, source, release_date, duration, director, image_url)
         VALUES (:avid, :title, :source, :release_date, :duration, :director, :image_url)
         ON CONFLICT(avid, source) DO UPDATE SET
            title = excluded.title,
            release_date = excluded.release_date,
            duration = excluded.duration,
            director = excluded.director,
            image_url = excluded.image_url",
        rusqlite::named_params! {
            ":avid": &info.avid,
            ":title": &info.title,
            ":source": &info.source,
            ":release_date": &info.release_date,
            ":duration": &info.duration,
            ":director": &info.director,
            ":image_url": &info.image_url,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    fn sample(avid: &str, source: &str) -> AvInfo {
        AvInfo {
            avid: avid.to_string(),
            title: "Sample Title".to_string(),
            source: source.to_string(),
            release_date: None,
            duration: None,
            director: None,
            image_url: Some("http://x/cover.jpg".to_string()),
        }
    }

    #[test]
    fn get_missing_returns_none() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        assert!(get(&conn, "ABC-123", None).unwrap().is_none());
    }

    #[test]
    fn upsert_then_get_roundtrip() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let info = sample("ABC-123", "avtoday");
        upsert(&conn, &info).unwrap();

        let found = get(&conn, "ABC-123", None).unwrap().unwrap();
        assert_eq!(found, info);
    }

    #[test]
    fn upsert_is_idempotent() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let info = sample("ABC-123", "avtoday");
        upsert(&conn, &info).unwrap();
        upsert(&conn, &info).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM AVInfo", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(get(&conn, "ABC-123", None).unwrap().unwrap(), info);
    }

    #[test]
    fn upsert_updates_non_key_fields() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        upsert(&conn, &sample("ABC-123", "avtoday")).unwrap();

        let mut updated = sample("ABC-123", "avtoday");
        updated.title = "Revised Title".to_string();
        updated.release_date = Some("2024-05-01".to_string());
        upsert(&conn, &updated).unwrap();

        let found = get(&conn, "ABC-123", Some("avtoday")).unwrap().unwrap();
        assert_eq!(found.title, "Revised Title");
        assert_eq!(found.release_date.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn source_narrows_lookup() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        upsert(&conn, &sample("ABC-123", "avtoday")).unwrap();
        upsert(&conn, &sample("ABC-123", "jable")).unwrap();

        let found = get(&conn, "ABC-123", Some("jable")).unwrap().unwrap();
        assert_eq!(found.source, "jable");

        assert!(get(&conn, "ABC-123", Some("missing")).unwrap().is_none());
    }
}
