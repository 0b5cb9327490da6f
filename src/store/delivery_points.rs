use rusqlite::{Connection, OptionalExtension};

use crate::error::StoreResult;
use crate::models::DeliveryPoint;

pub fn list_delivery_points(conn: &Connection) -> StoreResult<Vec<DeliveryPoint>> {
    let mut stmt = conn.prepare("SELECT id, address FROM delivery_points ORDER BY id")?;
    let points = stmt
        .query_map([], |row| {
            Ok(DeliveryPoint {
                id: row.get(0)?,
                address: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(points)
}

/// Exact-match get-or-create; the table has no uniqueness constraint, dedup
/// happens only here.
pub fn get_or_create(conn: &Connection, address: &str) -> StoreResult<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM delivery_points WHERE address = ?1",
            [address],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO delivery_points (address) VALUES (?1)",
        [address],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Best-effort fuzzy linkage for the order importer: the source data has no
/// stable join key, so we match case-insensitively on containment of the
/// first 30 characters of the provided address. First match wins. Matching
/// runs in Rust because SQLite's LIKE only case-folds ASCII, which would
/// miss Cyrillic addresses.
pub fn find_by_address_fragment(conn: &Connection, address: &str) -> StoreResult<Option<i64>> {
    let needle: String = address.chars().take(30).collect::<String>().to_lowercase();
    if needle.is_empty() {
        return Ok(None);
    }

    let mut stmt = conn.prepare("SELECT id, address FROM delivery_points ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;

    for row in rows {
        let (id, stored) = row?;
        if stored.to_lowercase().contains(&needle) {
            return Ok(Some(id));
        }
    }
    Ok(None)
}
