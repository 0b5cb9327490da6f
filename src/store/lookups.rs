//! Named lookup entities: categories, manufacturers, suppliers.
//! All three are id + unique name, created lazily by the importer.

use rusqlite::{Connection, OptionalExtension};

use crate::error::StoreResult;
use crate::models::{Category, Manufacturer, Supplier};

/// Read-by-name, else insert. The read-then-write window is accepted: the
/// connection is mutexed and import runs are single-threaded.
fn get_or_create(conn: &Connection, table: &str, name: &str) -> StoreResult<i64> {
    let name = name.trim();
    let existing: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE name = ?1", table),
            [name],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(&format!("INSERT INTO {} (name) VALUES (?1)", table), [name])?;
    Ok(conn.last_insert_rowid())
}

pub fn get_or_create_category(conn: &Connection, name: &str) -> StoreResult<i64> {
    get_or_create(conn, "categories", name)
}

pub fn get_or_create_manufacturer(conn: &Connection, name: &str) -> StoreResult<i64> {
    get_or_create(conn, "manufacturers", name)
}

pub fn get_or_create_supplier(conn: &Connection, name: &str) -> StoreResult<i64> {
    get_or_create(conn, "suppliers", name)
}

pub fn list_categories(conn: &Connection) -> StoreResult<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_manufacturers(conn: &Connection) -> StoreResult<Vec<Manufacturer>> {
    let mut stmt = conn.prepare("SELECT id, name FROM manufacturers ORDER BY name")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Manufacturer {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_suppliers(conn: &Connection) -> StoreResult<Vec<Supplier>> {
    let mut stmt = conn.prepare("SELECT id, name FROM suppliers ORDER BY name")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Supplier {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
