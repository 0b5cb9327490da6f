use rusqlite::{Connection, OptionalExtension};

use crate::auth;
use crate::error::StoreResult;
use crate::models::{Role, User};

fn map_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let role_name: Option<String> = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        role: role_name.as_deref().and_then(Role::from_str),
        created_at: row.get(4)?,
    })
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> StoreResult<Option<User>> {
    let user = conn
        .query_row(
            "SELECT u.id, u.username, u.full_name, r.name, u.created_at
             FROM users u
             LEFT JOIN roles r ON u.role_id = r.id
             WHERE u.username = ?1",
            [username],
            map_user,
        )
        .optional()?;
    Ok(user)
}

pub fn role_id(conn: &Connection, role: Role) -> StoreResult<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM roles WHERE name = ?1",
            [role.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

/// Create-only by username: an existing user is never updated. Returns true
/// when a row was inserted.
pub fn create_if_absent(
    conn: &Connection,
    username: &str,
    full_name: &str,
    role_id: Option<i64>,
    password_hash: &str,
) -> StoreResult<bool> {
    if get_user_by_username(conn, username)?.is_some() {
        return Ok(false);
    }
    conn.execute(
        "INSERT INTO users (username, full_name, role_id, password_hash) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![username, full_name, role_id, password_hash],
    )?;
    Ok(true)
}

/// The shared guest identity used by the guest-login action. No role, no
/// usable password.
pub fn get_or_create_guest(conn: &Connection) -> StoreResult<User> {
    if let Some(user) = get_user_by_username(conn, "guest")? {
        return Ok(user);
    }
    conn.execute(
        "INSERT INTO users (username, full_name) VALUES ('guest', 'Гость')",
        [],
    )?;
    get_user_by_username(conn, "guest")?.ok_or(crate::error::StoreError::NotFound("user"))
}

/// Password check for the login screen. Unknown usernames and users without
/// a stored hash (the guest) both fail verification.
pub fn verify_login(conn: &Connection, username: &str, password: &str) -> StoreResult<Option<User>> {
    let stored: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, password_hash FROM users WHERE username = ?1",
            [username],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match stored {
        Some((_, hash)) if !hash.is_empty() && auth::verify_password(&hash, password) => {
            get_user_by_username(conn, username)
        }
        _ => Ok(None),
    }
}

pub fn delete_user(conn: &Connection, id: i64) -> StoreResult<()> {
    // orders.client_id is ON DELETE SET NULL: historical orders survive.
    conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
    Ok(())
}
