use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::models::Role;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the underlying connection. A poisoned lock is recovered rather
    /// than propagated: the connection itself stays usable.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        Self::create_schema(&conn)?;
        Self::seed_roles(&conn)
    }

    pub fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            -- User roles (seeded once, immutable afterwards)
            CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL DEFAULT '',
                password_hash TEXT NOT NULL DEFAULT '',
                role_id INTEGER,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (role_id) REFERENCES roles(id)
            );

            -- Lookup entities, created lazily during import
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS manufacturers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS suppliers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            -- Products, keyed by business article
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                article TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                unit TEXT NOT NULL DEFAULT 'пара',
                price REAL NOT NULL,
                discount REAL NOT NULL DEFAULT 0,
                stock INTEGER NOT NULL DEFAULT 0,
                description TEXT NOT NULL DEFAULT '',
                image TEXT,
                category_id INTEGER NOT NULL,
                manufacturer_id INTEGER NOT NULL,
                supplier_id INTEGER NOT NULL,
                FOREIGN KEY (category_id) REFERENCES categories(id),
                FOREIGN KEY (manufacturer_id) REFERENCES manufacturers(id),
                FOREIGN KEY (supplier_id) REFERENCES suppliers(id)
            );

            CREATE TABLE IF NOT EXISTS delivery_points (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT NOT NULL
            );

            -- Orders reference products by article text on purpose, not by
            -- foreign key: historical orders survive product deletion.
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                number INTEGER NOT NULL UNIQUE,
                article TEXT NOT NULL DEFAULT '',
                order_date TEXT NOT NULL,
                delivery_date TEXT,
                client_name TEXT NOT NULL DEFAULT '',
                pickup_code TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'new',
                delivery_point_id INTEGER,
                client_id INTEGER,
                FOREIGN KEY (delivery_point_id) REFERENCES delivery_points(id),
                FOREIGN KEY (client_id) REFERENCES users(id) ON DELETE SET NULL
            );
            ",
        )
    }

    /// Insert the seedable roles if absent. Guest is representable but never
    /// seeded: a user without a role row behaves as guest.
    pub fn seed_roles(conn: &Connection) -> Result<()> {
        for role in [Role::Client, Role::Manager, Role::Admin] {
            conn.execute(
                "INSERT OR IGNORE INTO roles (name) VALUES (?1)",
                [role.as_str()],
            )?;
        }
        Ok(())
    }
}
