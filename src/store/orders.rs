use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{StoreError, StoreResult};
use crate::models::{CreateOrder, Order, OrderQuery, OrderStatus, UpdateOrder};

const DATE_FMT: &str = "%Y-%m-%d";

const ORDER_SELECT: &str = "SELECT o.id, o.number, o.article, o.order_date, o.delivery_date, o.client_name,
            o.pickup_code, o.status, o.delivery_point_id, dp.address, o.client_id
     FROM orders o
     LEFT JOIN delivery_points dp ON o.delivery_point_id = dp.id";

fn date_from_db(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_order(row: &rusqlite::Row) -> rusqlite::Result<Order> {
    let order_date: String = row.get(3)?;
    let delivery_date: Option<String> = row.get(4)?;
    let status: String = row.get(7)?;
    Ok(Order {
        id: row.get(0)?,
        number: row.get(1)?,
        article: row.get(2)?,
        order_date: date_from_db(3, &order_date)?,
        delivery_date: delivery_date
            .map(|d| date_from_db(4, &d))
            .transpose()?,
        client_name: row.get(5)?,
        pickup_code: row.get(6)?,
        status: OrderStatus::from_str(&status).unwrap_or(OrderStatus::New),
        delivery_point_id: row.get(8)?,
        delivery_point_address: row.get(9)?,
        client_id: row.get(10)?,
    })
}

/// Order listing, newest first, with free-text search over client name and
/// article.
pub fn list_orders(conn: &Connection, query: &OrderQuery) -> StoreResult<Vec<Order>> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    let orders = match search {
        Some(q) => {
            let sql = format!(
                "{} WHERE o.client_name LIKE ?1 OR o.article LIKE ?1 ORDER BY o.order_date DESC",
                ORDER_SELECT
            );
            let pattern = format!("%{}%", q);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([pattern], map_order)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let sql = format!("{} ORDER BY o.order_date DESC", ORDER_SELECT);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_order)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(orders)
}

pub fn get_order(conn: &Connection, id: i64) -> StoreResult<Order> {
    let sql = format!("{} WHERE o.id = ?1", ORDER_SELECT);
    conn.query_row(&sql, [id], map_order)
        .optional()?
        .ok_or(StoreError::NotFound("order"))
}

pub fn get_order_by_number(conn: &Connection, number: i64) -> StoreResult<Option<Order>> {
    let sql = format!("{} WHERE o.number = ?1", ORDER_SELECT);
    Ok(conn.query_row(&sql, [number], map_order).optional()?)
}

/// Create-only upsert keyed by order number: an existing order is never
/// modified by re-import. Returns true when a row was inserted.
pub fn create_if_absent(conn: &Connection, order: &CreateOrder) -> StoreResult<bool> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT id FROM orders WHERE number = ?1",
            [order.number],
            |row| row.get(0),
        )
        .optional()?;
    if exists.is_some() {
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO orders (number, article, order_date, delivery_date, client_name, pickup_code, status, delivery_point_id, client_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            order.number,
            order.article,
            order.order_date.format(DATE_FMT).to_string(),
            order.delivery_date.map(|d| d.format(DATE_FMT).to_string()),
            order.client_name,
            order.pickup_code,
            order.status.as_str(),
            order.delivery_point_id,
            order.client_id,
        ],
    )?;
    Ok(true)
}

/// Edit-form update. The order number stays immutable.
pub fn update_order(conn: &Connection, order: &UpdateOrder) -> StoreResult<Order> {
    let updated = conn.execute(
        "UPDATE orders SET article = ?1, order_date = ?2, delivery_date = ?3, client_name = ?4,
                pickup_code = ?5, status = ?6, delivery_point_id = ?7, client_id = ?8
         WHERE id = ?9",
        rusqlite::params![
            order.article,
            order.order_date.format(DATE_FMT).to_string(),
            order.delivery_date.map(|d| d.format(DATE_FMT).to_string()),
            order.client_name,
            order.pickup_code,
            order.status.as_str(),
            order.delivery_point_id,
            order.client_id,
            order.id,
        ],
    )?;
    if updated == 0 {
        return Err(StoreError::NotFound("order"));
    }
    get_order(conn, order.id)
}

pub fn delete_order(conn: &Connection, id: i64) -> StoreResult<()> {
    let deleted = conn.execute("DELETE FROM orders WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(StoreError::NotFound("order"));
    }
    Ok(())
}
