use rusqlite::{Connection, OptionalExtension, ToSql};

use crate::error::{StoreError, StoreResult};
use crate::models::{CreateProduct, Product, ProductQuery, ProductSort, UpdateProduct};

const PRODUCT_SELECT: &str = "SELECT p.id, p.article, p.name, p.unit, p.price, p.discount, p.stock, p.description, p.image,
            p.category_id, c.name, p.manufacturer_id, m.name, p.supplier_id, s.name
     FROM products p
     LEFT JOIN categories c ON p.category_id = c.id
     LEFT JOIN manufacturers m ON p.manufacturer_id = m.id
     LEFT JOIN suppliers s ON p.supplier_id = s.id";

fn map_product(row: &rusqlite::Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        article: row.get(1)?,
        name: row.get(2)?,
        unit: row.get(3)?,
        price: row.get(4)?,
        discount: row.get(5)?,
        stock: row.get(6)?,
        description: row.get(7)?,
        image: row.get(8)?,
        category_id: row.get(9)?,
        category_name: row.get(10)?,
        manufacturer_id: row.get(11)?,
        manufacturer_name: row.get(12)?,
        supplier_id: row.get(13)?,
        supplier_name: row.get(14)?,
    })
}

/// Product listing with free-text search, supplier filter and stock/name
/// ordering, as the catalog screen consumes it.
pub fn list_products(conn: &Connection, query: &ProductQuery) -> StoreResult<Vec<Product>> {
    let mut sql = String::from(PRODUCT_SELECT);
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(q) = query.search.as_deref() {
        let q = q.trim();
        if !q.is_empty() {
            let pattern = format!("%{}%", q);
            clauses.push(format!(
                "(p.name LIKE ?{0} OR p.article LIKE ?{0} OR p.description LIKE ?{0})",
                params.len() + 1
            ));
            params.push(Box::new(pattern));
        }
    }
    if let Some(supplier_id) = query.supplier_id {
        clauses.push(format!("p.supplier_id = ?{}", params.len() + 1));
        params.push(Box::new(supplier_id));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    sql.push_str(match query.sort {
        ProductSort::StockAsc => " ORDER BY p.stock ASC",
        ProductSort::StockDesc => " ORDER BY p.stock DESC",
        ProductSort::Name => " ORDER BY p.name",
    });

    let mut stmt = conn.prepare(&sql)?;
    let products = stmt
        .query_map(
            rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
            map_product,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(products)
}

pub fn get_product(conn: &Connection, id: i64) -> StoreResult<Product> {
    let sql = format!("{} WHERE p.id = ?1", PRODUCT_SELECT);
    conn.query_row(&sql, [id], map_product)
        .optional()?
        .ok_or(StoreError::NotFound("product"))
}

pub fn get_product_by_article(conn: &Connection, article: &str) -> StoreResult<Option<Product>> {
    let sql = format!("{} WHERE p.article = ?1", PRODUCT_SELECT);
    Ok(conn.query_row(&sql, [article], map_product).optional()?)
}

pub fn create_product(conn: &Connection, product: &CreateProduct) -> StoreResult<Product> {
    conn.execute(
        "INSERT INTO products (article, name, unit, price, discount, stock, description, category_id, manufacturer_id, supplier_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            product.article.trim(),
            product.name,
            product.unit,
            product.price,
            product.discount,
            product.stock,
            product.description,
            product.category_id,
            product.manufacturer_id,
            product.supplier_id,
        ],
    )?;
    get_product(conn, conn.last_insert_rowid())
}

/// Edit-form update. The article is the business key and is not touched.
pub fn update_product(conn: &Connection, product: &UpdateProduct) -> StoreResult<Product> {
    let updated = conn.execute(
        "UPDATE products SET name = ?1, unit = ?2, price = ?3, discount = ?4, stock = ?5, description = ?6,
                category_id = ?7, manufacturer_id = ?8, supplier_id = ?9
         WHERE id = ?10",
        rusqlite::params![
            product.name,
            product.unit,
            product.price,
            product.discount,
            product.stock,
            product.description,
            product.category_id,
            product.manufacturer_id,
            product.supplier_id,
            product.id,
        ],
    )?;
    if updated == 0 {
        return Err(StoreError::NotFound("product"));
    }
    get_product(conn, product.id)
}

/// Delete is refused while any order carries the product's article. The
/// comparison is on article text, not a foreign key: orders are deliberately
/// decoupled from live product identity.
pub fn delete_product(conn: &Connection, id: i64) -> StoreResult<()> {
    let product = get_product(conn, id)?;

    let references: i64 = conn.query_row(
        "SELECT COUNT(*) FROM orders WHERE article = ?1",
        [&product.article],
        |row| row.get(0),
    )?;
    if references > 0 {
        return Err(StoreError::ProductReferenced {
            name: product.name,
            article: product.article,
        });
    }

    conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
    Ok(())
}

/// Import-side upsert payload. Every descriptive field is overwritten on
/// each run; the image column is owned by the photo-copy step instead.
#[derive(Debug)]
pub struct ProductUpsert<'a> {
    pub article: &'a str,
    pub name: &'a str,
    pub unit: &'a str,
    pub price: f64,
    pub discount: f64,
    pub stock: i64,
    pub description: &'a str,
    pub category_id: i64,
    pub manufacturer_id: i64,
    pub supplier_id: i64,
}

pub fn upsert_by_article(conn: &Connection, p: &ProductUpsert) -> StoreResult<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM products WHERE article = ?1",
            [p.article],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(id) => {
            conn.execute(
                "UPDATE products SET name = ?1, unit = ?2, price = ?3, discount = ?4, stock = ?5, description = ?6,
                        category_id = ?7, manufacturer_id = ?8, supplier_id = ?9
                 WHERE id = ?10",
                rusqlite::params![
                    p.name,
                    p.unit,
                    p.price,
                    p.discount,
                    p.stock,
                    p.description,
                    p.category_id,
                    p.manufacturer_id,
                    p.supplier_id,
                    id,
                ],
            )?;
            Ok(id)
        }
        None => {
            conn.execute(
                "INSERT INTO products (article, name, unit, price, discount, stock, description, category_id, manufacturer_id, supplier_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    p.article,
                    p.name,
                    p.unit,
                    p.price,
                    p.discount,
                    p.stock,
                    p.description,
                    p.category_id,
                    p.manufacturer_id,
                    p.supplier_id,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }
}

pub fn image_of(conn: &Connection, id: i64) -> StoreResult<Option<String>> {
    let image: Option<String> =
        conn.query_row("SELECT image FROM products WHERE id = ?1", [id], |row| {
            row.get(0)
        })?;
    Ok(image.filter(|s| !s.is_empty()))
}

pub fn set_image(conn: &Connection, id: i64, relative_path: &str) -> StoreResult<()> {
    conn.execute(
        "UPDATE products SET image = ?1 WHERE id = ?2",
        rusqlite::params![relative_path, id],
    )?;
    Ok(())
}
