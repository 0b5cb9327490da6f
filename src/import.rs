//! Bulk spreadsheet import: four independent CSV sources reconciled into the
//! store. A single bad row never aborts a batch; bad cells degrade to
//! defaults, and only unparseable order numbers or unseeded roles skip a row.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use csv::StringRecord;
use log::{debug, warn};
use rusqlite::Connection;
use serde::Serialize;

use crate::auth;
use crate::db::Database;
use crate::error::ImportError;
use crate::models::{CreateOrder, OrderStatus, Role};
use crate::store::{delivery_points, lookups, orders, products, users};

// Fixed source filenames, carried over from the upstream workbooks.
pub const DELIVERY_POINTS_FILE: &str = "Пункты выдачи_import.csv";
pub const PRODUCTS_FILE: &str = "Tovar.csv";
pub const USERS_FILE: &str = "user_import.csv";
pub const ORDERS_FILE: &str = "Заказ_import.csv";

const IMPORT_DATE_FMT: &str = "%d.%m.%Y";

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Directory holding the CSV source files.
    pub source_dir: PathBuf,
    /// Directory holding product photos referenced by the product file.
    pub images_dir: PathBuf,
    /// Managed media root; photos are copied under `<media_root>/products/`.
    pub media_root: PathBuf,
}

/// Per-source row counts plus the warnings collected along the way.
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub delivery_points: usize,
    pub products: usize,
    pub users: usize,
    pub orders: usize,
    pub warnings: Vec<String>,
}

pub fn run(db: &Database, opts: &ImportOptions) -> Result<ImportSummary, ImportError> {
    let conn = db.conn();
    run_on(&conn, opts)
}

/// Run the whole pipeline on an already-locked connection. Missing source
/// files are skipped silently; each source is independent.
pub fn run_on(conn: &Connection, opts: &ImportOptions) -> Result<ImportSummary, ImportError> {
    Database::seed_roles(conn)?;

    let mut summary = ImportSummary::default();

    let dp_file = opts.source_dir.join(DELIVERY_POINTS_FILE);
    if dp_file.exists() {
        summary.delivery_points = import_delivery_points(conn, &dp_file, &mut summary.warnings)?;
    } else {
        debug!("no delivery point file at {}, skipping", dp_file.display());
    }

    let products_file = opts.source_dir.join(PRODUCTS_FILE);
    if products_file.exists() {
        summary.products = import_products(conn, &products_file, opts, &mut summary.warnings)?;
    } else {
        debug!("no product file at {}, skipping", products_file.display());
    }

    let users_file = opts.source_dir.join(USERS_FILE);
    if users_file.exists() {
        summary.users = import_users(conn, &users_file, &mut summary.warnings)?;
    } else {
        debug!("no user file at {}, skipping", users_file.display());
    }

    let orders_file = opts.source_dir.join(ORDERS_FILE);
    if orders_file.exists() {
        summary.orders = import_orders(conn, &orders_file, &mut summary.warnings)?;
    } else {
        debug!("no order file at {}, skipping", orders_file.display());
    }

    Ok(summary)
}

fn open_reader(path: &Path, has_headers: bool) -> Result<csv::Reader<fs::File>, ImportError> {
    csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_path(path)
        .map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Column lookup by trimmed header text; absent columns read as "".
fn field<'r>(headers: &StringRecord, record: &'r StringRecord, name: &str) -> &'r str {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .unwrap_or("")
}

fn next_row(
    result: Result<StringRecord, csv::Error>,
    file: &str,
    warnings: &mut Vec<String>,
) -> Option<StringRecord> {
    match result {
        Ok(record) => Some(record),
        Err(e) => {
            let msg = format!("{}: skipped unreadable row: {}", file, e);
            warn!("{}", msg);
            warnings.push(msg);
            None
        }
    }
}

fn import_delivery_points(
    conn: &Connection,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<usize, ImportError> {
    let mut rdr = open_reader(path, false)?;
    let mut count = 0;

    for result in rdr.records() {
        let Some(record) = next_row(result, DELIVERY_POINTS_FILE, warnings) else {
            continue;
        };
        let address = record.get(0).map(str::trim).unwrap_or("");
        if address.is_empty() {
            continue;
        }
        delivery_points::get_or_create(conn, address)?;
        count += 1;
    }

    Ok(count)
}

fn import_products(
    conn: &Connection,
    path: &Path,
    opts: &ImportOptions,
    warnings: &mut Vec<String>,
) -> Result<usize, ImportError> {
    let mut rdr = open_reader(path, true)?;
    let headers = rdr
        .headers()
        .map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let mut count = 0;

    for result in rdr.records() {
        let Some(record) = next_row(result, PRODUCTS_FILE, warnings) else {
            continue;
        };
        if record.get(0).map(str::trim).unwrap_or("").is_empty() {
            continue;
        }

        let category = non_empty(field(&headers, &record, "Категория товара"), "Без категории");
        let manufacturer = non_empty(field(&headers, &record, "Производитель"), "Неизвестен");
        let supplier = non_empty(field(&headers, &record, "Поставщик"), "Неизвестен");

        let category_id = lookups::get_or_create_category(conn, category)?;
        let manufacturer_id = lookups::get_or_create_manufacturer(conn, manufacturer)?;
        let supplier_id = lookups::get_or_create_supplier(conn, supplier)?;

        let upsert = products::ProductUpsert {
            article: field(&headers, &record, "Артикул"),
            name: field(&headers, &record, "Наименование товара"),
            unit: non_empty(field(&headers, &record, "Единица измерения"), "пара"),
            price: parse_price(field(&headers, &record, "Цена")),
            discount: parse_discount(field(&headers, &record, "Действующая скидка")),
            stock: parse_stock(field(&headers, &record, "Кол-во на складе")),
            description: field(&headers, &record, "Описание товара"),
            category_id,
            manufacturer_id,
            supplier_id,
        };
        let product_id = products::upsert_by_article(conn, &upsert)?;

        let photo = field(&headers, &record, "Фото");
        if !photo.is_empty() && products::image_of(conn, product_id)?.is_none() {
            attach_photo(conn, product_id, photo, opts)?;
        }

        count += 1;
    }

    Ok(count)
}

/// Copy a photo into the managed media tree and record the relative path.
/// Only reached when the product has no image yet; the copy itself is
/// skipped when a file of that name already sits at the destination.
fn attach_photo(
    conn: &Connection,
    product_id: i64,
    photo: &str,
    opts: &ImportOptions,
) -> Result<(), ImportError> {
    let src = opts.images_dir.join(photo);
    if !src.exists() {
        debug!("photo {} not found in {}", photo, opts.images_dir.display());
        return Ok(());
    }

    let dest_dir = opts.media_root.join("products");
    fs::create_dir_all(&dest_dir)?;
    let dest = dest_dir.join(photo);
    if !dest.exists() {
        fs::copy(&src, &dest)?;
    }
    products::set_image(conn, product_id, &format!("products/{}", photo))?;
    Ok(())
}

fn import_users(
    conn: &Connection,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<usize, ImportError> {
    let mut rdr = open_reader(path, true)?;
    let headers = rdr
        .headers()
        .map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let mut count = 0;

    for result in rdr.records() {
        let Some(record) = next_row(result, USERS_FILE, warnings) else {
            continue;
        };
        if record.get(0).map(str::trim).unwrap_or("").is_empty() {
            continue;
        }

        let role = role_from_label(field(&headers, &record, "Роль сотрудника"));
        // Roles are seeded before import; a missing row means the seeding
        // was bypassed, and the user row is skipped rather than mis-roled.
        let Some(role_id) = users::role_id(conn, role)? else {
            warn!("role {} not seeded, skipping user row", role.as_str());
            continue;
        };

        let username = field(&headers, &record, "Логин");
        if username.is_empty() {
            continue;
        }

        let password_hash = auth::hash_password(field(&headers, &record, "Пароль"));
        users::create_if_absent(
            conn,
            username,
            field(&headers, &record, "ФИО"),
            Some(role_id),
            &password_hash,
        )?;
        count += 1;
    }

    Ok(count)
}

fn import_orders(
    conn: &Connection,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<usize, ImportError> {
    let mut rdr = open_reader(path, true)?;
    let headers = rdr
        .headers()
        .map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let mut count = 0;

    for result in rdr.records() {
        let Some(record) = next_row(result, ORDERS_FILE, warnings) else {
            continue;
        };
        if record.get(0).map(str::trim).unwrap_or("").is_empty() {
            continue;
        }

        // The order number is the business key; a row without one is useless
        // and gets skipped outright instead of defaulted.
        let Ok(number) = field(&headers, &record, "Номер заказа").parse::<i64>() else {
            continue;
        };

        let dp_address = field(&headers, &record, "Адрес пункта выдачи");
        let delivery_point_id = if dp_address.is_empty() {
            None
        } else {
            delivery_points::find_by_address_fragment(conn, dp_address)?
        };

        let order_date = resolve_date(
            field(&headers, &record, "Дата заказа"),
            "заказа",
            number,
            warnings,
        )
        .unwrap_or_else(|| Local::now().date_naive());
        let delivery_date = resolve_date(
            field(&headers, &record, "Дата доставки"),
            "доставки",
            number,
            warnings,
        );

        orders::create_if_absent(
            conn,
            &CreateOrder {
                number,
                article: field(&headers, &record, "Артикул заказа").to_string(),
                order_date,
                delivery_date,
                client_name: field(&headers, &record, "ФИО авторизированного клиента").to_string(),
                pickup_code: field(&headers, &record, "Код для получения").to_string(),
                status: status_from_label(field(&headers, &record, "Статус заказа")),
                delivery_point_id,
                client_id: None,
            },
        )?;
        count += 1;
    }

    Ok(count)
}

fn non_empty<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

/// Price cells use a decimal comma; anything unparseable degrades to 0.0.
pub fn parse_price(raw: &str) -> f64 {
    raw.trim().replace(',', ".").parse().unwrap_or(0.0)
}

/// Discount cells may carry a trailing percent sign; anything unparseable
/// degrades to 0.0.
pub fn parse_discount(raw: &str) -> f64 {
    raw.trim().trim_end_matches('%').trim().parse().unwrap_or(0.0)
}

pub fn parse_stock(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// `DD.MM.YYYY` cell → date. Empty cells resolve to None; a malformed value
/// substitutes the current date and records a warning naming the order.
fn resolve_date(
    raw: &str,
    label: &str,
    number: i64,
    warnings: &mut Vec<String>,
) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, IMPORT_DATE_FMT) {
        Ok(date) => Some(date),
        Err(_) => {
            let msg = format!(
                "заказ №{}: невалидная дата {} \"{}\" — заменена на сегодняшнюю",
                number, label, raw
            );
            warn!("{}", msg);
            warnings.push(msg);
            Some(Local::now().date_naive())
        }
    }
}

fn role_from_label(label: &str) -> Role {
    match label {
        "Администратор" => Role::Admin,
        "Менеджер" => Role::Manager,
        "Авторизованный клиент" => Role::Client,
        _ => Role::Client,
    }
}

fn status_from_label(label: &str) -> OrderStatus {
    match label {
        "Завершен" => OrderStatus::Completed,
        "Новый" => OrderStatus::New,
        "Отменен" => OrderStatus::Cancelled,
        _ => OrderStatus::New,
    }
}
