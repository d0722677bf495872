use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use uuid::Uuid;

/// Водитель, закрепленный за MC компанией.
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    pub id: Uuid,
    /// Имя водителя
    pub name: String,
    /// Название MC компании, на которую оформлен водитель
    pub mc_name: String,
}

/// Диспетчер с процентом комиссии (1.5 означает 1.5%).
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatcher {
    pub id: Uuid,
    /// Имя диспетчера, используется как ключ для поиска
    pub name: String,
    /// Процент комиссии
    pub percent: f64,
}

/// MC (Motor Carrier) компания.
#[derive(Debug, Clone, PartialEq)]
pub struct McCompany {
    pub id: Uuid,
    pub name: String,
}

/// Груз, оформленный через опрос.
#[derive(Debug, Clone, PartialEq)]
pub struct Cargo {
    pub id: Uuid,
    /// Номер груза (уникальность на этом уровне не проверяется)
    pub number: String,
    pub dispatcher_id: Uuid,
    pub driver_id: Uuid,
    pub mc_id: Uuid,
    /// Мили пустым
    pub miles_empty: f64,
    /// Мили с грузом
    pub miles_loaded: f64,
    /// Сколько платят за груз
    pub cost: f64,
    /// Маршрут: из какого штата/города → в какой штат/город
    pub route: String,
    pub created_at: DateTime<Utc>,
}

impl Cargo {
    /// Суммарные мили (пустым + с грузом).
    pub fn total_miles(&self) -> f64 {
        self.miles_empty + self.miles_loaded
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and runs schema migrations.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Returns
///
/// Returns a `DbPool` on success or an `r2d2::Error` if pool creation fails.
pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    // Ensure schema is up to date on first connection
    let conn = pool.get()?;
    if let Err(e) = migrate_schema(&conn) {
        log::warn!("Failed to migrate schema: {}", e);
    }

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Create all tables if they do not exist yet
pub fn migrate_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS drivers (
             id      TEXT PRIMARY KEY,
             name    TEXT NOT NULL,
             mc_name TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS dispatchers (
             id      TEXT PRIMARY KEY,
             name    TEXT NOT NULL,
             percent REAL NOT NULL
         );
         CREATE TABLE IF NOT EXISTS mc_companies (
             id   TEXT PRIMARY KEY,
             name TEXT NOT NULL
         );
         CREATE TABLE IF NOT EXISTS cargos (
             id            TEXT PRIMARY KEY,
             number        TEXT NOT NULL,
             dispatcher_id TEXT NOT NULL,
             driver_id     TEXT NOT NULL,
             mc_id         TEXT NOT NULL,
             miles_empty   REAL NOT NULL,
             miles_loaded  REAL NOT NULL,
             cost          REAL NOT NULL,
             route         TEXT NOT NULL,
             created_at    TEXT NOT NULL
         );",
    )
}

fn uuid_from_row(row: &Row<'_>, idx: usize) -> Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn datetime_from_row(row: &Row<'_>, idx: usize) -> Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn driver_from_row(row: &Row<'_>) -> Result<Driver> {
    Ok(Driver {
        id: uuid_from_row(row, 0)?,
        name: row.get(1)?,
        mc_name: row.get(2)?,
    })
}

fn dispatcher_from_row(row: &Row<'_>) -> Result<Dispatcher> {
    Ok(Dispatcher {
        id: uuid_from_row(row, 0)?,
        name: row.get(1)?,
        percent: row.get(2)?,
    })
}

fn mc_from_row(row: &Row<'_>) -> Result<McCompany> {
    Ok(McCompany {
        id: uuid_from_row(row, 0)?,
        name: row.get(1)?,
    })
}

fn cargo_from_row(row: &Row<'_>) -> Result<Cargo> {
    Ok(Cargo {
        id: uuid_from_row(row, 0)?,
        number: row.get(1)?,
        dispatcher_id: uuid_from_row(row, 2)?,
        driver_id: uuid_from_row(row, 3)?,
        mc_id: uuid_from_row(row, 4)?,
        miles_empty: row.get(5)?,
        miles_loaded: row.get(6)?,
        cost: row.get(7)?,
        route: row.get(8)?,
        created_at: datetime_from_row(row, 9)?,
    })
}

// ---------------------------------------------------------------- drivers

pub fn add_driver(conn: &Connection, driver: &Driver) -> Result<()> {
    conn.execute(
        "INSERT INTO drivers (id, name, mc_name) VALUES (?1, ?2, ?3)",
        params![driver.id.to_string(), driver.name, driver.mc_name],
    )?;
    Ok(())
}

pub fn get_driver(conn: &Connection, id: Uuid) -> Result<Option<Driver>> {
    conn.query_row(
        "SELECT id, name, mc_name FROM drivers WHERE id = ?1",
        params![id.to_string()],
        driver_from_row,
    )
    .optional()
}

pub fn get_driver_by_name(conn: &Connection, name: &str) -> Result<Option<Driver>> {
    conn.query_row(
        "SELECT id, name, mc_name FROM drivers WHERE name = ?1",
        params![name],
        driver_from_row,
    )
    .optional()
}

pub fn update_driver(conn: &Connection, driver: &Driver) -> Result<()> {
    conn.execute(
        "UPDATE drivers SET name = ?2, mc_name = ?3 WHERE id = ?1",
        params![driver.id.to_string(), driver.name, driver.mc_name],
    )?;
    Ok(())
}

pub fn delete_driver(conn: &Connection, id: Uuid) -> Result<()> {
    conn.execute("DELETE FROM drivers WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

pub fn get_all_drivers(conn: &Connection) -> Result<Vec<Driver>> {
    let mut stmt = conn.prepare("SELECT id, name, mc_name FROM drivers ORDER BY name")?;
    let rows = stmt.query_map([], driver_from_row)?;
    rows.collect()
}

// ------------------------------------------------------------- dispatchers

pub fn add_dispatcher(conn: &Connection, dispatcher: &Dispatcher) -> Result<()> {
    conn.execute(
        "INSERT INTO dispatchers (id, name, percent) VALUES (?1, ?2, ?3)",
        params![dispatcher.id.to_string(), dispatcher.name, dispatcher.percent],
    )?;
    Ok(())
}

pub fn get_dispatcher(conn: &Connection, id: Uuid) -> Result<Option<Dispatcher>> {
    conn.query_row(
        "SELECT id, name, percent FROM dispatchers WHERE id = ?1",
        params![id.to_string()],
        dispatcher_from_row,
    )
    .optional()
}

pub fn get_dispatcher_by_name(conn: &Connection, name: &str) -> Result<Option<Dispatcher>> {
    conn.query_row(
        "SELECT id, name, percent FROM dispatchers WHERE name = ?1",
        params![name],
        dispatcher_from_row,
    )
    .optional()
}

pub fn update_dispatcher(conn: &Connection, dispatcher: &Dispatcher) -> Result<()> {
    conn.execute(
        "UPDATE dispatchers SET name = ?2, percent = ?3 WHERE id = ?1",
        params![dispatcher.id.to_string(), dispatcher.name, dispatcher.percent],
    )?;
    Ok(())
}

pub fn delete_dispatcher(conn: &Connection, id: Uuid) -> Result<()> {
    conn.execute("DELETE FROM dispatchers WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

pub fn get_all_dispatchers(conn: &Connection) -> Result<Vec<Dispatcher>> {
    let mut stmt = conn.prepare("SELECT id, name, percent FROM dispatchers ORDER BY name")?;
    let rows = stmt.query_map([], dispatcher_from_row)?;
    rows.collect()
}

// ------------------------------------------------------------ mc companies

pub fn add_mc(conn: &Connection, mc: &McCompany) -> Result<()> {
    conn.execute(
        "INSERT INTO mc_companies (id, name) VALUES (?1, ?2)",
        params![mc.id.to_string(), mc.name],
    )?;
    Ok(())
}

pub fn get_mc(conn: &Connection, id: Uuid) -> Result<Option<McCompany>> {
    conn.query_row(
        "SELECT id, name FROM mc_companies WHERE id = ?1",
        params![id.to_string()],
        mc_from_row,
    )
    .optional()
}

pub fn get_mc_by_name(conn: &Connection, name: &str) -> Result<Option<McCompany>> {
    conn.query_row(
        "SELECT id, name FROM mc_companies WHERE name = ?1",
        params![name],
        mc_from_row,
    )
    .optional()
}

pub fn update_mc(conn: &Connection, mc: &McCompany) -> Result<()> {
    conn.execute(
        "UPDATE mc_companies SET name = ?2 WHERE id = ?1",
        params![mc.id.to_string(), mc.name],
    )?;
    Ok(())
}

pub fn delete_mc(conn: &Connection, id: Uuid) -> Result<()> {
    conn.execute("DELETE FROM mc_companies WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

pub fn get_all_mcs(conn: &Connection) -> Result<Vec<McCompany>> {
    let mut stmt = conn.prepare("SELECT id, name FROM mc_companies ORDER BY name")?;
    let rows = stmt.query_map([], mc_from_row)?;
    rows.collect()
}

// ------------------------------------------------------------------ cargos

pub fn add_cargo(conn: &Connection, cargo: &Cargo) -> Result<()> {
    conn.execute(
        "INSERT INTO cargos (id, number, dispatcher_id, driver_id, mc_id,
                             miles_empty, miles_loaded, cost, route, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            cargo.id.to_string(),
            cargo.number,
            cargo.dispatcher_id.to_string(),
            cargo.driver_id.to_string(),
            cargo.mc_id.to_string(),
            cargo.miles_empty,
            cargo.miles_loaded,
            cargo.cost,
            cargo.route,
            cargo.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_cargo(conn: &Connection, id: Uuid) -> Result<Option<Cargo>> {
    conn.query_row(
        "SELECT id, number, dispatcher_id, driver_id, mc_id,
                miles_empty, miles_loaded, cost, route, created_at
         FROM cargos WHERE id = ?1",
        params![id.to_string()],
        cargo_from_row,
    )
    .optional()
}

pub fn get_cargo_by_number(conn: &Connection, number: &str) -> Result<Option<Cargo>> {
    conn.query_row(
        "SELECT id, number, dispatcher_id, driver_id, mc_id,
                miles_empty, miles_loaded, cost, route, created_at
         FROM cargos WHERE number = ?1",
        params![number],
        cargo_from_row,
    )
    .optional()
}

pub fn update_cargo(conn: &Connection, cargo: &Cargo) -> Result<()> {
    conn.execute(
        "UPDATE cargos SET number = ?2, dispatcher_id = ?3, driver_id = ?4, mc_id = ?5,
                           miles_empty = ?6, miles_loaded = ?7, cost = ?8, route = ?9,
                           created_at = ?10
         WHERE id = ?1",
        params![
            cargo.id.to_string(),
            cargo.number,
            cargo.dispatcher_id.to_string(),
            cargo.driver_id.to_string(),
            cargo.mc_id.to_string(),
            cargo.miles_empty,
            cargo.miles_loaded,
            cargo.cost,
            cargo.route,
            cargo.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn delete_cargo(conn: &Connection, id: Uuid) -> Result<()> {
    conn.execute("DELETE FROM cargos WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

/// Все грузы, упорядоченные по дате создания (возрастание)
pub fn get_all_cargos(conn: &Connection) -> Result<Vec<Cargo>> {
    let mut stmt = conn.prepare(
        "SELECT id, number, dispatcher_id, driver_id, mc_id,
                miles_empty, miles_loaded, cost, route, created_at
         FROM cargos ORDER BY created_at",
    )?;
    let rows = stmt.query_map([], cargo_from_row)?;
    rows.collect()
}
