//! Table lifecycle for the roster schema.
//!
//! # Invariants
//! - `create_table` and `drop_table` are idempotent.
//! - Ids are `AUTOINCREMENT`: a deleted id is never handed to a later insert,
//!   so orphans keep pointing at a vanished parent instead of a new one.
//! - `REFERENCES` clauses document the parent tables only; enforcement is
//!   disabled on every connection opened by `db::open`.

use super::DbResult;
use log::info;
use rusqlite::Connection;

pub(crate) const UNITS_DDL: &str = "CREATE TABLE IF NOT EXISTS units (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    location TEXT NOT NULL
);";

pub(crate) const MEMBERS_DDL: &str = "CREATE TABLE IF NOT EXISTS members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    job_title TEXT NOT NULL,
    department_id INTEGER NOT NULL REFERENCES units(id)
);
CREATE INDEX IF NOT EXISTS idx_members_department_id ON members(department_id);";

pub(crate) const REVIEWS_DDL: &str = "CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year INTEGER NOT NULL,
    summary TEXT NOT NULL,
    employee_id INTEGER NOT NULL REFERENCES members(id)
);
CREATE INDEX IF NOT EXISTS idx_reviews_employee_id ON reviews(employee_id);";

/// Tables owned by the roster schema, in parent-to-child order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Units,
    Members,
    Reviews,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Units, Table::Members, Table::Reviews];

    pub fn name(self) -> &'static str {
        match self {
            Table::Units => "units",
            Table::Members => "members",
            Table::Reviews => "reviews",
        }
    }

    fn create_sql(self) -> &'static str {
        match self {
            Table::Units => UNITS_DDL,
            Table::Members => MEMBERS_DDL,
            Table::Reviews => REVIEWS_DDL,
        }
    }
}

/// Creates one table (and its index) when missing.
pub fn create_table(conn: &Connection, table: Table) -> DbResult<()> {
    conn.execute_batch(table.create_sql())?;
    info!(
        "event=table_create module=db status=ok table={}",
        table.name()
    );
    Ok(())
}

/// Drops one table when present. Rows in child tables are left untouched.
pub fn drop_table(conn: &Connection, table: Table) -> DbResult<()> {
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", table.name()))?;
    info!("event=table_drop module=db status=ok table={}", table.name());
    Ok(())
}

/// Creates every roster table, parents first.
pub fn create_all(conn: &Connection) -> DbResult<()> {
    for table in Table::ALL {
        create_table(conn, table)?;
    }
    Ok(())
}

/// Drops every roster table, children first.
///
/// Resets `PRAGMA user_version` to 0 so the next `open_db` re-applies the
/// migrations and recreates the schema.
pub fn drop_all(conn: &Connection) -> DbResult<()> {
    for table in Table::ALL.iter().rev() {
        drop_table(conn, *table)?;
    }
    conn.execute_batch("PRAGMA user_version = 0;")?;
    Ok(())
}

/// Returns the number of stored rows in `table`.
pub fn row_count(conn: &Connection, table: Table) -> DbResult<i64> {
    let count = conn.query_row(
        &format!("SELECT COUNT(*) FROM {};", table.name()),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
