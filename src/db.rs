use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::Mutex;

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        if let Some(dir) = db_path.as_ref().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).expect("Failed to create database directory");
            }
        }

        let conn = Connection::open(db_path)?;

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

    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "
            -- Menu categories
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            -- Menu items
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                status TEXT NOT NULL DEFAULT 'available',
                description TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (category_id) REFERENCES categories(id)
            );

            -- Business days (accounting periods)
            CREATE TABLE IF NOT EXISTS business_days (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                business_date DATE NOT NULL,
                opened_at DATETIME NOT NULL,
                closed_at DATETIME,
                is_open INTEGER NOT NULL DEFAULT 0
            );

            -- At most one open business day, enforced by the store
            CREATE UNIQUE INDEX IF NOT EXISTS idx_business_days_single_open
                ON business_days (is_open) WHERE is_open = 1;

            -- Orders; items kept as an ordered JSON array
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT NOT NULL,
                order_type TEXT NOT NULL,
                items TEXT NOT NULL,
                total_bill REAL NOT NULL,
                discount REAL NOT NULL DEFAULT 0,
                service_charges REAL NOT NULL DEFAULT 0,
                delivery_charges REAL NOT NULL DEFAULT 0,
                net_bill REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'created',
                customer_phone TEXT,
                table_no TEXT,
                business_day_id INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (business_day_id) REFERENCES business_days(id)
            );

            -- Purchase categories
            CREATE TABLE IF NOT EXISTS purchase_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            -- Purchases; items kept as an ordered JSON array
            CREATE TABLE IF NOT EXISTS purchases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                purchase_category_id INTEGER NOT NULL,
                items TEXT NOT NULL,
                total_bill REAL NOT NULL,
                bill_image TEXT,
                business_day_id INTEGER NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (purchase_category_id) REFERENCES purchase_categories(id),
                FOREIGN KEY (business_day_id) REFERENCES business_days(id)
            );
            ",
        )?;

        // Run migrations for existing databases (pass connection to avoid deadlock)
        Self::migrate_conn(&conn)?;

        Ok(())
    }

    fn migrate_conn(conn: &Connection) -> Result<()> {
        // Billing columns arrived after the first release; patch old files
        let columns: Vec<String> = conn
            .prepare("PRAGMA table_info(orders)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !columns.contains(&"discount".to_string()) {
            conn.execute(
                "ALTER TABLE orders ADD COLUMN discount REAL NOT NULL DEFAULT 0",
                [],
            )?;
        }
        if !columns.contains(&"service_charges".to_string()) {
            conn.execute(
                "ALTER TABLE orders ADD COLUMN service_charges REAL NOT NULL DEFAULT 0",
                [],
            )?;
        }
        if !columns.contains(&"delivery_charges".to_string()) {
            conn.execute(
                "ALTER TABLE orders ADD COLUMN delivery_charges REAL NOT NULL DEFAULT 0",
                [],
            )?;
        }
        if !columns.contains(&"net_bill".to_string()) {
            conn.execute(
                "ALTER TABLE orders ADD COLUMN net_bill REAL NOT NULL DEFAULT 0",
                [],
            )?;
        }
        if !columns.contains(&"table_no".to_string()) {
            conn.execute("ALTER TABLE orders ADD COLUMN table_no TEXT", [])?;
        }

        let purchase_columns: Vec<String> = conn
            .prepare("PRAGMA table_info(purchases)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !purchase_columns.contains(&"total_bill".to_string()) {
            conn.execute(
                "ALTER TABLE purchases ADD COLUMN total_bill REAL NOT NULL DEFAULT 0",
                [],
            )?;
        }

        Ok(())
    }
}
