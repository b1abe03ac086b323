use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    /// Printer endpoint: a device path like /dev/usb/lp0 or tcp://host:9100.
    /// Unset means no printer is attached; print requests then fail loudly.
    pub printer: Option<String>,
    pub upload_dir: String,
    pub shop_name: String,
    pub shop_footer: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let host = env::var("POS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("POS_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .expect("POS_PORT must be a number");

        let db_path = env::var("POS_DB_PATH").unwrap_or_else(|_| "restro_pos.db".to_string());
        let printer = env::var("POS_PRINTER").ok().filter(|v| !v.is_empty());
        let upload_dir = env::var("POS_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let shop_name = env::var("POS_SHOP_NAME").unwrap_or_else(|_| "RESTRO POS".to_string());
        let shop_footer = env::var("POS_SHOP_FOOTER")
            .map(|v| v.split('|').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["THANK YOU!".to_string(), "VISIT AGAIN".to_string()]);

        Config {
            host,
            port,
            db_path,
            printer,
            upload_dir,
            shop_name,
            shop_footer,
        }
    }
}
