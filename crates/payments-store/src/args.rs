//! CLI argument definitions for the payments store.

use clap::Args;

/// MySQL connection settings.
#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    /// MySQL host
    #[arg(long, env = "MYSQL_HOST", default_value = "localhost")]
    pub mysql_host: String,

    /// MySQL port
    #[arg(long, env = "MYSQL_PORT", default_value = "3306")]
    pub mysql_port: u16,

    /// MySQL user
    #[arg(long, env = "MYSQL_USER")]
    pub mysql_user: String,

    /// MySQL password
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    pub mysql_password: Option<String>,

    /// Database holding the payments table
    #[arg(long, env = "MYSQL_DATABASE")]
    pub mysql_database: String,
}

impl StoreArgs {
    /// `user@host:port/database`, safe to log.
    pub fn describe(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.mysql_user, self.mysql_host, self.mysql_port, self.mysql_database
        )
    }
}
