//! CLIインターフェース

use clap::{Args, Parser, Subcommand};

/// admind - CRUD admin backend with a server API registry
#[derive(Parser, Debug)]
#[command(name = "admind")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    ADMIND_HOST             Bind address (default: 0.0.0.0)
    ADMIND_PORT             Listen port (default: 8080)
    ADMIND_LOG              Log filter (default: info)
    ADMIND_DATABASE_URL     Database URL (default: sqlite:admind.db)
    ADMIND_JWT_SECRET       JWT signing key (auto-generated if not set)
    ADMIND_STORAGE_DIR      Object storage directory (default: objects)
    ADMIND_PUBLIC_BASE_URL  Public base URL for stored files
    ADMIND_ADMIN_EMAIL      Initial admin email (default: admin@example.com)
    ADMIND_ADMIN_NAME       Initial admin name (default: admin)
    ADMIND_ADMIN_PASSWORD   Initial admin password (required on first run)
"#)]
pub struct Cli {
    /// 実行するサブコマンド
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// サブコマンド
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the admin backend server
    Serve(ServeArgs),
}

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value = "8080", env = "ADMIND_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "ADMIND_HOST")]
    pub host: String,
}
