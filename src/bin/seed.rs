// src/bin/seed.rs
//! 开发数据初始化命令：
//!
//! ```text
//! cargo run --bin seed          # 等同于 seed run
//! cargo run --bin seed -- clean # 删除测试用户与测试文章
//! ```
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use cms_backend::{
    core::{config::Config, database, error::AppError, log},
    services::seed,
};

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Seed or clean development data")]
struct Cli {
    #[arg(value_enum, default_value_t = Command::Run)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    /// 角色、用户、语言、文章、权限
    Run,
    /// 删除测试用户与测试文章
    Clean,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Seed failed: {e}");
            tracing::error!("❌ Seed failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command) -> Result<(), AppError> {
    let config = Config::load()?;
    let _guard = log::init(&config.rust_log, "seed.log");

    let db = database::connect(&config).await?;
    tracing::info!("✅ Database connected, migrations applied.");

    match command {
        Command::Run => {
            seed::seed(&db, config.i18n_enabled).await?;
        }
        Command::Clean => {
            seed::clean(&db).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_is_the_default_command() {
        assert_eq!(Cli::parse_from(["seed"]).command, Command::Run);
        assert_eq!(Cli::parse_from(["seed", "run"]).command, Command::Run);
        assert_eq!(Cli::parse_from(["seed", "clean"]).command, Command::Clean);
        assert!(Cli::try_parse_from(["seed", "drop"]).is_err());
    }
}
