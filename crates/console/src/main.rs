//! 规则控制台入口
//!
//! 加载配置、初始化日志、连接数据库，然后进入交互式菜单。

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rule_console::{Cli, DataSource, PgDataSource, Session};
use rule_engine::RuleStore;
use rule_shared::config::AppConfig;
use rule_shared::database::Database;
use rule_shared::observability;
use tracing::info;

const SERVICE_NAME: &str = "rule-console";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 统一加载配置：从 config/{service_name}.toml 加载，失败时使用默认值
    let mut config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig {
            service_name: SERVICE_NAME.to_string(),
            ..AppConfig::default()
        }
    });
    cli.apply(&mut config);

    observability::init(&config.service_name, &config.observability)?;
    info!(offline = cli.offline, "Starting rule console...");

    let database = if cli.offline {
        None
    } else {
        let db = Database::connect(&config.database)
            .await
            .context("Failed to connect to database")?;
        db.health_check()
            .await
            .context("Database health check failed")?;
        Some(db)
    };
    let source = database
        .clone()
        .map(|db| Arc::new(PgDataSource::new(db)) as Arc<dyn DataSource>);

    let stdin = std::io::stdin();
    let mut session = Session::new(RuleStore::new(), source, stdin.lock(), std::io::stdout())
        .with_default_schema(config.database.default_schema.clone());

    let ready = !session.has_source() || session.discover().await?.is_some();
    if ready {
        session.run().await?;
    }

    if let Some(db) = database {
        db.close().await;
    }

    info!("Rule console exited");
    Ok(())
}
