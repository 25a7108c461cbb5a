//! CLI 参数定义
//!
//! 命令行参数优先级高于配置文件和环境变量。

use clap::Parser;
use rule_shared::config::AppConfig;

/// 交互式过滤条件构建工具
///
/// 启动后列出数据库中的表，然后进入菜单循环：创建条件、组合条件、
/// 用条件查询数据。
#[derive(Parser, Debug)]
#[command(name = "rule-console")]
#[command(version, about = "交互式过滤条件构建工具")]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 输出 JSON 格式日志
    #[arg(long)]
    pub json_logs: bool,

    /// 数据库连接地址，覆盖配置中的 database.url
    #[arg(long)]
    pub database_url: Option<String>,

    /// 表发现使用的默认 schema
    #[arg(long)]
    pub schema: Option<String>,

    /// 不连接数据库，只构建和查看规则
    #[arg(long)]
    pub offline: bool,
}

impl Cli {
    /// 把命令行参数合并到配置
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if self.json_logs {
            config.observability.log_format = "json".to_string();
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if let Some(schema) = &self.schema {
            config.database.default_schema = schema.clone();
        }
    }
}
