//! 规则控制台
//!
//! 交互式菜单、表发现与条件查询。规则的构建和渲染全部由 `rule_engine` 完成，
//! 这里只负责输入输出和数据库访问。

pub mod cli;
pub mod session;
pub mod source;

pub use cli::Cli;
pub use session::{MenuChoice, Session};
pub use source::{DataSource, PgDataSource, QueryRows, TableRef};
