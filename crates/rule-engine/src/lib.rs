//! 动态规则引擎
//!
//! 增量构建布尔过滤条件：
//! - 从原子比较条件创建规则
//! - 用 AND / OR 组合已有规则
//! - 把任意规则渲染为完全加括号的条件字符串
//!
//! 所有树遍历都使用显式栈，表达式深度不受调用栈限制。

pub mod arena;
pub mod error;
pub mod models;
pub mod operators;
pub mod render;
pub mod store;
pub mod validator;

pub use arena::NodeArena;
pub use error::{CombineError, Result, RuleError, StructuralError, ValidationError};
pub use models::{ExpressionNode, NodeId, NodeKind, RuleSummary};
pub use operators::LogicalOperator;
pub use render::render;
pub use store::{RuleStore, RuleStoreStats};
pub use validator::{is_valid_condition, validate_condition};
