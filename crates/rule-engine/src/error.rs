//! 规则引擎错误类型
//!
//! 每个操作返回自己的窄错误类型，`RuleError` 汇总它们供上层统一处理。

use thiserror::Error;

/// 条件文本未通过语法检查
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("无效的条件: '{condition}'，需要非空且包含比较操作符 (=, >, <, !=)")]
pub struct ValidationError {
    pub condition: String,
}

impl ValidationError {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
        }
    }
}

/// 组合规则失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombineError {
    #[error("无效的操作: '{0}'，只支持 AND 或 OR")]
    UnknownOperation(String),

    #[error("规则索引越界: {index}，当前共 {len} 条规则")]
    IndexOutOfRange { index: usize, len: usize },
}

/// 表达式树结构损坏
///
/// 组合节点的子引用不存在，或编号不小于父节点时触发。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("表达式树结构错误: {operator} 节点可用操作数不足 (需要 2，实际 {available})")]
pub struct StructuralError {
    pub operator: String,
    pub available: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Combine(#[from] CombineError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("规则未找到: index={0}")]
    RuleNotFound(usize),
}

impl RuleError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Combine(CombineError::UnknownOperation(_)) => "UNKNOWN_OPERATION",
            Self::Combine(CombineError::IndexOutOfRange { .. }) => "INDEX_OUT_OF_RANGE",
            Self::Structural(_) => "STRUCTURAL_ERROR",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
        }
    }

    /// 是否由用户输入引起（可以提示用户重试）
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Structural(_))
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err: RuleError = CombineError::UnknownOperation("XOR".to_string()).into();
        assert_eq!(err.code(), "UNKNOWN_OPERATION");

        let err: RuleError = ValidationError::new("age").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_structural_error_is_not_user_error() {
        let err: RuleError = StructuralError {
            operator: "AND".to_string(),
            available: 1,
        }
        .into();
        assert!(!err.is_user_error());
        assert!(RuleError::RuleNotFound(3).is_user_error());
    }

    #[test]
    fn test_error_message() {
        let err = CombineError::IndexOutOfRange { index: 5, len: 1 };
        assert!(err.to_string().contains("5"));
        assert!(ValidationError::new("age").to_string().contains("'age'"));
    }
}
