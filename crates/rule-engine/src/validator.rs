//! 条件文本的语法检查
//!
//! 只检查非空和是否含有比较操作符，不解析操作数，也不防注入。

use crate::error::ValidationError;

/// 被视为比较操作符的子串
pub const COMPARISON_OPERATORS: [&str; 4] = ["=", ">", "<", "!="];

pub fn is_valid_condition(text: &str) -> bool {
    !text.trim().is_empty() && COMPARISON_OPERATORS.iter().any(|op| text.contains(op))
}

pub fn validate_condition(text: &str) -> Result<(), ValidationError> {
    if is_valid_condition(text) {
        Ok(())
    } else {
        Err(ValidationError::new(text))
    }
}
