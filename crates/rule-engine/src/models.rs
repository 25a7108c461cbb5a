//! 表达式树领域模型

use crate::operators::LogicalOperator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// arena 中节点的编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 节点种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Leaf,
    And,
    Or,
}

impl From<LogicalOperator> for NodeKind {
    fn from(operator: LogicalOperator) -> Self {
        match operator {
            LogicalOperator::And => Self::And,
            LogicalOperator::Or => Self::Or,
        }
    }
}

/// 表达式节点（原子条件或二元逻辑组合）
///
/// 组合节点通过 `NodeId` 引用子节点，子节点一定先于父节点写入 arena。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpressionNode {
    Leaf {
        text: String,
    },
    Combination {
        operator: LogicalOperator,
        left: NodeId,
        right: NodeId,
    },
}

impl ExpressionNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Leaf { .. } => NodeKind::Leaf,
            Self::Combination { operator, .. } => (*operator).into(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// 叶子节点的条件文本
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Leaf { text } => Some(text),
            Self::Combination { .. } => None,
        }
    }

    /// 组合节点的左右子节点
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self {
            Self::Leaf { .. } => None,
            Self::Combination { left, right, .. } => Some((*left, *right)),
        }
    }
}

/// `list_all` 的单条输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub index: usize,
    pub condition: String,
}
