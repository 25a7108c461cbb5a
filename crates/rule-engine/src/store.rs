//! 规则存储管理
//!
//! 规则按创建顺序追加，下标即规则的句柄，永不删除。所有节点放在同一个
//! `NodeArena` 中，组合规则直接引用源规则的根节点，不复制子树。
//! 写操作在写锁内完成，读操作共享读锁。

use crate::arena::NodeArena;
use crate::error::{CombineError, Result, RuleError, StructuralError, ValidationError};
use crate::models::{ExpressionNode, NodeId, NodeKind, RuleSummary};
use crate::operators::LogicalOperator;
use crate::render;
use crate::validator::validate_condition;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct StoreInner {
    arena: NodeArena,
    /// 每条规则的根节点
    roots: Vec<NodeId>,
}

impl StoreInner {
    fn root(&self, index: usize) -> std::result::Result<NodeId, CombineError> {
        self.roots
            .get(index)
            .copied()
            .ok_or(CombineError::IndexOutOfRange {
                index,
                len: self.roots.len(),
            })
    }
}

/// 规则存储
#[derive(Clone, Default)]
pub struct RuleStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl RuleStore {
    /// 创建新的规则存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前规则数量
    pub fn count(&self) -> usize {
        self.inner.read().roots.len()
    }

    /// 检查存储是否为空
    pub fn is_empty(&self) -> bool {
        self.inner.read().roots.is_empty()
    }

    /// 校验条件并创建叶子规则，返回新规则的下标
    #[instrument(skip(self))]
    pub fn create_rule(&self, condition: &str) -> std::result::Result<usize, ValidationError> {
        if let Err(e) = validate_condition(condition) {
            warn!("拒绝无效条件");
            return Err(e);
        }

        let mut inner = self.inner.write();
        let root = inner.arena.make_leaf(condition);
        inner.roots.push(root);
        let index = inner.roots.len() - 1;

        info!(index, node = %root, "规则已创建");
        Ok(index)
    }

    /// 用 AND / OR 组合两条已有规则，返回新规则的下标
    ///
    /// 两条源规则保持不变且仍可单独访问，新规则与它们共享子树。
    #[instrument(skip(self))]
    pub fn combine_rules(
        &self,
        index_a: usize,
        index_b: usize,
        operation: &str,
    ) -> std::result::Result<usize, CombineError> {
        let mut inner = self.inner.write();

        let resolved = Self::resolve_combine(&inner, index_a, index_b, operation);
        let (left, right, operator) = match resolved {
            Ok(parts) => parts,
            Err(e) => {
                warn!(error = %e, "组合规则失败");
                return Err(e);
            }
        };

        let root = inner.arena.make_combination(operator, left, right);
        inner.roots.push(root);
        let index = inner.roots.len() - 1;

        info!(index, node = %root, %operator, "规则已组合");
        Ok(index)
    }

    fn resolve_combine(
        inner: &StoreInner,
        index_a: usize,
        index_b: usize,
        operation: &str,
    ) -> std::result::Result<(NodeId, NodeId, LogicalOperator), CombineError> {
        let left = inner.root(index_a)?;
        let right = inner.root(index_b)?;
        let operator = operation.parse::<LogicalOperator>()?;
        Ok((left, right, operator))
    }

    /// 获取规则的根节点，越界返回 None
    pub fn get_rule(&self, index: usize) -> Option<NodeId> {
        self.inner.read().roots.get(index).copied()
    }

    /// 获取节点副本
    pub fn node(&self, id: NodeId) -> Option<ExpressionNode> {
        self.inner.read().arena.get(id).cloned()
    }

    /// 渲染单条规则
    pub fn render_rule(&self, index: usize) -> Result<String> {
        let inner = self.inner.read();
        let root = inner
            .roots
            .get(index)
            .copied()
            .ok_or(RuleError::RuleNotFound(index))?;
        Ok(render::render(&inner.arena, root)?)
    }

    /// 规则引用的所有原子条件（按从左到右顺序）
    pub fn rule_leaves(&self, index: usize) -> Result<Vec<String>> {
        let inner = self.inner.read();
        let root = inner
            .roots
            .get(index)
            .copied()
            .ok_or(RuleError::RuleNotFound(index))?;
        Ok(render::leaves(&inner.arena, root)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// 按下标顺序列出所有规则及其渲染结果
    pub fn list_all(&self) -> std::result::Result<Vec<RuleSummary>, StructuralError> {
        let inner = self.inner.read();
        let summaries = inner
            .roots
            .iter()
            .enumerate()
            .map(|(index, root)| {
                render::render(&inner.arena, *root).map(|condition| RuleSummary { index, condition })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(count = summaries.len(), "列出全部规则");
        Ok(summaries)
    }

    /// 获取规则统计信息
    pub fn stats(&self) -> RuleStoreStats {
        let inner = self.inner.read();
        let leaf_count = inner
            .arena
            .iter()
            .filter(|(_, node)| node.kind() == NodeKind::Leaf)
            .count();
        let max_depth = inner
            .roots
            .iter()
            .map(|root| render::depth(&inner.arena, *root))
            .max()
            .unwrap_or(0);

        RuleStoreStats {
            rules_count: inner.roots.len(),
            node_count: inner.arena.len(),
            leaf_count,
            combination_count: inner.arena.len() - leaf_count,
            max_depth,
        }
    }
}

/// 规则存储统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStoreStats {
    /// 规则总数
    pub rules_count: usize,
    /// arena 中的节点总数（共享子树只计一次）
    pub node_count: usize,
    pub leaf_count: usize,
    pub combination_count: usize,
    /// 最深规则的深度
    pub max_depth: usize,
}
