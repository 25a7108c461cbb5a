//! 表达式节点池
//!
//! 所有节点按写入顺序追加到同一个 Vec 中，用下标作为 `NodeId`。
//! 多条规则可以引用同一棵子树，节点只随整个 arena 一起释放。

use crate::models::{ExpressionNode, NodeId};
use crate::operators::LogicalOperator;

#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<ExpressionNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// 创建叶子节点，文本原样保存，不做校验
    pub fn make_leaf(&mut self, text: impl Into<String>) -> NodeId {
        self.push(ExpressionNode::Leaf { text: text.into() })
    }

    /// 创建组合节点
    ///
    /// 子节点应当是本 arena 中已有的节点。来自其他 arena 的编号不会被拒绝，
    /// 但编号不小于新节点的子引用在遍历时按悬空处理。
    pub fn make_combination(
        &mut self,
        operator: LogicalOperator,
        left: NodeId,
        right: NodeId,
    ) -> NodeId {
        self.push(ExpressionNode::Combination {
            operator,
            left,
            right,
        })
    }

    pub fn get(&self, id: NodeId) -> Option<&ExpressionNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ExpressionNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    fn push(&mut self, node: ExpressionNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// 直接写入任意节点，用于构造损坏的树
    #[cfg(test)]
    pub(crate) fn push_raw(&mut self, node: ExpressionNode) -> NodeId {
        self.push(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;

    #[test]
    fn test_ids_are_dense() {
        let mut arena = NodeArena::new();
        let a = arena.make_leaf("a = 1");
        let b = arena.make_leaf("b = 2");
        let c = arena.make_combination(LogicalOperator::And, a, b);

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(c.index(), 2);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_leaf_text_is_not_normalized() {
        let mut arena = NodeArena::new();
        let id = arena.make_leaf("  qty   >  10 ");

        assert_eq!(arena.get(id).unwrap().text(), Some("  qty   >  10 "));
    }

    #[test]
    fn test_shared_subtree() {
        let mut arena = NodeArena::new();
        let a = arena.make_leaf("a = 1");
        let b = arena.make_leaf("b = 2");
        let and = arena.make_combination(LogicalOperator::And, a, b);
        let or = arena.make_combination(LogicalOperator::Or, and, a);

        // a 同时被两个组合节点引用，不会被复制
        assert_eq!(arena.len(), 4);
        assert_eq!(arena.get(or).unwrap().children(), Some((and, a)));
        assert_eq!(arena.get(or).unwrap().kind(), NodeKind::Or);
    }

    #[test]
    fn test_get_missing() {
        let arena = NodeArena::new();
        assert!(arena.get(NodeId(0)).is_none());
        assert!(arena.is_empty());
    }
}
