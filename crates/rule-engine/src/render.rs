//! 表达式渲染
//!
//! 把表达式树转换为完全加括号的条件字符串。树的深度由调用方决定，
//! 所有遍历都使用显式栈，不使用递归。

use crate::arena::NodeArena;
use crate::error::StructuralError;
use crate::models::{ExpressionNode, NodeId};
use crate::operators::LogicalOperator;

enum Frame {
    /// 展开节点
    Visit(NodeId),
    /// 左子树已写完，写入 ` OP `
    Operator(LogicalOperator),
    /// 两个子节点都已归约：`base` 是展开该节点时已有的操作数个数
    Reduce {
        operator: LogicalOperator,
        base: usize,
    },
}

/// 子节点一定先于父节点写入，编号不小于父节点的引用视为悬空
///
/// 这保证沿任意路径编号严格递减，遍历必然终止。
fn child_of(parent: NodeId, child: NodeId) -> Option<NodeId> {
    (child < parent).then_some(child)
}

/// 后序归约渲染 `root`
///
/// 叶子输出原始文本，组合节点输出 `(left OP right)`，每一层都加括号。
/// 文本直接追加到同一个缓冲区，栈上只记录操作数个数；归约时该节点下
/// 必须恰好新增了两个操作数，否则返回 `StructuralError`。
/// `root` 不在 arena 中时视为空树，返回空字符串。
pub fn render(arena: &NodeArena, root: NodeId) -> Result<String, StructuralError> {
    let mut stack = vec![Frame::Visit(root)];
    let mut out = String::new();
    let mut operands = 0usize;

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Visit(id) => match arena.get(id) {
                Some(ExpressionNode::Leaf { text }) => {
                    out.push_str(text);
                    operands += 1;
                }
                Some(ExpressionNode::Combination {
                    operator,
                    left,
                    right,
                }) => {
                    out.push('(');
                    stack.push(Frame::Reduce {
                        operator: *operator,
                        base: operands,
                    });
                    // 悬空引用不展开，也不产生操作数，由 Reduce 报告
                    stack.extend(child_of(id, *right).map(Frame::Visit));
                    stack.push(Frame::Operator(*operator));
                    stack.extend(child_of(id, *left).map(Frame::Visit));
                }
                None => {}
            },
            Frame::Operator(operator) => {
                out.push(' ');
                out.push_str(operator.symbol());
                out.push(' ');
            }
            Frame::Reduce { operator, base } => {
                let available = operands - base;
                if available < 2 {
                    return Err(StructuralError {
                        operator: operator.to_string(),
                        available,
                    });
                }
                operands = base + 1;
                out.push(')');
            }
        }
    }

    Ok(out)
}

/// 按从左到右的顺序收集叶子条件，共享子树会重复出现，悬空引用被跳过
pub fn leaves(arena: &NodeArena, root: NodeId) -> Vec<&str> {
    let mut stack = vec![root];
    let mut out = Vec::new();

    while let Some(id) = stack.pop() {
        match arena.get(id) {
            Some(ExpressionNode::Leaf { text }) => out.push(text.as_str()),
            Some(ExpressionNode::Combination { left, right, .. }) => {
                stack.extend(child_of(id, *right));
                stack.extend(child_of(id, *left));
            }
            None => {}
        }
    }

    out
}

/// 树的深度，单个叶子为 1，空树为 0
pub fn depth(arena: &NodeArena, root: NodeId) -> usize {
    let mut stack = vec![(root, 1usize)];
    let mut max = 0;

    while let Some((id, level)) = stack.pop() {
        match arena.get(id) {
            Some(ExpressionNode::Leaf { .. }) => max = max.max(level),
            Some(ExpressionNode::Combination { left, right, .. }) => {
                max = max.max(level);
                for child in [*right, *left].into_iter().filter_map(|c| child_of(id, c)) {
                    stack.push((child, level + 1));
                }
            }
            None => {}
        }
    }

    max
}
