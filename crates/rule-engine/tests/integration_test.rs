//! 规则引擎集成测试
//!
//! 覆盖创建、组合、渲染、列出的完整工作流。

use rule_engine::{
    CombineError, LogicalOperator, NodeArena, NodeKind, RuleError, RuleStore, is_valid_condition,
    render,
};

// ==================== 完整工作流测试 ====================

#[test]
fn test_store_and_qty_scenario() {
    let store = RuleStore::new();

    assert_eq!(store.create_rule("store_id = 1").unwrap(), 0);
    assert_eq!(store.create_rule("qty > 10").unwrap(), 1);

    let and = store.combine_rules(0, 1, "AND").unwrap();
    assert_eq!(and, 2);
    assert_eq!(store.render_rule(and).unwrap(), "(store_id = 1 AND qty > 10)");

    let or = store.combine_rules(2, 0, "OR").unwrap();
    assert_eq!(or, 3);
    assert_eq!(
        store.render_rule(or).unwrap(),
        "((store_id = 1 AND qty > 10) OR store_id = 1)"
    );

    let root = store.get_rule(or).unwrap();
    assert_eq!(store.node(root).unwrap().kind(), NodeKind::Or);
}

#[test]
fn test_indices_are_stable() {
    let store = RuleStore::new();
    store.create_rule("a = 1").unwrap();
    store.create_rule("b = 2").unwrap();
    let before = store.list_all().unwrap();

    store.combine_rules(0, 1, "AND").unwrap();
    store.create_rule("c = 3").unwrap();
    let _ = store.create_rule("invalid");
    let _ = store.combine_rules(0, 7, "AND");

    let after = store.list_all().unwrap();
    assert_eq!(&after[..2], &before[..]);
    assert_eq!(
        after.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
}

// ==================== 错误处理测试 ====================

#[test]
fn test_rejected_conditions() {
    let store = RuleStore::new();

    for bad in ["", "   ", "age"] {
        assert!(!is_valid_condition(bad));
        assert!(store.create_rule(bad).is_err());
    }

    assert_eq!(store.count(), 0);
}

#[test]
fn test_combine_rejections() {
    let store = RuleStore::new();
    store.create_rule("a = 1").unwrap();

    assert!(matches!(
        store.combine_rules(0, 5, "AND"),
        Err(CombineError::IndexOutOfRange { index: 5, .. })
    ));

    store.create_rule("b = 2").unwrap();
    assert!(matches!(
        store.combine_rules(0, 1, "XOR"),
        Err(CombineError::UnknownOperation(op)) if op == "XOR"
    ));

    assert_eq!(store.count(), 2);
}

#[test]
fn test_error_conversion() {
    let store = RuleStore::new();

    let err: RuleError = store.create_rule("age").unwrap_err().into();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = store.render_rule(3).unwrap_err();
    assert_eq!(err.code(), "RULE_NOT_FOUND");
}

// ==================== 渲染测试 ====================

#[test]
fn test_mixed_operators_keep_grouping() {
    let mut arena = NodeArena::new();
    let a = arena.make_leaf("a = 1");
    let b = arena.make_leaf("b = 2");
    let c = arena.make_leaf("c = 3");
    let d = arena.make_leaf("d = 4");
    let ab = arena.make_combination(LogicalOperator::Or, a, b);
    let cd = arena.make_combination(LogicalOperator::Or, c, d);
    let root = arena.make_combination(LogicalOperator::And, ab, cd);

    assert_eq!(
        render(&arena, root).unwrap(),
        "((a = 1 OR b = 2) AND (c = 3 OR d = 4))"
    );
}

#[test]
fn test_deep_left_skewed_chain_through_store() {
    let store = RuleStore::new();
    store.create_rule("x = 0").unwrap();

    let mut last = 0;
    for i in 1..10_000 {
        let leaf = store.create_rule(&format!("x = {}", i)).unwrap();
        last = store.combine_rules(last, leaf, "AND").unwrap();
    }

    let rendered = store.render_rule(last).unwrap();
    assert_eq!(rendered.matches('(').count(), 9_999);
    assert_eq!(rendered.matches(')').count(), 9_999);
    assert!(
        rendered
            .trim_start_matches('(')
            .starts_with("x = 0 AND x = 1) AND x = 2)")
    );
    assert!(rendered.ends_with(" AND x = 9999)"));

    let stats = store.stats();
    assert_eq!(stats.rules_count, 19_999);
    assert_eq!(stats.max_depth, 10_000);
}

#[test]
fn test_summary_serialization() {
    let store = RuleStore::new();
    store.create_rule("a = 1").unwrap();

    let json = serde_json::to_value(store.list_all().unwrap()).unwrap();
    assert_eq!(json, serde_json::json!([{ "index": 0, "condition": "a = 1" }]));
}
