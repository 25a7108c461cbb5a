//! 数据源
//!
//! 控制台通过 `DataSource` 发现表和列，并用渲染后的条件查询数据。
//! 条件字符串原样拼入 WHERE 子句，表名和列名使用双引号转义。

use async_trait::async_trait;
use rule_shared::database::Database;
use rule_shared::error::{Result, SharedError};
use sqlx::Row;
use std::fmt;
use tracing::{debug, instrument};

/// schema 限定的表名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// 解析 "schema.table" 或 "table"，后者使用默认 schema
    pub fn parse(input: &str, default_schema: &str) -> Result<Self> {
        let input = input.trim();
        let (schema, name) = match input.split_once('.') {
            Some((schema, name)) => (schema.trim(), name.trim()),
            None => (default_schema, input),
        };

        if schema.is_empty() || name.is_empty() || name.contains('.') {
            return Err(SharedError::InvalidIdentifier(input.to_string()));
        }

        Ok(Self::new(schema, name))
    }

    /// 转义后的 `"schema"."table"`
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// 双引号包裹标识符，内部的双引号加倍
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// 查询结果，所有值都已转为文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 构造查询语句：所有列转为 text，条件为空时不加 WHERE
pub fn build_select(table: &TableRef, columns: &[String], predicate: &str) -> String {
    let select_list = columns
        .iter()
        .map(|c| format!("{}::text", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");

    if predicate.trim().is_empty() {
        format!("SELECT {} FROM {}", select_list, table.quoted())
    } else {
        format!(
            "SELECT {} FROM {} WHERE {}",
            select_list,
            table.quoted(),
            predicate
        )
    }
}

/// 数据源接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    /// 列出所有基础表
    async fn list_tables(&self) -> Result<Vec<TableRef>>;

    /// 按定义顺序列出表的列名
    async fn list_columns(&self, table: &TableRef) -> Result<Vec<String>>;

    /// 用条件查询表数据
    async fn fetch_rows(&self, table: &TableRef, predicate: &str) -> Result<QueryRows>;
}

/// PostgreSQL 数据源
pub struct PgDataSource {
    db: Database,
}

impl PgDataSource {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DataSource for PgDataSource {
    #[instrument(skip(self))]
    async fn list_tables(&self) -> Result<Vec<TableRef>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT table_schema::text, table_name::text
            FROM information_schema.tables
            WHERE table_type = 'BASE TABLE'
              AND table_schema NOT IN ('pg_catalog', 'information_schema')
            ORDER BY table_schema, table_name
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        debug!(count = rows.len(), "tables discovered");
        Ok(rows
            .into_iter()
            .map(|(schema, name)| TableRef::new(schema, name))
            .collect())
    }

    #[instrument(skip(self, table), fields(table = %table))]
    async fn list_columns(&self, table: &TableRef) -> Result<Vec<String>> {
        let columns = sqlx::query_scalar::<_, String>(
            r#"
            SELECT column_name::text
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
            "#,
        )
        .bind(&table.schema)
        .bind(&table.name)
        .fetch_all(self.db.pool())
        .await?;

        Ok(columns)
    }

    #[instrument(skip(self, table), fields(table = %table))]
    async fn fetch_rows(&self, table: &TableRef, predicate: &str) -> Result<QueryRows> {
        let columns = self.list_columns(table).await?;
        if columns.is_empty() {
            return Err(SharedError::TableNotFound(table.to_string()));
        }

        let sql = build_select(table, &columns, predicate);
        debug!(%sql, "executing filtered query");

        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;
        let rows = rows
            .iter()
            .map(|row| {
                (0..columns.len())
                    .map(|i| row.try_get::<Option<String>, _>(i))
                    .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(QueryRows { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_ref() {
        assert_eq!(
            TableRef::parse("sales.orders", "public").unwrap(),
            TableRef::new("sales", "orders")
        );
        assert_eq!(
            TableRef::parse(" stores ", "public").unwrap(),
            TableRef::new("public", "stores")
        );
    }

    #[test]
    fn test_parse_invalid_table_ref() {
        for bad in ["", ".orders", "sales.", "a.b.c"] {
            assert!(TableRef::parse(bad, "public").is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("orders"), "\"orders\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(
            TableRef::new("sales", "orders").quoted(),
            "\"sales\".\"orders\""
        );
    }

    #[test]
    fn test_build_select() {
        let table = TableRef::new("sales", "orders");
        let columns = vec!["order_id".to_string(), "store_id".to_string()];

        assert_eq!(
            build_select(&table, &columns, "(store_id = 1 AND qty > 10)"),
            "SELECT \"order_id\"::text, \"store_id\"::text FROM \"sales\".\"orders\" WHERE (store_id = 1 AND qty > 10)"
        );
        assert_eq!(
            build_select(&table, &columns, "  "),
            "SELECT \"order_id\"::text, \"store_id\"::text FROM \"sales\".\"orders\""
        );
    }
}
