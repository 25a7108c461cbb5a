//! 交互式会话
//!
//! 菜单循环负责所有输入输出，规则的创建、组合和渲染全部委托给 `RuleStore`。
//! 输入结束（EOF）等同于选择退出。

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use rule_engine::{RuleError, RuleStore};
use tracing::{error, info, warn};

use crate::source::{DataSource, QueryRows, TableRef};

/// 主菜单选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateRule,
    CombineRules,
    FetchData,
    ShowRules,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::CreateRule),
            "2" => Ok(Self::CombineRules),
            "3" => Ok(Self::FetchData),
            "4" => Ok(Self::ShowRules),
            "5" => Ok(Self::Exit),
            _ => Err(()),
        }
    }
}

/// 子流程结束后是否继续菜单循环
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

const MENU: &str = "\nChoose an action:\n\
    1. Create New Rule\n\
    2. Combine Existing Rules\n\
    3. Fetch Data Based on Rule\n\
    4. Show Existing Rules\n\
    5. Exit";

pub struct Session<R, W> {
    store: RuleStore,
    source: Option<Arc<dyn DataSource>>,
    input: R,
    output: W,
    default_schema: String,
    selected_table: Option<TableRef>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(
        store: RuleStore,
        source: Option<Arc<dyn DataSource>>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            store,
            source,
            input,
            output,
            default_schema: "public".to_string(),
            selected_table: None,
        }
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn selected_table(&self) -> Option<&TableRef> {
        self.selected_table.as_ref()
    }

    /// 启动时的表发现：列出表、选择一张表并显示其列
    ///
    /// 没有可用表或列、或输入结束时返回 None。
    pub async fn discover(&mut self) -> Result<Option<TableRef>> {
        let Some(source) = self.source.clone() else {
            return Ok(None);
        };

        let tables = match source.list_tables().await {
            Ok(tables) => tables,
            Err(e) => {
                warn!(error = %e, "failed to list tables");
                writeln!(self.output, "Error fetching tables: {}", e)?;
                Vec::new()
            }
        };
        if tables.is_empty() {
            writeln!(self.output, "No tables found in the database.")?;
            return Ok(None);
        }

        writeln!(self.output, "Available Tables:")?;
        for table in &tables {
            writeln!(self.output, "- {}", table)?;
        }

        let Some(answer) = self.prompt("\nSelect a table to view columns:")? else {
            return Ok(None);
        };
        let table = match TableRef::parse(&answer, &self.default_schema) {
            Ok(table) => table,
            Err(e) => {
                writeln!(self.output, "{}", e)?;
                return Ok(None);
            }
        };

        let columns = match source.list_columns(&table).await {
            Ok(columns) => columns,
            Err(e) => {
                warn!(error = %e, %table, "failed to list columns");
                writeln!(self.output, "Error fetching columns for table '{}': {}", table, e)?;
                Vec::new()
            }
        };
        if columns.is_empty() {
            writeln!(self.output, "No columns found in the table '{}'.", table)?;
            return Ok(None);
        }

        writeln!(self.output, "\nColumns in {}:", table)?;
        for column in &columns {
            writeln!(self.output, "- {}", column)?;
        }

        info!(%table, columns = columns.len(), "table selected");
        self.selected_table = Some(table.clone());
        Ok(Some(table))
    }

    /// 菜单循环，直到选择退出或输入结束
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(answer) = self.prompt(MENU)? else {
                break;
            };

            let flow = match answer.parse::<MenuChoice>() {
                Ok(MenuChoice::CreateRule) => self.create_rule()?,
                Ok(MenuChoice::CombineRules) => self.combine_rules()?,
                Ok(MenuChoice::FetchData) => self.fetch_data().await?,
                Ok(MenuChoice::ShowRules) => {
                    self.print_rules()?;
                    Flow::Continue
                }
                Ok(MenuChoice::Exit) => Flow::Exit,
                Err(()) => {
                    writeln!(self.output, "Invalid choice. Please try again.")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Exit {
                break;
            }
        }

        info!(rules = self.store.count(), "session finished");
        Ok(())
    }

    fn create_rule(&mut self) -> Result<Flow> {
        self.print_rules()?;

        let Some(condition) = self.read_condition()? else {
            return Ok(Flow::Exit);
        };

        match self.store.create_rule(&condition) {
            Ok(index) => {
                writeln!(self.output, "New Rule Created [{}]: {}", index, condition)?;
            }
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn combine_rules(&mut self) -> Result<Flow> {
        if self.store.count() < 2 {
            writeln!(
                self.output,
                "Not enough rules available to combine. Please create more rules first."
            )?;
            return Ok(Flow::Continue);
        }

        let Some(first) = self.prompt("Enter the index of the first rule to combine:")? else {
            return Ok(Flow::Exit);
        };
        let Ok(first) = first.trim().parse::<usize>() else {
            writeln!(self.output, "Invalid index for the first rule.")?;
            return Ok(Flow::Continue);
        };

        let Some(second) = self.prompt("Enter the index of the second rule to combine:")? else {
            return Ok(Flow::Exit);
        };
        let Ok(second) = second.trim().parse::<usize>() else {
            writeln!(self.output, "Invalid index for the second rule.")?;
            return Ok(Flow::Continue);
        };

        let Some(operation) = self.prompt("Enter operation (AND/OR):")? else {
            return Ok(Flow::Exit);
        };

        match self.store.combine_rules(first, second, operation.trim()) {
            Ok(index) => match self.store.render_rule(index) {
                Ok(condition) => {
                    writeln!(self.output, "Combined Rule [{}]: {}", index, condition)?;
                }
                Err(e) => self.report(e)?,
            },
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    async fn fetch_data(&mut self) -> Result<Flow> {
        let hint = match &self.selected_table {
            Some(table) => format!("Enter the table (schema.table) [{}]:", table),
            None => "Enter the table (schema.table):".to_string(),
        };
        let Some(answer) = self.prompt(&hint)? else {
            return Ok(Flow::Exit);
        };
        let table = match (answer.trim().is_empty(), &self.selected_table) {
            (true, Some(selected)) => selected.clone(),
            _ => match TableRef::parse(&answer, &self.default_schema) {
                Ok(table) => table,
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    return Ok(Flow::Continue);
                }
            },
        };

        let Some(fetch_choice) = self.prompt(
            "Select an option for fetching data:\n1. Use an existing rule\n2. Create a new rule",
        )?
        else {
            return Ok(Flow::Exit);
        };

        let condition = match fetch_choice.trim() {
            "1" => {
                if self.store.is_empty() {
                    writeln!(
                        self.output,
                        "No rules have been created yet. Please create a rule first."
                    )?;
                    return Ok(Flow::Continue);
                }
                self.print_rules()?;

                let Some(index) = self.prompt("Enter the index of the rule you want to use:")?
                else {
                    return Ok(Flow::Exit);
                };
                let rendered = index
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .map(|index| self.store.render_rule(index));
                match rendered {
                    Some(Ok(condition)) => condition,
                    Some(Err(e)) => {
                        self.report(e)?;
                        return Ok(Flow::Continue);
                    }
                    None => {
                        writeln!(self.output, "Invalid rule selection.")?;
                        return Ok(Flow::Continue);
                    }
                }
            }
            "2" => {
                let Some(condition) = self.read_condition()? else {
                    return Ok(Flow::Exit);
                };
                match self.store.create_rule(&condition) {
                    Ok(index) => {
                        writeln!(self.output, "New Rule Created [{}]: {}", index, condition)?;
                        condition
                    }
                    Err(e) => {
                        self.report(e)?;
                        return Ok(Flow::Continue);
                    }
                }
            }
            _ => {
                writeln!(self.output, "Invalid choice.")?;
                return Ok(Flow::Continue);
            }
        };

        let Some(source) = self.source.clone() else {
            writeln!(
                self.output,
                "No data source available (offline mode). Query filter: {}",
                condition
            )?;
            return Ok(Flow::Continue);
        };

        match source.fetch_rows(&table, &condition).await {
            Ok(rows) => self.print_rows(&rows)?,
            Err(e) => {
                warn!(error = %e, code = e.code(), %table, "filtered query failed");
                writeln!(self.output, "Error [{}]: {}", e.code(), e)?;
                if e.is_retryable() {
                    writeln!(
                        self.output,
                        "The database is temporarily unavailable. Please try again."
                    )?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// 依次读取左操作数、操作符、右操作数，用单个空格拼接
    fn read_condition(&mut self) -> Result<Option<String>> {
        let Some(first) =
            self.prompt("\nEnter the first operand (e.g., a column name like 'age'):")?
        else {
            return Ok(None);
        };
        let Some(operator) =
            self.prompt("Enter the operator (e.g., '>', '<', '=', '>=', '<=', '<>'):")?
        else {
            return Ok(None);
        };
        let Some(second) = self.prompt("Enter the second operand (e.g., a value like '30'):")?
        else {
            return Ok(None);
        };

        Ok(Some(format!("{} {} {}", first, operator, second)))
    }

    fn print_rules(&mut self) -> Result<()> {
        match self.store.list_all() {
            Ok(rules) if rules.is_empty() => {
                writeln!(self.output, "No rules have been created yet.")?;
            }
            Ok(rules) => {
                writeln!(self.output, "Existing Rules:")?;
                for rule in rules {
                    writeln!(self.output, "{}: {}", rule.index, rule.condition)?;
                }
            }
            Err(e) => self.report(e)?,
        }
        Ok(())
    }

    /// 输出规则操作的错误，结构损坏按内部错误记录
    fn report(&mut self, err: impl Into<RuleError>) -> Result<()> {
        let err = err.into();
        if err.is_user_error() {
            warn!(code = err.code(), error = %err, "rule operation rejected");
        } else {
            error!(code = err.code(), error = %err, "rule tree is corrupted");
        }
        writeln!(self.output, "Error [{}]: {}", err.code(), err)?;
        Ok(())
    }

    fn print_rows(&mut self, rows: &QueryRows) -> Result<()> {
        if rows.is_empty() {
            writeln!(self.output, "No data found for the specified condition.")?;
            return Ok(());
        }

        writeln!(self.output, "{}", rows.columns.join("\t"))?;
        for row in &rows.rows {
            let line = row
                .iter()
                .map(|value| value.as_deref().unwrap_or("NULL"))
                .collect::<Vec<_>>()
                .join("\t");
            writeln!(self.output, "{}", line)?;
        }
        writeln!(self.output, "({} rows)", rows.rows.len())?;
        Ok(())
    }

    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        writeln!(self.output, "{}", message)?;
        self.output.flush()?;
        self.read_line()
    }

    /// 读取一行并去掉换行符，EOF 返回 None
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
