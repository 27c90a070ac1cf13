// File: src/logic/criteria.rs
// Purpose: Criteria tree, its evaluation and client rendering, and the chained builder

use super::operator::{LogicalOperator, Operator};
use crate::constraint::ValidationContext;
use crate::error::{ConfigError, ValidatorError};

/// A single predicate over one master field
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    master: String,
    operator: Operator,
    args: Vec<String>,
}

impl Criterion {
    pub fn new(master: impl Into<String>, operator: Operator, args: Vec<String>) -> Result<Self, ConfigError> {
        operator.check_args(&args)?;
        Ok(Self {
            master: master.into(),
            operator,
            args,
        })
    }

    pub fn master(&self) -> &str {
        &self.master
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Comparison value as the client sees it; `min-max` for ranges
    pub fn value(&self) -> String {
        self.args.join("-")
    }

    pub fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<bool, ValidatorError> {
        let value = ctx
            .value_of(&self.master)
            .ok_or_else(|| ValidatorError::UnknownMasterField(self.master.clone()))?;
        Ok(self.operator.evaluate(&value, &self.args))
    }

    /// `$("#Master").evaluateEqualTo("value")`
    pub fn to_script(&self) -> String {
        format!(
            "$(\"#{}\").{}(\"{}\")",
            self.master,
            self.operator.client_name(),
            add_slashes(&self.value())
        )
    }
}

/// Backslash-escape quotes, backslashes and NUL for a double-quoted script literal
fn add_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '"' | '\'' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out
}

/// Child of a criteria node
#[derive(Debug, Clone, PartialEq)]
pub enum LogicNode {
    Criterion(Criterion),
    Group(Criteria),
}

impl LogicNode {
    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<bool, ValidatorError> {
        match self {
            LogicNode::Criterion(c) => c.evaluate(ctx),
            LogicNode::Group(g) => g.evaluate(ctx),
        }
    }

    fn to_script(&self) -> String {
        match self {
            LogicNode::Criterion(c) => c.to_script(),
            LogicNode::Group(g) => g.to_script(),
        }
    }
}

/// Ordered children combined with one logical operator.
///
/// Without an explicit operator the children combine with AND. An empty node
/// is vacuously true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    operator: Option<LogicalOperator>,
    children: Vec<LogicNode>,
}

impl Criteria {
    /// Start building a tree whose first predicates apply to `master`
    pub fn when(master: impl Into<String>) -> CriteriaBuilder<Standalone> {
        CriteriaBuilder::new(Standalone, master.into())
    }

    pub fn logical_operator(&self) -> Option<LogicalOperator> {
        self.operator
    }

    fn combinator(&self) -> LogicalOperator {
        self.operator.unwrap_or(LogicalOperator::And)
    }

    /// Direct children in declaration order
    pub fn criteria(&self) -> &[LogicNode] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Distinct master field names, recursively, in order of first appearance
    pub fn master_list(&self) -> Vec<String> {
        let mut masters = Vec::new();
        self.collect_masters(&mut masters);
        masters
    }

    fn collect_masters(&self, masters: &mut Vec<String>) {
        for child in &self.children {
            match child {
                LogicNode::Criterion(c) => {
                    if !masters.iter().any(|m| m == c.master()) {
                        masters.push(c.master().to_string());
                    }
                }
                LogicNode::Group(g) => g.collect_masters(masters),
            }
        }
    }

    /// Evaluate against current field values.
    ///
    /// Every child is evaluated so that an unknown master anywhere in the tree
    /// is reported regardless of short-circuiting.
    pub fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<bool, ValidatorError> {
        let results = self
            .children
            .iter()
            .map(|child| child.evaluate(ctx))
            .collect::<Result<Vec<bool>, _>>()?;

        let outcome = match self.combinator() {
            LogicalOperator::And => results.iter().all(|r| *r),
            LogicalOperator::Or => results.is_empty() || results.iter().any(|r| *r),
        };
        tracing::trace!(
            operator = ?self.combinator(),
            children = self.children.len(),
            outcome,
            "Criteria evaluated"
        );
        Ok(outcome)
    }

    /// Client expression, e.g. `($("#A").evaluateChecked("") && ...)`
    pub fn to_script(&self) -> String {
        if self.children.is_empty() {
            return "true".to_string();
        }
        let joiner = format!(" {} ", self.combinator().symbol());
        let parts: Vec<String> = self.children.iter().map(LogicNode::to_script).collect();
        format!("({})", parts.join(&joiner))
    }
}

/// Receives a finished criteria node from [`CriteriaBuilder::end`]
pub trait CriteriaParent {
    type Output;

    fn close(self, node: Criteria, error: Option<ConfigError>) -> Self::Output;
}

/// Parent of a tree built on its own with [`Criteria::when`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Standalone;

impl CriteriaParent for Standalone {
    type Output = Result<Criteria, ConfigError>;

    fn close(self, node: Criteria, error: Option<ConfigError>) -> Self::Output {
        match error {
            Some(e) => Err(e),
            None => Ok(node),
        }
    }
}

/// Chained construction of a criteria node.
///
/// Predicate calls apply to the current master field. The first mistake is
/// kept and reported by [`CriteriaBuilder::end`] on the outermost node.
#[must_use = "criteria are only recorded when end() is called"]
pub struct CriteriaBuilder<P: CriteriaParent> {
    parent: P,
    master: String,
    node: Criteria,
    error: Option<ConfigError>,
}

impl<P: CriteriaParent> CriteriaBuilder<P> {
    pub(crate) fn new(parent: P, master: String) -> Self {
        Self {
            parent,
            master,
            node: Criteria::default(),
            error: None,
        }
    }

    fn record(&mut self, error: ConfigError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn logical(mut self, operator: LogicalOperator, master: &str) -> Self {
        match self.node.operator {
            Some(first) if first != operator => self.record(ConfigError::ConflictingLogicalOperator {
                first: first.call_name(),
                attempted: operator.call_name(),
            }),
            _ => self.node.operator = Some(operator),
        }
        if !master.is_empty() {
            self.master = master.to_string();
        }
        self
    }

    /// Combine this node's children with AND and switch to `master`
    pub fn and_if(self, master: &str) -> Self {
        self.logical(LogicalOperator::And, master)
    }

    /// Combine this node's children with OR and switch to `master`
    pub fn or_if(self, master: &str) -> Self {
        self.logical(LogicalOperator::Or, master)
    }

    /// Add a predicate by operator name, e.g. `("isGreaterThan", &["5"])`
    pub fn criterion(mut self, name: &str, args: &[&str]) -> Self {
        match Operator::from_name(name) {
            Ok(operator) => self.push(operator, args.iter().map(|a| a.to_string()).collect()),
            Err(e) => {
                self.record(e);
                self
            }
        }
    }

    fn push(mut self, operator: Operator, args: Vec<String>) -> Self {
        match Criterion::new(self.master.clone(), operator, args) {
            Ok(criterion) => self.node.children.push(LogicNode::Criterion(criterion)),
            Err(e) => self.record(e),
        }
        self
    }

    pub fn is_equal_to(self, value: impl ToString) -> Self {
        self.push(Operator::EqualTo, vec![value.to_string()])
    }

    pub fn is_not_equal_to(self, value: impl ToString) -> Self {
        self.push(Operator::NotEqualTo, vec![value.to_string()])
    }

    pub fn is_greater_than(self, value: impl ToString) -> Self {
        self.push(Operator::GreaterThan, vec![value.to_string()])
    }

    pub fn is_less_than(self, value: impl ToString) -> Self {
        self.push(Operator::LessThan, vec![value.to_string()])
    }

    pub fn contains(self, value: impl ToString) -> Self {
        self.push(Operator::Contains, vec![value.to_string()])
    }

    pub fn is_empty(self) -> Self {
        self.push(Operator::Empty, Vec::new())
    }

    pub fn is_not_empty(self) -> Self {
        self.push(Operator::NotEmpty, Vec::new())
    }

    pub fn is_checked(self) -> Self {
        self.push(Operator::Checked, Vec::new())
    }

    pub fn is_not_checked(self) -> Self {
        self.push(Operator::NotChecked, Vec::new())
    }

    pub fn has_checked_option(self, value: impl ToString) -> Self {
        self.push(Operator::HasCheckedOption, vec![value.to_string()])
    }

    pub fn has_checked_at_least(self, count: usize) -> Self {
        self.push(Operator::HasCheckedAtLeast, vec![count.to_string()])
    }

    pub fn has_checked_less_than(self, count: usize) -> Self {
        self.push(Operator::HasCheckedLessThan, vec![count.to_string()])
    }

    /// Inclusive numeric range
    pub fn is_between(self, min: impl ToString, max: impl ToString) -> Self {
        self.push(Operator::Between, vec![min.to_string(), max.to_string()])
    }

    /// Open a nested node. It starts on the current master and its own
    /// logical operator; `end()` returns to this builder.
    pub fn group(self) -> CriteriaBuilder<Self> {
        let master = self.master.clone();
        CriteriaBuilder::new(self, master)
    }

    /// Finish this node and hand it to the parent
    pub fn end(self) -> P::Output {
        self.parent.close(self.node, self.error)
    }
}

impl<P: CriteriaParent> CriteriaParent for CriteriaBuilder<P> {
    type Output = CriteriaBuilder<P>;

    fn close(mut self, node: Criteria, error: Option<ConfigError>) -> Self::Output {
        if let Some(e) = error {
            self.record(e);
        }
        self.node.children.push(LogicNode::Group(node));
        self
    }
}
