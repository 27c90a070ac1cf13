// File: src/logic/mod.rs
// Purpose: Conditional ("validate if") logic between master and dependent fields

pub mod criteria;
pub mod operator;

pub use criteria::{Criteria, CriteriaBuilder, CriteriaParent, Criterion, LogicNode, Standalone};
pub use operator::{LogicalOperator, Operator};
