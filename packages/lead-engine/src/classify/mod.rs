//! Business-type classification.

pub mod fallback;
pub mod rules;

pub use fallback::{BudgetedClassifier, ClassifierChain};
pub use rules::{decide, KeywordCounts, RuleClassifier};
