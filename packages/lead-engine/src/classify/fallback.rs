//! Secondary classification behind a trigger, a call budget and a cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::error::ClassifyError;
use crate::traits::classifier::{Classification, Classifier, Pages};
use crate::types::{BusinessType, ClassifierConfig};

/// Wraps a secondary classifier with a per-period call budget and a
/// per-domain cache. A domain is sent to the inner classifier at most once
/// until [`BudgetedClassifier::reset_period`] is called.
pub struct BudgetedClassifier {
    inner: Arc<dyn Classifier>,
    budget: u32,
    used: AtomicU32,
    cache: RwLock<HashMap<String, Classification>>,
}

impl BudgetedClassifier {
    pub fn new(inner: Arc<dyn Classifier>, budget: u32) -> Self {
        Self {
            inner,
            budget,
            used: AtomicU32::new(0),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Calls still available this period.
    pub fn remaining(&self) -> u32 {
        self.budget.saturating_sub(self.used.load(Ordering::SeqCst))
    }

    /// Start a new period: restore the budget and forget cached verdicts.
    pub fn reset_period(&self) {
        self.used.store(0, Ordering::SeqCst);
        self.cache.write().unwrap().clear();
    }

    pub fn cached(&self, domain: &str) -> Option<Classification> {
        self.cache.read().unwrap().get(domain).cloned()
    }

    fn take_budget(&self) -> bool {
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < self.budget).then_some(used + 1)
            })
            .is_ok()
    }
}

#[async_trait]
impl Classifier for BudgetedClassifier {
    async fn classify(&self, domain: &str, pages: &Pages) -> Result<Classification, ClassifyError> {
        if let Some(hit) = self.cached(domain) {
            return Ok(hit);
        }
        if !self.take_budget() {
            return Err(ClassifyError::BudgetExhausted);
        }

        let result = self.inner.classify(domain, pages).await?;
        self.cache
            .write()
            .unwrap()
            .insert(domain.to_string(), result.clone());
        Ok(result)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Primary classifier, optionally followed by a secondary one.
///
/// The secondary runs only when the primary verdict is `unknown` or below
/// the confidence threshold. Its failures fall back to the primary verdict.
pub struct ClassifierChain {
    primary: Arc<dyn Classifier>,
    secondary: Option<Arc<dyn Classifier>>,
    confidence_threshold: f32,
}

impl ClassifierChain {
    pub fn new(primary: Arc<dyn Classifier>) -> Self {
        Self {
            primary,
            secondary: None,
            confidence_threshold: 0.5,
        }
    }

    /// Attach a secondary classifier, wrapped in the configured budget and cache.
    pub fn with_secondary(mut self, secondary: Arc<dyn Classifier>, config: &ClassifierConfig) -> Self {
        self.secondary = Some(Arc::new(BudgetedClassifier::new(
            secondary,
            config.secondary_budget_per_period,
        )));
        self.confidence_threshold = config.secondary_confidence_threshold;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Whether a verdict should be handed to the secondary classifier.
    pub fn should_escalate(&self, verdict: &Classification) -> bool {
        verdict.business_type == BusinessType::Unknown || verdict.confidence < self.confidence_threshold
    }
}

#[async_trait]
impl Classifier for ClassifierChain {
    async fn classify(&self, domain: &str, pages: &Pages) -> Result<Classification, ClassifyError> {
        let primary = self.primary.classify(domain, pages).await?;

        let Some(secondary) = &self.secondary else {
            return Ok(primary);
        };
        if !self.should_escalate(&primary) {
            return Ok(primary);
        }

        match secondary.classify(domain, pages).await {
            Ok(mut verdict) => {
                info!(
                    domain = %domain,
                    from = %primary.business_type,
                    to = %verdict.business_type,
                    classifier = secondary.name(),
                    "Secondary classification applied"
                );
                verdict
                    .reasons
                    .push(format!("classified by {}", secondary.name()));
                // Page hints come from the primary pass.
                verdict.hints.extend(primary.hints.iter().copied());
                Ok(verdict)
            }
            Err(ClassifyError::BudgetExhausted) => {
                debug!(domain = %domain, "Secondary classifier budget exhausted");
                Ok(primary)
            }
            Err(e) => {
                warn!(domain = %domain, error = %e, "Secondary classifier failed");
                Ok(primary)
            }
        }
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClassifier;

    fn secondary_config(budget: u32) -> ClassifierConfig {
        ClassifierConfig {
            secondary_budget_per_period: budget,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_confident_primary_skips_secondary() {
        let primary = Arc::new(MockClassifier::returning(Classification::new(BusinessType::ProductCompany, 0.8)));
        let secondary = Arc::new(MockClassifier::returning(Classification::new(BusinessType::ServiceAgency, 0.9)));
        let chain = ClassifierChain::new(primary).with_secondary(secondary.clone(), &secondary_config(5));

        let result = chain.classify("acme.io", &Pages::new()).await.unwrap();
        assert_eq!(result.business_type, BusinessType::ProductCompany);
        assert!(secondary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_escalates_once_per_domain() {
        let primary = Arc::new(MockClassifier::returning(Classification::unknown("thin")));
        let secondary = Arc::new(MockClassifier::returning(Classification::new(BusinessType::Consultancy, 0.7)));
        let chain = ClassifierChain::new(primary).with_secondary(secondary.clone(), &secondary_config(5));

        for _ in 0..3 {
            let result = chain.classify("bolt.dev", &Pages::new()).await.unwrap();
            assert_eq!(result.business_type, BusinessType::Consultancy);
        }
        assert_eq!(secondary.calls(), vec!["bolt.dev".to_string()]);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_keeps_primary() {
        let primary = Arc::new(MockClassifier::returning(Classification::new(BusinessType::ProductCompany, 0.2)));
        let secondary = Arc::new(MockClassifier::returning(Classification::new(BusinessType::ServiceAgency, 0.9)));
        let chain = ClassifierChain::new(primary).with_secondary(secondary.clone(), &secondary_config(1));

        let first = chain.classify("a.io", &Pages::new()).await.unwrap();
        let second = chain.classify("b.io", &Pages::new()).await.unwrap();

        assert_eq!(first.business_type, BusinessType::ServiceAgency);
        assert_eq!(second.business_type, BusinessType::ProductCompany);
        assert_eq!(secondary.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_secondary_failure_keeps_primary() {
        let primary = Arc::new(MockClassifier::returning(Classification::unknown("thin")));
        let secondary = Arc::new(MockClassifier::failing());
        let chain = ClassifierChain::new(primary).with_secondary(secondary, &secondary_config(5));

        let result = chain.classify("acme.io", &Pages::new()).await.unwrap();
        assert_eq!(result.business_type, BusinessType::Unknown);
    }

    #[tokio::test]
    async fn test_reset_period_restores_budget() {
        let inner = Arc::new(MockClassifier::returning(Classification::new(BusinessType::ProductCompany, 0.9)));
        let budgeted = BudgetedClassifier::new(inner.clone(), 1);

        budgeted.classify("a.io", &Pages::new()).await.unwrap();
        assert!(matches!(
            budgeted.classify("b.io", &Pages::new()).await,
            Err(ClassifyError::BudgetExhausted)
        ));

        budgeted.reset_period();
        assert_eq!(budgeted.remaining(), 1);
        budgeted.classify("b.io", &Pages::new()).await.unwrap();
        assert_eq!(inner.calls().len(), 2);
    }
}
