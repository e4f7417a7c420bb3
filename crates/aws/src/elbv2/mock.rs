//! In-memory ELBv2 account for tests. Enabled by the `mock` feature.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use cloudsweep_core::ResourceError;

use super::api::{
    Elbv2Api, Listener, LoadBalancerSummary, Page, Rule, Tag, TagDescription,
};

#[derive(Default)]
struct MockState {
    load_balancers: Vec<(LoadBalancerSummary, Vec<Tag>)>,
    listeners: HashMap<String, Vec<Listener>>,
    rules: HashMap<String, Vec<Rule>>,
    fail_load_balancers: bool,
    /// Load balancer ARN -> index of the listener page that fails.
    listener_failures: HashMap<String, usize>,
    /// Listener ARN -> index of the rule page that fails.
    rule_failures: HashMap<String, usize>,
    calls: HashMap<&'static str, usize>,
    last_rule_page_size: Option<i32>,
}

/// An [`Elbv2Api`] backed by an in-memory account.
///
/// Listings are served in insertion order and split into pages of
/// `page_size` items (a single page by default). Failures can be injected per
/// load balancer or listener.
pub struct MockElbv2 {
    state: Mutex<MockState>,
    page_size: usize,
}

impl Default for MockElbv2 {
    fn default() -> Self {
        Self::new()
    }
}

impl MockElbv2 {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            page_size: usize::MAX,
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut MockState {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Split every listing into pages of at most `page_size` items.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_load_balancer(
        mut self,
        arn: impl Into<String>,
        name: impl Into<String>,
        tags: Vec<Tag>,
    ) -> Self {
        let summary = LoadBalancerSummary {
            arn: arn.into(),
            name: name.into(),
        };
        self.state_mut().load_balancers.push((summary, tags));
        self
    }

    #[must_use]
    pub fn with_listener(
        mut self,
        load_balancer_arn: impl Into<String>,
        listener_arn: impl Into<String>,
    ) -> Self {
        let load_balancer_arn = load_balancer_arn.into();
        self.state_mut()
            .listeners
            .entry(load_balancer_arn.clone())
            .or_default()
            .push(Listener {
                arn: listener_arn.into(),
                load_balancer_arn,
            });
        self
    }

    #[must_use]
    pub fn with_rule(
        mut self,
        listener_arn: impl Into<String>,
        rule_arn: impl Into<String>,
        is_default: Option<bool>,
    ) -> Self {
        self.state_mut()
            .rules
            .entry(listener_arn.into())
            .or_default()
            .push(Rule {
                arn: rule_arn.into(),
                is_default,
            });
        self
    }

    /// Make `DescribeLoadBalancers` fail.
    #[must_use]
    pub fn failing_load_balancers(mut self) -> Self {
        self.state_mut().fail_load_balancers = true;
        self
    }

    /// Make every `DescribeListeners` call for this load balancer fail.
    #[must_use]
    pub fn failing_listeners_for(self, load_balancer_arn: impl Into<String>) -> Self {
        self.failing_listener_page(load_balancer_arn, 0)
    }

    /// Make `DescribeListeners` fail when asked for the given (zero-based) page.
    #[must_use]
    pub fn failing_listener_page(
        mut self,
        load_balancer_arn: impl Into<String>,
        page: usize,
    ) -> Self {
        self.state_mut()
            .listener_failures
            .insert(load_balancer_arn.into(), page);
        self
    }

    /// Make every `DescribeRules` call for this listener fail.
    #[must_use]
    pub fn failing_rules_for(self, listener_arn: impl Into<String>) -> Self {
        self.failing_rule_page(listener_arn, 0)
    }

    /// Make `DescribeRules` fail when asked for the given (zero-based) page.
    #[must_use]
    pub fn failing_rule_page(mut self, listener_arn: impl Into<String>, page: usize) -> Self {
        self.state_mut()
            .rule_failures
            .insert(listener_arn.into(), page);
        self
    }

    /// Delete a rule behind the caller's back.
    pub fn remove_out_of_band(&self, rule_arn: &str) {
        for rules in self.state().rules.values_mut() {
            rules.retain(|rule| rule.arn != rule_arn);
        }
    }

    /// ARNs of every rule still present, across all listeners.
    pub fn rule_arns(&self) -> HashSet<String> {
        self.state()
            .rules
            .values()
            .flatten()
            .map(|rule| rule.arn.clone())
            .collect()
    }

    /// Number of calls made to the named API operation.
    pub fn calls(&self, operation: &str) -> usize {
        self.state().calls.get(operation).copied().unwrap_or(0)
    }

    /// Page size passed to the most recent `DescribeRules` call.
    pub fn last_rule_page_size(&self) -> Option<i32> {
        self.state().last_rule_page_size
    }

    fn record(&self, operation: &'static str) {
        *self.state().calls.entry(operation).or_insert(0) += 1;
    }

    fn page<T: Clone>(items: &[T], marker: Option<&str>, page_size: usize) -> Page<T> {
        let start = marker.and_then(|m| m.parse::<usize>().ok()).unwrap_or(0);
        let end = start.saturating_add(page_size).min(items.len());
        let next_marker = (end < items.len()).then(|| end.to_string());
        Page {
            items: items.get(start..end).unwrap_or_default().to_vec(),
            next_marker,
        }
    }

    fn page_index(marker: Option<&str>, page_size: usize) -> usize {
        marker
            .and_then(|m| m.parse::<usize>().ok())
            .map_or(0, |start| start / page_size)
    }
}

#[async_trait]
impl Elbv2Api for MockElbv2 {
    async fn describe_load_balancers(
        &self,
        marker: Option<String>,
    ) -> Result<Page<LoadBalancerSummary>, ResourceError> {
        self.record("DescribeLoadBalancers");
        let state = self.state();
        if state.fail_load_balancers {
            return Err(ResourceError::remote(
                "DescribeLoadBalancers",
                "AccessDenied: not authorized to describe load balancers",
            ));
        }
        let summaries: Vec<_> = state
            .load_balancers
            .iter()
            .map(|(summary, _)| summary.clone())
            .collect();
        Ok(Self::page(&summaries, marker.as_deref(), self.page_size))
    }

    async fn describe_tags(&self, arns: &[String]) -> Result<Vec<TagDescription>, ResourceError> {
        self.record("DescribeTags");
        if arns.len() > super::api::MAX_TAG_ARNS_PER_CALL {
            return Err(ResourceError::remote(
                "DescribeTags",
                "ValidationError: too many resource ARNs",
            ));
        }
        let state = self.state();
        Ok(state
            .load_balancers
            .iter()
            .filter(|(summary, _)| arns.contains(&summary.arn))
            .map(|(summary, tags)| TagDescription {
                resource_arn: summary.arn.clone(),
                tags: tags.clone(),
            })
            .collect())
    }

    async fn describe_listeners(
        &self,
        load_balancer_arn: &str,
        marker: Option<String>,
    ) -> Result<Page<Listener>, ResourceError> {
        self.record("DescribeListeners");
        let page_index = Self::page_index(marker.as_deref(), self.page_size);
        let state = self.state();
        if state.listener_failures.get(load_balancer_arn) == Some(&page_index) {
            return Err(ResourceError::remote(
                "DescribeListeners",
                format!("LoadBalancerNotFound: {load_balancer_arn}"),
            ));
        }
        let listeners = state
            .listeners
            .get(load_balancer_arn)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(Self::page(listeners, marker.as_deref(), self.page_size))
    }

    async fn describe_rules(
        &self,
        listener_arn: &str,
        page_size: i32,
        marker: Option<String>,
    ) -> Result<Page<Rule>, ResourceError> {
        self.record("DescribeRules");
        let mut state = self.state();
        state.last_rule_page_size = Some(page_size);
        let page_size = usize::try_from(page_size)
            .unwrap_or(1)
            .max(1)
            .min(self.page_size);
        let page_index = Self::page_index(marker.as_deref(), page_size);
        if state.rule_failures.get(listener_arn) == Some(&page_index) {
            return Err(ResourceError::remote(
                "DescribeRules",
                format!("Throttling: Rate exceeded for {listener_arn}"),
            ));
        }
        let rules = state
            .rules
            .get(listener_arn)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(Self::page(rules, marker.as_deref(), page_size))
    }

    async fn delete_rule(&self, rule_arn: &str) -> Result<(), ResourceError> {
        self.record("DeleteRule");
        let mut state = self.state();
        for rules in state.rules.values_mut() {
            if let Some(pos) = rules.iter().position(|rule| rule.arn == rule_arn) {
                if rules[pos].is_default() {
                    return Err(ResourceError::remote(
                        "DeleteRule",
                        "OperationNotPermitted: Default rules cannot be deleted",
                    ));
                }
                rules.remove(pos);
                return Ok(());
            }
        }
        Err(ResourceError::remote(
            "DeleteRule",
            format!("RuleNotFound: One or more rules not found: {rule_arn}"),
        ))
    }
}
