use std::collections::HashSet;
use std::sync::Arc;

use cloudsweep_aws::config::Elbv2Config;
use cloudsweep_aws::elbv2::{
    self, BranchFailure, CancellableElbv2, Elbv2Api, ListenerRule, ListenerRuleEnumerator,
    MockElbv2, Tag, list_load_balancers,
};
use cloudsweep_core::{Resource, ResourceError, ResourceKindRegistry};
use tokio_util::sync::CancellationToken;

// -- Fixtures -------------------------------------------------------------

const LB1: &str = "arn:aws:elasticloadbalancing:us-east-1:123456789012:loadbalancer/app/web/1";
const LB2: &str = "arn:aws:elasticloadbalancing:us-east-1:123456789012:loadbalancer/app/api/2";
const LB1_L1: &str = "arn:aws:elasticloadbalancing:us-east-1:123456789012:listener/app/web/1/l1";
const LB1_L2: &str = "arn:aws:elasticloadbalancing:us-east-1:123456789012:listener/app/web/1/l2";
const LB2_L1: &str = "arn:aws:elasticloadbalancing:us-east-1:123456789012:listener/app/api/2/l1";

/// LB1 has two listeners with one default and one custom rule each; LB2 has
/// a single listener holding only its default rule.
fn two_load_balancer_account() -> MockElbv2 {
    MockElbv2::new()
        .with_load_balancer(
            LB1,
            "web",
            vec![Tag::new("env", "prod"), Tag::new("team", "edge")],
        )
        .with_load_balancer(LB2, "api", vec![Tag::new("env", "staging")])
        .with_listener(LB1, LB1_L1)
        .with_listener(LB1, LB1_L2)
        .with_listener(LB2, LB2_L1)
        .with_rule(LB1_L1, "arn:rule/web/l1/default", Some(true))
        .with_rule(LB1_L1, "arn:rule/web/l1/custom", Some(false))
        .with_rule(LB1_L2, "arn:rule/web/l2/default", Some(true))
        .with_rule(LB1_L2, "arn:rule/web/l2/custom", Some(false))
        .with_rule(LB2_L1, "arn:rule/api/l1/default", Some(true))
}

async fn enumerate(client: &Arc<dyn Elbv2Api>) -> Vec<ListenerRule> {
    let lbs = list_load_balancers(client).await.unwrap();
    ListenerRuleEnumerator::default().enumerate(&lbs).await
}

fn arns(rules: &[ListenerRule]) -> HashSet<String> {
    rules.iter().map(|r| r.rule_arn().to_owned()).collect()
}

// -- Scenarios ------------------------------------------------------------

#[tokio::test]
async fn default_rules_are_excluded_across_load_balancers() {
    let client: Arc<dyn Elbv2Api> = Arc::new(two_load_balancer_account());

    let rules = enumerate(&client).await;

    assert_eq!(rules.len(), 2);
    assert!(rules.iter().all(|r| r.load_balancer().arn() == LB1));
    assert!(rules.iter().all(|r| !r.rule().is_default()));
    assert_eq!(rules[0].rule_arn(), "arn:rule/web/l1/custom");
    assert_eq!(rules[1].rule_arn(), "arn:rule/web/l2/custom");
}

#[tokio::test]
async fn rule_listing_failure_is_isolated_to_its_listener() {
    let client: Arc<dyn Elbv2Api> =
        Arc::new(two_load_balancer_account().failing_rules_for(LB1_L2));
    let lbs = list_load_balancers(&client).await.unwrap();

    let outcome = ListenerRuleEnumerator::default().run(&lbs).await;

    assert_eq!(outcome.rules.len(), 1);
    assert_eq!(outcome.rules[0].rule_arn(), "arn:rule/web/l1/custom");
    assert_eq!(outcome.failures.len(), 1);
    match &outcome.failures[0] {
        BranchFailure::Rules {
            listener_arn,
            error,
        } => {
            assert_eq!(listener_arn, LB1_L2);
            assert!(matches!(
                error,
                ResourceError::Remote { operation, .. } if operation == "DescribeRules"
            ));
        }
        other => panic!("unexpected branch failure: {other:?}"),
    }
}

#[tokio::test]
async fn one_failing_listener_among_many_keeps_the_rest() {
    let mut mock = MockElbv2::new().with_load_balancer(LB1, "web", vec![]);
    for n in 0..5 {
        let listener = format!("{LB1_L1}-{n}");
        mock = mock
            .with_listener(LB1, listener.clone())
            .with_rule(listener.clone(), format!("arn:rule/{n}/default"), Some(true))
            .with_rule(listener.clone(), format!("arn:rule/{n}/a"), Some(false))
            .with_rule(listener, format!("arn:rule/{n}/b"), None);
    }
    let client: Arc<dyn Elbv2Api> = Arc::new(mock.failing_rules_for(format!("{LB1_L1}-2")));

    let rules = enumerate(&client).await;

    assert_eq!(rules.len(), 8);
    assert!(!arns(&rules).iter().any(|arn| arn.starts_with("arn:rule/2/")));
}

#[tokio::test]
async fn listener_page_failure_keeps_earlier_pages() {
    let client: Arc<dyn Elbv2Api> = Arc::new(
        two_load_balancer_account()
            .with_page_size(1)
            .failing_listener_page(LB1, 1),
    );
    let lbs = list_load_balancers(&client).await.unwrap();

    let outcome = ListenerRuleEnumerator::default().run(&lbs).await;

    let arns = arns(&outcome.rules);
    assert_eq!(
        arns,
        HashSet::from(["arn:rule/web/l1/custom".to_owned()])
    );
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].parent_arn(), LB1);
}

#[tokio::test]
async fn rule_page_failure_keeps_earlier_pages() {
    let client: Arc<dyn Elbv2Api> = Arc::new(
        MockElbv2::new()
            .with_page_size(2)
            .with_load_balancer(LB1, "web", vec![])
            .with_listener(LB1, LB1_L1)
            .with_rule(LB1_L1, "arn:rule/web/l1/default", Some(true))
            .with_rule(LB1_L1, "arn:rule/web/l1/a", Some(false))
            .with_rule(LB1_L1, "arn:rule/web/l1/b", Some(false))
            .with_rule(LB1_L1, "arn:rule/web/l1/c", Some(false))
            .failing_rule_page(LB1_L1, 1),
    );
    let lbs = list_load_balancers(&client).await.unwrap();

    let outcome = ListenerRuleEnumerator::default().run(&lbs).await;

    let arns: Vec<_> = outcome.rules.iter().map(ListenerRule::rule_arn).collect();
    assert_eq!(arns, vec!["arn:rule/web/l1/a"]);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(
        &outcome.failures[0],
        BranchFailure::Rules { listener_arn, .. } if listener_arn == LB1_L1
    ));
}

#[tokio::test]
async fn cancelled_enumeration_records_every_branch_as_failed() {
    let token = CancellationToken::new();
    let client: Arc<dyn Elbv2Api> = Arc::new(CancellableElbv2::new(
        Arc::new(two_load_balancer_account()),
        token.clone(),
    ));
    let lbs = list_load_balancers(&client).await.unwrap();
    assert_eq!(lbs.len(), 2);

    token.cancel();
    let outcome = ListenerRuleEnumerator::default().run(&lbs).await;

    assert!(outcome.rules.is_empty());
    assert_eq!(outcome.failures.len(), 2);
    for failure in &outcome.failures {
        assert!(matches!(failure, BranchFailure::Listeners { .. }));
        assert!(matches!(failure.error(), ResourceError::Cancelled));
    }
}

#[tokio::test]
async fn enumeration_is_idempotent() {
    let client: Arc<dyn Elbv2Api> = Arc::new(two_load_balancer_account().with_page_size(1));

    let first = enumerate(&client).await;
    let second = enumerate(&client).await;

    assert_eq!(arns(&first), arns(&second));
}

#[tokio::test]
async fn properties_carry_identifiers_and_exact_tag_set() {
    let client: Arc<dyn Elbv2Api> = Arc::new(two_load_balancer_account());

    for rule in enumerate(&client).await {
        let props = rule.properties();
        assert_eq!(props.get("ARN"), Some(rule.rule_arn()));
        assert_eq!(props.get("ListenerARN"), Some(rule.listener_arn()));
        assert_eq!(props.get("LoadBalancer"), Some("web"));

        let tags: HashSet<(String, String)> = props
            .tags()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        let expected: HashSet<(String, String)> = rule
            .load_balancer()
            .tags()
            .iter()
            .map(|t| (t.key.clone(), t.value.clone()))
            .collect();
        assert_eq!(tags, expected);
    }
}

#[tokio::test]
async fn display_string_format() {
    let client: Arc<dyn Elbv2Api> = Arc::new(two_load_balancer_account());

    for rule in enumerate(&client).await {
        assert_eq!(rule.to_string(), format!("web -> {}", rule.rule_arn()));
    }
}

#[tokio::test]
async fn deleting_an_already_removed_rule_fails_remotely() {
    let mock = Arc::new(two_load_balancer_account());
    let client: Arc<dyn Elbv2Api> = mock.clone();
    let rules = enumerate(&client).await;
    let target = &rules[0];

    mock.remove_out_of_band(target.rule_arn());
    let err = target.remove().await.unwrap_err();

    assert!(matches!(err, ResourceError::Remote { .. }));
    assert!(err.to_string().contains("RuleNotFound"));
}

#[tokio::test]
async fn deleting_twice_fails_the_second_time() {
    let mock = Arc::new(two_load_balancer_account());
    let client: Arc<dyn Elbv2Api> = mock.clone();
    let rules = enumerate(&client).await;

    rules[1].remove().await.unwrap();
    assert!(rules[1].remove().await.is_err());
    assert_eq!(mock.calls("DeleteRule"), 2);
    assert!(mock.rule_arns().contains(rules[0].rule_arn()));
}

// -- Registry wiring ------------------------------------------------------

#[tokio::test]
async fn registered_kind_lists_through_the_registry() {
    let client: Arc<dyn Elbv2Api> = Arc::new(two_load_balancer_account());
    let registry: ResourceKindRegistry = elbv2::register(
        ResourceKindRegistry::builder(),
        client,
        &Elbv2Config::default(),
    )
    .unwrap()
    .build();

    assert_eq!(registry.names(), vec!["ELBv2ListenerRule"]);

    let resources = registry
        .lister("ELBv2ListenerRule")
        .unwrap()
        .list()
        .await
        .unwrap();
    let displays: Vec<String> = resources.iter().map(ToString::to_string).collect();
    assert_eq!(
        displays,
        vec![
            "web -> arn:rule/web/l1/custom",
            "web -> arn:rule/web/l2/custom"
        ]
    );
}

#[tokio::test]
async fn registering_the_kind_twice_is_rejected() {
    let client: Arc<dyn Elbv2Api> = Arc::new(MockElbv2::new());
    let config = Elbv2Config::default();
    let builder =
        elbv2::register(ResourceKindRegistry::builder(), Arc::clone(&client), &config).unwrap();

    assert!(elbv2::register(builder, client, &config).is_err());
}
