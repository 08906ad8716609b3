//! Concurrent invocations sharing one registry.

mod common;

use std::sync::Arc;

use capgate_audit::AccessDecision;
use capgate_runtime::Acquire;
use capgate_test::{allow, echo_resource, modify, test_principal};
use common::Harness;
use serde_json::json;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_invocations_are_independent() {
    let harness = Arc::new(Harness::new());
    harness.registry.register(echo_resource("echo"));

    let mut tasks = Vec::new();
    for i in 0..64_u64 {
        let harness = Arc::clone(&harness);
        tasks.push(tokio::spawn(async move {
            let principal = if i % 2 == 0 {
                test_principal(vec![allow("echo", "read")])
            } else {
                test_principal(vec![modify("users", "read", "tag")])
            };
            let code = if i % 2 == 0 { "echo" } else { "users" };
            principal
                .acquire(&harness.registry, code)
                .unwrap()
                .call(json!({"id": i}))
                .await
                .unwrap()
        }));
    }

    let outputs: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    for (i, output) in outputs.iter().enumerate() {
        assert_eq!(output["id"], json!(i));
        if i % 2 == 1 {
            assert_eq!(output["tags"], json!(["tag"]));
        }
    }

    assert_eq!(harness.audit.count(AccessDecision::Allowed), 32);
    assert_eq!(harness.audit.count(AccessDecision::Filtered), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_registration_races_keep_one_resource() {
    let harness = Arc::new(Harness::new());

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move { harness.registry.register(echo_resource("shared")) })
        })
        .collect();

    let registered: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert!(registered.iter().all(|r| Arc::ptr_eq(r, &registered[0])));
    assert_eq!(harness.registry.len(), 2);
}

#[tokio::test]
async fn test_bound_invocation_is_reusable() {
    let harness = Harness::new();
    let invocation = test_principal(vec![allow("users", "read")])
        .acquire(&harness.registry, "users")
        .unwrap();

    let calls = (1..=3).map(|i| {
        let invocation = invocation.clone();
        async move { invocation.call(json!({"id": i})).await }
    });
    let outputs = futures::future::try_join_all(calls).await.unwrap();

    assert_eq!(outputs.len(), 3);
    assert_eq!(harness.audit.count(AccessDecision::Allowed), 3);
}
