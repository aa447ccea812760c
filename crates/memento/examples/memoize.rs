// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Function Memoization Example
//!
//! Demonstrates caching function results with keys derived from an expression, explicit
//! keys, scoping, and reading the hit counts afterwards.

use std::{sync::Arc, time::Duration};

use memento::{Captures, ExpirationPolicy, Expression, FunctionCache, MemoCache, Node, Value};
use tick::runtime::InactiveClock;

fn fibonacci(n: u64) -> u64 {
    (0..n).fold((0_u64, 1_u64), |(a, b), _| (b, a.saturating_add(b))).0
}

fn main() -> Result<(), memento::Error> {
    let (clock, _driver) = InactiveClock::default().activate();

    let functions = FunctionCache::new(
        MemoCache::builder(clock)
            .memory_with(|store| store.max_capacity(1_000))
            .name("example")
            .hit_count(true)
            .build(),
    );

    // Key derived from the argument of the call: each distinct `n` runs once
    for n in [10_u64, 20, 10, 10, 20] {
        let env = Arc::new(Captures::new().with("n", n));
        let expr = Expression::new(Node::call("fibonacci", [Node::captured(&env, "n")]), move || fibonacci(n));
        println!("fibonacci({n}) = {}", functions.get(&expr)?);
    }

    // Explicit key with a short time-to-live
    let greeting = functions.get_with_policy(
        || "hello".to_string(),
        ExpirationPolicy::TimeToLive(Duration::from_secs(30)),
        &[Value::from("greeting"), Value::from("en")],
    )?;
    println!("greeting = {greeting}");

    // Two functions with the same argument and result type need a scope to stay apart
    let env = Arc::new(Captures::new().with("n", 5_u64));
    let doubled = functions.get_scoped(
        "double",
        &Expression::new(Node::call("double", [Node::captured(&env, "n")]), || 10_u64),
    )?;
    let squared = functions.get_scoped(
        "square",
        &Expression::new(Node::call("square", [Node::captured(&env, "n")]), || 25_u64),
    )?;
    println!("double(5) = {doubled}, square(5) = {squared}");

    if let Some(totals) = functions.hit_counter().totals() {
        println!(
            "{} requests, {} executions across {} keys",
            totals.request_count(),
            totals.execution_count(),
            functions.hit_counter().len()
        );
    }

    Ok(())
}
