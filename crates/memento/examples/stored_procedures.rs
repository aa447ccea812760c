// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Stored Procedure Cache Example
//!
//! Demonstrates caching stored-procedure results in front of a database, with cache
//! decisions logged through `tracing`.

use std::sync::atomic::{AtomicUsize, Ordering};

use memento::{MemoCache, ProcedureCache, SqlSource, Table, Value};
use tick::runtime::InactiveClock;

/// Stands in for a real database connection.
#[derive(Debug, Default)]
struct Database {
    round_trips: AtomicUsize,
}

impl SqlSource for Database {
    type Error = std::io::Error;

    fn procedure_table(&self, name: &str, params: &[Value]) -> Result<Table, Self::Error> {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        match name {
            "usp_get_product" => {
                let id = params.first().cloned().unwrap_or(Value::Null);
                Ok(Table::new(["id", "name", "price"]).with_row(vec![id, Value::from("widget"), Value::from(9.99)]))
            }
            _ => Err(std::io::Error::other(format!("no such procedure: {name}"))),
        }
    }

    fn procedure_field(&self, name: &str, _params: &[Value]) -> Result<Value, Self::Error> {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
        match name {
            "usp_count_products" => Ok(Value::from(1_204)),
            _ => Err(std::io::Error::other(format!("no such procedure: {name}"))),
        }
    }
}

fn main() -> Result<(), memento::Error> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let (clock, _driver) = InactiveClock::default().activate();
    let procedures = ProcedureCache::new(
        Database::default(),
        MemoCache::builder(clock)
            .memory()
            .name("procedures")
            .enable_logs()
            .build(),
    );

    for _ in 0..3 {
        let product = procedures.execute_procedure("usp_get_product", &[Value::from(42)])?;
        let name = product.first_row_field("name");
        let price = procedures.execute_procedure_field("usp_get_product", "price", &[Value::from(42)])?;
        println!("product 42: {name:?} at {price:?}");
    }

    let count = procedures.execute_scalar("usp_count_products", &[])?;
    println!("{count:?} products");

    if let Err(e) = procedures.execute_procedure("usp_missing", &[]) {
        println!("expected failure: {e}");
    }

    println!(
        "{} database round trips",
        procedures.source().round_trips.load(Ordering::Relaxed)
    );

    Ok(())
}
