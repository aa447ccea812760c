// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `ProcedureCache`.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, SystemTime},
};

use memento::{ErrorKind, ExpirationPolicy, InMemoryStore, MemoCache, ProcedureCache, SqlSource, StoredValue, Table, Value};
use tick::{Clock, ClockControl};

#[derive(Debug, Default)]
struct FakeDatabase {
    calls: AtomicUsize,
}

impl FakeDatabase {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SqlSource for FakeDatabase {
    type Error = std::io::Error;

    fn procedure_table(&self, name: &str, params: &[Value]) -> Result<Table, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match name {
            "get_customer" => Ok(Table::new(["id", "name"]).with_row(vec![params[0].clone(), Value::from("Ada")])),
            "find_nobody" => Ok(Table::new(["id", "name"])),
            _ => Err(std::io::Error::other(format!("unknown procedure {name}"))),
        }
    }

    fn procedure_field(&self, name: &str, _params: &[Value]) -> Result<Value, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match name {
            "count_orders" => Ok(Value::from(12)),
            _ => Err(std::io::Error::other(format!("unknown procedure {name}"))),
        }
    }
}

fn procedures() -> ProcedureCache<FakeDatabase, InMemoryStore<StoredValue>> {
    ProcedureCache::new(
        FakeDatabase::default(),
        MemoCache::builder(Clock::new_frozen()).memory().hit_count(true).build(),
    )
}

#[test]
fn table_is_fetched_once_per_parameter_set() {
    let procedures = procedures();

    for _ in 0..3 {
        let table = procedures
            .execute_procedure("get_customer", &[Value::from(7)])
            .expect("procedure failed");
        assert_eq!(table.first_row_field("name"), Value::from("Ada"));
    }
    let _ = procedures
        .execute_procedure("get_customer", &[Value::from(8)])
        .expect("procedure failed");

    assert_eq!(procedures.source().calls(), 2);
}

#[test]
fn field_reads_first_row() {
    let procedures = procedures();

    let name = procedures
        .execute_procedure_field("get_customer", "name", &[Value::from(1)])
        .expect("procedure failed");
    let again = procedures
        .execute_procedure_field("get_customer", "name", &[Value::from(1)])
        .expect("procedure failed");

    assert_eq!(name, Value::from("Ada"));
    assert_eq!(again, name);
    assert_eq!(procedures.source().calls(), 1);
}

#[test]
fn field_is_null_for_empty_result_or_unknown_column() {
    let procedures = procedures();

    let empty = procedures
        .execute_procedure_field("find_nobody", "name", &[])
        .expect("procedure failed");
    let unknown = procedures
        .execute_procedure_field("get_customer", "email", &[Value::from(1)])
        .expect("procedure failed");

    assert!(empty.is_null());
    assert!(unknown.is_null());
}

#[test]
fn different_columns_are_cached_separately() {
    let procedures = procedures();

    let id = procedures
        .execute_procedure_field("get_customer", "id", &[Value::from(5)])
        .expect("procedure failed");
    let name = procedures
        .execute_procedure_field("get_customer", "name", &[Value::from(5)])
        .expect("procedure failed");

    assert_eq!((id, name), (Value::from(5), Value::from("Ada")));
    assert_eq!(procedures.source().calls(), 2);
}

#[test]
fn scalar_is_cached() {
    let procedures = procedures();

    for _ in 0..4 {
        let count = procedures
            .execute_scalar("count_orders", &[Value::from("2024")])
            .expect("procedure failed");
        assert_eq!(count, Value::Int(12));
    }

    assert_eq!(procedures.source().calls(), 1);
    let totals = procedures.cache().hit_counter().totals().expect("calls should have been counted");
    assert_eq!((totals.execution_count(), totals.request_count()), (1, 4));
}

#[test]
fn empty_name_is_rejected() {
    let procedures = procedures();

    let err = procedures.execute_procedure("", &[]).expect_err("empty name should fail");

    assert_eq!(err.kind(), ErrorKind::NullInput);
    assert_eq!(procedures.source().calls(), 0);
}

#[test]
fn source_failure_is_not_cached() {
    let procedures = procedures();

    for expected_calls in 1..=2 {
        let err = procedures
            .execute_procedure("drop_everything", &[])
            .expect_err("unknown procedure should fail");
        assert_eq!(err.kind(), ErrorKind::ProducerFailure);
        assert_eq!(procedures.source().calls(), expected_calls);
    }
}

#[test]
fn null_parameter_cannot_form_a_key() {
    let procedures = procedures();

    let err = procedures
        .execute_scalar("count_orders", &[Value::Null])
        .expect_err("null parameter should fail");

    assert_eq!(err.kind(), ErrorKind::KeyRender);
    assert_eq!(procedures.source().calls(), 0);
}

#[test]
fn policy_overloads_apply_to_field_and_scalar() {
    let control = ClockControl::new_at(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000));
    let procedures = ProcedureCache::new(FakeDatabase::default(), MemoCache::builder(control.to_clock()).memory().build());
    let short = ExpirationPolicy::TimeToLive(Duration::from_secs(10));

    let run_all = || {
        let name = procedures
            .execute_procedure_field_with_policy("get_customer", "name", short, &[Value::from(1)])
            .expect("field failed");
        let count = procedures
            .execute_scalar_with_policy("count_orders", short, &[])
            .expect("scalar failed");
        let table = procedures
            .execute_procedure("get_customer", &[Value::from(1)])
            .expect("table failed");
        assert_eq!(name, Value::from("Ada"));
        assert_eq!(count, Value::Int(12));
        assert_eq!(table.len(), 1);
    };

    run_all();
    run_all();
    assert_eq!(procedures.source().calls(), 3);

    control.advance(Duration::from_secs(11));
    run_all();
    assert_eq!(procedures.source().calls(), 5, "only the short-lived field and scalar run again");
}
