// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Memoization of stored-procedure results.
//!
//! [`ProcedureCache`] sits in front of any [`SqlSource`] and caches what it returns under
//! keys made of the procedure name and its parameters.

use memento_store::{ExpirationPolicy, ExpiringStore};

use crate::{CacheKey, Error, MemoCache, Result, Value, cache::StoredValue};

/// A backend able to run stored procedures.
///
/// # Examples
///
/// ```
/// use memento::{SqlSource, Table, Value};
///
/// struct Inventory;
///
/// impl SqlSource for Inventory {
///     type Error = std::io::Error;
///
///     fn procedure_table(&self, _name: &str, params: &[Value]) -> Result<Table, Self::Error> {
///         Ok(Table::new(["sku"]).with_row(vec![params[0].clone()]))
///     }
///
///     fn procedure_field(&self, _name: &str, _params: &[Value]) -> Result<Value, Self::Error> {
///         Ok(Value::from(3))
///     }
/// }
/// ```
pub trait SqlSource: Send + Sync {
    /// The error returned when a procedure fails.
    type Error: Into<Box<dyn std::error::Error + Send + Sync>>;

    /// Runs the procedure and returns its result set.
    ///
    /// # Errors
    ///
    /// Returns an error if the procedure cannot be run.
    fn procedure_table(&self, name: &str, params: &[Value]) -> std::result::Result<Table, Self::Error>;

    /// Runs the procedure and returns the first column of its first row.
    ///
    /// # Errors
    ///
    /// Returns an error if the procedure cannot be run.
    fn procedure_field(&self, name: &str, params: &[Value]) -> std::result::Result<Value, Self::Error>;
}

/// A result set with named columns.
///
/// Rows shorter than the column list read as [`Value::Null`] in the missing positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    #[must_use]
    pub fn new<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    #[must_use]
    pub fn with_row(mut self, row: Vec<Value>) -> Self {
        self.push_row(row);
        self
    }

    /// Appends a row in place.
    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of `column`.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Returns the value of `column` in row `row`, if both exist.
    #[must_use]
    pub fn field(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Returns the value of `column` in the first row.
    ///
    /// Returns [`Value::Null`] when the table has no rows or no such column.
    ///
    /// # Examples
    ///
    /// ```
    /// use memento::{Table, Value};
    ///
    /// let table = Table::new(["id", "name"]).with_row(vec![Value::from(7), Value::from("ada")]);
    /// assert_eq!(table.first_row_field("name"), Value::from("ada"));
    /// assert_eq!(table.first_row_field("email"), Value::Null);
    /// assert_eq!(Table::new(["id"]).first_row_field("id"), Value::Null);
    /// ```
    #[must_use]
    pub fn first_row_field(&self, column: &str) -> Value {
        self.field(0, column).cloned().unwrap_or(Value::Null)
    }
}

/// Caches stored-procedure results.
///
/// Keys are the procedure name followed by its parameters, so the same procedure called
/// with the same parameters is run once until the entry expires. The table and scalar
/// forms of a procedure share that key; reading one form after the other replaces the
/// cached value.
#[derive(Debug)]
pub struct ProcedureCache<Q, S> {
    source: Q,
    cache: MemoCache<S>,
}

impl<Q, S> ProcedureCache<Q, S> {
    /// Creates a procedure cache over `source`, storing results in `cache`.
    #[must_use]
    pub fn new(source: Q, cache: MemoCache<S>) -> Self {
        Self { source, cache }
    }

    /// Returns the underlying source.
    #[must_use]
    pub fn source(&self) -> &Q {
        &self.source
    }

    /// Returns the underlying cache.
    #[must_use]
    pub fn cache(&self) -> &MemoCache<S> {
        &self.cache
    }
}

impl<Q, S> ProcedureCache<Q, S>
where
    Q: SqlSource,
    S: ExpiringStore<StoredValue>,
{
    /// Returns the result set of `name` called with `params`, running it on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NullInput`](crate::ErrorKind::NullInput) for an empty name,
    /// [`ErrorKind::KeyRender`](crate::ErrorKind::KeyRender) for a parameter without a
    /// string form, [`ErrorKind::ProducerFailure`](crate::ErrorKind::ProducerFailure) if the
    /// procedure fails, or the store's error.
    pub fn execute_procedure(&self, name: &str, params: &[Value]) -> Result<Table> {
        self.table(name, params, None)
    }

    /// Like [`execute_procedure`](Self::execute_procedure), storing a new result with the
    /// given policy.
    ///
    /// # Errors
    ///
    /// See [`execute_procedure`](Self::execute_procedure).
    pub fn execute_procedure_with_policy(&self, name: &str, policy: ExpirationPolicy, params: &[Value]) -> Result<Table> {
        self.table(name, params, Some(policy))
    }

    /// Returns `column` of the first row of `name` called with `params`.
    ///
    /// The field is cached on its own, keyed by name, column and parameters. Returns
    /// [`Value::Null`] when the result set is empty or has no such column.
    ///
    /// # Errors
    ///
    /// See [`execute_procedure`](Self::execute_procedure).
    pub fn execute_procedure_field(&self, name: &str, column: &str, params: &[Value]) -> Result<Value> {
        self.field(name, column, params, None)
    }

    /// Like [`execute_procedure_field`](Self::execute_procedure_field), storing a new result
    /// with the given policy.
    ///
    /// # Errors
    ///
    /// See [`execute_procedure`](Self::execute_procedure).
    pub fn execute_procedure_field_with_policy(
        &self,
        name: &str,
        column: &str,
        policy: ExpirationPolicy,
        params: &[Value],
    ) -> Result<Value> {
        self.field(name, column, params, Some(policy))
    }

    /// Returns the scalar result of `name` called with `params`, running it on a miss.
    ///
    /// # Errors
    ///
    /// See [`execute_procedure`](Self::execute_procedure).
    pub fn execute_scalar(&self, name: &str, params: &[Value]) -> Result<Value> {
        self.scalar(name, params, None)
    }

    /// Like [`execute_scalar`](Self::execute_scalar), storing a new result with the given
    /// policy.
    ///
    /// # Errors
    ///
    /// See [`execute_procedure`](Self::execute_procedure).
    pub fn execute_scalar_with_policy(&self, name: &str, policy: ExpirationPolicy, params: &[Value]) -> Result<Value> {
        self.scalar(name, params, Some(policy))
    }

    fn table(&self, name: &str, params: &[Value], policy: Option<ExpirationPolicy>) -> Result<Table> {
        check_name(name)?;
        let key = CacheKey::build(name, params)?;
        self.cache
            .try_get_or_compute(&key, || self.source.procedure_table(name, params), policy)
    }

    fn field(&self, name: &str, column: &str, params: &[Value], policy: Option<ExpirationPolicy>) -> Result<Value> {
        check_name(name)?;
        let mut components = Vec::with_capacity(params.len() + 1);
        components.push(Value::from(column));
        components.extend_from_slice(params);
        let key = CacheKey::build(name, &components)?;

        self.cache.try_get_or_compute(
            &key,
            || {
                self.source
                    .procedure_table(name, params)
                    .map(|table| table.first_row_field(column))
            },
            policy,
        )
    }

    fn scalar(&self, name: &str, params: &[Value], policy: Option<ExpirationPolicy>) -> Result<Value> {
        check_name(name)?;
        let key = CacheKey::build(name, params)?;
        self.cache
            .try_get_or_compute(&key, || self.source.procedure_field(name, params), policy)
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::null_input("procedure name is empty"));
    }
    Ok(())
}
