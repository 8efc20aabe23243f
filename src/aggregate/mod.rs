//! Aggregation stage: grouping and summary statistics.
//!
//! Reduces a filtered table to one row per distinct group key, holding the
//! mean or sum of a numeric column, or the row count. Groups appear in order
//! of first occurrence unless the caller asks for them sorted.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::table::{Column, ColumnType, Table, Value, ValueKey};

/// Label for outcome value 1.
pub const SUCCESS_LABEL: &str = "Success";
/// Label for outcome value 0.
pub const FAILURE_LABEL: &str = "Failure";

/// Name of the value column produced by [`Aggregate::Count`].
pub const COUNT_COLUMN: &str = "count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate<'a> {
    /// Mean of a numeric column, ignoring nulls.
    Mean(&'a str),
    /// Sum of a numeric column, ignoring nulls.
    Sum(&'a str),
    /// Number of rows.
    Count,
}

impl Aggregate<'_> {
    fn output_column(&self) -> &str {
        match self {
            Self::Mean(column) | Self::Sum(column) => column,
            Self::Count => COUNT_COLUMN,
        }
    }
}

/// A grouping request: key columns plus the aggregate to compute.
#[derive(Debug, Clone)]
pub struct GroupBy<'a> {
    keys: Vec<&'a str>,
    aggregate: Aggregate<'a>,
    sorted: bool,
}

#[derive(Default)]
struct Accumulator {
    rows: usize,
    values: usize,
    sum: f64,
}

impl<'a> GroupBy<'a> {
    pub fn new(keys: &[&'a str], aggregate: Aggregate<'a>) -> Self {
        Self {
            keys: keys.to_vec(),
            aggregate,
            sorted: false,
        }
    }

    /// Order groups by ascending key instead of first occurrence.
    pub fn sorted(mut self) -> Self {
        self.sorted = true;
        self
    }

    /// Run the grouping.
    ///
    /// The result has the key columns followed by the aggregate column. An
    /// empty input, or a key/value column the table lacks, yields zero
    /// groups.
    pub fn apply(&self, table: &Table) -> Table {
        let mut columns: Vec<Column> = self
            .keys
            .iter()
            .map(|key| {
                let column_type = table
                    .column_index(key)
                    .map(|i| table.columns()[i].column_type)
                    .unwrap_or(ColumnType::Text);
                Column::new(*key, column_type)
            })
            .collect();
        columns.push(Column::new(self.aggregate.output_column(), ColumnType::Number));

        let key_indices: Option<Vec<usize>> = self.keys.iter().map(|k| table.column_index(k)).collect();
        let value_index = match self.aggregate {
            Aggregate::Mean(column) | Aggregate::Sum(column) => table.column_index(column).map(Some),
            Aggregate::Count => Some(None),
        };
        let (Some(key_indices), Some(value_index)) = (key_indices, value_index) else {
            return Table::new(columns, Vec::new());
        };

        let mut order: Vec<Vec<Value>> = Vec::new();
        let mut groups: HashMap<Vec<ValueKey>, (usize, Accumulator)> = HashMap::new();

        for row in table.rows() {
            let key: Vec<Value> = key_indices.iter().map(|&i| row[i].clone()).collect();
            let hash_key: Vec<ValueKey> = key.iter().map(Value::key).collect();

            let next = order.len();
            let (_, acc) = groups.entry(hash_key).or_insert_with(|| {
                order.push(key);
                (next, Accumulator::default())
            });

            acc.rows += 1;
            if let Some(n) = value_index.and_then(|i| row[i].as_f64()) {
                acc.values += 1;
                acc.sum += n;
            }
        }

        let mut results: Vec<Option<Accumulator>> = (0..order.len()).map(|_| None).collect();
        for (position, acc) in groups.into_values() {
            results[position] = Some(acc);
        }

        let mut rows: Vec<Vec<Value>> = order
            .into_iter()
            .zip(results)
            .map(|(mut key, acc)| {
                let acc = acc.unwrap_or_default();
                let value = match self.aggregate {
                    Aggregate::Mean(_) if acc.values == 0 => 0.0,
                    Aggregate::Mean(_) => acc.sum / acc.values as f64,
                    Aggregate::Sum(_) => acc.sum,
                    Aggregate::Count => acc.rows as f64,
                };
                key.push(Value::Number(value));
                key
            })
            .collect();

        if self.sorted {
            let width = self.keys.len();
            rows.sort_by(|a, b| compare_keys(&a[..width], &b[..width]));
        }

        Table::new(columns, rows)
    }
}

/// Replace a {0,1} outcome column with "Success"/"Failure" labels.
///
/// Cells holding any other value are left as their text form.
pub fn label_outcomes(table: &Table, column: &str) -> Table {
    table.map_column(column, ColumnType::Text, |v| match v.as_f64() {
        Some(n) if n == 1.0 => Value::from(SUCCESS_LABEL),
        Some(n) if n == 0.0 => Value::from(FAILURE_LABEL),
        _ if v.is_null() => Value::Null,
        _ => Value::Text(v.to_string()),
    })
}

/// Count rows per outcome label.
pub fn count_outcomes(table: &Table, column: &str) -> Table {
    GroupBy::new(&[column], Aggregate::Count).apply(&label_outcomes(table, column))
}

fn compare_keys(a: &[Value], b: &[Value]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| compare_values(x, y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Nulls first, then numbers, then text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Number(_), Value::Text(_)) => Ordering::Less,
        (Value::Text(_), Value::Number(_)) => Ordering::Greater,
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::read_csv;

    fn sales() -> Table {
        let csv = "\
Year,Vehicle_Type,Automobile_Sales,unemployment_rate
1981,Sports,10,5.5
1980,Supperminicar,20,5.5
1981,Sports,30,6.0
1980,Sports,,6.0
1980,Supperminicar,40,5.5
";
        read_csv(csv.as_bytes()).unwrap()
    }

    fn pairs(table: &Table) -> Vec<(String, f64)> {
        table
            .rows()
            .iter()
            .map(|r| (r[0].to_string(), r[r.len() - 1].as_f64().unwrap()))
            .collect()
    }

    #[test]
    fn mean_groups_in_first_occurrence_order() {
        let out = GroupBy::new(&["Vehicle_Type"], Aggregate::Mean("Automobile_Sales")).apply(&sales());
        assert_eq!(
            pairs(&out),
            vec![("Sports".to_string(), 20.0), ("Supperminicar".to_string(), 30.0)]
        );
        assert_eq!(out.columns()[1].name, "Automobile_Sales");
    }

    #[test]
    fn sorted_orders_by_key() {
        let out = GroupBy::new(&["Year"], Aggregate::Sum("Automobile_Sales"))
            .sorted()
            .apply(&sales());
        assert_eq!(
            pairs(&out),
            vec![("1980".to_string(), 60.0), ("1981".to_string(), 40.0)]
        );
        assert_eq!(out.columns()[0].column_type, ColumnType::Number);
    }

    #[test]
    fn count_includes_rows_with_null_values() {
        let out = GroupBy::new(&["Year"], Aggregate::Count).apply(&sales());
        assert_eq!(
            pairs(&out),
            vec![("1981".to_string(), 2.0), ("1980".to_string(), 3.0)]
        );
        assert_eq!(out.columns()[1].name, COUNT_COLUMN);
    }

    #[test]
    fn all_null_group_has_zero_mean() {
        let table = read_csv("k,v\na,\na,\n".as_bytes()).unwrap();
        let out = GroupBy::new(&["k"], Aggregate::Mean("v")).apply(&table);
        assert_eq!(pairs(&out), vec![("a".to_string(), 0.0)]);
    }

    #[test]
    fn multi_key_grouping() {
        let out = GroupBy::new(
            &["Vehicle_Type", "unemployment_rate"],
            Aggregate::Mean("Automobile_Sales"),
        )
        .apply(&sales());
        assert_eq!(out.len(), 3);
        assert_eq!(out.columns().len(), 3);
        assert_eq!(out.rows()[0][1], Value::Number(5.5));
    }

    #[test]
    fn empty_input_yields_zero_groups() {
        let empty = sales().empty_like();
        let out = GroupBy::new(&["Year"], Aggregate::Mean("Automobile_Sales")).apply(&empty);
        assert!(out.is_empty());
        assert_eq!(out.columns().len(), 2);
    }

    #[test]
    fn missing_column_yields_zero_groups() {
        let out = GroupBy::new(&["Nope"], Aggregate::Count).apply(&sales());
        assert!(out.is_empty());
        let out = GroupBy::new(&["Year"], Aggregate::Sum("Nope")).apply(&sales());
        assert!(out.is_empty());
    }

    #[test]
    fn outcome_labels_are_success_and_failure_only() {
        let table = read_csv("class\n1\n0\n1\n1\n0\n".as_bytes()).unwrap();
        let out = count_outcomes(&table, "class");

        let mut labels: Vec<String> = out.column_values("class").map(|v| v.to_string()).collect();
        labels.sort();
        assert_eq!(labels, vec![FAILURE_LABEL, SUCCESS_LABEL]);

        let total: f64 = out.column_values(COUNT_COLUMN).filter_map(Value::as_f64).sum();
        assert_eq!(total, 5.0);
        assert_eq!(pairs(&out), vec![("Success".to_string(), 3.0), ("Failure".to_string(), 2.0)]);
    }
}
