//! FILENAME: grid-engine/src/grouping.rs
//! Grouping Engine - Recursive multi-level grouping with aggregation.
//!
//! Builds an owned tree of `GroupNode`s from the sorted rows. The tree is
//! recomputed from scratch on every change; expand/collapse state lives
//! outside it in `ExpansionState` and is only looked up while building.
//!
//! Terminology:
//! - Bucket: the rows sharing one group value at one level
//! - Group key: `group_<level>_<field>_<value>`, the identity used by the
//!   expansion state
//! - Flattening: depth-first walk emitting groups and, below expanded
//!   groups, their children

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use grid_model::{column_value, ColumnSpec, Row, Value, ValueKey};
use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::definition::{AggregationFunction, AggregationSpec, GroupSpec};
use crate::sort::merge_sort_by;

/// Aggregate name that always carries the bucket's row count.
pub const COUNT_AGGREGATE: &str = "count";

// ============================================================================
// EXPANSION STATE
// ============================================================================

/// The set of expanded group keys.
///
/// Keys that no longer occur after regrouping stay in the set and are simply
/// never matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionState {
    keys: BTreeSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        ExpansionState::default()
    }

    pub fn contains(&self, group_key: &str) -> bool {
        self.keys.contains(group_key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ExpansionState {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// TREE TYPES
// ============================================================================

/// A synthetic node summarizing the rows that share one value at one level.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode<'a> {
    pub group_key: String,
    pub group_value: Value,
    pub group_field: String,
    pub level: usize,
    pub children: GroupChildren<'a>,
    pub aggregates: BTreeMap<String, Value>,
    /// Membership of `group_key` in the expansion state the tree was built with.
    pub expanded: bool,
}

impl GroupNode<'_> {
    /// Number of data rows below this node, at any depth.
    pub fn leaf_count(&self) -> usize {
        self.children.leaf_count()
    }

    pub fn aggregate(&self, name: &str) -> Option<&Value> {
        self.aggregates.get(name)
    }
}

/// Children of a group: nested groups, or the raw rows at the deepest level.
/// Also the result of `apply_grouping`, which is `Rows` when nothing is grouped.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GroupChildren<'a> {
    Groups(Vec<GroupNode<'a>>),
    Rows(Vec<&'a Row>),
}

impl<'a> GroupChildren<'a> {
    pub fn len(&self) -> usize {
        match self {
            GroupChildren::Groups(groups) => groups.len(),
            GroupChildren::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn groups(&self) -> &[GroupNode<'a>] {
        match self {
            GroupChildren::Groups(groups) => groups,
            GroupChildren::Rows(_) => &[],
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, GroupChildren::Groups(_))
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            GroupChildren::Groups(groups) => groups.iter().map(GroupNode::leaf_count).sum(),
            GroupChildren::Rows(rows) => rows.len(),
        }
    }
}

/// One entry of the flattened display sequence.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayRow<'a> {
    Row(&'a Row),
    Group(&'a GroupNode<'a>),
}

impl<'a> DisplayRow<'a> {
    pub fn is_group(&self) -> bool {
        matches!(self, DisplayRow::Group(_))
    }

    pub fn as_row(&self) -> Option<&'a Row> {
        match self {
            DisplayRow::Row(row) => Some(row),
            DisplayRow::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&'a GroupNode<'a>> {
        match self {
            DisplayRow::Group(group) => Some(group),
            DisplayRow::Row(_) => None,
        }
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Accumulates the non-null values of one field within a bucket.
struct AggregateAccumulator<'r> {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
    first: Option<&'r Value>,
    last: Option<&'r Value>,
}

impl<'r> AggregateAccumulator<'r> {
    fn new() -> Self {
        AggregateAccumulator {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            first: None,
            last: None,
        }
    }

    fn add(&mut self, value: &'r Value) {
        let n = value.as_number();
        self.count += 1;
        self.sum += n;
        // A single non-numeric value poisons min/max.
        self.min = if n.is_nan() || self.min.is_nan() { f64::NAN } else { self.min.min(n) };
        self.max = if n.is_nan() || self.max.is_nan() { f64::NAN } else { self.max.max(n) };
        if self.first.is_none() {
            self.first = Some(value);
        }
        self.last = Some(value);
    }

    fn compute(&self, function: AggregationFunction) -> Value {
        if self.count == 0 {
            return match function {
                AggregationFunction::Count => Value::Number(0.0),
                _ => Value::Null,
            };
        }
        match function {
            AggregationFunction::Sum => Value::Number(self.sum),
            AggregationFunction::Avg => Value::Number(self.sum / self.count as f64),
            AggregationFunction::Min => Value::Number(self.min),
            AggregationFunction::Max => Value::Number(self.max),
            AggregationFunction::Count => Value::Number(self.count as f64),
            AggregationFunction::First => self.first.cloned().unwrap_or(Value::Null),
            AggregationFunction::Last => self.last.cloned().unwrap_or(Value::Null),
        }
    }
}

/// Computes the aggregates of one bucket. Aggregations read the raw row
/// field and skip null values; `count` always holds the bucket size unless an
/// aggregation on a field named `count` replaces it.
pub fn compute_aggregates(
    rows: &[&Row],
    aggregations: &[AggregationSpec],
) -> BTreeMap<String, Value> {
    let mut result = BTreeMap::new();
    result.insert(COUNT_AGGREGATE.to_string(), Value::from(rows.len()));

    for spec in aggregations {
        let mut acc = AggregateAccumulator::new();
        for row in rows {
            let value = row.value(&spec.field);
            if !value.is_null() {
                acc.add(value);
            }
        }
        result.insert(spec.field.clone(), acc.compute(spec.function));
    }

    result
}

// ============================================================================
// TREE CONSTRUCTION
// ============================================================================

/// Groups the rows by the given specs (index 0 outermost).
///
/// With no group specs the rows are returned unchanged as `GroupChildren::Rows`.
pub fn apply_grouping<'a>(
    rows: Vec<&'a Row>,
    group_specs: &[GroupSpec],
    columns: &[ColumnSpec],
    aggregations: &[AggregationSpec],
    expansion: &ExpansionState,
) -> GroupChildren<'a> {
    if group_specs.is_empty() {
        return GroupChildren::Rows(rows);
    }

    let row_count = rows.len();
    let tree = build_level(rows, group_specs, 0, columns, aggregations, expansion);

    debug!(
        target: "grid::grouping",
        "grouped {} rows into {} top-level group(s) over {} level(s)",
        row_count,
        tree.len(),
        group_specs.len()
    );
    tree
}

fn build_level<'a>(
    rows: Vec<&'a Row>,
    group_specs: &[GroupSpec],
    level: usize,
    columns: &[ColumnSpec],
    aggregations: &[AggregationSpec],
    expansion: &ExpansionState,
) -> GroupChildren<'a> {
    if level >= group_specs.len() {
        return GroupChildren::Rows(rows);
    }

    let spec = &group_specs[level];

    // Step 1: Partition into buckets, keeping first-appearance order
    let mut index: FxHashMap<ValueKey, usize> = FxHashMap::default();
    let mut buckets: Vec<(Value, Vec<&'a Row>)> = Vec::new();
    for row in rows {
        let value = column_value(row, &spec.field, columns);
        let key = ValueKey::from(&value);
        match index.get(&key) {
            Some(&slot) => buckets[slot].1.push(row),
            None => {
                index.insert(key, buckets.len());
                buckets.push((value, vec![row]));
            }
        }
    }

    // Step 2: Order the buckets by group value (stable)
    let buckets = match &spec.comparator {
        Some(comparator) => merge_sort_by(buckets, |(a, _), (b, _)| comparator(a, b)),
        None => merge_sort_by(buckets, |(a, _), (b, _)| default_group_compare(a, b)),
    };

    // Step 3: Build one node per bucket, recursing below it
    let nodes = buckets
        .into_iter()
        .map(|(group_value, bucket)| {
            let group_key = group_key(level, &spec.field, &group_value);
            let aggregates = compute_aggregates(&bucket, aggregations);
            let children =
                build_level(bucket, group_specs, level + 1, columns, aggregations, expansion);
            GroupNode {
                expanded: expansion.contains(&group_key),
                group_key,
                group_value,
                group_field: spec.field.clone(),
                level,
                children,
                aggregates,
            }
        })
        .collect();

    GroupChildren::Groups(nodes)
}

/// Identity of a group: level, field and the string form of the value.
pub fn group_key(level: usize, field: &str, value: &Value) -> String {
    format!("group_{}_{}_{}", level, field, value.to_display_string())
}

/// Default ordering of group values: equal values tie, null goes last,
/// otherwise values of one kind compare naturally. Values of different
/// kinds order booleans, then numbers, then dates, then text.
pub fn default_group_compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Boolean(_) => 0,
        Value::Number(_) => 1,
        Value::Date(_) => 2,
        Value::Text(_) => 3,
        Value::Null => 4,
    }
}

// ============================================================================
// EXPAND / COLLAPSE
// ============================================================================

/// Flips membership of `group_key`. Returns the new state and whether the
/// group is now expanded.
pub fn toggle_group(state: &ExpansionState, group_key: &str) -> (ExpansionState, bool) {
    let mut next = state.clone();
    let expanded = if next.keys.remove(group_key) {
        false
    } else {
        next.keys.insert(group_key.to_string());
        true
    };
    (next, expanded)
}

/// An expansion state holding every group key in the tree.
pub fn expand_all(tree: &GroupChildren<'_>) -> ExpansionState {
    let mut state = ExpansionState::new();
    collect_group_keys(tree, &mut state.keys);
    state
}

fn collect_group_keys(tree: &GroupChildren<'_>, keys: &mut BTreeSet<String>) {
    for group in tree.groups() {
        keys.insert(group.group_key.clone());
        collect_group_keys(&group.children, keys);
    }
}

pub fn collapse_all() -> ExpansionState {
    ExpansionState::new()
}

pub fn is_group_expanded(state: &ExpansionState, group_key: &str) -> bool {
    state.contains(group_key)
}

// ============================================================================
// FLATTENING
// ============================================================================

/// Depth-first visible sequence: every top-level entry, and the children of
/// each expanded group. Sibling order is never changed.
pub fn flatten_visible_rows<'t>(tree: &'t GroupChildren<'t>) -> Vec<DisplayRow<'t>> {
    let mut result = Vec::with_capacity(tree.len());
    flatten_into(tree, &mut result);
    result
}

fn flatten_into<'t>(tree: &'t GroupChildren<'t>, result: &mut Vec<DisplayRow<'t>>) {
    match tree {
        GroupChildren::Rows(rows) => result.extend(rows.iter().map(|row| DisplayRow::Row(*row))),
        GroupChildren::Groups(groups) => {
            for group in groups {
                result.push(DisplayRow::Group(group));
                if group.expanded {
                    flatten_into(&group.children, result);
                }
            }
        }
    }
}

/// Length of `flatten_visible_rows(tree)` without materializing it.
pub fn visible_row_count(tree: &GroupChildren<'_>) -> usize {
    match tree {
        GroupChildren::Rows(rows) => rows.len(),
        GroupChildren::Groups(groups) => groups
            .iter()
            .map(|group| {
                1 + if group.expanded {
                    visible_row_count(&group.children)
                } else {
                    0
                }
            })
            .sum(),
    }
}
