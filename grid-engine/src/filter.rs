//! FILENAME: grid-engine/src/filter.rs
//! Filter Engine - Per-column predicates combined with logical AND.
//!
//! Filtering never reorders: the output is the subsequence of the input rows
//! for which every active FilterSpec passes.

use grid_model::{column_value, ColumnSpec, Row, Value};
use log::debug;

use crate::definition::{FilterModel, FilterOperator, FilterSpec};

/// Keeps the rows that pass every active filter, in input order.
/// An empty model is the identity.
pub fn apply_filters<'a, I>(rows: I, model: &FilterModel, columns: &[ColumnSpec]) -> Vec<&'a Row>
where
    I: IntoIterator<Item = &'a Row>,
{
    if model.is_empty() {
        return rows.into_iter().collect();
    }

    for (field, spec) in model {
        if spec.operator == FilterOperator::Unrecognized {
            debug!(target: "grid::filter", "unrecognized operator on '{}' passes every row", field);
        }
    }

    let mut input_count = 0usize;
    let kept: Vec<&'a Row> = rows
        .into_iter()
        .inspect(|_| input_count += 1)
        .filter(|row| {
            model
                .iter()
                .all(|(field, spec)| test_filter(&column_value(row, field, columns), spec))
        })
        .collect();

    debug!(
        target: "grid::filter",
        "{} of {} rows pass {} filter(s)",
        kept.len(),
        input_count,
        model.len()
    );
    kept
}

/// Tests a single value against a filter spec.
pub fn test_filter(value: &Value, spec: &FilterSpec) -> bool {
    let operand = &spec.value;
    match spec.operator {
        FilterOperator::Contains => test_contains(value, operand),
        FilterOperator::NotContains => !test_contains(value, operand),
        FilterOperator::Equals => test_equals(value, operand),
        FilterOperator::NotEquals => !test_equals(value, operand),
        FilterOperator::StartsWith => test_text(value, operand, |v, f| v.starts_with(f)),
        FilterOperator::EndsWith => test_text(value, operand, |v, f| v.ends_with(f)),
        FilterOperator::LessThan => test_numeric(value, operand, |v, f| v < f),
        FilterOperator::LessThanOrEqual => test_numeric(value, operand, |v, f| v <= f),
        FilterOperator::GreaterThan => test_numeric(value, operand, |v, f| v > f),
        FilterOperator::GreaterThanOrEqual => test_numeric(value, operand, |v, f| v >= f),
        FilterOperator::InRange => {
            let max = spec.value2.as_ref().unwrap_or(&Value::Null);
            test_in_range(value, operand, max)
        }
        FilterOperator::Blank => value.is_blank(),
        FilterOperator::NotBlank => !value.is_blank(),
        // Fail open: configuration this engine does not understand never hides data.
        FilterOperator::Unrecognized => true,
    }
}

fn lowercase(value: &Value) -> String {
    value.to_display_string().to_lowercase()
}

fn test_contains(value: &Value, operand: &Value) -> bool {
    test_text(value, operand, |v, f| v.contains(f))
}

/// Case-insensitive text test; blank on either side fails.
fn test_text(value: &Value, operand: &Value, predicate: impl Fn(&str, &str) -> bool) -> bool {
    if value.is_blank() || operand.is_blank() {
        return false;
    }
    predicate(&lowercase(value), &lowercase(operand))
}

fn test_equals(value: &Value, operand: &Value) -> bool {
    match (value, operand) {
        (Value::Number(a), Value::Number(b)) => a == b,
        _ => lowercase(value) == lowercase(operand),
    }
}

/// Numeric comparison after coercion; blank on either side fails.
/// NaN operands compare false.
fn test_numeric(value: &Value, operand: &Value, predicate: impl Fn(f64, f64) -> bool) -> bool {
    if value.is_blank() || operand.is_blank() {
        return false;
    }
    predicate(value.as_number(), operand.as_number())
}

fn test_in_range(value: &Value, min: &Value, max: &Value) -> bool {
    if value.is_blank() || min.is_blank() || max.is_blank() {
        return false;
    }
    let n = value.as_number();
    n >= min.as_number() && n <= max.as_number()
}

// ============================================================================
// MODEL HELPERS
// ============================================================================

/// Builds one `contains` filter per filterable column from a search string.
/// The text is trimmed; an empty search produces no filters.
pub fn create_quick_filter(search_text: &str, columns: &[ColumnSpec]) -> FilterModel {
    let text = search_text.trim();
    if text.is_empty() {
        return FilterModel::new();
    }

    columns
        .iter()
        .filter(|column| column.is_filterable())
        .map(|column| {
            (
                column.field.clone(),
                FilterSpec::new(FilterOperator::Contains, text),
            )
        })
        .collect()
}

pub fn has_active_filters(model: &FilterModel) -> bool {
    !model.is_empty()
}

pub fn clear_filters() -> FilterModel {
    FilterModel::new()
}

/// Returns a copy of the model without the filter on `field`.
pub fn clear_column_filter(field: &str, model: &FilterModel) -> FilterModel {
    let mut next = model.clone();
    next.remove(field);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Vec<Row> {
        vec![
            Row::new().with("name", "Alice").with("age", 30).with("city", "Oslo"),
            Row::new().with("name", "bob").with("age", 25).with("city", ""),
            Row::new().with("name", "Carol").with("age", 35),
            Row::new().with("name", "Dave").with("age", "40").with("city", "Bergen"),
        ]
    }

    fn names(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r.value("name").to_display_string()).collect()
    }

    fn only(field: &str, spec: FilterSpec) -> FilterModel {
        let mut model = FilterModel::new();
        model.insert(field.to_string(), spec);
        model
    }

    #[test]
    fn test_empty_model_is_identity() {
        let rows = people();
        let out = apply_filters(&rows, &FilterModel::new(), &[]);
        assert_eq!(out.len(), rows.len());
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let rows = people();
        let model = only("name", FilterSpec::new(FilterOperator::Contains, "A"));
        let out = apply_filters(&rows, &model, &[]);
        assert_eq!(names(&out), vec!["Alice", "Carol", "Dave"]);
    }

    #[test]
    fn test_contains_blank_is_false() {
        let rows = people();
        let model = only("city", FilterSpec::new(FilterOperator::Contains, "o"));
        assert_eq!(names(&apply_filters(&rows, &model, &[])), vec!["Alice"]);

        // Empty filter value never matches, so notContains keeps everything.
        let model = only("name", FilterSpec::new(FilterOperator::Contains, ""));
        assert!(apply_filters(&rows, &model, &[]).is_empty());
        let model = only("name", FilterSpec::new(FilterOperator::NotContains, ""));
        assert_eq!(apply_filters(&rows, &model, &[]).len(), 4);
    }

    #[test]
    fn test_equals_numeric_and_text() {
        assert!(test_filter(&Value::Number(5.0), &FilterSpec::new(FilterOperator::Equals, 5)));
        assert!(test_filter(&Value::text("BOB"), &FilterSpec::new(FilterOperator::Equals, "bob")));
        // Mixed types compare as strings.
        assert!(test_filter(&Value::text("5"), &FilterSpec::new(FilterOperator::Equals, 5)));
        assert!(test_filter(&Value::text("x"), &FilterSpec::new(FilterOperator::NotEquals, "y")));
    }

    #[test]
    fn test_prefix_and_suffix() {
        let rows = people();
        let model = only("name", FilterSpec::new(FilterOperator::StartsWith, "c"));
        assert_eq!(names(&apply_filters(&rows, &model, &[])), vec!["Carol"]);
        let model = only("name", FilterSpec::new(FilterOperator::EndsWith, "E"));
        assert_eq!(names(&apply_filters(&rows, &model, &[])), vec!["Alice", "Dave"]);
    }

    #[test]
    fn test_numeric_comparisons_coerce_text() {
        let rows = people();
        let model = only("age", FilterSpec::new(FilterOperator::GreaterThan, 30));
        assert_eq!(names(&apply_filters(&rows, &model, &[])), vec!["Carol", "Dave"]);
        let model = only("age", FilterSpec::new(FilterOperator::LessThanOrEqual, "30"));
        assert_eq!(names(&apply_filters(&rows, &model, &[])), vec!["Alice", "bob"]);
    }

    #[test]
    fn test_numeric_comparison_with_nan_is_false() {
        let spec = FilterSpec::new(FilterOperator::LessThan, 10);
        assert!(!test_filter(&Value::text("abc"), &spec));
        let spec = FilterSpec::new(FilterOperator::GreaterThanOrEqual, 10);
        assert!(!test_filter(&Value::text("abc"), &spec));
        assert!(!test_filter(&Value::Null, &spec));
    }

    #[test]
    fn test_in_range_inclusive() {
        let rows = people();
        let model = only("age", FilterSpec::in_range(25, 35));
        assert_eq!(names(&apply_filters(&rows, &model, &[])), vec!["Alice", "bob", "Carol"]);

        let open_ended = FilterSpec::new(FilterOperator::InRange, 25);
        assert!(!test_filter(&Value::Number(30.0), &open_ended));
    }

    #[test]
    fn test_blank_and_not_blank() {
        let rows = people();
        let model = only("city", FilterSpec::unary(FilterOperator::Blank));
        assert_eq!(names(&apply_filters(&rows, &model, &[])), vec!["bob", "Carol"]);
        let model = only("city", FilterSpec::unary(FilterOperator::NotBlank));
        assert_eq!(names(&apply_filters(&rows, &model, &[])), vec!["Alice", "Dave"]);
    }

    #[test]
    fn test_unrecognized_operator_fails_open() {
        let rows = people();
        let model = only("name", FilterSpec::new(FilterOperator::Unrecognized, "zzz"));
        assert_eq!(apply_filters(&rows, &model, &[]).len(), rows.len());
    }

    #[test]
    fn test_multiple_filters_combine_with_and() {
        let rows = people();
        let mut model = only("age", FilterSpec::new(FilterOperator::GreaterThanOrEqual, 30));
        model.insert("city".to_string(), FilterSpec::unary(FilterOperator::NotBlank));
        assert_eq!(names(&apply_filters(&rows, &model, &[])), vec!["Alice", "Dave"]);
    }

    #[test]
    fn test_filter_uses_value_getter() {
        let rows = people();
        let columns = vec![ColumnSpec::new("initial").with_value_getter(|row| {
            Value::Text(row.value("name").to_display_string().chars().take(1).collect())
        })];
        let model = only("initial", FilterSpec::new(FilterOperator::Equals, "d"));
        assert_eq!(names(&apply_filters(&rows, &model, &columns)), vec!["Dave"]);
    }

    #[test]
    fn test_filtering_preserves_relative_order() {
        let rows: Vec<Row> = (0..50).map(|i| Row::new().with("n", i)).collect();
        let model = only("n", FilterSpec::new(FilterOperator::GreaterThan, 10));
        let out = apply_filters(&rows, &model, &[]);
        let values: Vec<f64> = out.iter().map(|r| r.value("n").as_number()).collect();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(values, sorted);
        assert_eq!(values.len(), 39);
    }

    #[test]
    fn test_quick_filter() {
        let columns = vec![
            ColumnSpec::new("name"),
            ColumnSpec::new("city"),
            ColumnSpec::new("secret").filterable(false),
        ];
        let model = create_quick_filter("  os ", &columns);
        assert_eq!(model.len(), 2);
        assert_eq!(model["name"], FilterSpec::new(FilterOperator::Contains, "os"));
        assert!(!model.contains_key("secret"));

        assert!(create_quick_filter("   ", &columns).is_empty());
    }

    #[test]
    fn test_model_helpers() {
        let mut model = only("a", FilterSpec::unary(FilterOperator::Blank));
        model.insert("b".to_string(), FilterSpec::unary(FilterOperator::NotBlank));
        assert!(has_active_filters(&model));

        let cleared = clear_column_filter("a", &model);
        assert_eq!(cleared.len(), 1);
        assert_eq!(model.len(), 2);
        assert!(!has_active_filters(&clear_filters()));
    }
}
