use serde_json::Value;

use bandsite_core::{Filter, Order, Select};

/// Query parameters for a PostgREST select.
pub fn select_params(query: &Select) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.columns())];

    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(order_param)
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }

    params.extend(query.filters.iter().map(filter_param));

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

pub fn order_param(order: &Order) -> String {
    let direction = if order.ascending { "asc" } else { "desc" };
    format!("{}.{}", order.column, direction)
}

/// Encode a filter as `column=op.value`.
pub fn filter_param(filter: &Filter) -> (String, String) {
    let value = match filter {
        Filter::Eq(_, Value::Null) => "is.null".to_string(),
        Filter::Neq(_, Value::Null) => "not.is.null".to_string(),
        Filter::Eq(_, value) => format!("eq.{}", literal(value)),
        Filter::Neq(_, value) => format!("neq.{}", literal(value)),
    };
    (filter.column().to_string(), value)
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandsite_core::Table;

    #[test]
    fn test_select_params() {
        let query = Select::from(Table::Albums)
            .embed(Table::Photos, "album_id")
            .order(Order::desc("created_at"))
            .order(Order::asc("id"))
            .filter(Filter::id(3))
            .single();

        assert_eq!(
            select_params(&query),
            vec![
                ("select".to_string(), "*,photos(*)".to_string()),
                ("order".to_string(), "created_at.desc,id.asc".to_string()),
                ("id".to_string(), "eq.3".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_filter_literals() {
        assert_eq!(
            filter_param(&Filter::eq("name", "Amp")),
            ("name".to_string(), "eq.Amp".to_string())
        );
        assert_eq!(
            filter_param(&Filter::neq("id", 0)),
            ("id".to_string(), "neq.0".to_string())
        );
        assert_eq!(
            filter_param(&Filter::neq("id", Value::Null)),
            ("id".to_string(), "not.is.null".to_string())
        );
    }
}
