use std::cmp::Ordering;

use serde_json::Value;

/// Remote tables backing the site content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    SiteConfig,
    Shows,
    Members,
    Products,
    Songs,
    TechnicalRider,
    Albums,
    Photos,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::SiteConfig => "site_config",
            Table::Shows => "shows",
            Table::Members => "members",
            Table::Products => "products",
            Table::Songs => "songs",
            Table::TechnicalRider => "technical_rider",
            Table::Albums => "albums",
            Table::Photos => "photos",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort key for a select.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }

    /// Compare two rows on this key. Nulls sort last when ascending and
    /// first when descending.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let left = a.get(self.column).unwrap_or(&Value::Null);
        let right = b.get(self.column).unwrap_or(&Value::Null);
        let ord = compare_values(left, right);
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Row filter on a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Neq(&'static str, Value),
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn neq(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Neq(column, value.into())
    }

    /// Match the row with the given primary key.
    pub fn id(id: i64) -> Self {
        Filter::eq("id", id)
    }

    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq(column, _) | Filter::Neq(column, _) => column,
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Filter::Eq(column, value) => row.get(column) == Some(value),
            Filter::Neq(column, value) => row.get(column) != Some(value),
        }
    }
}

/// Child table embedded into each parent row through a foreign key.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub table: Table,
    pub foreign_key: &'static str,
}

/// A select query against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: Table,
    pub embed: Option<Embed>,
    pub order: Vec<Order>,
    pub filters: Vec<Filter>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            embed: None,
            order: Vec::new(),
            filters: Vec::new(),
            limit: None,
        }
    }

    pub fn embed(mut self, table: Table, foreign_key: &'static str) -> Self {
        self.embed = Some(Embed { table, foreign_key });
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Fetch at most one row.
    pub fn single(mut self) -> Self {
        self.limit = Some(1);
        self
    }

    /// Column projection, e.g. `*` or `*,photos(*)`.
    pub fn columns(&self) -> String {
        match &self.embed {
            Some(embed) => format!("*,{}(*)", embed.table),
            None => "*".to_string(),
        }
    }

    /// Sort rows by the order keys, in priority order.
    pub fn sort(&self, rows: &mut [Value]) {
        rows.sort_by(|a, b| {
            self.order
                .iter()
                .map(|o| o.compare(a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
}
