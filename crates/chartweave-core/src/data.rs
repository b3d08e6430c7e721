//! Row access for the data universe.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::OnceLock;

/// A flat record whose fields are looked up by name.
pub trait DataRow {
    /// The value of `name`, or `None` if the row has no such field or it is null.
    fn field(&self, name: &str) -> Option<Value>;
}

impl DataRow for Map<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        let value = match self.get(name) {
            Some(value) => value,
            None => {
                self.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))?
                    .1
            }
        };
        (!value.is_null()).then(|| value.clone())
    }
}

impl DataRow for Value {
    fn field(&self, name: &str) -> Option<Value> {
        self.as_object()?.field(name)
    }
}

impl<T: DataRow + ?Sized> DataRow for &T {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

/// Equality used by filters: numbers compare numerically so `10` matches `10.0`.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// The 12-field business record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub id: u64,
    pub year: i32,
    pub month: u32,
    /// ISO-8601 calendar date.
    pub date: String,
    pub category: String,
    pub channel: String,
    pub product: String,
    pub region: String,
    pub amount: f64,
    pub quantity: i64,
    pub percentage: f64,
    pub salesman: String,
}

type Accessor = fn(&SalesRecord) -> Value;

fn sales_accessors() -> &'static FxHashMap<&'static str, Accessor> {
    static TABLE: OnceLock<FxHashMap<&'static str, Accessor>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let entries: [(&'static str, Accessor); 12] = [
            ("id", |r| json!(r.id)),
            ("year", |r| json!(r.year)),
            ("month", |r| json!(r.month)),
            ("date", |r| json!(r.date)),
            ("category", |r| json!(r.category)),
            ("channel", |r| json!(r.channel)),
            ("product", |r| json!(r.product)),
            ("region", |r| json!(r.region)),
            ("amount", |r| json!(r.amount)),
            ("quantity", |r| json!(r.quantity)),
            ("percentage", |r| json!(r.percentage)),
            ("salesman", |r| json!(r.salesman)),
        ];
        entries.into_iter().collect()
    })
}

impl SalesRecord {
    pub const FIELDS: [&'static str; 12] = [
        "id",
        "year",
        "month",
        "date",
        "category",
        "channel",
        "product",
        "region",
        "amount",
        "quantity",
        "percentage",
        "salesman",
    ];
}

impl DataRow for SalesRecord {
    fn field(&self, name: &str) -> Option<Value> {
        let accessors = sales_accessors();
        let accessor = accessors.get(name).or_else(|| {
            accessors
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, accessor)| accessor)
        })?;
        Some(accessor(self))
    }
}

pub const SAMPLE_DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const SAMPLE_CHANNELS: [(&str, [i64; 7]); 5] = [
    ("Email", [120, 132, 101, 134, 90, 230, 210]),
    ("Union Ads", [220, 182, 191, 234, 290, 330, 310]),
    ("Video Ads", [150, 232, 201, 154, 190, 330, 410]),
    ("Direct", [320, 332, 301, 334, 390, 330, 320]),
    ("Search Engine", [820, 932, 901, 934, 1290, 1330, 1320]),
];

/// Seven days by five channels of marketing conversions, day-major.
pub fn sample_marketing_rows() -> Vec<Value> {
    SAMPLE_DAYS
        .iter()
        .enumerate()
        .flat_map(|(day_index, day)| {
            SAMPLE_CHANNELS.iter().map(move |(channel, counts)| {
                json!({
                    "day_name": day,
                    "channel_name": channel,
                    "conversion_count": counts[day_index],
                    "stack_group": "Total"
                })
            })
        })
        .collect()
}
