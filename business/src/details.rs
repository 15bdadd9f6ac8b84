//! Read-only field view of one record.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde_json::Value;

use crate::i18n::{Translate, camel_case_to_underscores};
use crate::model::Model;

pub const DEFAULT_DETAIL_FIELDS: &[&str] = &[
    "name",
    "username",
    "shortName",
    "code",
    "displayDescription",
    "created",
    "lastUpdated",
    "id",
    "href",
    "userGroups",
    "organisationUnits",
];

pub const LOADING_DETAILS: &str = "Loading details...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    PlainText,
    Timestamp,
    ExternalLink,
    NameList,
}

pub fn field_format(field: &str) -> FieldFormat {
    match field {
        "created" | "lastUpdated" => FieldFormat::Timestamp,
        "href" => FieldFormat::ExternalLink,
        "userGroups" | "organisationUnits" => FieldFormat::NameList,
        _ => FieldFormat::PlainText,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailValue {
    Text(String),
    /// `url` is what opens; `label` is what is shown.
    Link { label: String, url: String },
    Lines(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub field: String,
    pub label: String,
    pub value: DetailValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsContent {
    Loading,
    Rows(Vec<DetailRow>),
}

/// `null`, `false`, `0` and `""` are falsy. Arrays and objects always count as set.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

/// `Tue Mar 05 2024 10:00:00 GMT+0100` in `tz`. Unparseable input is returned as is.
pub fn format_timestamp_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw) {
        Some(at) => at
            .with_timezone(tz)
            .format("%a %b %d %Y %H:%M:%S GMT%z")
            .to_string(),
        None => raw.to_owned(),
    }
}

pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

fn name_lines(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return vec![plain_text(value)];
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj
                .get("displayName")
                .or_else(|| obj.get("name"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        })
        .collect()
}

pub fn render_value<Tz>(field: &str, value: &Value, tz: &Tz) -> DetailValue
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match field_format(field) {
        FieldFormat::PlainText => DetailValue::Text(plain_text(value)),
        FieldFormat::Timestamp => DetailValue::Text(format_timestamp_in(&plain_text(value), tz)),
        FieldFormat::ExternalLink => {
            let label = plain_text(value);
            DetailValue::Link {
                url: format!("{label}.json"),
                label,
            }
        }
        FieldFormat::NameList => DetailValue::Lines(name_lines(value)),
    }
}

/// Rows for `fields` in order, skipping falsy values. `None` means still loading.
pub fn details_content_in<Tz>(
    fields: &[&str],
    record: Option<&Model>,
    translate: &impl Translate,
    tz: &Tz,
) -> DetailsContent
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some(record) = record else {
        return DetailsContent::Loading;
    };

    let rows = fields
        .iter()
        .filter_map(|field| {
            let value = record.get(field).filter(|v| is_truthy(v))?;
            Some(DetailRow {
                field: (*field).to_owned(),
                label: translate.translate(&camel_case_to_underscores(field)),
                value: render_value(field, value, tz),
            })
        })
        .collect();

    DetailsContent::Rows(rows)
}

pub fn details_content(
    fields: &[&str],
    record: Option<&Model>,
    translate: &impl Translate,
) -> DetailsContent {
    details_content_in(fields, record, translate, &Local)
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use serde_json::json;

    use super::*;
    use crate::i18n::Translations;

    fn record(value: Value) -> Model {
        Model::from_value("user", value)
    }

    #[test]
    fn falsy_fields_are_omitted() {
        let t = Translations::english();
        let model = record(json!({"name": "X", "code": ""}));

        let DetailsContent::Rows(rows) = details_content_in(&["name", "code"], Some(&model), &t, &Utc)
        else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field, "name");
        assert_eq!(rows[0].label, "Name");
        assert_eq!(rows[0].value, DetailValue::Text("X".to_owned()));
    }

    #[test]
    fn missing_record_is_loading() {
        let t = Translations::english();
        assert_eq!(
            details_content_in(DEFAULT_DETAIL_FIELDS, None, &t, &Utc),
            DetailsContent::Loading
        );
    }

    #[test]
    fn rows_follow_field_order() {
        let t = Translations::english();
        let model = record(json!({"id": "abc", "username": "ann", "name": "Ann"}));
        let DetailsContent::Rows(rows) =
            details_content_in(DEFAULT_DETAIL_FIELDS, Some(&model), &t, &Utc)
        else {
            panic!("expected rows");
        };
        let fields: Vec<_> = rows.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "username", "id"]);
    }

    #[test]
    fn formats_per_field() {
        let utc = Utc;
        assert_eq!(
            render_value("href", &json!("https://x/api/users/a"), &utc),
            DetailValue::Link {
                label: "https://x/api/users/a".to_owned(),
                url: "https://x/api/users/a.json".to_owned(),
            }
        );
        assert_eq!(
            render_value(
                "userGroups",
                &json!([{"displayName": "Admins"}, "Clerks", {"name": "Ops"}]),
                &utc
            ),
            DetailValue::Lines(vec!["Admins".into(), "Clerks".into(), "Ops".into()])
        );
        assert_eq!(
            render_value("code", &json!(42), &utc),
            DetailValue::Text("42".to_owned())
        );
    }

    #[test]
    fn timestamps_in_timezone() {
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            format_timestamp_in("2024-03-05T09:00:00.000", &plus_one),
            "Tue Mar 05 2024 10:00:00 GMT+0100"
        );
        assert_eq!(
            format_timestamp_in("2024-03-05T09:00:00Z", &Utc),
            "Tue Mar 05 2024 09:00:00 GMT+0000"
        );
        assert_eq!(format_timestamp_in("yesterday", &Utc), "yesterday");
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("a")));
    }
}
