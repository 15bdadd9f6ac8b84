//! Key based translation lookup.

use std::collections::HashMap;

/// Looks up user facing strings by key.
///
/// A missing key degrades to a visible placeholder instead of failing.
pub trait Translate {
    fn translate(&self, key: &str) -> String;

    /// Translate `key` and replace every `{name}` with its value.
    fn translate_with(&self, key: &str, values: &[(&str, &str)]) -> String {
        interpolate(&self.translate(key), values)
    }
}

pub fn missing_placeholder(key: &str) -> String {
    format!("** {key} **")
}

fn interpolate(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_owned(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

/// `lastUpdated` -> `last_updated`, `organisationUnits` -> `organisation_units`.
pub fn camel_case_to_underscores(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    strings: HashMap<String, String>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in English strings for every key the UI uses.
    pub fn english() -> Self {
        Self::from_pairs(ENGLISH)
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            strings: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        }
    }

    /// Parses a flat JSON object of `key: string`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let strings: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { strings })
    }

    /// Later entries win.
    pub fn merge(&mut self, other: Translations) {
        self.strings.extend(other.strings);
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Translate for Translations {
    fn translate(&self, key: &str) -> String {
        match self.strings.get(key) {
            Some(text) => text.clone(),
            None => {
                log::trace!("missing translation for {key}");
                missing_placeholder(key)
            }
        }
    }
}

const ENGLISH: &[(&str, &str)] = &[
    ("no_value", "No value"),
    ("search", "Search"),
    ("filter", "Filter"),
    ("select", "Select"),
    ("apply", "Apply"),
    ("cancel", "Cancel"),
    ("close", "Close"),
    ("save", "Save"),
    ("edit", "Edit"),
    ("clone", "Clone"),
    ("delete", "Delete"),
    ("details", "Show details"),
    ("assign_to_org_units", "Assign to organisation units"),
    ("no_results_found", "No results found"),
    ("previous", "Previous"),
    ("next", "Next"),
    ("this_and_n_others_compact", "{this} and {n} others"),
    ("organisation_units_selected", "organisation units selected"),
    ("no_roots_found", "No roots found"),
    ("filter_organisation_units_by_name", "Filter organisation units by name"),
    ("level", "Level"),
    ("group", "Group"),
    ("columns", "Columns"),
    ("model_type", "Records"),
    ("user", "Users"),
    ("user_group", "User groups"),
    ("user_role", "User roles"),
    ("ok", "OK"),
    ("select_by_level", "Select by level"),
    ("select_by_group", "Select by group"),
    ("deselect", "Deselect"),
    ("select_all", "Select all"),
    ("deselect_all", "Deselect all"),
    ("organisation_unit_assignment_saved", "Organisation unit assignment saved"),
    (
        "organisation_unit_assignment_save_error",
        "Could not save organisation unit assignment",
    ),
    ("display_only_users_can_manage", "Display only users I can manage"),
    ("user_management", "User management"),
    ("user_group_management", "User group management"),
    ("user_role_management", "User role management"),
    ("organisation_unit_management", "Organisation unit management"),
    ("name", "Name"),
    ("display_name", "Display name"),
    ("username", "Username"),
    ("short_name", "Short name"),
    ("code", "Code"),
    ("display_description", "Description"),
    ("created", "Created"),
    ("last_updated", "Last updated"),
    ("id", "Id"),
    ("href", "API URL"),
    ("user_groups", "User groups"),
    ("organisation_units", "Organisation units"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_renders_placeholder() {
        let t = Translations::new();
        assert_eq!(t.translate("nope"), "** nope **");
    }

    #[test]
    fn interpolates_named_values() {
        let t = Translations::english();
        assert_eq!(
            t.translate_with("this_and_n_others_compact", &[("this", "a, b, c"), ("n", "2")]),
            "a, b, c and 2 others"
        );
    }

    #[test]
    fn loads_and_merges_json() {
        let mut t = Translations::english();
        t.merge(Translations::from_json(r#"{"no_value": "Aucune valeur"}"#).unwrap());
        assert_eq!(t.translate("no_value"), "Aucune valeur");
        assert_eq!(t.translate("cancel"), "Cancel");
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case_to_underscores("lastUpdated"), "last_updated");
        assert_eq!(camel_case_to_underscores("userGroup"), "user_group");
        assert_eq!(camel_case_to_underscores("href"), "href");
        assert_eq!(
            camel_case_to_underscores("assignToOrgUnits"),
            "assign_to_org_units"
        );
    }
}
