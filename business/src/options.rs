use serde::Deserialize;
use ustr::Ustr;

use crate::i18n::Translate;

/// One choice of a selector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    pub value: Ustr,
    pub text: String,
}

impl SelectOption {
    pub fn new(value: impl AsRef<str>, text: impl Into<String>) -> Self {
        Self {
            value: Ustr::from(value.as_ref()),
            text: text.into(),
        }
    }

    /// Replaces the text with its translation, looked up by the lowercased text.
    pub fn translated(mut self, translate: &impl Translate) -> Self {
        if !self.text.is_empty() {
            self.text = translate.translate(&self.text.to_lowercase());
        }
        self
    }
}

/// Case-insensitive, whitespace tokenized AND match. An empty filter matches everything.
pub fn matches_filter(text: &str, filter: &str) -> bool {
    let text = text.to_lowercase();
    filter
        .to_lowercase()
        .split_whitespace()
        .all(|token| text.contains(token))
}

/// Text of the option holding `value`, or `""` when there is none.
pub fn option_text(options: &[SelectOption], value: Option<Ustr>) -> &str {
    value
        .and_then(|value| options.iter().find(|option| option.value == value))
        .map(|option| option.text.as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translations;

    #[test]
    fn filter_requires_every_token() {
        assert!(matches_filter("Bo District Hospital", "bo hosp"));
        assert!(matches_filter("Bo District Hospital", "  HOSPITAL   dist "));
        assert!(!matches_filter("Bo District Hospital", "bo clinic"));
        assert!(matches_filter("anything", ""));
        assert!(matches_filter("anything", "   "));
    }

    #[test]
    fn translated_uses_lowercase_key() {
        let t = Translations::from_pairs(&[("male", "Homme")]);
        assert_eq!(SelectOption::new("M", "MALE").translated(&t).text, "Homme");
        assert_eq!(
            SelectOption::new("X", "Other").translated(&t).text,
            "** other **"
        );
    }

    #[test]
    fn option_text_for_unknown_value_is_empty() {
        let options = vec![SelectOption::new("a", "Alpha")];
        assert_eq!(option_text(&options, Some(Ustr::from("a"))), "Alpha");
        assert_eq!(option_text(&options, Some(Ustr::from("z"))), "");
        assert_eq!(option_text(&options, None), "");
    }
}
