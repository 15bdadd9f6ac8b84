//! Single choice selector that switches to a filter dialog for long option lists.

use ustr::Ustr;

use crate::config::DEFAULT_DROPDOWN_LIMIT;
use crate::i18n::Translate;
use crate::options::{SelectOption, matches_filter, option_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownMode {
    /// All options are listed in a plain combo box.
    Select,
    /// A read-only field opens a modal list with a text filter.
    Dialog,
}

/// One row of the plain selector or of the dialog list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownEntry {
    /// `None` is the "no value" sentinel.
    pub value: Option<Ustr>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct DropdownState {
    options: Vec<SelectOption>,
    limit: usize,
    required: bool,
    value: Option<Ustr>,
    dialog_open: bool,
    filter_text: String,
}

impl DropdownState {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            limit: DEFAULT_DROPDOWN_LIMIT,
            required: false,
            value: None,
            dialog_open: false,
            filter_text: String::new(),
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: Option<Ustr>) -> Self {
        self.value = value;
        self
    }

    /// Translates every option text through its lowercased key.
    #[must_use]
    pub fn translate_options(mut self, translate: &impl Translate) -> Self {
        self.options = self
            .options
            .into_iter()
            .map(|option| option.translated(translate))
            .collect();
        self
    }

    /// Replaces the options, keeping value and dialog state.
    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn mode(&self) -> DropdownMode {
        if self.options.len() > self.limit {
            DropdownMode::Dialog
        } else {
            DropdownMode::Select
        }
    }

    pub fn value(&self) -> Option<Ustr> {
        self.value
    }

    /// Text of the committed value; empty when nothing (or an unknown value) is selected.
    pub fn display_text(&self) -> &str {
        option_text(&self.options, self.value)
    }

    /// Rows for the plain selector, with the "no value" sentinel first unless required.
    pub fn select_entries(&self, translate: &impl Translate) -> Vec<DropdownEntry> {
        self.sentinel(translate)
            .into_iter()
            .chain(self.options.iter().map(|option| DropdownEntry {
                value: Some(option.value),
                text: option.text.clone(),
            }))
            .collect()
    }

    fn sentinel(&self, translate: &impl Translate) -> Option<DropdownEntry> {
        (!self.required).then(|| DropdownEntry {
            value: None,
            text: translate.translate("no_value"),
        })
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    /// Opens the filter dialog with an empty filter. Returns `false` in select mode.
    pub fn open_dialog(&mut self) -> bool {
        if self.mode() != DropdownMode::Dialog {
            return false;
        }
        self.dialog_open = true;
        self.filter_text.clear();
        true
    }

    /// Closes the dialog; the committed value is untouched.
    pub fn cancel_dialog(&mut self) {
        self.dialog_open = false;
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
    }

    pub fn filter_text_mut(&mut self) -> &mut String {
        &mut self.filter_text
    }

    /// Dialog rows matching the current filter. The sentinel is always offered unless required.
    pub fn dialog_entries(&self, translate: &impl Translate) -> Vec<DropdownEntry> {
        self.sentinel(translate)
            .into_iter()
            .chain(
                self.options
                    .iter()
                    .filter(|option| matches_filter(&option.text, &self.filter_text))
                    .map(|option| DropdownEntry {
                        value: Some(option.value),
                        text: option.text.clone(),
                    }),
            )
            .collect()
    }

    /// Commits `value`, closes the dialog and returns the value to hand to the owner.
    pub fn pick(&mut self, value: Option<Ustr>) -> Option<Ustr> {
        self.value = value;
        self.dialog_open = false;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translations;

    fn options(n: usize) -> Vec<SelectOption> {
        (0..n)
            .map(|i| SelectOption::new(format!("v{i}"), format!("Option {i}")))
            .collect()
    }

    #[test]
    fn mode_follows_limit() {
        assert_eq!(
            DropdownState::new(options(3)).with_limit(3).mode(),
            DropdownMode::Select
        );
        assert_eq!(
            DropdownState::new(options(4)).with_limit(3).mode(),
            DropdownMode::Dialog
        );
    }

    #[test]
    fn select_mode_never_opens_dialog() {
        let mut state = DropdownState::new(options(2));
        assert!(!state.open_dialog());
        assert!(!state.is_dialog_open());
    }

    #[test]
    fn sentinel_present_unless_required() {
        let t = Translations::english();
        let optional = DropdownState::new(options(2)).select_entries(&t);
        assert_eq!(optional.len(), 3);
        assert_eq!(optional[0].value, None);
        assert_eq!(optional[0].text, "No value");

        let required = DropdownState::new(options(2))
            .required(true)
            .select_entries(&t);
        assert_eq!(required.len(), 2);
    }

    #[test]
    fn dialog_filters_and_commits() {
        let t = Translations::english();
        let mut state = DropdownState::new(options(12)).with_limit(5);

        assert!(state.open_dialog());
        state.set_filter_text("option 1");
        let values: Vec<_> = state
            .dialog_entries(&t)
            .into_iter()
            .map(|entry| entry.value)
            .collect();
        assert_eq!(
            values,
            vec![
                None,
                Some(Ustr::from("v1")),
                Some(Ustr::from("v10")),
                Some(Ustr::from("v11"))
            ]
        );

        assert_eq!(state.pick(Some(Ustr::from("v10"))), Some(Ustr::from("v10")));
        assert!(!state.is_dialog_open());
        assert_eq!(state.display_text(), "Option 10");
    }

    #[test]
    fn cancel_keeps_prior_value() {
        let mut state = DropdownState::new(options(12))
            .with_limit(5)
            .with_value(Some(Ustr::from("v2")));
        state.open_dialog();
        state.set_filter_text("9");
        state.cancel_dialog();

        assert_eq!(state.value(), Some(Ustr::from("v2")));
        assert!(!state.is_dialog_open());
    }

    #[test]
    fn reopening_resets_filter() {
        let mut state = DropdownState::new(options(12)).with_limit(5);
        state.open_dialog();
        state.set_filter_text("abc");
        state.cancel_dialog();
        state.open_dialog();
        assert_eq!(state.filter_text(), "");
    }

    #[test]
    fn no_value_sentinel_clears_selection() {
        let mut state = DropdownState::new(options(12))
            .with_limit(5)
            .with_value(Some(Ustr::from("v2")));
        state.open_dialog();
        assert_eq!(state.pick(None), None);
        assert_eq!(state.display_text(), "");
    }
}
