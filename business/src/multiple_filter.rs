//! Multi select with a compact summary and a staged edit dialog.

use ustr::Ustr;

use crate::i18n::Translate;
use crate::options::{SelectOption, matches_filter};

/// Number of names spelled out in the compact summary.
pub const COMPACT_LIMIT: usize = 3;

/// Summary of the committed selection: `"a, b, c"` or `"a, b, c and 2 others"`.
///
/// Values without a matching option are skipped.
pub fn compact_label(
    options: &[SelectOption],
    selected: &[Ustr],
    limit: usize,
    translate: &impl Translate,
) -> String {
    let names: Vec<&str> = selected
        .iter()
        .filter_map(|value| options.iter().find(|option| option.value == *value))
        .map(|option| option.text.as_str())
        .collect();

    if names.len() <= limit {
        return names.join(", ");
    }

    let shown = names[..limit].join(", ");
    let others = (names.len() - limit).to_string();
    translate.translate_with(
        "this_and_n_others_compact",
        &[("this", &shown), ("n", &others)],
    )
}

#[derive(Debug, Clone, Default)]
pub struct MultipleFilterState {
    options: Vec<SelectOption>,
    selected: Vec<Ustr>,
    dialog_open: bool,
    staged: Vec<Ustr>,
    filter_text: String,
}

impl MultipleFilterState {
    pub fn new(options: Vec<SelectOption>, selected: Vec<Ustr>) -> Self {
        Self {
            options,
            selected,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
    }

    /// The committed selection.
    pub fn selected(&self) -> &[Ustr] {
        &self.selected
    }

    /// Replaces the committed selection (owner pushed a new value).
    pub fn set_selected(&mut self, selected: Vec<Ustr>) {
        self.selected = selected;
    }

    pub fn summary(&self, translate: &impl Translate) -> String {
        compact_label(&self.options, &self.selected, COMPACT_LIMIT, translate)
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    /// Opens the dialog seeded with the committed selection.
    pub fn open_dialog(&mut self) {
        self.staged = self.selected.clone();
        self.filter_text.clear();
        self.dialog_open = true;
    }

    pub fn staged(&self) -> &[Ustr] {
        &self.staged
    }

    pub fn is_staged(&self, value: Ustr) -> bool {
        self.staged.contains(&value)
    }

    /// Adds or removes `value` from the staged selection.
    pub fn toggle_staged(&mut self, value: Ustr) {
        if let Some(index) = self.staged.iter().position(|v| *v == value) {
            self.staged.remove(index);
        } else {
            self.staged.push(value);
        }
    }

    pub fn filter_text_mut(&mut self) -> &mut String {
        &mut self.filter_text
    }

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
    }

    /// Options not staged yet, narrowed by the dialog filter.
    pub fn available(&self) -> Vec<&SelectOption> {
        self.options
            .iter()
            .filter(|option| !self.staged.contains(&option.value))
            .filter(|option| matches_filter(&option.text, &self.filter_text))
            .collect()
    }

    /// Staged options in staging order.
    pub fn staged_options(&self) -> Vec<&SelectOption> {
        self.staged
            .iter()
            .filter_map(|value| self.options.iter().find(|option| option.value == *value))
            .collect()
    }

    /// Commits the staged selection, closes the dialog and returns the value for `on_change`.
    pub fn apply(&mut self) -> Vec<Ustr> {
        self.selected = std::mem::take(&mut self.staged);
        self.dialog_open = false;
        self.selected.clone()
    }

    /// Discards staged edits.
    pub fn cancel(&mut self) {
        self.staged.clear();
        self.dialog_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translations;

    fn abc() -> Vec<SelectOption> {
        ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|v| SelectOption::new(v, v))
            .collect()
    }

    fn values(v: &[&str]) -> Vec<Ustr> {
        v.iter().map(|s| Ustr::from(*s)).collect()
    }

    #[test]
    fn compact_label_limits_names() {
        let t = Translations::english();
        assert_eq!(
            compact_label(&abc(), &values(&["a", "b", "c", "d", "e"]), 3, &t),
            "a, b, c and 2 others"
        );
        assert_eq!(compact_label(&abc(), &values(&["a", "b"]), 3, &t), "a, b");
        assert_eq!(compact_label(&abc(), &values(&["a", "b", "c"]), 3, &t), "a, b, c");
        assert_eq!(compact_label(&abc(), &[], 3, &t), "");
    }

    #[test]
    fn compact_label_skips_unknown_values() {
        let t = Translations::english();
        assert_eq!(
            compact_label(&abc(), &values(&["a", "zz", "b", "c", "d"]), 3, &t),
            "a, b, c and 1 others"
        );
    }

    #[test]
    fn edits_are_staged_until_apply() {
        let mut state = MultipleFilterState::new(abc(), values(&["a"]));
        state.open_dialog();
        state.toggle_staged(Ustr::from("b"));
        state.toggle_staged(Ustr::from("a"));

        assert_eq!(state.selected(), values(&["a"]).as_slice());
        assert_eq!(state.apply(), values(&["b"]));
        assert_eq!(state.selected(), values(&["b"]).as_slice());
        assert!(!state.is_dialog_open());
    }

    #[test]
    fn cancel_reverts_to_committed() {
        let mut state = MultipleFilterState::new(abc(), values(&["a", "c"]));
        state.open_dialog();
        state.toggle_staged(Ustr::from("e"));
        state.cancel();

        assert_eq!(state.selected(), values(&["a", "c"]).as_slice());

        state.open_dialog();
        assert_eq!(state.staged(), values(&["a", "c"]).as_slice());
    }

    #[test]
    fn available_excludes_staged_and_filters() {
        let mut state = MultipleFilterState::new(abc(), values(&["a"]));
        state.open_dialog();
        let texts: Vec<_> = state.available().iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "d", "e"]);

        state.set_filter_text("D");
        let texts: Vec<_> = state.available().iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["d"]);
    }
}
