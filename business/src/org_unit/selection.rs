//! Selection arithmetic over org unit paths. Order of untouched entries is kept.

/// Removes `path` if selected, appends it otherwise. No cascade to parents or children.
pub fn toggle_path(selected: &[String], path: &str) -> Vec<String> {
    if selected.iter().any(|p| p == path) {
        selected.iter().filter(|p| *p != path).cloned().collect()
    } else {
        let mut next = selected.to_vec();
        next.push(path.to_owned());
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkMode {
    Select,
    Deselect,
}

/// Combines the current selection with the paths fetched for a bulk affordance.
///
/// Selecting unions, or with the intersection policy and a non-empty selection keeps
/// only paths present in both. Deselecting removes the fetched paths.
pub fn apply_bulk(
    selected: &[String],
    fetched: &[String],
    mode: BulkMode,
    intersection_policy: bool,
) -> Vec<String> {
    match mode {
        BulkMode::Select if intersection_policy && !selected.is_empty() => selected
            .iter()
            .filter(|p| fetched.contains(p))
            .cloned()
            .collect(),
        BulkMode::Select => {
            let mut next = selected.to_vec();
            for path in fetched {
                if !next.contains(path) {
                    next.push(path.clone());
                }
            }
            next
        }
        BulkMode::Deselect => selected
            .iter()
            .filter(|p| !fetched.contains(p))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn toggle_twice_restores_selection() {
        let selected = paths(&["/a", "/a/b", "/c"]);
        let once = toggle_path(&selected, "/a/b");
        assert_eq!(once, paths(&["/a", "/c"]));
        let twice = toggle_path(&once, "/a/b");
        assert_eq!(twice, paths(&["/a", "/c", "/a/b"]));

        let added = toggle_path(&selected, "/d");
        assert_eq!(toggle_path(&added, "/d"), selected);
    }

    #[test]
    fn toggle_does_not_cascade() {
        let selected = paths(&["/a", "/a/b"]);
        assert_eq!(toggle_path(&selected, "/a"), paths(&["/a/b"]));
    }

    #[test]
    fn union_appends_missing_paths() {
        let selected = paths(&["/a", "/b"]);
        let fetched = paths(&["/b", "/c"]);
        assert_eq!(
            apply_bulk(&selected, &fetched, BulkMode::Select, false),
            paths(&["/a", "/b", "/c"])
        );
    }

    #[test]
    fn intersection_keeps_common_paths() {
        let selected = paths(&["/a", "/b"]);
        let fetched = paths(&["/b", "/c"]);
        assert_eq!(
            apply_bulk(&selected, &fetched, BulkMode::Select, true),
            paths(&["/b"])
        );
        assert_eq!(
            apply_bulk(&[], &fetched, BulkMode::Select, true),
            paths(&["/b", "/c"])
        );
    }

    #[test]
    fn deselect_removes_fetched() {
        let selected = paths(&["/a", "/b", "/c"]);
        assert_eq!(
            apply_bulk(&selected, &paths(&["/b"]), BulkMode::Deselect, true),
            paths(&["/a", "/c"])
        );
    }
}
