use serde::Deserialize;
use ustr::Ustr;

/// A node of the organisation unit hierarchy.
///
/// `path` (`/rootId/.../id`) identifies the node in selections and in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    pub id: Ustr,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub path: String,
    /// Filled from `children::isNotEmpty`.
    #[serde(default, rename = "children")]
    pub has_children: bool,
}

impl OrgUnit {
    pub fn new(id: &str, display_name: &str, path: &str, has_children: bool) -> Self {
        Self {
            id: Ustr::from(id),
            display_name: display_name.to_owned(),
            path: path.to_owned(),
            has_children,
        }
    }
}

/// Last segment of an org unit path.
pub fn id_from_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitLevel {
    pub id: Ustr,
    pub level: u32,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitGroup {
    pub id: Ustr,
    #[serde(default)]
    pub display_name: String,
}
