//! Shared color constants for the UI.

use egui::Color32;

/// Subtle gray for table and panel borders.
pub const TABLE_BORDER_COLOR: Color32 = Color32::from_rgb(200, 200, 200);

/// Light gray behind table headers.
pub const HEADER_BG_COLOR: Color32 = Color32::from_rgb(245, 245, 245);

/// Dark background of the snackbar.
pub const SNACK_BG_COLOR: Color32 = Color32::from_rgb(50, 50, 50);

/// Delete and error states.
pub const COLOR_RED: Color32 = Color32::from_rgb(220, 53, 69);

/// Muted gray for secondary text such as the details field labels.
pub const COLOR_MUTED: Color32 = Color32::from_rgb(117, 117, 117);
