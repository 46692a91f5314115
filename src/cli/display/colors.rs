//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color for a step result
    pub fn get_step_color(&self, succeeded: bool) -> TableColor {
        if succeeded {
            self.success
        } else {
            self.error
        }
    }

    /// Get color for a vulnerability severity label
    pub fn get_severity_color(&self, severity: &str) -> TableColor {
        match severity.to_ascii_uppercase().as_str() {
            "CRITICAL" => self.error,
            "HIGH" => self.warning,
            "MEDIUM" => self.info,
            "LOW" => self.muted,
            _ => TableColor::White,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.warning, TableColor::Yellow);
        assert_eq!(theme.error, TableColor::Red);
    }

    #[test]
    fn test_get_step_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.get_step_color(true), TableColor::Green);
        assert_eq!(theme.get_step_color(false), TableColor::Red);
    }

    #[test]
    fn test_get_severity_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.get_severity_color("critical"), TableColor::Red);
        assert_eq!(theme.get_severity_color("HIGH"), TableColor::Yellow);
        assert_eq!(theme.get_severity_color("unknown"), TableColor::White);
    }
}
