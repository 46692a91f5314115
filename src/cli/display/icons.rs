//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (step completed)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (degraded, best-effort failure)
    pub const WARNING: &'static str = "⚠";

    /// Error icon (step failed)
    pub const ERROR: &'static str = "✗";

    /// Pending icon (waiting)
    pub const PENDING: &'static str = "⏳";

    /// Get status icon for a step result
    pub fn get_step_icon(succeeded: bool, retryable: bool) -> &'static str {
        if succeeded {
            Self::SUCCESS
        } else if retryable {
            Self::WARNING
        } else {
            Self::ERROR
        }
    }

    /// Get icon for a remaining-resource category in the verification
    /// checklist: empty means clean.
    pub fn get_checklist_icon(remaining: usize) -> &'static str {
        if remaining == 0 {
            Self::SUCCESS
        } else {
            Self::WARNING
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_step_icon() {
        assert_eq!(StatusIcon::get_step_icon(true, false), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_step_icon(false, true), StatusIcon::WARNING);
        assert_eq!(StatusIcon::get_step_icon(false, false), StatusIcon::ERROR);
    }

    #[test]
    fn test_get_checklist_icon() {
        assert_eq!(StatusIcon::get_checklist_icon(0), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_checklist_icon(2), StatusIcon::WARNING);
    }
}
