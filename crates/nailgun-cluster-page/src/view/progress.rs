/*
[INPUT]:  Task progress reported by the server (0-100)
[OUTPUT]: Progress bar width and label
[POS]:    View helper - deployment progress indicator
[UPDATE]: When changing progress presentation
*/

/// Smallest bar width so a running task is always visible
pub const MIN_VISIBLE_PROGRESS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressDisplay {
    /// Bar width in percent, never below `MIN_VISIBLE_PROGRESS`
    pub bar_width: u8,
    /// Reported progress, capped at 100
    pub percentage: u8,
}

impl ProgressDisplay {
    pub fn new(progress: u8) -> Self {
        let percentage = progress.min(100);
        Self {
            bar_width: percentage.max(MIN_VISIBLE_PROGRESS),
            percentage,
        }
    }

    pub fn text(&self) -> String {
        format!("{}%", self.percentage)
    }

    pub fn width(&self) -> String {
        format!("{}%", self.bar_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 3, "0%")]
    #[case(2, 3, "2%")]
    #[case(3, 3, "3%")]
    #[case(47, 47, "47%")]
    #[case(100, 100, "100%")]
    #[case(140, 100, "100%")]
    fn test_progress_clamp(#[case] progress: u8, #[case] width: u8, #[case] text: &str) {
        let display = ProgressDisplay::new(progress);
        assert_eq!(display.bar_width, width);
        assert_eq!(display.text(), text);
        assert!(display.bar_width >= MIN_VISIBLE_PROGRESS);
    }
}
