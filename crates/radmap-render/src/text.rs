use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-free measurer: every display column is `font_size * char_width_factor` wide.
///
/// Wide (CJK) characters count as two columns.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = style.font_size.max(1.0);
        let mut line_count = 0usize;
        let mut max_cols = 0usize;
        for line in text.split('\n') {
            line_count += 1;
            max_cols = max_cols.max(UnicodeWidthStr::width(line));
        }

        TextMetrics {
            width: max_cols as f64 * font_size * char_width_factor,
            height: line_count as f64 * font_size * line_height_factor,
            line_count,
        }
    }
}

/// Label font size for a tree level: 18px at the root, 2px smaller per level, floored at 12px.
pub fn font_size_for_level(level: usize) -> f64 {
    (18.0 - 2.0 * level as f64).max(12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_measure_uses_display_columns() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle {
            font_size: 10.0,
            ..Default::default()
        };
        let ascii = m.measure("abcd", &style);
        assert_eq!(ascii.width, 24.0);
        assert_eq!(ascii.height, 12.0);
        assert_eq!(ascii.line_count, 1);

        let wide = m.measure("思维", &style);
        assert_eq!(wide.width, 24.0);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let m = DeterministicTextMeasurer::default();
        let metrics = m.measure("", &TextStyle::default());
        assert_eq!(metrics.width, 0.0);
        assert_eq!(metrics.line_count, 1);
    }

    #[test]
    fn multi_line_takes_widest_line() {
        let m = DeterministicTextMeasurer::default();
        let metrics = m.measure("ab\nabcdef", &TextStyle::default());
        assert_eq!(metrics.line_count, 2);
        assert!((metrics.width - 6.0 * 16.0 * 0.6).abs() < 1e-9);
    }

    #[test]
    fn font_size_shrinks_by_level() {
        assert_eq!(font_size_for_level(0), 18.0);
        assert_eq!(font_size_for_level(1), 16.0);
        assert_eq!(font_size_for_level(3), 12.0);
        assert_eq!(font_size_for_level(10), 12.0);
    }
}
