//! Trend sparkline widget for inline visualization

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different values (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A one-row sparkline of the most recent values of a series
pub struct TrendSparkline<'a> {
    values: &'a [f64],
    min: f64,
    max: f64,
    /// Style for the sparkline
    style: Style,
    /// Style for the latest value
    latest_style: Style,
}

impl<'a> TrendSparkline<'a> {
    /// Scales to the range of `values`
    pub fn new(values: &'a [f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            values,
            min: if min.is_finite() { min } else { 0.0 },
            max: if max.is_finite() { max } else { 0.0 },
            style: Style::default().fg(Color::Cyan),
            latest_style: Style::default().fg(Color::Yellow),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn value_to_block(&self, value: f64) -> char {
        let span = self.max - self.min;
        // A flat series sits on the middle row
        let normalized = if span <= 0.0 {
            0.5
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        };
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for TrendSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Keep the newest values when the series is wider than the area
        let width = area.width as usize;
        let start = self.values.len().saturating_sub(width);
        let shown = &self.values[start..];

        for (i, value) in shown.iter().enumerate() {
            let style = if i + 1 == shown.len() {
                self.latest_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((area.x + i as u16, area.y)) {
                cell.set_char(self.value_to_block(*value)).set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_to_block_range_ends() {
        let values = [10.0, 20.0, 30.0];
        let sparkline = TrendSparkline::new(&values);
        assert_eq!(sparkline.value_to_block(10.0), '▁');
        assert_eq!(sparkline.value_to_block(30.0), '█');
    }

    #[test]
    fn test_flat_series_uses_middle_block() {
        let values = [5.0, 5.0];
        let sparkline = TrendSparkline::new(&values);
        assert_eq!(sparkline.value_to_block(5.0), BLOCKS[4]);
    }

    #[test]
    fn test_empty_series_has_zero_range() {
        let sparkline = TrendSparkline::new(&[]);
        assert_eq!(sparkline.min, 0.0);
        assert_eq!(sparkline.max, 0.0);
    }

    #[test]
    fn test_render_keeps_newest_values() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let mut buf = Buffer::empty(Rect::new(0, 0, 3, 1));
        TrendSparkline::new(&values).render(Rect::new(0, 0, 3, 1), &mut buf);

        let rendered: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        assert_eq!(rendered, "▆▇█");
    }
}
