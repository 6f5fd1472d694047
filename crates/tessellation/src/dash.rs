//! The dash state machine shared by the general and rectilinear strokers.

use crate::geom::Fixed;
use crate::StrokeStyle;

/// Tracks the position within the dash pattern while walking a subpath.
/// Lengths are in user space; segment walkers convert their steps before
/// calling [`StrokerDash::step`].
#[derive(Clone, Debug)]
pub(crate) struct StrokerDash {
    pub dashed: bool,
    pub dash_index: usize,
    pub dash_on: bool,
    pub dash_starts_on: bool,
    pub dash_remain: f64,

    dash_offset: f64,
    dashes: Vec<f64>,
}

impl StrokerDash {
    pub fn new(style: &StrokeStyle) -> Self {
        let mut dash = StrokerDash {
            dashed: style.is_dashed(),
            dash_index: 0,
            dash_on: true,
            dash_starts_on: true,
            dash_remain: 0.0,
            dash_offset: style.dash_offset,
            dashes: style.dash.clone(),
        };

        if dash.dashed {
            dash.start();
        }
        dash
    }

    /// Rewinds the pattern to the configured offset; called at the start
    /// of every subpath.
    pub fn start(&mut self) {
        if !self.dashed {
            return;
        }

        let mut offset = self.dash_offset;
        let mut on = true;
        let mut i = 0;

        // Stop as soon as the offset reaches zero, so that an initial dash
        // segment shrunk to zero is not skipped over.
        while offset > 0.0 && offset >= self.dashes[i] {
            offset -= self.dashes[i];
            on = !on;
            i += 1;
            if i == self.dashes.len() {
                i = 0;
            }
        }

        self.dash_index = i;
        self.dash_on = on;
        self.dash_starts_on = on;
        self.dash_remain = self.dashes[i] - offset;
    }

    /// Consumes `step` length from the current dash, flipping the on/off
    /// phase when the dash is exhausted (within the fixed-point error).
    pub fn step(&mut self, step: f64) {
        self.dash_remain -= step;
        if self.dash_remain < Fixed::ERROR_DOUBLE {
            self.dash_index += 1;
            if self.dash_index == self.dashes.len() {
                self.dash_index = 0;
            }

            self.dash_on = !self.dash_on;
            self.dash_remain += self.dashes[self.dash_index];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(dash: &[f64], offset: f64) -> StrokeStyle {
        let mut style = StrokeStyle::default();
        style.dash = dash.to_vec();
        style.dash_offset = offset;
        style
    }

    #[test]
    fn undashed_style() {
        let dash = StrokerDash::new(&StrokeStyle::default());
        assert!(!dash.dashed);
    }

    #[test]
    fn offset_advances_the_pattern() {
        let dash = StrokerDash::new(&style(&[2.0, 1.0], 0.0));
        assert!(dash.dash_on);
        assert_eq!(dash.dash_remain, 2.0);

        // An offset inside the first gap starts "off".
        let dash = StrokerDash::new(&style(&[2.0, 1.0], 2.5));
        assert!(!dash.dash_on);
        assert!(!dash.dash_starts_on);
        assert_eq!(dash.dash_remain, 0.5);

        // An offset spanning a whole period wraps around.
        let dash = StrokerDash::new(&style(&[2.0, 1.0], 3.5));
        assert!(dash.dash_on);
        assert_eq!(dash.dash_remain, 0.5);
    }

    #[test]
    fn stepping_flips_phases() {
        let mut dash = StrokerDash::new(&style(&[2.0, 1.0], 0.0));

        dash.step(1.0);
        assert!(dash.dash_on);
        assert_eq!(dash.dash_remain, 1.0);

        dash.step(1.0);
        assert!(!dash.dash_on);
        assert_eq!(dash.dash_remain, 1.0);

        dash.step(1.0);
        assert!(dash.dash_on);
        assert_eq!(dash.dash_remain, 2.0);
    }

    #[test]
    fn total_on_length_is_preserved() {
        // Walking any distance in arbitrary steps spends exactly the
        // pattern's on-ratio of it (up to one trailing dash).
        let mut dash = StrokerDash::new(&style(&[2.0, 2.0], 0.0));
        let mut on_total = 0.0;
        let steps = [0.5, 1.25, 0.25, 2.0, 3.0, 1.0];
        for &s in &steps {
            let mut remaining: f64 = s;
            while remaining > 0.0 {
                let chunk = remaining.min(dash.dash_remain);
                if dash.dash_on {
                    on_total += chunk;
                }
                dash.step(chunk);
                remaining -= chunk;
            }
        }
        // 8 total distance, half of it on.
        let total: f64 = steps.iter().sum();
        assert!((on_total - total / 2.0).abs() < 16.0 * Fixed::ERROR_DOUBLE);
    }
}
