/// Simple Moving Average indicator.
///
/// Trailing window: the value at index `i` is the mean of `values[i + 1 - window ..= i]`,
/// so the latest value always includes the latest input. Positions before the
/// window fills are `None`.
#[derive(Debug, Clone)]
pub struct SmaIndicator {
    pub window: usize,
}

impl SmaIndicator {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "SMA window must be >= 1");
        Self { window }
    }

    /// Compute the SMA series from a slice of values (oldest first).
    /// The output has the same length as the input.
    pub fn compute(&self, values: &[f64]) -> Vec<Option<f64>> {
        let filled = values
            .windows(self.window)
            .map(|w| Some(w.iter().sum::<f64>() / self.window as f64));

        std::iter::repeat(None)
            .take(values.len().min(self.window - 1))
            .chain(filled)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_output_matches_input_length() {
        let sma = SmaIndicator::new(3);
        assert_eq!(sma.compute(&[1.0, 2.0]).len(), 2);
        assert_eq!(sma.compute(&[1.0, 2.0, 3.0, 4.0]).len(), 4);
        assert!(sma.compute(&[]).is_empty());
    }

    #[test]
    fn sma_is_none_until_window_fills() {
        let sma = SmaIndicator::new(3);
        let out = sma.compute(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(2.0));
        assert_eq!(out[3], Some(3.0));
    }

    #[test]
    fn sma_window_of_one_is_identity() {
        let sma = SmaIndicator::new(1);
        let out = sma.compute(&[5.0, 7.0]);
        assert_eq!(out, vec![Some(5.0), Some(7.0)]);
    }

    #[test]
    fn sma_latest_includes_latest_value() {
        let sma = SmaIndicator::new(4);
        let out = sma.compute(&[10.0, 10.0, 10.0, 10.0, 14.0]);
        let last = out.last().copied().flatten().unwrap();
        assert!((last - 11.0).abs() < 1e-9, "Expected 11, got {last}");
    }

    #[test]
    #[should_panic]
    fn sma_rejects_zero_window() {
        SmaIndicator::new(0);
    }
}
