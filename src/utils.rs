use crate::model::Price;

#[derive(Default)]
pub struct MovingAverage {
    value: Price,
    length: usize,
}

impl MovingAverage {
    pub fn feed(&mut self, value: Price) {
        self.value += value;
        self.length += 1;
    }

    pub fn avg(&self) -> Option<f64> {
        if self.length == 0 {
            return None;
        }

        Some(self.value / self.length as Price)
    }
}

/// Percentage change from `base` to `latest`. `None` when the ratio is undefined.
pub fn pct_change(base: Price, latest: Price) -> Option<f64> {
    ratio_change(base, latest).map(|r| r * 100.0)
}

/// Fractional change from `base` to `latest`, e.g. `0.05` for +5%.
pub fn ratio_change(base: Price, latest: Price) -> Option<f64> {
    if !(base > 0.0) || !latest.is_finite() {
        return None;
    }

    let change = latest / base - 1.0;
    change.is_finite().then_some(change)
}

#[cfg(test)]
mod tests {
    use super::{pct_change, ratio_change, MovingAverage};

    #[test]
    fn unittest_moving_average() {
        let mut avg = MovingAverage::default();
        assert_eq!(avg.avg(), None);

        avg.feed(10.0);
        assert_eq!(avg.avg(), Some(10.0));

        avg.feed(20.0);
        avg.feed(30.0);
        assert_eq!(avg.avg(), Some(20.0));
    }

    #[test]
    fn unittest_change_guards_bad_base() {
        assert_eq!(ratio_change(0.0, 10.0), None);
        assert_eq!(ratio_change(-1.0, 10.0), None);
        assert_eq!(ratio_change(f64::NAN, 10.0), None);
        assert_eq!(pct_change(10.0, f64::INFINITY), None);
        assert_eq!(pct_change(100.0, 150.0), Some(50.0));
    }
}
