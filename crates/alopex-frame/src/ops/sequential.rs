use crate::frame::Row;
use crate::{FrameError, Result};

/// Values [`Row::diff`] can subtract.
///
/// Integer subtraction is checked; `None` means the difference does not fit.
pub trait Difference: Copy + Default {
    fn difference(self, earlier: Self) -> Option<Self>;
}

macro_rules! checked_difference {
    ($($t:ty),*) => {
        $(impl Difference for $t {
            fn difference(self, earlier: Self) -> Option<Self> {
                self.checked_sub(earlier)
            }
        })*
    };
}

checked_difference!(i32, i64);

impl Difference for f64 {
    fn difference(self, earlier: Self) -> Option<Self> {
        Some(self - earlier)
    }
}

impl<'a> Row<'a> {
    /// Difference between `selector` on this row and on the previous row.
    ///
    /// The first row has no predecessor and yields `T::default()`. An integer
    /// difference that overflows is an `InvalidOperation`.
    pub fn diff<T, F>(&self, selector: F) -> Result<T>
    where
        T: Difference,
        F: Fn(&Row<'a>) -> Result<T>,
    {
        let Some(prev) = self.prev() else {
            return Ok(T::default());
        };
        selector(self)?
            .difference(selector(&prev)?)
            .ok_or_else(|| {
                FrameError::invalid_operation(format!(
                    "difference between rows {} and {} overflows",
                    prev.index(),
                    self.index()
                ))
            })
    }

    /// Mean of `selector` over this row and up to `k - 1` preceding rows.
    ///
    /// Near the top of the frame fewer than `k` rows exist; the mean is taken
    /// over those that do.
    pub fn moving_average<F>(&self, k: usize, selector: F) -> Result<f64>
    where
        F: Fn(&Row<'a>) -> Result<f64>,
    {
        if k == 0 {
            return Err(FrameError::invalid_operation(
                "moving average window must cover at least one row",
            ));
        }
        let mut sum = 0.0;
        let mut count = 0_usize;
        for row in self.backward().take(k) {
            sum += selector(&row)?;
            count += 1;
        }
        Ok(sum / count as f64)
    }
}
