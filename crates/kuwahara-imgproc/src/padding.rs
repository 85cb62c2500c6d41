/// How a neighborhood stencil reads pixels that fall outside the image.
///
/// The kuwahara stages all read their borders with [`PaddingMode::Reflect101`].
/// [`PaddingMode::Constant`] and [`PaddingMode::Replicate`] are offered to callers of
/// the generic filters in [`crate::filter`], e.g. a zero padded [`gaussian_blur`].
///
/// [`gaussian_blur`]: crate::filter::gaussian_blur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingMode {
    /// Outside taps are dropped, as if the image were surrounded by zeros.
    ///
    /// `c b a | 0 0 0`
    Constant,

    /// Outside taps read the nearest edge pixel.
    ///
    /// `c b a | a a a`
    Replicate,

    /// Mirror around the edge pixel, which is not repeated.
    ///
    /// `c b a | b c d`
    #[default]
    Reflect101,
}

impl PaddingMode {
    /// Fold `i` into `[0, len)`, or `None` when a [`PaddingMode::Constant`] tap lands
    /// outside. `len` must be non zero.
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        if (0..len as isize).contains(&i) {
            return Some(i as usize);
        }
        match self {
            PaddingMode::Constant => None,
            PaddingMode::Replicate => Some(i.clamp(0, len as isize - 1) as usize),
            PaddingMode::Reflect101 => {
                // mirrored indices repeat with period 2 * (len - 1)
                let period = 2 * (len as isize - 1);
                if period == 0 {
                    return Some(0);
                }
                let folded = i.rem_euclid(period);
                Some(if folded < len as isize {
                    folded
                } else {
                    period - folded
                } as usize)
            }
        }
    }

    /// Source index of every position in `[-half, len + half)`, shifted so that entry
    /// `k` belongs to position `k - half`.
    ///
    /// Row stencils look their columns up here instead of folding per tap.
    pub fn index_table(&self, len: usize, half: usize) -> Vec<Option<usize>> {
        let half = half as isize;
        (-half..len as isize + half)
            .map(|i| self.map_index(i, len))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_index() {
        let positions = [-2, -1, 0, 3, 4, 5];
        let cases = [
            (PaddingMode::Constant, [None, None, Some(0), Some(3), None, None]),
            (
                PaddingMode::Replicate,
                [Some(0), Some(0), Some(0), Some(3), Some(3), Some(3)],
            ),
            (
                PaddingMode::Reflect101,
                [Some(2), Some(1), Some(0), Some(3), Some(2), Some(1)],
            ),
        ];

        for (mode, expected) in cases {
            assert_eq!(positions.map(|i| mode.map_index(i, 4)), expected, "{mode:?}");
        }
    }

    #[test]
    fn test_reflect101_far_outside() {
        // 0 1 2 1 | 0 1 2 1 | 0 ...
        let got = (-5..9)
            .map(|i| PaddingMode::Reflect101.map_index(i, 3))
            .collect::<Vec<_>>();
        let expected = [1, 0, 1, 2, 1, 0, 1, 2, 1, 0, 1, 2, 1, 0].map(Some);
        assert_eq!(got, expected);

        assert_eq!(PaddingMode::Reflect101.map_index(-3, 1), Some(0));
        assert_eq!(PaddingMode::Replicate.map_index(7, 1), Some(0));
    }

    #[test]
    fn test_index_table() {
        let table = PaddingMode::Reflect101.index_table(3, 1);
        assert_eq!(table, vec![Some(1), Some(0), Some(1), Some(2), Some(1)]);
    }
}
