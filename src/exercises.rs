//! Small numeric-array demonstrations, unrelated to the dashboard.

use std::fmt;
use std::mem::size_of;

use ndarray::{Array2, ArrayBase, Axis, Data, Dimension};

/// `rows × cols` grid of alternating 1/0 with a 1 in the top-left corner.
///
/// Cell `(r, c)` is 1 when `r + c` is even.
pub fn checkerboard(rows: usize, cols: usize) -> Array2<u8> {
    let mut board = Array2::from_elem((rows, cols), 1u8);
    for ((r, c), cell) in board.indexed_iter_mut() {
        if (r + c) % 2 == 1 {
            *cell = 0;
        }
    }
    board
}

/// Shape and memory usage of an array's elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFootprint {
    pub shape: Vec<usize>,
    pub ndim: usize,
    /// Number of elements.
    pub size: usize,
    /// Bytes per element.
    pub itemsize: usize,
    /// `size * itemsize`.
    pub nbytes: usize,
}

impl MemoryFootprint {
    pub fn of<S, D>(array: &ArrayBase<S, D>) -> Self
    where
        S: Data,
        D: Dimension,
    {
        let itemsize = size_of::<S::Elem>();
        MemoryFootprint {
            shape: array.shape().to_vec(),
            ndim: array.ndim(),
            size: array.len(),
            itemsize,
            nbytes: array.len() * itemsize,
        }
    }
}

impl fmt::Display for MemoryFootprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shape {:?} ndim {} size {} itemsize {} total bytes {}",
            self.shape, self.ndim, self.size, self.itemsize, self.nbytes
        )
    }
}

/// Swap the first and last rows in place.
///
/// The first row is copied out before either row is overwritten. Arrays with
/// fewer than two rows are left as they are.
pub fn swap_first_last_rows<T: Clone>(a: &mut Array2<T>) {
    let last = a.nrows();
    if last < 2 {
        return;
    }
    let first = a.row(0).to_owned();
    {
        let (mut head, tail) = a.view_mut().split_at(Axis(0), last - 1);
        head.row_mut(0).assign(&tail.row(0));
    }
    a.row_mut(last - 1).assign(&first);
}

#[cfg(test)]
mod tests {
    use ndarray::{arr2, Array};

    use super::*;

    #[test]
    fn checkerboard_alternates_in_both_axes() {
        let board = checkerboard(10, 10);
        assert_eq!(board[[0, 0]], 1);
        assert_eq!(board[[1, 0]], 0);
        assert_eq!(board[[0, 1]], 0);
        for r in 0..10 {
            for c in 0..10 {
                if r + 1 < 10 {
                    assert_eq!(board[[r, c]], 1 - board[[r + 1, c]]);
                }
                if c + 1 < 10 {
                    assert_eq!(board[[r, c]], 1 - board[[r, c + 1]]);
                }
            }
        }
    }

    #[test]
    fn checkerboard_handles_non_square() {
        assert_eq!(checkerboard(2, 3), arr2(&[[1u8, 0, 1], [0, 1, 0]]));
        assert_eq!(checkerboard(0, 4).len(), 0);
    }

    #[test]
    fn footprint_of_large_f64_buffer() {
        let m = Array2::<f64>::zeros((1000, 1000));
        let fp = MemoryFootprint::of(&m);
        assert_eq!(fp.shape, vec![1000, 1000]);
        assert_eq!(fp.ndim, 2);
        assert_eq!(fp.size, 1_000_000);
        assert_eq!(fp.itemsize, 8);
        assert_eq!(fp.nbytes, 8_000_000);
    }

    #[test]
    fn footprint_uses_element_width() {
        let m = Array2::<f32>::zeros((3, 4));
        assert_eq!(MemoryFootprint::of(&m).nbytes, 48);
    }

    #[test]
    fn swap_moves_rows_without_corruption() {
        let mut a = Array::from_iter(0..20).into_shape_with_order((4, 5)).unwrap();
        swap_first_last_rows(&mut a);
        assert_eq!(a.row(0).to_vec(), vec![15, 16, 17, 18, 19]);
        assert_eq!(a.row(3).to_vec(), vec![0, 1, 2, 3, 4]);
        assert_eq!(a.row(1).to_vec(), vec![5, 6, 7, 8, 9]);
        assert_eq!(a.row(2).to_vec(), vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn swap_leaves_single_row_alone() {
        let mut a = arr2(&[[1, 2, 3]]);
        swap_first_last_rows(&mut a);
        assert_eq!(a, arr2(&[[1, 2, 3]]));
    }
}
