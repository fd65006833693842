//! PosOrder: the hyperplane ordering used by the vertex enumerators.
//!
//! Row `i` precedes row `j` iff, at the first column where exactly one of them
//! is zero, row `i` is the one with the zero. Rows with the same zero pattern
//! keep their input order.

use crate::core::integer::IntegerBackend;
use crate::core::matrix::MatrixInt;
use std::cmp::Ordering;

/// Compares two rows under PosOrder.
///
/// # Examples
///
/// ```rust
/// use normal_surfaces::enumerate::pos_order::pos_order_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(pos_order_cmp(&[0_i64, 3], &[2, 0]), Ordering::Less);
/// assert_eq!(pos_order_cmp(&[1_i64, 0], &[-4, 0]), Ordering::Equal);
/// ```
#[must_use]
pub fn pos_order_cmp<I: IntegerBackend>(a: &[I], b: &[I]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match (x.is_zero(), y.is_zero()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

/// Row indices in processing order: the first `initial` rows as given, then
/// the rest sorted stably by PosOrder.
#[must_use]
pub fn pos_order<I: IntegerBackend>(matrix: &MatrixInt<I>, initial: usize) -> Vec<usize> {
    let initial = initial.min(matrix.rows());
    let mut order: Vec<usize> = (0..matrix.rows()).collect();
    order[initial..].sort_by(|&a, &b| pos_order_cmp(matrix.row(a), matrix.row(b)));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_is_stable_after_prefix() {
        let m = MatrixInt::from_rows(
            3,
            vec![
                vec![1_i64, 1, 1],
                vec![1, 0, 0],
                vec![0, 5, 0],
                vec![2, 0, 0],
                vec![0, 0, 1],
            ],
        );
        assert_eq!(pos_order(&m, 0), vec![4, 2, 1, 3, 0]);
        assert_eq!(pos_order(&m, 2), vec![0, 1, 4, 2, 3]);
        assert_eq!(pos_order(&m, 10), vec![0, 1, 2, 3, 4]);
    }
}
