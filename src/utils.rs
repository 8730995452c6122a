use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::One;

/// `n!` as an exact integer.
pub fn factorial(n: usize) -> BigUint {
    (1..=n).fold(BigUint::one(), |acc, i| acc * BigUint::from(i))
}

/// Shapley weight of a coalition of size `s` among `n` players:
///
/// ```text
/// s! * (n - s - 1)! / n!
/// ```
pub fn shapley_weight(s: usize, n: usize) -> BigRational {
    assert!(s < n, "Coalition size {} must be smaller than the number of players {}", s, n);
    let num = factorial(s) * factorial(n - s - 1);
    BigRational::new(BigInt::from(num), BigInt::from(factorial(n)))
}

/// Iterator over the `k`-element subsets of `items`, in lexicographic order of positions.
pub struct Combinations<'a> {
    items: &'a [usize],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(items: &'a [usize], k: usize) -> Self {
        Self {
            items,
            indices: (0..k).collect(),
            done: k > items.len(),
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let res = self.indices.iter().map(|&i| self.items[i]).collect();

        // Advance to the next combination
        let n = self.items.len();
        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] != i + n - k) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(res)
    }
}

/// All subsets of `items`, by increasing size.
pub fn powerset(items: &[usize]) -> impl Iterator<Item = Vec<usize>> + '_ {
    (0..=items.len()).flat_map(move |k| Combinations::new(items, k))
}
