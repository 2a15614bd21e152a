//! Lazy power set enumeration
//!
//! Subsets are produced degree by degree (ascending or descending) and in
//! lexicographic order of item positions within a degree. Two strategies
//! produce this order:
//!
//! - **Bitmask**: while there are at most [`BITMASK_MAX_SETS`] items a subset
//!   fits in a machine word. Item `i` is bit `n - 1 - i`, so lexicographic order
//!   is decreasing numeric order; the masks of popcount `k` are walked in
//!   decreasing order as the complements of the popcount `n - k` masks walked
//!   increasingly with Gosper's hack.
//! - **Lexicographic**: index-vector successor, no bound on the item count.
//!
//! Both yield identical sequences, so the choice is purely a performance one.

use crate::constants::BITMASK_MAX_SETS;

/// Enumeration strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Enumeration {
    /// Bitmask when the item count allows it, lexicographic otherwise
    #[default]
    Auto,
    /// Bitmask enumeration; falls back to lexicographic above the bitmask limit
    Bitmask,
    Lexicographic,
}

/// Order in which degrees are visited
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DegreeOrder {
    #[default]
    Ascending,
    Descending,
}

/// Power set options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PowerSetOptions {
    /// Smallest subset size
    pub min: usize,
    /// Largest subset size (None = number of items)
    pub max: Option<usize>,
    /// Stop after this many subsets
    pub limit: Option<usize>,
    pub strategy: Enumeration,
    pub degree_order: DegreeOrder,
}

impl PowerSetOptions {
    pub fn with_degree(mut self, min: usize, max: Option<usize>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_strategy(mut self, strategy: Enumeration) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_degree_order(mut self, order: DegreeOrder) -> Self {
        self.degree_order = order;
        self
    }
}

/// Binomial coefficient C(n, k), saturating at `u128::MAX`
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // result * (n - i) / (i + 1) stays integral at every step
        result = match result.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    result
}

/// Number of subsets of `n` items with size in `[min, max]`, saturating
pub fn estimated_count(n: usize, min: usize, max: usize) -> u128 {
    if min > max {
        return 0;
    }
    (min..=max.min(n)).fold(0u128, |acc, k| acc.saturating_add(binomial(n, k)))
}

/// Restartable lazy power set over a slice of items
#[derive(Clone, Debug)]
pub struct PowerSet<'a, K> {
    items: &'a [K],
    options: PowerSetOptions,
}

/// Create a power set view over `items`
pub fn power_set<K>(items: &[K], options: PowerSetOptions) -> PowerSet<'_, K> {
    PowerSet { items, options }
}

impl<'a, K> PowerSet<'a, K> {
    pub fn options(&self) -> &PowerSetOptions {
        &self.options
    }

    /// Number of subsets the enumeration yields, without enumerating
    pub fn estimated_count(&self) -> u128 {
        let n = self.items.len();
        let count = estimated_count(n, self.options.min, self.options.max.unwrap_or(n));
        match self.options.limit {
            Some(limit) => count.min(limit as u128),
            None => count,
        }
    }

    /// Fresh iterator over subsets as item position lists
    pub fn indices(&self) -> SubsetIndices {
        SubsetIndices::new(self.items.len(), &self.options)
    }

    /// Fresh iterator over subsets as item references
    pub fn iter(&self) -> impl Iterator<Item = Vec<&'a K>> + 'a {
        let items = self.items;
        self.indices()
            .map(move |subset| subset.into_iter().map(|i| &items[i]).collect())
    }
}

#[derive(Clone, Debug)]
enum Cursor {
    /// Next complement mask to emit
    Mask { next: Option<u64> },
    /// Next index vector to emit
    Lex { next: Option<Vec<usize>> },
}

/// Iterator over subsets as sorted position lists
#[derive(Clone, Debug)]
pub struct SubsetIndices {
    n: usize,
    degrees: Vec<usize>,
    degree_pos: usize,
    use_bitmask: bool,
    cursor: Option<Cursor>,
    remaining: Option<usize>,
}

impl SubsetIndices {
    fn new(n: usize, options: &PowerSetOptions) -> Self {
        let max = options.max.unwrap_or(n).min(n);
        let mut degrees: Vec<usize> = if options.min <= max {
            (options.min..=max).collect()
        } else {
            Vec::new()
        };
        if options.degree_order == DegreeOrder::Descending {
            degrees.reverse();
        }

        let use_bitmask = match options.strategy {
            Enumeration::Auto | Enumeration::Bitmask => n <= BITMASK_MAX_SETS,
            Enumeration::Lexicographic => false,
        };

        Self {
            n,
            degrees,
            degree_pos: 0,
            use_bitmask,
            cursor: None,
            remaining: options.limit,
        }
    }

    fn start(&self, k: usize) -> Cursor {
        if self.use_bitmask {
            let m = self.n - k;
            Cursor::Mask {
                next: Some((1u64 << m) - 1),
            }
        } else {
            Cursor::Lex {
                next: Some((0..k).collect()),
            }
        }
    }

    fn step(&mut self, k: usize) -> Option<Vec<usize>> {
        let n = self.n;
        match self.cursor.as_mut()? {
            Cursor::Mask { next } => {
                let y = next.take()?;
                let full = (1u64 << n) - 1;
                let x = !y & full;
                let subset = (0..n).filter(|&i| (x >> (n - 1 - i)) & 1 != 0).collect();
                *next = gosper_next(y).filter(|&v| v <= full);
                Some(subset)
            }
            Cursor::Lex { next } => {
                let current = next.take()?;
                *next = lex_successor(&current, n, k);
                Some(current)
            }
        }
    }
}

impl Iterator for SubsetIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.remaining == Some(0) {
            return None;
        }

        loop {
            if self.cursor.is_none() {
                let &k = self.degrees.get(self.degree_pos)?;
                self.degree_pos += 1;
                self.cursor = Some(self.start(k));
            }

            let k = self.degrees[self.degree_pos - 1];
            if let Some(subset) = self.step(k) {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Some(subset);
            }
            self.cursor = None;
        }
    }
}

/// Next larger integer with the same popcount (None for 0)
fn gosper_next(y: u64) -> Option<u64> {
    if y == 0 {
        return None;
    }
    let c = y & y.wrapping_neg();
    let r = y + c;
    Some((((r ^ y) >> 2) / c) | r)
}

fn lex_successor(current: &[usize], n: usize, k: usize) -> Option<Vec<usize>> {
    let i = (0..k).rev().find(|&i| current[i] < n - k + i)?;
    let mut next = current.to_vec();
    next[i] += 1;
    for j in i + 1..k {
        next[j] = next[j - 1] + 1;
    }
    Some(next)
}
