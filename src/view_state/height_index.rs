//! HeightIndex - O(log n) prefix sums and lower_bound via Fenwick tree
//!
//! Provides efficient operations for computing cumulative heights and finding
//! item indices by vertical offset (scroll position).
//!
//! # Complexity
//!
//! - `from_heights`: O(n log n)
//! - `set`: O(log n)
//! - `prefix_sum` / `offset_of`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `total`: O(log n)
//! - `len`: O(1)

/// HeightIndex wraps a Fenwick tree for O(log n) prefix sum queries and updates.
///
/// The tree is always exactly `len` slots long; changing the item count
/// rebuilds it through [`HeightIndex::resized`].
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    /// Fenwick tree backing storage (1-indexed internally, but we expose 0-indexed API)
    tree: Vec<isize>,
}

impl HeightIndex {
    /// Builds an index over the given heights.
    ///
    /// # Examples
    ///
    /// ```
    /// # use calgrid::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights([10, 20, 15]);
    /// assert_eq!(index.len(), 3);
    /// assert_eq!(index.total(), 45);
    /// ```
    pub fn from_heights(heights: impl IntoIterator<Item = usize>) -> Self {
        let heights: Vec<usize> = heights.into_iter().collect();
        let mut tree = vec![0isize; heights.len()];
        for (idx, height) in heights.into_iter().enumerate() {
            fenwick::array::update(&mut tree, idx, to_signed(height));
        }
        Self { tree }
    }

    /// `len` items of the same height.
    pub fn uniform(len: usize, height: usize) -> Self {
        Self::from_heights(std::iter::repeat_n(height, len))
    }

    /// Copy with `len` items: existing heights are kept, new slots get
    /// `fill(index)`.
    pub fn resized(&self, len: usize, fill: impl Fn(usize) -> usize) -> Self {
        let kept = self.len().min(len);
        Self::from_heights(
            (0..len).map(|i| if i < kept { self.height_unchecked(i) } else { fill(i) }),
        )
    }

    /// Sets the height at the given index.
    ///
    /// Returns `false` without touching the index when `index >= len()` or
    /// the height is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use calgrid::view_state::height_index::HeightIndex;
    /// let mut index = HeightIndex::uniform(3, 5);
    /// assert!(index.set(0, 10));
    /// assert!(!index.set(0, 10));
    /// assert!(!index.set(7, 1));
    /// assert_eq!(index.prefix_sum(0), 10);
    /// ```
    pub fn set(&mut self, index: usize, height: usize) -> bool {
        let Some(current) = self.height(index) else {
            return false;
        };
        let delta = to_signed(height) - to_signed(current);
        if delta == 0 {
            return false;
        }
        fenwick::array::update(&mut self.tree, index, delta);
        true
    }

    /// Height of a single item, or `None` past the end.
    pub fn height(&self, index: usize) -> Option<usize> {
        (index < self.len()).then(|| self.height_unchecked(index))
    }

    fn height_unchecked(&self, index: usize) -> usize {
        if index == 0 {
            self.prefix_sum(0)
        } else {
            self.prefix_sum(index) - self.prefix_sum(index - 1)
        }
    }

    /// Returns the cumulative height up to and including the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use calgrid::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights([3, 4, 5]);
    /// assert_eq!(index.prefix_sum(0), 3);
    /// assert_eq!(index.prefix_sum(1), 7);
    /// assert_eq!(index.prefix_sum(2), 12);
    /// ```
    pub fn prefix_sum(&self, index: usize) -> usize {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );

        let sum = fenwick::array::prefix_sum(&self.tree, index);
        sum.max(0) as usize
    }

    /// Top offset of `index`: total height of the items before it.
    /// `offset_of(len())` is the total.
    pub fn offset_of(&self, index: usize) -> usize {
        match index.min(self.len()) {
            0 => 0,
            n => self.prefix_sum(n - 1),
        }
    }

    /// Binary search for the first index where `prefix_sum(index) > value`.
    ///
    /// Returns the index of the item containing the given vertical offset.
    ///
    /// # Returns
    ///
    /// - `Some(index)` if there exists an index where `prefix_sum(index) > value`
    /// - `None` if `value >= total()` or the index is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use calgrid::view_state::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights([10, 20, 15]);
    /// assert_eq!(index.lower_bound(0), Some(0));
    /// assert_eq!(index.lower_bound(10), Some(1));
    /// assert_eq!(index.lower_bound(30), Some(2));
    /// assert_eq!(index.lower_bound(100), None);
    /// ```
    pub fn lower_bound(&self, value: usize) -> Option<usize> {
        if self.is_empty() {
            return None;
        }

        // Item i covers [prefix_sum(i-1), prefix_sum(i))
        let mut left = 0;
        let mut right = self.len();

        while left < right {
            let mid = left + (right - left) / 2;
            if self.prefix_sum(mid) > value {
                right = mid;
            } else {
                left = mid + 1;
            }
        }

        (left < self.len()).then_some(left)
    }

    /// Returns the total cumulative height of all items.
    pub fn total(&self) -> usize {
        self.offset_of(self.len())
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// True for an empty list.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

fn to_signed(height: usize) -> isize {
    isize::try_from(height).unwrap_or(isize::MAX)
}
