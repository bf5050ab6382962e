//! Longest-common-subsequence text diff
//!
//! The diff is computed over "units": the lines of each text, or fixed-size
//! character chunks when neither text contains a newline. Only the edit
//! script is reported; units on the common subsequence are dropped.

use derive_new::new;
use std::fmt::Display;

/// Width of the chunks used when both texts are a single line
pub const CHUNK_SIZE: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Delete { value: T },
    Insert { value: T },
    Equal { value: T },
}

impl<T> Edit<T> {
    pub fn value(&self) -> &T {
        match self {
            Edit::Delete { value } | Edit::Insert { value } | Edit::Equal { value } => value,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Edit::Equal { .. })
    }
}

impl<T: Display> Display for Edit<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edit::Delete { value } => write!(f, "  - {value}"),
            Edit::Insert { value } => write!(f, "  + {value}"),
            Edit::Equal { value } => write!(f, "    {value}"),
        }
    }
}

/// An aligned pair of equal units
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Match {
    pub index_a: usize,
    pub index_b: usize,
}

pub trait DiffAlgorithm<'d, T> {
    type Table;
    type Alignment;
    type EditScript;

    fn compute_table(&self) -> Self::Table;
    fn backtrack(&self) -> Self::Alignment;
    fn diff(&self) -> Self::EditScript;
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct LcsDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

impl<'d, T: Eq + Clone> DiffAlgorithm<'d, T> for LcsDiff<'d, T> {
    type Table = Vec<Vec<usize>>;
    type Alignment = Vec<Match>;
    type EditScript = Vec<Edit<T>>;

    /// `table[i][j]` is the LCS length of `a[..i]` and `b[..j]`.
    fn compute_table(&self) -> Self::Table {
        let (n, m) = (self.a.len(), self.b.len());
        let mut table = vec![vec![0; m + 1]; n + 1];

        for i in 1..=n {
            for j in 1..=m {
                table[i][j] = if self.a[i - 1] == self.b[j - 1] {
                    table[i - 1][j - 1] + 1
                } else {
                    table[i - 1][j].max(table[i][j - 1])
                };
            }
        }

        table
    }

    fn backtrack(&self) -> Self::Alignment {
        if self.a.is_empty() || self.b.is_empty() {
            return Vec::new();
        }

        let table = self.compute_table();
        let (mut i, mut j) = (self.a.len(), self.b.len());
        let mut alignment = Vec::new();

        while i > 0 && j > 0 {
            if self.a[i - 1] == self.b[j - 1] {
                alignment.push(Match::new(i - 1, j - 1));
                i -= 1;
                j -= 1;
            } else if table[i - 1][j] >= table[i][j - 1] {
                // ties skip the unit from `a`
                i -= 1;
            } else {
                j -= 1;
            }
        }

        alignment.reverse();
        alignment
    }

    /// Full script, equal units included, deletions before insertions
    /// within each gap.
    fn diff(&self) -> Self::EditScript {
        let mut script = Vec::with_capacity(self.a.len() + self.b.len());
        let (mut idx_a, mut idx_b) = (0, 0);

        for Match { index_a, index_b } in self.backtrack() {
            script.extend(
                self.a[idx_a..index_a]
                    .iter()
                    .map(|value| Edit::Delete { value: value.clone() }),
            );
            script.extend(
                self.b[idx_b..index_b]
                    .iter()
                    .map(|value| Edit::Insert { value: value.clone() }),
            );
            script.push(Edit::Equal {
                value: self.a[index_a].clone(),
            });
            idx_a = index_a + 1;
            idx_b = index_b + 1;
        }

        script.extend(
            self.a[idx_a..]
                .iter()
                .map(|value| Edit::Delete { value: value.clone() }),
        );
        script.extend(
            self.b[idx_b..]
                .iter()
                .map(|value| Edit::Insert { value: value.clone() }),
        );

        script
    }
}

/// Split a text into diff units: lines, or character chunks when both
/// sides are a single line.
pub fn segment(text_a: &str, text_b: &str) -> (Vec<String>, Vec<String>) {
    let lines_a = text_a.split('\n').map(String::from).collect::<Vec<_>>();
    let lines_b = text_b.split('\n').map(String::from).collect::<Vec<_>>();

    if lines_a.len() == 1 && lines_b.len() == 1 {
        (chunks(text_a, CHUNK_SIZE), chunks(text_b, CHUNK_SIZE))
    } else {
        (lines_a, lines_b)
    }
}

fn chunks(text: &str, size: usize) -> Vec<String> {
    text.chars()
        .collect::<Vec<_>>()
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Deletions and insertions that turn `text_a` into `text_b`
pub fn text_diff(text_a: &str, text_b: &str) -> Vec<Edit<String>> {
    let (units_a, units_b) = segment(text_a, text_b);

    LcsDiff::new(&units_a, &units_b)
        .diff()
        .into_iter()
        .filter(Edit::is_change)
        .collect()
}
