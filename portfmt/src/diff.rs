//! Shortest-edit-script computation over two sequences of opaque elements.
//!
//! Greedy Myers LCS with a full trace for backtracking. Callers interpret
//! `Add`/`Delete` as lines added in the target or removed from the origin.

/// Edit classification of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffType {
    Common,
    Add,
    Delete,
}

/// One element of the edit script, borrowing from the origin (`Delete`,
/// `Common`) or the target (`Add`).
#[derive(Debug, Clone, Copy)]
pub struct DiffEntry<'a, T> {
    pub kind: DiffType,
    pub element: &'a T,
}

/// Compute the shortest edit script turning `a` into `b` under `eq`.
pub fn diff<'a, T, F>(a: &'a [T], b: &'a [T], eq: F) -> Vec<DiffEntry<'a, T>>
where
    F: Fn(&T, &T) -> bool,
{
    let n = a.len();
    let m = b.len();
    let max = n + m;
    if max == 0 {
        return Vec::new();
    }

    let width = 2 * max + 1;
    let idx = |k: isize| (k + max as isize) as usize;

    let mut v = vec![0usize; width];
    let mut trace: Vec<Vec<usize>> = Vec::new();

    'outer: for d in 0..=(max as isize) {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let mut x = if k == -d || (k != d && v[idx(k - 1)] < v[idx(k + 1)]) {
                v[idx(k + 1)]
            } else {
                v[idx(k - 1)] + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && eq(&a[x], &b[y]) {
                x += 1;
                y += 1;
            }
            v[idx(k)] = x;
            if x >= n && y >= m {
                break 'outer;
            }
            k += 2;
        }
    }

    // Backtrack from (n, m) through the saved rounds.
    let mut edits: Vec<DiffEntry<'a, T>> = Vec::new();
    let mut x = n;
    let mut y = m;

    for (d, v) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let k = x as isize - y as isize;
        let prev_k = if k == -d || (k != d && v[idx(k - 1)] < v[idx(k + 1)]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = v[idx(prev_k)];
        // Can go to -1 at depth zero; keep it signed until the snake walk
        // is done.
        let prev_y = prev_x as isize - prev_k;

        while x > prev_x && (y as isize) > prev_y {
            edits.push(DiffEntry {
                kind: DiffType::Common,
                element: &a[x - 1],
            });
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            if x == prev_x {
                edits.push(DiffEntry {
                    kind: DiffType::Add,
                    element: &b[prev_y as usize],
                });
            } else {
                edits.push(DiffEntry {
                    kind: DiffType::Delete,
                    element: &a[prev_x],
                });
            }
        }
        x = prev_x;
        y = prev_y.max(0) as usize;
    }

    edits.reverse();
    edits
}

/// Convenience wrapper over string slices with byte equality.
pub fn diff_lines<'a>(a: &'a [String], b: &'a [String]) -> Vec<DiffEntry<'a, String>> {
    diff(a, b, |x, y| x == y)
}
