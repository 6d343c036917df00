use serde::{Deserialize, Serialize};

use super::{Dezena, QUADRANT_COUNT, QUADRANT_SIZE};

/// Count of ticket numbers falling in one decade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadrantCount {
    pub range: String,
    pub count: usize,
}

/// Zero-based decade of a number: 1..=10 → 0, 51..=60 → 5.
pub fn quadrant_index(n: Dezena) -> usize {
    (usize::from(n.saturating_sub(1)) / QUADRANT_SIZE).min(QUADRANT_COUNT - 1)
}

/// Display label, e.g. `"01-10"`.
pub fn quadrant_label(index: usize) -> String {
    let start = index * QUADRANT_SIZE + 1;
    format!("{:02}-{:02}", start, start + QUADRANT_SIZE - 1)
}

/// All numbers of a decade, ascending.
pub fn quadrant_numbers(index: usize) -> Vec<Dezena> {
    let start = index * QUADRANT_SIZE + 1;
    (start..start + QUADRANT_SIZE).map(|n| n as Dezena).collect()
}

/// Six-slot histogram, one entry per decade in order.
pub fn quadrant_histogram(numbers: &[Dezena]) -> Vec<QuadrantCount> {
    let mut counts = [0usize; QUADRANT_COUNT];
    for &n in numbers {
        counts[quadrant_index(n)] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| QuadrantCount {
            range: quadrant_label(i),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decade_boundaries() {
        assert_eq!(quadrant_index(1), 0);
        assert_eq!(quadrant_index(10), 0);
        assert_eq!(quadrant_index(11), 1);
        assert_eq!(quadrant_index(60), 5);
    }

    #[test]
    fn labels_are_zero_padded() {
        assert_eq!(quadrant_label(0), "01-10");
        assert_eq!(quadrant_label(5), "51-60");
    }

    #[test]
    fn histogram_sums_to_len() {
        let hist = quadrant_histogram(&[1, 2, 15, 33, 59, 60]);
        assert_eq!(hist.len(), 6);
        assert_eq!(hist.iter().map(|q| q.count).sum::<usize>(), 6);
        assert_eq!(hist[0].count, 2);
        assert_eq!(hist[4].count, 0);
        assert_eq!(hist[5].count, 2);
    }

    #[test]
    fn quadrant_numbers_cover_decade() {
        assert_eq!(quadrant_numbers(2), (21..=30).collect::<Vec<u8>>());
    }
}
