use std::collections::HashMap;

use super::TitleId;

/// Rounded mean of review scores, or `None` when there are no reviews.
///
/// Rounds half away from zero, so `[10, 9]` rates 10 and `[1, 2]` rates 2.
#[must_use]
pub fn average(scores: &[i32]) -> Option<i32> {
    if scores.is_empty() {
        return None;
    }

    let total: i64 = scores.iter().copied().map(i64::from).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean = total as f64 / scores.len() as f64;

    #[allow(clippy::cast_possible_truncation)]
    Some(mean.round() as i32)
}

/// Groups `(title, score)` rows and rates each title.
///
/// Titles without rows are absent from the map; callers treat absence as
/// "no rating yet".
#[must_use]
pub fn by_title(rows: &[(i32, i32)]) -> HashMap<TitleId, i32> {
    let mut grouped: HashMap<TitleId, Vec<i32>> = HashMap::new();
    for &(title_id, score) in rows {
        grouped
            .entry(TitleId::new(title_id))
            .or_default()
            .push(score);
    }

    grouped
        .into_iter()
        .filter_map(|(title_id, scores)| average(&scores).map(|r| (title_id, r)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_reviews_is_unset() {
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn test_rounds_mean() {
        assert_eq!(average(&[10, 8]), Some(9));
        assert_eq!(average(&[1]), Some(1));
        assert_eq!(average(&[10, 9]), Some(10));
        assert_eq!(average(&[1, 2, 2]), Some(2));
        assert_eq!(average(&[1, 1, 2]), Some(1));
    }

    #[test]
    fn test_by_title_groups_rows() {
        let ratings = by_title(&[(1, 10), (2, 3), (1, 8)]);
        assert_eq!(ratings.get(&TitleId::new(1)), Some(&9));
        assert_eq!(ratings.get(&TitleId::new(2)), Some(&3));
        assert_eq!(ratings.get(&TitleId::new(3)), None);
    }
}
