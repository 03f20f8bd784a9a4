//! Score ordering shared by suppression and matching

use std::cmp::Ordering;

/// Descending by score; NaN scores sort last
pub(crate) fn by_score_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descending_with_nan_last() {
        let mut scores = vec![0.2, f64::NAN, 0.9, 0.5];
        scores.sort_by(|a, b| by_score_desc(*a, *b));
        assert_eq!(&scores[..3], &[0.9, 0.5, 0.2]);
        assert!(scores[3].is_nan());
    }
}
