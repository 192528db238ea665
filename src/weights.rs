//! Per-set weight normalization
//!
//! A weight vector is an ordered list of optional numbers, one slot per set.
//! `None` marks a slot the user left blank, which is not the same as `0.0`.
//!
//! Two inputs feed it:
//! - free text ("60, 70 80"), split on commas and whitespace
//! - one field per set, resized whenever the set count changes

/// One per-set weight; `None` = left blank
pub type WeightSlot = Option<f64>;

/// Upper bound on sets per exercise; every set owns a weight slot
pub const MAX_SETS: u32 = 100;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split free text on any run of commas and/or whitespace and parse each token.
///
/// Tokens that are not finite numbers are dropped.
pub fn parse_free_text(input: &str) -> Vec<f64> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect()
}

/// Parse a single per-set field; blank or non-numeric input leaves the slot unset
pub fn parse_slot(input: &str) -> WeightSlot {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

// ---------------------------------------------------------------------------
// Derived-state maintenance
// ---------------------------------------------------------------------------

/// Resize to exactly `sets` slots, keeping prior values by index
pub fn resize(weights: &mut Vec<WeightSlot>, sets: usize) {
    weights.resize(sets, None);
}

/// Apply free text to the existing slots by position.
///
/// The slot count does not change: extra values are dropped and slots the text
/// does not reach become unset.
pub fn fill_from_text(weights: &mut [WeightSlot], text: &str) {
    let mut parsed = parse_free_text(text).into_iter();
    for slot in weights.iter_mut() {
        *slot = parsed.next();
    }
}

/// Collapse a draft vector for storage: all-blank becomes empty
pub fn collapse(weights: &[WeightSlot]) -> Vec<WeightSlot> {
    if weights.iter().all(Option::is_none) {
        Vec::new()
    } else {
        weights.to_vec()
    }
}

/// Bring a stored vector back to `sets` slots; an empty vector stays empty
pub fn fit_to_sets(mut weights: Vec<WeightSlot>, sets: usize) -> Vec<WeightSlot> {
    if weights.is_empty() {
        return weights;
    }
    resize(&mut weights, sets);
    collapse(&weights)
}

/// Render a number the way the tracker shows it ("60", "62.5")
pub fn format_weight(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_mixed_separators() {
        assert_eq!(parse_free_text("60, 70  80"), vec![60.0, 70.0, 80.0]);
        assert_eq!(parse_free_text("60,,70,\t80\n"), vec![60.0, 70.0, 80.0]);
    }

    #[test]
    fn test_free_text_empty() {
        assert!(parse_free_text("").is_empty());
        assert!(parse_free_text(" ,  , ").is_empty());
    }

    #[test]
    fn test_free_text_drops_non_numeric() {
        assert_eq!(parse_free_text("60 heavy 72.5 NaN inf"), vec![60.0, 72.5]);
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!(parse_slot(" 45 "), Some(45.0));
        assert_eq!(parse_slot("0"), Some(0.0));
        assert_eq!(parse_slot(""), None);
        assert_eq!(parse_slot("abc"), None);
    }

    #[test]
    fn test_resize_grow_and_shrink() {
        let mut weights = vec![Some(100.0), None, Some(120.0)];

        resize(&mut weights, 5);
        assert_eq!(weights, vec![Some(100.0), None, Some(120.0), None, None]);

        resize(&mut weights, 2);
        assert_eq!(weights, vec![Some(100.0), None]);

        resize(&mut weights, 0);
        assert!(weights.is_empty());
    }

    #[test]
    fn test_resize_preserves_prefix_for_every_length() {
        let original = vec![Some(10.0), Some(20.0), None, Some(40.0)];
        for n in 0..8 {
            let mut weights = original.clone();
            resize(&mut weights, n);
            assert_eq!(weights.len(), n);
            for (i, slot) in weights.iter().enumerate() {
                assert_eq!(*slot, original.get(i).copied().flatten());
            }
        }
    }

    #[test]
    fn test_fill_from_text_fits_slot_count() {
        let mut weights = vec![None; 3];
        fill_from_text(&mut weights, "60 70 80 90");
        assert_eq!(weights, vec![Some(60.0), Some(70.0), Some(80.0)]);

        fill_from_text(&mut weights, "55");
        assert_eq!(weights, vec![Some(55.0), None, None]);
    }

    #[test]
    fn test_collapse() {
        assert!(collapse(&[None, None]).is_empty());
        assert_eq!(collapse(&[Some(0.0), None]), vec![Some(0.0), None]);
    }

    #[test]
    fn test_fit_to_sets() {
        assert!(fit_to_sets(vec![], 3).is_empty());
        assert_eq!(fit_to_sets(vec![Some(50.0)], 2), vec![Some(50.0), None]);
        assert_eq!(fit_to_sets(vec![Some(1.0), Some(2.0), Some(3.0)], 2), vec![Some(1.0), Some(2.0)]);
        assert!(fit_to_sets(vec![None, None], 2).is_empty());
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(60.0), "60");
        assert_eq!(format_weight(62.5), "62.5");
    }
}
