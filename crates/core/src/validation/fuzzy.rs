use strsim::normalized_levenshtein;

/// Best similarity (0..=100) between the shorter input and any equally long
/// window of the longer one, ignoring case.
pub fn partial_ratio(left: &str, right: &str) -> u8 {
    let left = left.trim().to_lowercase();
    let right = right.trim().to_lowercase();
    if left.is_empty() || right.is_empty() {
        return 0;
    }

    let (shorter, longer) =
        if left.chars().count() <= right.chars().count() { (left, right) } else { (right, left) };
    let window = shorter.chars().count();
    let longer_chars = longer.chars().collect::<Vec<_>>();

    let best = longer_chars
        .windows(window)
        .map(|slice| normalized_levenshtein(&shorter, &slice.iter().collect::<String>()))
        .fold(0.0_f64, f64::max);

    (best * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::partial_ratio;

    #[test]
    fn identical_names_score_full_marks_ignoring_case() {
        assert_eq!(partial_ratio("pepperoni", "Pepperoni"), 100);
    }

    #[test]
    fn name_embedded_in_sentence_scores_full_marks() {
        assert_eq!(partial_ratio("I'd like a pepperoni please", "Pepperoni"), 100);
        assert_eq!(partial_ratio("quattro formaggi, thanks", "Quattro Formaggi"), 100);
    }

    #[test]
    fn small_typos_stay_above_threshold() {
        assert!(partial_ratio("pepperonni", "Pepperoni") >= 80);
        assert!(partial_ratio("margheritta", "Margherita") >= 80);
    }

    #[test]
    fn unrelated_names_score_low() {
        assert!(partial_ratio("pepperoni", "Margherita") < 50);
        assert!(partial_ratio("sushi", "Hawaiian") < 50);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(partial_ratio("", "Margherita"), 0);
        assert_eq!(partial_ratio("   ", "Margherita"), 0);
    }
}
