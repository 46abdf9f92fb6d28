use crate::constant::MAX_SUGGESTIONS;

/// The `candidates` which resemble `token`, closest first.
///
/// A candidate resembles the token when it starts with the token, or is within an edit distance of a third of the token length (at least `1`).
pub(crate) fn similar<'c, I>(token: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'c str>,
{
    if token.is_empty() {
        return Vec::default();
    }

    let threshold = std::cmp::max(1, token.chars().count() / 3);
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter(|candidate| *candidate != token)
        .filter_map(|candidate| {
            let distance = edit_distance(token, candidate);

            if distance <= threshold || candidate.starts_with(token) {
                Some((distance, candidate))
            } else {
                None
            }
        })
        .collect();
    scored.sort();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

// Levenshtein distance, by characters.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = std::cmp::min(
                substitution,
                std::cmp::min(previous[j + 1] + 1, current[j] + 1),
            );
        }

        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
