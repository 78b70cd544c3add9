use super::vocab::MergeRanks;

/// Distinct adjacent pairs of `word`, in order of first occurrence.
fn get_pairs(word: &[String]) -> Vec<(&str, &str)> {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for w in word.windows(2) {
        let pair = (w[0].as_str(), w[1].as_str());
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }
    pairs
}

/// Merges the symbols of an already byte-remapped piece, lowest rank first,
/// until no ranked pair remains. Returns the sub-tokens joined by single
/// spaces (the remapped alphabet never contains a space).
pub fn bpe(piece: &str, ranks: &MergeRanks) -> String {
    let mut word: Vec<String> = piece.chars().map(String::from).collect();

    loop {
        let pairs = get_pairs(&word);

        // Pairs absent from the table have infinite rank, so `None` here
        // covers both "no pairs" and "nothing left to merge".
        let bigram = pairs
            .iter()
            .filter_map(|&(a, b)| ranks.rank(a, b).map(|rank| (rank, a, b)))
            .min_by_key(|&(rank, _, _)| rank)
            .map(|(_, a, b)| (a.to_string(), b.to_string()));

        let Some((first, second)) = bigram else {
            break;
        };

        let mut merged = Vec::with_capacity(word.len());
        let mut i = 0;
        while i < word.len() {
            if i + 1 < word.len() && word[i] == first && word[i + 1] == second {
                merged.push(format!("{first}{second}"));
                i += 2;
            } else {
                merged.push(std::mem::take(&mut word[i]));
                i += 1;
            }
        }
        word = merged;

        if word.len() == 1 {
            break;
        }
    }

    word.join(" ")
}
