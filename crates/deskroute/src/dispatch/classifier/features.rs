use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sparse feature vector as `(vocabulary index, weight)` pairs sorted by index.
pub(crate) type SparseVector = Vec<(usize, f64)>;

/// English function words dropped before n-grams are formed. Kept sorted.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "if", "in", "into", "is", "it", "its", "me", "more", "most", "my", "myself",
    "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out",
    "over", "own", "same", "shall", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "too", "under",
    "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "would", "yet", "you", "your", "yours",
];

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// Unigrams and adjacent bigrams of an already normalized text.
///
/// Tokens split on anything that is not alphanumeric; single characters and stop words are
/// dropped before bigrams are paired up.
pub(crate) fn terms(normalized: &str) -> Vec<String> {
    let tokens: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 1)
        .filter(|token| !is_stop_word(token))
        .collect();

    let mut terms: Vec<String> = tokens.iter().map(|token| token.to_string()).collect();
    terms.extend(
        tokens
            .windows(2)
            .map(|pair| format!("{} {}", pair[0], pair[1])),
    );
    terms
}

/// TF-IDF weighting over a vocabulary frozen at fit time.
#[derive(Debug, Clone)]
pub(crate) struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Smoothed idf: `ln((1 + n) / (1 + df)) + 1`. Indices follow lexical term order.
    pub(crate) fn fit(documents: &[Vec<String>]) -> Self {
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for document in documents {
            let unique: BTreeSet<&str> = document.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let total = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, frequency)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), index);
            idf.push(((1.0 + total) / (1.0 + frequency as f64)).ln() + 1.0);
        }

        Self { vocabulary, idf }
    }

    pub(crate) fn len(&self) -> usize {
        self.idf.len()
    }

    /// L2-normalized tf-idf vector. Terms outside the vocabulary are skipped.
    pub(crate) fn transform(&self, terms: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in terms {
            if let Some(&index) = self.vocabulary.get(term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let weighted: SparseVector = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let norm = weighted
            .iter()
            .map(|(_, weight)| weight * weight)
            .sum::<f64>()
            .sqrt();
        if norm == 0.0 {
            return weighted;
        }

        weighted
            .into_iter()
            .map(|(index, weight)| (index, weight / norm))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|term| term.to_string()).collect()
    }

    #[test]
    fn stop_words_are_sorted_for_binary_search() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS.to_vec());
    }

    #[test]
    fn terms_pair_bigrams_after_stop_word_removal() {
        let terms = terms("scholarship amount not credited");
        assert_eq!(
            terms,
            owned(&[
                "scholarship",
                "amount",
                "credited",
                "scholarship amount",
                "amount credited",
            ])
        );
    }

    #[test]
    fn terms_drop_single_characters_and_punctuation() {
        assert_eq!(terms("a b, hostel!"), owned(&["hostel"]));
        assert!(terms("").is_empty());
    }

    #[test]
    fn rarer_terms_weigh_more_and_vectors_are_unit_length() {
        let documents = vec![
            owned(&["fee", "refund"]),
            owned(&["fee", "receipt"]),
            owned(&["hostel", "room"]),
        ];
        let vectorizer = TfidfVectorizer::fit(&documents);
        assert_eq!(vectorizer.len(), 5);

        let vector = vectorizer.transform(&owned(&["fee", "refund", "unseen"]));
        assert_eq!(vector.len(), 2);
        let norm: f64 = vector.iter().map(|(_, weight)| weight * weight).sum();
        assert!((norm - 1.0).abs() < 1e-9);

        let weight_of = |term: &str| {
            let index = vectorizer.vocabulary[term];
            vector
                .iter()
                .find(|(candidate, _)| *candidate == index)
                .map(|(_, weight)| *weight)
                .expect("term present")
        };
        assert!(weight_of("refund") > weight_of("fee"));
    }

    #[test]
    fn out_of_vocabulary_text_maps_to_empty_vector() {
        let vectorizer = TfidfVectorizer::fit(&[owned(&["hostel"])]);
        assert!(vectorizer.transform(&owned(&["library"])).is_empty());
    }
}
