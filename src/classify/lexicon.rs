use std::collections::HashSet;

use crate::classify::{ClassifyError, Classifier, Sentiment};

const POSITIVE: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "comfortable", "cute", "delighted",
    "durable", "easy", "excellent", "fantastic", "fast", "fine", "fun", "glad",
    "good", "gorgeous", "great", "happy", "helpful", "ideal", "impressed",
    "incredible", "like", "liked", "love", "loved", "lovely", "nice", "perfect",
    "perfectly", "pleased", "pretty", "quality", "recommend", "recommended",
    "reliable", "satisfied", "smooth", "soft", "solid", "sturdy", "super",
    "terrific", "thanks", "useful", "well", "wonderful", "works", "worth",
];

const NEGATIVE: &[&str] = &[
    "awful", "bad", "broke", "broken", "cheap", "cheaply", "complaint",
    "damaged", "defective", "difficult", "disappointed", "disappointing",
    "dislike", "fail", "failed", "fake", "flimsy", "garbage", "hate", "hated",
    "horrible", "junk", "leaked", "leaking", "mess", "missing", "poor",
    "poorly", "problem", "refund", "return", "returned", "returning", "ripped",
    "sad", "scam", "smell", "terrible", "tore", "torn", "trash", "ugly",
    "uncomfortable", "unusable", "useless", "waste", "wasted", "worse",
    "worst", "wrong",
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "didn't", "didnt", "doesn't",
    "doesnt", "isn't", "isnt", "wasn't", "wasnt", "won't", "wont", "can't",
    "cant", "cannot", "hardly",
];

/// Word-list sentiment classifier.
///
/// Counts positive and negative lexicon hits over lower-cased word tokens.
/// A negator flips the polarity of the word right after it. Text with more
/// negative than positive hits is [`Sentiment::Negative`]; ties go positive.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negators: HashSet<&'static str>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE.iter().copied().collect(),
            negative: NEGATIVE.iter().copied().collect(),
            negators: NEGATORS.iter().copied().collect(),
        }
    }

    /// Positive minus negative hits, or `None` if `text` has no words.
    pub fn score(&self, text: &str) -> Option<i64> {
        let mut score = 0_i64;
        let mut words = 0_usize;
        let mut negate = false;

        for token in text
            .split(|c: char| !(c.is_alphabetic() || c == '\''))
            .filter(|t| t.chars().any(char::is_alphabetic))
        {
            words += 1;
            let word = token.trim_matches('\'').to_lowercase();

            if self.negators.contains(word.as_str()) {
                negate = true;
                continue;
            }

            let polarity = if self.positive.contains(word.as_str()) {
                1
            } else if self.negative.contains(word.as_str()) {
                -1
            } else {
                0
            };
            score += if negate { -polarity } else { polarity };
            negate = false;
        }

        (words > 0).then_some(score)
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<Sentiment, ClassifyError> {
        match self.score(text) {
            Some(score) if score < 0 => Ok(Sentiment::Negative),
            Some(_) => Ok(Sentiment::Positive),
            None => Err(ClassifyError::new("text contains no words")),
        }
    }
}
