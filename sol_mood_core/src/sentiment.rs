// Market-mood scoring with a rule-based lexicon
// Each word carries a valence; boosters and negations adjust the word they
// precede and exclamation marks add emphasis. The sum is squashed into
// [-1, 1]. Posts come from a PostSource; StaticPosts serves a configured corpus.

use crate::error::{DataSource, FetchError};
use crate::models::SentimentScore;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn fetch_sentiment(&self) -> Result<SentimentScore, FetchError>;
}

/// Supplies the texts to be scored.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self) -> Result<Vec<String>, FetchError>;
}

pub struct StaticPosts(pub Vec<String>);

#[async_trait]
impl PostSource for StaticPosts {
    async fn fetch_posts(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.0.clone())
    }
}

// Normalization constant; approximates the max expected raw sum.
const ALPHA: f64 = 15.0;
const BOOST_INCR: f64 = 0.293;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCR: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

const LEXICON: &[(&str, f64)] = &[
    // general
    ("good", 1.9), ("great", 3.1), ("awesome", 3.1), ("amazing", 2.8), ("love", 3.2),
    ("like", 1.5), ("win", 2.8), ("winning", 2.4), ("happy", 2.7), ("nice", 1.8),
    ("best", 3.2), ("strong", 2.3), ("profit", 1.9), ("gain", 2.0), ("gains", 2.0),
    ("bad", -2.5), ("terrible", -2.1), ("awful", -2.0), ("hate", -2.7), ("worst", -3.1),
    ("junk", -1.9), ("trash", -2.2), ("garbage", -2.2), ("scam", -2.9), ("fraud", -2.8),
    ("loss", -1.3), ("losses", -1.5), ("lose", -1.7), ("losing", -1.6), ("weak", -1.9),
    ("fear", -2.2), ("panic", -2.3), ("worried", -1.2), ("dead", -3.3), ("crash", -1.7),
    ("crashing", -2.0), ("dump", -1.6), ("dumping", -1.9),
    // market slang
    ("pump", 1.6), ("pumping", 2.0), ("moon", 2.0), ("mooning", 2.4), ("bullish", 2.3),
    ("bull", 1.5), ("rally", 1.8), ("breakout", 1.7), ("gem", 2.2), ("hodl", 1.2),
    ("bearish", -2.3), ("bear", -1.3), ("rug", -3.0), ("rugged", -3.2), ("rekt", -2.7),
    ("sell", -1.0), ("selling", -1.1), ("buy", 1.0), ("buying", 1.1),
];

const BOOSTERS: &[(&str, f64)] = &[
    ("very", BOOST_INCR), ("extremely", BOOST_INCR), ("super", BOOST_INCR),
    ("really", BOOST_INCR), ("so", BOOST_INCR), ("totally", BOOST_INCR),
    ("absolutely", BOOST_INCR), ("incredibly", BOOST_INCR),
    ("slightly", -BOOST_INCR), ("somewhat", -BOOST_INCR), ("barely", -BOOST_INCR),
    ("kinda", -BOOST_INCR), ("marginally", -BOOST_INCR),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "neither", "nor", "without",
    "dont", "don't", "isnt", "isn't", "wont", "won't", "cant", "can't",
    "aint", "ain't", "doesnt", "doesn't", "wasnt", "wasn't",
];

/// Squash a raw valence sum into (-1, 1).
fn normalize(score: f64) -> f64 {
    score / (score * score + ALPHA).sqrt()
}

pub struct LexiconAnalyzer {
    lexicon: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
        }
    }

    /// Compound score of one text in [-1, 1]; 0 for text with no known words.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect();

        let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.lexicon.get(token.as_str()) else {
                valences.push(0.0);
                continue;
            };
            let mut v = base;
            let window = &tokens[i.saturating_sub(3)..i];
            for (dist, prev) in window.iter().rev().enumerate() {
                if let Some(&incr) = self.boosters.get(prev.as_str()) {
                    // boosters further away count for less
                    let damp = match dist {
                        0 => 1.0,
                        1 => 0.95,
                        _ => 0.9,
                    };
                    v += incr * damp * v.signum();
                }
            }
            if window.iter().any(|prev| NEGATIONS.contains(&prev.as_str())) {
                v *= NEGATION_SCALAR;
            }
            valences.push(v);
        }

        // "x but y": y dominates
        if let Some(but_idx) = tokens.iter().position(|t| t == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < but_idx {
                    *v *= 0.5;
                } else if i > but_idx {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            let bangs = text.matches('!').count().min(MAX_EXCLAMATIONS);
            sum += bangs as f64 * EXCLAMATION_INCR * sum.signum();
        }
        normalize(sum).clamp(-1.0, 1.0)
    }

    /// Mean compound score across `texts`.
    pub fn score_corpus<S: AsRef<str>>(&self, texts: &[S]) -> SentimentScore {
        if texts.is_empty() {
            return SentimentScore::new(0.0, 0);
        }
        let total: f64 = texts.iter().map(|t| self.compound(t.as_ref())).sum();
        SentimentScore::new(total / texts.len() as f64, texts.len())
    }
}

/// Scores whatever corpus `P` yields on each call. No history is kept.
pub struct CorpusSentimentSource<P: PostSource> {
    posts: P,
    analyzer: LexiconAnalyzer,
}

impl<P: PostSource> CorpusSentimentSource<P> {
    pub fn new(posts: P) -> Self {
        Self {
            posts,
            analyzer: LexiconAnalyzer::new(),
        }
    }
}

#[async_trait]
impl<P: PostSource> SentimentSource for CorpusSentimentSource<P> {
    async fn fetch_sentiment(&self) -> Result<SentimentScore, FetchError> {
        let posts = self.posts.fetch_posts().await?;
        let score = self.analyzer.score_corpus(&posts);
        log::debug!("Scored {} posts, sentiment {:.4}", score.sample_size, score.value());
        if !score.value().is_finite() {
            return Err(FetchError::Malformed(DataSource::Sentiment, "non-finite score".to_string()));
        }
        Ok(score)
    }
}
