use serde::{Deserialize, Serialize};

/// Which side of the card is shown as the question.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestMode {
    #[default]
    #[serde(rename = "word-meaning")]
    WordToMeaning,
    #[serde(rename = "meaning-word")]
    MeaningToWord,
}

impl TestMode {
    pub const ALL: [TestMode; 2] = [TestMode::WordToMeaning, TestMode::MeaningToWord];

    pub fn key(self) -> &'static str {
        match self {
            TestMode::WordToMeaning => "word-meaning",
            TestMode::MeaningToWord => "meaning-word",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.key() == key)
    }
}

/// One question of a session. `position` is 1-based within the session;
/// `word_number` is the word's index in its textbook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWord {
    pub position: usize,
    pub word_number: u32,
    pub word: String,
    pub meaning: String,
}

impl SessionWord {
    pub fn prompt(&self, mode: TestMode) -> &str {
        match mode {
            TestMode::WordToMeaning => &self.word,
            TestMode::MeaningToWord => &self.meaning,
        }
    }

    pub fn answer(&self, mode: TestMode) -> &str {
        match mode {
            TestMode::WordToMeaning => &self.meaning,
            TestMode::MeaningToWord => &self.word,
        }
    }
}

/// Number sampled items 1..=n in their sampled order.
pub(crate) fn number_positions<T>(
    items: impl IntoIterator<Item = T>,
    to_word: impl Fn(usize, T) -> SessionWord,
) -> Vec<SessionWord> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| to_word(i + 1, item))
        .collect()
}
