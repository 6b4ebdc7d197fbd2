/// Lower-cased keywords matched as substrings of an utterance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn matches_any(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|keyword| text.contains(keyword.as_str()))
    }

    /// An empty set never matches.
    pub fn matches_all(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        !self.keywords.is_empty() && self.keywords.iter().all(|keyword| text.contains(keyword.as_str()))
    }
}

/// Decides whether an answer confirms a yes/no question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmationMatcher {
    keywords: KeywordSet,
}

impl ConfirmationMatcher {
    pub fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }

    pub fn is_confirmation(&self, text: &str) -> bool {
        self.keywords.matches_any(text)
    }
}

impl Default for ConfirmationMatcher {
    fn default() -> Self {
        Self::new(KeywordSet::new(["yes"]))
    }
}
