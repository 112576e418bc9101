//! Articles and the narration sessions built from them.

use crate::segment::{segment, SpeakableUnit};

/// An article as supplied by the content source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub title: String,
    /// Where the article came from, usually its domain name.
    pub origin_label: String,
    /// Raw marked-up body.
    pub content: String,
}

/// An article prepared for speech, plus a cursor into its units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationSession {
    content_id: String,
    title: String,
    origin_label: String,
    units: Vec<SpeakableUnit>,
    current_index: usize,
}

impl NarrationSession {
    pub fn new(
        content_id: impl Into<String>,
        title: impl Into<String>,
        origin_label: impl Into<String>,
        units: Vec<SpeakableUnit>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            title: title.into(),
            origin_label: origin_label.into(),
            units,
            current_index: 0,
        }
    }

    /// Segment `article` into a session.
    ///
    /// With `announce_title` the title is spoken first, but only when the
    /// body has something to say; an empty body gives an empty session.
    ///
    /// ```
    /// use listen_later::narration::{Article, NarrationSession};
    ///
    /// let article = Article {
    ///     id: "7".into(),
    ///     title: "Headline".into(),
    ///     origin_label: "example.org".into(),
    ///     content: "<p>First</p><p>Second</p>".into(),
    /// };
    /// let session = NarrationSession::from_article(&article, true);
    /// let texts: Vec<&str> = session.units().iter().map(|u| u.text()).collect();
    /// assert_eq!(texts, ["Headline", "First", "Second"]);
    /// ```
    pub fn from_article(article: &Article, announce_title: bool) -> Self {
        let body = segment(&article.content);
        let title = article.title.trim();

        let units = if announce_title && !body.is_empty() && !title.is_empty() {
            std::iter::once(SpeakableUnit::new(title))
                .chain(body)
                .collect()
        } else {
            body
        };

        Self::new(
            article.id.clone(),
            article.title.clone(),
            article.origin_label.clone(),
            units,
        )
    }

    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn origin_label(&self) -> &str {
        &self.origin_label
    }

    pub fn units(&self) -> &[SpeakableUnit] {
        &self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Index of the unit being spoken.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_unit(&self) -> Option<&SpeakableUnit> {
        self.units.get(self.current_index)
    }

    /// Move the cursor.  Indices past the end are ignored.
    pub(crate) fn set_current_index(&mut self, index: usize) {
        if index < self.units.len() {
            self.current_index = index;
        }
    }

    /// The same session with the cursor back on the first unit.
    pub(crate) fn rewound(mut self) -> Self {
        self.current_index = 0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(content: &str) -> Article {
        Article {
            id: "1".into(),
            title: "Title".into(),
            origin_label: "news.example".into(),
            content: content.into(),
        }
    }

    fn texts(session: &NarrationSession) -> Vec<&str> {
        session.units().iter().map(|u| u.text()).collect()
    }

    #[test]
    fn title_is_announced_first() {
        let session = NarrationSession::from_article(&article("<p>a</p><p>b</p>"), true);
        assert_eq!(texts(&session), ["Title", "a", "b"]);
        assert_eq!(session.content_id(), "1");
        assert_eq!(session.origin_label(), "news.example");
    }

    #[test]
    fn title_can_be_skipped() {
        let session = NarrationSession::from_article(&article("<p>a</p>"), false);
        assert_eq!(texts(&session), ["a"]);
    }

    #[test]
    fn empty_body_gives_empty_session_even_with_title() {
        let session = NarrationSession::from_article(&article("<p></p>"), true);
        assert!(session.is_empty());
    }

    #[test]
    fn cursor_moves_within_bounds() {
        let mut session = NarrationSession::from_article(&article("<p>a</p><p>b</p>"), false);
        assert_eq!(session.current_unit().map(|u| u.text()), Some("a"));

        session.set_current_index(1);
        assert_eq!(session.current_unit().map(|u| u.text()), Some("b"));

        session.set_current_index(5);
        assert_eq!(session.current_index(), 1);

        assert_eq!(session.rewound().current_index(), 0);
    }
}
