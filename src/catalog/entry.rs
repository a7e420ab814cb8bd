//! Translation entry definitions.

/// Review state of a `<translation>` element, decoded from its `type`
/// attribute. An absent attribute means the translation is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TranslationStatus {
    /// Reviewed and complete; the UI shows the translation text.
    #[default]
    Finished,
    /// Not yet completed by a translator; the UI falls back to source text.
    Unfinished,
    /// The source string disappeared from the application but the old
    /// translation is kept for reference.
    Vanished,
    /// Kept only for history; never shown.
    Obsolete,
}

impl TranslationStatus {
    /// Decodes the `type` attribute value of a `<translation>` element.
    ///
    /// Unknown values are treated as unfinished so the consumer never
    /// shows an unreviewed translation.
    #[must_use]
    pub fn from_type_attr(value: Option<&str>) -> Self {
        match value {
            None => Self::Finished,
            Some("unfinished") => Self::Unfinished,
            Some("vanished") => Self::Vanished,
            Some("obsolete") => Self::Obsolete,
            Some(other) => {
                tracing::debug!(value = other, "Unknown translation type attribute");
                Self::Unfinished
            }
        }
    }

    /// Encodes this status back into a `type` attribute value.
    #[must_use]
    pub const fn type_attr(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Vanished => Some("vanished"),
            Self::Obsolete => Some("obsolete"),
        }
    }
}

/// One `<message id="...">` element of a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MessageEntry {
    /// Canonical source-language phrase (`<source>`).
    pub source: String,

    /// Localized phrase (`<translation>`), possibly empty when unfinished.
    pub translation: String,

    /// Review state of the translation.
    pub status: TranslationStatus,

    /// Translator guidance (`<extracomment>`).
    pub extracomment: Option<String>,

    /// Previous source text kept by the catalog tooling (`<oldsource>`).
    pub oldsource: Option<String>,
}

impl MessageEntry {
    /// Consumer-facing text for this entry.
    ///
    /// Returns the translation only for a finished, non-empty entry;
    /// everything else falls back to the source text. This is the silent,
    /// expected fallback of the lookup contract, not an error condition.
    #[must_use]
    pub fn display_text(&self) -> &str {
        if self.status == TranslationStatus::Finished && !self.translation.is_empty() {
            &self.translation
        } else {
            &self.source
        }
    }
}
