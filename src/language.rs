//! Translated prompt texts shown to the photobooth guests.

/// Lookup of user-facing texts by message identifier.
pub trait Translator {
    /// Text for `key`. Unknown keys come back unchanged.
    fn translate(&self, key: &str) -> String;
}

/// Built-in message catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: &'static str,
}

/// Languages with built-in texts.
pub const LANGUAGES: &[&str] = &["en", "fr", "de", "es", "it"];

impl Default for Catalog {
    fn default() -> Self {
        Self { language: "en" }
    }
}

impl Catalog {
    /// Catalog for `language`. Falls back to English when it is unknown.
    #[must_use]
    pub fn new(language: &str) -> Self {
        let language = LANGUAGES
            .iter()
            .copied()
            .find(|code| code.eq_ignore_ascii_case(language))
            .unwrap_or_else(|| {
                log::warn!("unsupported language '{language}', using English");
                "en"
            });
        Self { language }
    }

    /// Selected language code.
    #[must_use]
    pub const fn language(&self) -> &'static str {
        self.language
    }
}

fn lookup(language: &str, key: &str) -> Option<&'static str> {
    let text = match (language, key) {
        ("en", "smile") => "Smile!",
        ("fr", "smile") => "Souriez !",
        ("de", "smile") => "Lächeln!",
        ("es", "smile") => "¡Sonríe!",
        ("it", "smile") => "Sorridi!",
        _ => return None,
    };
    Some(text)
}

impl Translator for Catalog {
    fn translate(&self, key: &str) -> String {
        lookup(self.language, key)
            .or_else(|| lookup("en", key))
            .map_or_else(|| key.to_owned(), str::to_owned)
    }
}
