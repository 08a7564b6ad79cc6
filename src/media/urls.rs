// Turns whatever the user pastes into a media id.
// Accepts bare ids plus the usual share-link shapes (watch?v=, youtu.be/,
// embed/, /v/). Anything else is not our problem to guess at.

use regex::Regex;

pub struct IdExtractor {
    url_pattern: Option<Regex>,
}

impl IdExtractor {
    pub fn new() -> Self {
        // Capture group is the 11-char id that follows any of the known
        // url prefixes; stop at #, & or ? like the share links do.
        let url_pattern =
            Regex::new(r"(?:youtu\.be/|/v/|/embed/|watch\?v=|&v=)([^#&?/]+)").ok();

        Self { url_pattern }
    }

    /// Extract a media id from a raw url or a bare id string.
    /// Returns None when the input doesn't look like either.
    pub fn extract(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        // Bare id: no slashes or dots, reasonably long, url-safe charset
        if !input.contains('/') && !input.contains('.') && input.len() > 8 {
            if input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Some(input.to_string());
            }
            return None;
        }

        if let Some(regex) = &self.url_pattern {
            if let Some(captures) = regex.captures(input) {
                let id = captures.get(1)?.as_str();
                // Platform ids are exactly 11 chars; anything else means we
                // matched some other kind of link
                if id.len() == 11 {
                    return Some(id.to_string());
                }
            }
        }

        None
    }
}

impl Default for IdExtractor {
    fn default() -> Self {
        Self::new()
    }
}
