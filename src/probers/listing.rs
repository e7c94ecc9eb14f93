// src/probers/listing.rs
use crate::types::{BucketFinderError, Listing};
use regex::Regex;

/// Extracts object keys from a `ListBucketResult` XML payload.
#[derive(Debug, Clone)]
pub struct ListingParser {
    root: Regex,
    contents: Regex,
    key: Regex,
}

impl ListingParser {
    pub fn new() -> Result<Self, BucketFinderError> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| BucketFinderError::ConfigError(format!("Regex error: {}", e)))
        };

        Ok(Self {
            root: compile(r"(?s)<ListBucketResult(?:\s[^>]*)?>(.*)</ListBucketResult>")?,
            contents: compile(r"(?s)<Contents>(.*?)</Contents>")?,
            key: compile(r"(?s)<Key>(.*?)</Key>")?,
        })
    }

    /// Never fails: a body that is not a listing comes back as `Listing::Malformed`.
    pub fn parse(&self, body: &str) -> Listing {
        let Some(root) = self.root.captures(body).and_then(|c| c.get(1)) else {
            return Listing::Malformed("missing ListBucketResult element".to_string());
        };

        let mut keys = Vec::new();
        for (idx, contents) in self.contents.captures_iter(root.as_str()).enumerate() {
            let block = contents.get(1).map(|m| m.as_str()).unwrap_or_default();
            match self.key.captures(block).and_then(|c| c.get(1)) {
                Some(key) => keys.push(unescape(key.as_str().trim())),
                None => return Listing::Malformed(format!("Contents element {} has no Key", idx)),
            }
        }

        if keys.is_empty() {
            Listing::Empty
        } else {
            Listing::Keys(keys)
        }
    }
}

/// Decode the five predefined XML entities and numeric character
/// references. Anything unrecognised is kept verbatim.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}
