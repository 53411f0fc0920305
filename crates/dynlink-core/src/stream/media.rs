use std::fmt;

///
/// Format
///
/// Response formats the streamer can produce.
/// `Unsupported` is the wildcard result of negotiation, not an error.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    Json,
    Xml,
    Unsupported,
}

impl Format {
    /// Canonical media type for the response header.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Unsupported => "*/*",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// MediaType
///
/// Parsed `type/subtype[; name=value]*`. Type and subtype are lowercased.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MediaType {
    pub kind: String,
    pub subtype: String,
    pub params: Vec<(String, String)>,
}

impl MediaType {
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split(';');
        let essence = parts.next()?.trim();
        let (kind, subtype) = essence.split_once('/')?;
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }

        let params = parts
            .filter_map(|param| {
                let (name, value) = param.split_once('=')?;
                Some((
                    name.trim().to_ascii_lowercase(),
                    value.trim().trim_matches('"').to_string(),
                ))
            })
            .collect();

        Some(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
        })
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        (self.kind == "application" && self.subtype == "json") || self.subtype.ends_with("+json")
    }

    #[must_use]
    pub fn is_xml(&self) -> bool {
        (matches!(self.kind.as_str(), "application" | "text") && self.subtype == "xml")
            || self.subtype.ends_with("+xml")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for (name, value) in &self.params {
            write!(f, "; {name}={value}")?;
        }

        Ok(())
    }
}

///
/// Accept
///
/// One negotiation candidate: a parsed media type, or raw header text
/// that is matched by substring.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Accept {
    Media(MediaType),
    Raw(String),
}

impl Accept {
    #[must_use]
    pub fn is_json(&self) -> bool {
        match self {
            Self::Media(media) => media.is_json(),
            Self::Raw(raw) => {
                let raw = raw.to_ascii_lowercase();
                raw.contains("application/json") || raw.contains("+json")
            }
        }
    }

    #[must_use]
    pub fn is_xml(&self) -> bool {
        match self {
            Self::Media(media) => media.is_xml(),
            Self::Raw(raw) => {
                let raw = raw.to_ascii_lowercase();
                raw.contains("application/xml") || raw.contains("text/xml") || raw.contains("+xml")
            }
        }
    }
}

impl From<MediaType> for Accept {
    fn from(media: MediaType) -> Self {
        Self::Media(media)
    }
}

impl From<&str> for Accept {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for Accept {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}
