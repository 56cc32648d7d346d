use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use tracing::warn;

/// The normalized header row of a sheet and the position of each header.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<Header>,
    header_map: HashMap<Header, usize>,
}

impl Mapping {
    /// Create a new `Mapping` from raw header strings. Each header is normalized with
    /// `Header::normalize`. A blank header, or one that repeats an earlier header after
    /// normalization, is named `Unnamed: <ix>` after its zero-based column index.
    pub fn new<S, I>(headers: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        let mut mapping = Self::default();
        for (ix, raw) in headers.into_iter().enumerate() {
            let mut header = Header::normalize(raw);
            if header.0.is_empty() || mapping.header_map.contains_key(&header) {
                if !header.0.is_empty() {
                    warn!("Renaming the repeated header '{header}' in column {ix}");
                }
                header = unnamed(ix, &mapping.header_map);
            }
            mapping.header_map.insert(header.clone(), ix);
            mapping.headers.push(header);
        }
        mapping
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn index_of(&self, header: &str) -> Option<usize> {
        self.header_map.get(&Header::normalize(header)).copied()
    }

    pub fn contains(&self, header: &str) -> bool {
        self.index_of(header).is_some()
    }
}

impl Serialize for Mapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.headers.len()))?;
        for header in &self.headers {
            seq.serialize_element(header.as_ref())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items: Vec<String> = Vec::deserialize(deserializer)?;
        Ok(Mapping::new(items))
    }
}

/// A normalized column header, for example `Total Pengeluaran`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct Header(String);

impl Header {
    /// Trims `raw`, collapses internal whitespace runs to a single space and title-cases it.
    /// Normalizing a normalized header returns it unchanged.
    pub fn normalize(raw: impl AsRef<str>) -> Self {
        let collapsed = raw.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        Self(title_case(&collapsed))
    }
}

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Header::normalize(s))
    }
}

/// A name for column `ix` that is not taken yet.
fn unnamed(ix: usize, taken: &HashMap<Header, usize>) -> Header {
    let mut header = Header(format!("Unnamed: {ix}"));
    let mut n = 1;
    while taken.contains_key(&header) {
        header = Header(format!("Unnamed: {ix}.{n}"));
        n += 1;
    }
    header
}

/// Upper-cases every letter that follows a non-letter and lower-cases every other letter. When
/// upper-casing expands to several chars (`ß` to `SS`) only the first stays upper case. Whether a
/// char follows a letter is decided on the output, so a second pass changes nothing.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if !c.is_alphabetic() {
            push(&mut out, &mut prev_is_letter, c);
        } else if prev_is_letter {
            for lower in c.to_lowercase() {
                push(&mut out, &mut prev_is_letter, lower);
            }
        } else {
            let mut upper = c.to_uppercase();
            if let Some(first) = upper.next() {
                push(&mut out, &mut prev_is_letter, first);
            }
            for rest in upper.flat_map(char::to_lowercase) {
                push(&mut out, &mut prev_is_letter, rest);
            }
        }
    }
    out
}

fn push(out: &mut String, prev_is_letter: &mut bool, c: char) {
    out.push(c);
    *prev_is_letter = c.is_alphabetic();
}
