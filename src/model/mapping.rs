use serde::de::Error as SerdeError;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// The header row of a worksheet and a lookup from header text to column position.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<Header>,
    header_map: HashMap<Header, usize>,
}

impl Mapping {
    /// Create a new `Mapping` from the header cells of a worksheet. Blank headers are named
    /// `Unnamed: N`, where `N` is their position, so that a sheet with more than one unlabeled column
    /// can still be represented.
    pub fn new<S, I>(headers: I) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers
            .into_iter()
            .enumerate()
            .map(|(ix, s)| {
                let s = s.into();
                if s.trim().is_empty() {
                    Header(format!("Unnamed: {ix}"))
                } else {
                    Header(s.trim().to_string())
                }
            })
            .collect();

        let header_map: HashMap<Header, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.to_owned(), idx))
            .collect();

        if header_map.len() != headers.len() {
            return Err(MappingError(String::from("Encountered a duplicate header")));
        }

        Ok(Self {
            headers,
            header_map,
        })
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
        self.header_map.get(header).copied()
    }

    /// Like `index_of`, but a missing header is an error.
    pub fn require(&self, header: &str) -> Result<usize, MappingError> {
        self.index_of(header).ok_or_else(|| {
            MappingError(format!(
                "The required column '{header}' was not found, the columns are: {}",
                self.headers
                    .iter()
                    .map(|h| format!("'{}'", h.as_ref()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }
}

/// Picks the cells at `columns` out of `row`, in the order given. Cells past the end of the row are
/// blank; the Sheets API drops trailing empty cells. `None` keeps the whole row.
pub(crate) fn select_columns(row: Vec<String>, columns: Option<&[usize]>) -> Vec<String> {
    match columns {
        None => row,
        Some(columns) => columns
            .iter()
            .map(|&ix| row.get(ix).cloned().unwrap_or_default())
            .collect(),
    }
}

/// Checks that every index in `columns` exists in a header row of `width` cells.
pub(crate) fn validate_columns(columns: &[usize], width: usize) -> Result<(), MappingError> {
    match columns.iter().find(|&&ix| ix >= width) {
        Some(ix) => Err(MappingError(format!(
            "Column index {ix} is out of range for a worksheet with {width} columns"
        ))),
        None => Ok(()),
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
        Mapping::new(items).map_err(D::Error::custom)
    }
}

/// Represents a header in the worksheet, for example, `Amount`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(String);

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::borrow::Borrow<str> for Header {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
