//! Token layouts: where an experiment family encodes its parameters in a
//! benchmark filename.
//!
//! A filename such as `mt_run_3-16.csv` is split on `_`, `-` and `.` into
//! `["mt", "run", "3", "16", "csv"]`. A [`TokenLayout`] names the token
//! positions that carry integer parameters, e.g. `threads` at 2 and `pages`
//! at 3.
//!
//! ```rust
//! use bench_tables::layout::TokenLayout;
//!
//! let layout = TokenLayout::thread_page_sweep();
//! assert_eq!(layout.decode("mt_run_3-16.csv")?, vec![3, 16]);
//! # Ok::<(), bench_tables::Error>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Delimiters separating filename tokens
pub const DELIMITERS: [char; 3] = ['_', '-', '.'];

/// Split a filename into tokens.
///
/// Empty tokens between adjacent delimiters are kept so that token positions
/// stay stable (`a__b` is `["a", "", "b"]`).
#[must_use]
pub fn split_tokens(file_name: &str) -> Vec<&str> {
    file_name.split(DELIMITERS).collect()
}

/// One named parameter and the token position that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSlot {
    name: String,
    index: usize,
}

impl ParameterSlot {
    /// Create a slot mapping token `index` to parameter `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    /// Parameter name (becomes a table column).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token position within the split filename.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Ordered mapping from filename token positions to named integer parameters.
///
/// The order of the slots is the order of the parameter columns in the
/// result table, and therefore the sort priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTokenLayout")]
pub struct TokenLayout {
    slots: Vec<ParameterSlot>,
}

#[derive(Deserialize)]
struct RawTokenLayout {
    slots: Vec<ParameterSlot>,
}

impl TryFrom<RawTokenLayout> for TokenLayout {
    type Error = Error;

    fn try_from(raw: RawTokenLayout) -> Result<Self> {
        Self::new(raw.slots.into_iter().map(|slot| (slot.name, slot.index)))
    }
}

impl TokenLayout {
    /// Create a layout from `(name, token_index)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if no slot is given, a name is empty,
    /// or a name appears twice.
    pub fn new<I, S>(slots: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let slots: Vec<ParameterSlot> = slots
            .into_iter()
            .map(|(name, index)| ParameterSlot::new(name, index))
            .collect();

        if slots.is_empty() {
            return Err(Error::InvalidInput(
                "token layout must name at least one parameter".to_string(),
            ));
        }
        for (i, slot) in slots.iter().enumerate() {
            if slot.name.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "token layout slot {i} has an empty parameter name"
                )));
            }
            if slots[..i].iter().any(|s| s.name == slot.name) {
                return Err(Error::InvalidInput(format!(
                    "parameter '{}' appears twice in token layout",
                    slot.name
                )));
            }
        }

        Ok(Self { slots })
    }

    /// Thread/page sweep: `<prefix>_<prefix>_<threads>-<pages>.csv`
    #[must_use]
    pub fn thread_page_sweep() -> Self {
        Self {
            slots: vec![ParameterSlot::new("threads", 2), ParameterSlot::new("pages", 3)],
        }
    }

    /// Cluster sweep: `<prefix>_<clusters>.csv`
    #[must_use]
    pub fn cluster_sweep() -> Self {
        Self {
            slots: vec![ParameterSlot::new("clusters", 1)],
        }
    }

    /// Parameter slots in column order.
    #[must_use]
    pub fn slots(&self) -> &[ParameterSlot] {
        &self.slots
    }

    /// Parameter names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(ParameterSlot::name)
    }

    /// Number of parameters decoded per filename.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Never true for a constructed layout.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Column position of parameter `name`, if the layout has it.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    /// Decode the integer parameters encoded in `file_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFilename`] if a configured token position is
    /// missing or its token is not an integer.
    pub fn decode(&self, file_name: &str) -> Result<Vec<i64>> {
        let tokens = split_tokens(file_name);

        self.slots
            .iter()
            .map(|slot| {
                let token = tokens.get(slot.index).ok_or_else(|| Error::MalformedFilename {
                    file: file_name.to_string(),
                    reason: format!(
                        "expected '{}' at token {}, but name has only {} token(s)",
                        slot.name,
                        slot.index,
                        tokens.len()
                    ),
                })?;

                token.parse::<i64>().map_err(|_| Error::MalformedFilename {
                    file: file_name.to_string(),
                    reason: format!(
                        "token {} ('{token}') for '{}' is not an integer",
                        slot.index, slot.name
                    ),
                })
            })
            .collect()
    }
}

/// Decode `file_name` with `layout`. Free-function form of [`TokenLayout::decode`].
///
/// # Errors
///
/// See [`TokenLayout::decode`].
pub fn decode_filename(file_name: &str, layout: &TokenLayout) -> Result<Vec<i64>> {
    layout.decode(file_name)
}

/// Parses `name:index[,name:index...]`, e.g. `threads:2,pages:3`.
impl FromStr for TokenLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut slots = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, index) = part.split_once(':').ok_or_else(|| {
                Error::InvalidInput(format!("layout entry '{part}' is not 'name:index'"))
            })?;
            let index = index.trim().parse::<usize>().map_err(|_| {
                Error::InvalidInput(format!("layout entry '{part}' has a non-numeric index"))
            })?;
            slots.push((name.trim().to_string(), index));
        }
        Self::new(slots)
    }
}

impl fmt::Display for TokenLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", slot.name, slot.index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_layout() -> TokenLayout {
        TokenLayout::new([("threads", 1), ("pages", 2)]).unwrap()
    }

    #[test]
    fn test_split_keeps_empty_tokens() {
        assert_eq!(split_tokens("a__b.csv"), vec!["a", "", "b", "csv"]);
    }

    #[test]
    fn test_decode_mixed_delimiters() {
        let layout = pair_layout();
        assert_eq!(layout.decode("run_4-8.csv").unwrap(), vec![4, 8]);
        assert_eq!(layout.decode("run_4_8.csv").unwrap(), vec![4, 8]);
        assert_eq!(layout.decode("run.4.8.csv").unwrap(), vec![4, 8]);
    }

    #[test]
    fn test_thread_page_preset() {
        let layout = TokenLayout::thread_page_sweep();
        assert_eq!(layout.decode("mt_run_0-128.csv").unwrap(), vec![0, 128]);
        assert_eq!(layout.names().collect::<Vec<_>>(), vec!["threads", "pages"]);
    }

    #[test]
    fn test_cluster_preset() {
        let layout = TokenLayout::cluster_sweep();
        assert_eq!(layout.decode("clusters_6.csv").unwrap(), vec![6]);
    }

    #[test]
    fn test_decode_missing_token() {
        // "pages" sits at token 2, "run_4" has two tokens
        let err = pair_layout().decode("run_4").unwrap_err();
        assert!(matches!(err, Error::MalformedFilename { .. }));
        let msg = err.to_string();
        assert!(msg.contains("run_4"));
        assert!(msg.contains("'pages'"));
        assert!(msg.contains("only 2 token(s)"));
    }

    #[test]
    fn test_decode_non_numeric_token() {
        let err = pair_layout().decode("run_four-8.csv").unwrap_err();
        assert!(matches!(err, Error::MalformedFilename { .. }));
        assert!(err.to_string().contains("'four'"));
    }

    #[test]
    fn test_new_rejects_empty_and_duplicates() {
        assert!(TokenLayout::new(Vec::<(String, usize)>::new()).is_err());
        assert!(TokenLayout::new([("a", 1), ("a", 2)]).is_err());
        assert!(TokenLayout::new([("", 1)]).is_err());
    }

    #[test]
    fn test_deserialize_validates_slots() {
        let layout: TokenLayout =
            serde_json::from_str(r#"{"slots":[{"name":"clusters","index":1}]}"#).unwrap();
        assert_eq!(layout, TokenLayout::cluster_sweep());

        assert!(serde_json::from_str::<TokenLayout>(r#"{"slots":[]}"#).is_err());
        let dup = r#"{"slots":[{"name":"a","index":1},{"name":"a","index":2}]}"#;
        let err = serde_json::from_str::<TokenLayout>(dup).unwrap_err();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn test_parse_and_display() {
        let layout: TokenLayout = "threads:2, pages:3".parse().unwrap();
        assert_eq!(layout, TokenLayout::thread_page_sweep());
        assert_eq!(layout.to_string(), "threads:2,pages:3");
        assert!("threads".parse::<TokenLayout>().is_err());
        assert!("threads:x".parse::<TokenLayout>().is_err());
    }
}
