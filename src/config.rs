use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MIN_SEARCH_REQUEST_LEN: usize = 2;
pub const MAX_SEARCH_REQUEST_LEN: usize = 128;
pub const DEFAULT_INPUT_DELAY_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchOption {
    /// Expand ancestors of matching rows, collapse rows without matches
    AutoExpandNodes,
    /// Reorder rows by relevance after each cycle
    RelevantSort,
    /// Only search on an explicit trigger, never on keystrokes
    StartSearchAfterButtonClick,
}

/// Set of enabled [`SearchOption`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchOptions(BTreeSet<SearchOption>);

impl Default for SearchOptions {
    fn default() -> Self {
        Self(BTreeSet::from([
            SearchOption::AutoExpandNodes,
            SearchOption::RelevantSort,
        ]))
    }
}

impl SearchOptions {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, option: SearchOption) -> &mut Self {
        self.0.insert(option);
        self
    }

    pub fn remove(&mut self, option: SearchOption) -> &mut Self {
        self.0.remove(&option);
        self
    }

    pub fn contains(&self, option: SearchOption) -> bool {
        self.0.contains(&option)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = SearchOption> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<SearchOption> for SearchOptions {
    fn from_iter<I: IntoIterator<Item = SearchOption>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Column indices to search. Empty means every column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchColumns(BTreeSet<usize>);

impl SearchColumns {
    pub fn insert(&mut self, column: usize) -> &mut Self {
        self.0.insert(column);
        self
    }

    pub fn remove(&mut self, column: usize) -> &mut Self {
        self.0.remove(&column);
        self
    }

    pub fn contains(&self, column: usize) -> bool {
        self.0.contains(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Whether `column` takes part in matching and highlighting.
    pub fn includes(&self, column: usize) -> bool {
        self.0.is_empty() || self.0.contains(&column)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, usize> {
        self.0.iter()
    }
}

impl FromIterator<usize> for SearchColumns {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SearchColumns {
    type Item = &'a usize;
    type IntoIter = btree_set::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    #[serde(default = "default_min_request_length")]
    pub min_request_length: usize,
    #[serde(default = "default_max_request_length")]
    pub max_request_length: usize,
    #[serde(default = "default_input_delay_ms")]
    pub input_delay_ms: u64,
    pub search_columns: SearchColumns,
    pub options: SearchOptions,
}

fn default_min_request_length() -> usize {
    MIN_SEARCH_REQUEST_LEN
}
fn default_max_request_length() -> usize {
    MAX_SEARCH_REQUEST_LEN
}
fn default_input_delay_ms() -> u64 {
    DEFAULT_INPUT_DELAY_MS
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_request_length: default_min_request_length(),
            max_request_length: default_max_request_length(),
            input_delay_ms: default_input_delay_ms(),
            search_columns: SearchColumns::default(),
            options: SearchOptions::default(),
        }
    }
}

impl SearchSettings {
    pub fn set_min_request_length(&mut self, min_len: usize) {
        self.min_request_length = min_len;
    }

    pub fn set_max_request_length(&mut self, max_len: usize) {
        self.max_request_length = max_len;
    }

    pub fn set_request_limits(&mut self, min_len: usize, max_len: usize) {
        self.set_min_request_length(min_len);
        self.set_max_request_length(max_len);
    }

    pub fn set_input_delay(&mut self, delay_ms: u64) {
        self.input_delay_ms = delay_ms;
    }

    pub fn input_delay(&self) -> Duration {
        Duration::from_millis(self.input_delay_ms)
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.min_request_length > self.max_request_length {
            return Err(crate::error::TreefindError::Config(format!(
                "min_request_length ({}) exceeds max_request_length ({})",
                self.min_request_length, self.max_request_length
            )));
        }
        Ok(())
    }

    /// Loads the first config file found, or defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("treefind/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".treefind.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".treefind.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
