use serde::Deserialize;
use thiserror::Error;

const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_SHOW_MORE_STEP: usize = 10;
const DEFAULT_PROGRESS_DECIMALS: u8 = 1;
const MAX_PROGRESS_DECIMALS: u8 = 4;

/// Presentation knobs shared by every drill-down frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSettings {
    default_page_size: usize,
    show_more_step: usize,
    progress_decimals: u8,
    entry_search_fields: Vec<String>,
}

/// Unvalidated settings, typically deserialized from a config file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewSettingsDraft {
    pub default_page_size: Option<usize>,
    pub show_more_step: Option<usize>,
    pub progress_decimals: Option<u8>,
    pub entry_search_fields: Option<Vec<String>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ViewSettingsError {
    #[error("default page size must be > 0")]
    InvalidPageSize,

    #[error("show-more step must be > 0")]
    InvalidShowMoreStep,

    #[error("progress decimals must be <= {MAX_PROGRESS_DECIMALS}, got {0}")]
    InvalidProgressDecimals(u8),

    #[error("entry search fields cannot be empty")]
    EmptySearchFields,
}

impl ViewSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset values with defaults.
    ///
    /// # Errors
    ///
    /// Returns `ViewSettingsError` if any supplied value is out of range.
    pub fn validate(self) -> Result<ViewSettings, ViewSettingsError> {
        let default_page_size = self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if default_page_size == 0 {
            return Err(ViewSettingsError::InvalidPageSize);
        }
        let show_more_step = self.show_more_step.unwrap_or(DEFAULT_SHOW_MORE_STEP);
        if show_more_step == 0 {
            return Err(ViewSettingsError::InvalidShowMoreStep);
        }
        let progress_decimals = self.progress_decimals.unwrap_or(DEFAULT_PROGRESS_DECIMALS);
        if progress_decimals > MAX_PROGRESS_DECIMALS {
            return Err(ViewSettingsError::InvalidProgressDecimals(progress_decimals));
        }
        let entry_search_fields = match self.entry_search_fields {
            None => default_search_fields(),
            Some(fields) => {
                let fields: Vec<String> = fields
                    .into_iter()
                    .map(|field| field.trim().to_owned())
                    .filter(|field| !field.is_empty())
                    .collect();
                if fields.is_empty() {
                    return Err(ViewSettingsError::EmptySearchFields);
                }
                fields
            }
        };

        Ok(ViewSettings {
            default_page_size,
            show_more_step,
            progress_decimals,
            entry_search_fields,
        })
    }
}

fn default_search_fields() -> Vec<String> {
    ["topic", "project", "status"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

impl ViewSettings {
    #[must_use]
    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    #[must_use]
    pub fn show_more_step(&self) -> usize {
        self.show_more_step
    }

    #[must_use]
    pub fn progress_decimals(&self) -> u8 {
        self.progress_decimals
    }

    #[must_use]
    pub fn entry_search_fields(&self) -> &[String] {
        &self.entry_search_fields
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            show_more_step: DEFAULT_SHOW_MORE_STEP,
            progress_decimals: DEFAULT_PROGRESS_DECIMALS,
            entry_search_fields: default_search_fields(),
        }
    }
}
