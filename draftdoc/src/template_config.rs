//! Boilerplate template schema for generated documents
//!
//! A template is a TOML file listing the literal fragments placed around the
//! extracted sections: a `preamble` emitted once at the top, a `section`
//! layout emitted once per extracted section, and a `trailer` emitted once at
//! the end. Fragment text may contain `{{NAME}}` placeholders.

use crate::content_model::Section;
use crate::operations::{Style, DEFAULT_FONT_SIZE_PT};
use chrono::NaiveDate;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").expect("placeholder pattern is valid"));

/// Template definition from a .toml file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Template name (e.g., "website-brief-pt")
    pub name: String,

    /// One-line description shown by `list-templates`
    #[serde(default)]
    pub description: String,

    /// Title of the remote document, may use `{{PROJECT}}` and `{{DATE}}`
    pub document_title: String,

    /// Label substituted when the request carries no project name
    pub default_project_name: String,

    /// strftime pattern for `{{DATE}}`
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Fragments emitted once before the sections
    #[serde(default)]
    pub preamble: Vec<FragmentTemplate>,

    /// Fragments emitted for every extracted section
    #[serde(default)]
    pub section: Vec<FragmentTemplate>,

    /// Fragments emitted once after the sections
    #[serde(default)]
    pub trailer: Vec<FragmentTemplate>,
}

/// One literal piece of text with its styling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentTemplate {
    /// Text with optional placeholders
    pub text: String,

    /// Bold formatting
    #[serde(default)]
    pub bold: bool,

    /// Font size in points
    #[serde(default = "default_font_size")]
    pub size: u32,

    /// Emit nothing when every placeholder in the fragment expands to ""
    #[serde(default)]
    pub collapse_if_empty: bool,
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE_PT
}

/// Format a calendar date, failing on specifiers that need a time or zone
fn try_format_date(date: NaiveDate, format: &str) -> Result<String, fmt::Error> {
    let mut formatted = String::new();
    write!(formatted, "{}", date.format(format))?;
    Ok(formatted)
}

/// Placeholders recognised in fragment text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Project,
    Date,
    Section,
    Location,
    Page,
    Text,
}

impl Placeholder {
    /// Look up a placeholder by the name used between the braces
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PROJECT" => Some(Self::Project),
            "DATE" => Some(Self::Date),
            "SECTION" => Some(Self::Section),
            "LOCATION" => Some(Self::Location),
            "PAGE" => Some(Self::Page),
            "TEXT" => Some(Self::Text),
            _ => None,
        }
    }

    /// Placeholders that only have a value inside the `section` layout
    pub fn is_section_scoped(self) -> bool {
        matches!(
            self,
            Self::Section | Self::Location | Self::Page | Self::Text
        )
    }
}

/// Values placeholders expand to
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    pub project: &'a str,
    pub date: &'a str,
    pub section: Option<&'a Section>,
}

impl<'a> Bindings<'a> {
    fn value(&self, placeholder: Placeholder) -> &'a str {
        match (placeholder, self.section) {
            (Placeholder::Project, _) => self.project,
            (Placeholder::Date, _) => self.date,
            (Placeholder::Section, Some(s)) => &s.section,
            (Placeholder::Location, Some(s)) => &s.location,
            (Placeholder::Page, Some(s)) => &s.page,
            (Placeholder::Text, Some(s)) => &s.text,
            (_, None) => "",
        }
    }
}

impl FragmentTemplate {
    /// Style to apply to the expanded text
    pub fn style(&self) -> Style {
        Style::new(self.bold, self.size)
    }

    /// Expand placeholders in a single pass
    ///
    /// Substituted values are never re-scanned, so extracted text that happens
    /// to contain `{{TEXT}}` is inserted literally.
    pub fn expand(&self, bindings: &Bindings<'_>) -> String {
        let mut any_placeholder = false;
        let mut all_empty = true;

        let expanded = PLACEHOLDER.replace_all(&self.text, |caps: &Captures<'_>| {
            match Placeholder::from_name(&caps[1]) {
                Some(placeholder) => {
                    let value = bindings.value(placeholder);
                    any_placeholder = true;
                    all_empty &= value.is_empty();
                    value.to_string()
                }
                None => caps[0].to_string(),
            }
        });

        if self.collapse_if_empty && any_placeholder && all_empty {
            String::new()
        } else {
            expanded.into_owned()
        }
    }

    fn placeholders(&self) -> impl Iterator<Item = &str> + '_ {
        PLACEHOLDER
            .captures_iter(&self.text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
    }
}

impl TemplateConfig {
    /// Load and validate a template from a .toml file
    ///
    /// # Parameters
    /// * `path` - Path to the template .toml file
    ///
    /// # Returns
    /// * `Ok(TemplateConfig)` - Successfully loaded template configuration
    /// * `Err(TemplateError)` - Error reading, parsing or validating the template
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let content = fs::read_to_string(&path).map_err(TemplateError::IoError)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a template from TOML text
    pub fn from_toml(content: &str) -> Result<Self, TemplateError> {
        let config: TemplateConfig = toml::from_str(content).map_err(TemplateError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Check placeholders, font sizes and the date format
    pub fn validate(&self) -> Result<(), TemplateError> {
        let sample = NaiveDate::from_ymd_opt(2000, 1, 31).unwrap_or_default();
        if try_format_date(sample, &self.date_format).is_err() {
            return Err(TemplateError::InvalidDateFormat(self.date_format.clone()));
        }

        let title = self.title_fragment();

        let groups: [(&str, &[FragmentTemplate], bool); 4] = [
            ("document_title", std::slice::from_ref(&title), false),
            ("preamble", self.preamble.as_slice(), false),
            ("section", self.section.as_slice(), true),
            ("trailer", self.trailer.as_slice(), false),
        ];

        for (group, fragments, section_scope) in groups {
            for (index, fragment) in fragments.iter().enumerate() {
                if fragment.size == 0 {
                    return Err(TemplateError::ZeroFontSize {
                        group: group.to_string(),
                        index,
                    });
                }
                for name in fragment.placeholders() {
                    let placeholder = Placeholder::from_name(name).ok_or_else(|| {
                        TemplateError::UnknownPlaceholder {
                            group: group.to_string(),
                            index,
                            name: name.to_string(),
                        }
                    })?;
                    if placeholder.is_section_scoped() && !section_scope {
                        return Err(TemplateError::PlaceholderOutOfScope {
                            group: group.to_string(),
                            index,
                            name: name.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Project label to use, falling back to the template default
    pub fn project_label<'a>(&'a self, project_name: Option<&'a str>) -> &'a str {
        project_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.default_project_name)
    }

    /// Format the generation date for `{{DATE}}`
    ///
    /// Templates built without `validate` may carry a pattern that cannot
    /// format a bare date; those fall back to ISO 8601.
    pub fn format_date(&self, date: NaiveDate) -> String {
        try_format_date(date, &self.date_format).unwrap_or_else(|_| {
            log::warn!(
                "Date format '{}' needs a time or zone, using ISO 8601",
                self.date_format
            );
            date.format("%Y-%m-%d").to_string()
        })
    }

    /// Expand the remote document title
    pub fn render_title(&self, project: &str, date: &str) -> String {
        self.title_fragment().expand(&Bindings {
            project,
            date,
            section: None,
        })
    }

    fn title_fragment(&self) -> FragmentTemplate {
        FragmentTemplate {
            text: self.document_title.clone(),
            bold: false,
            size: DEFAULT_FONT_SIZE_PT,
            collapse_if_empty: false,
        }
    }
}

/// Errors that can occur when loading template configuration
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    IoError(#[source] std::io::Error),

    #[error("TOML parse error: {0}")]
    ParseError(#[source] toml::de::Error),

    #[error("Unknown placeholder {{{{{name}}}}} in {group}[{index}]")]
    UnknownPlaceholder {
        group: String,
        index: usize,
        name: String,
    },

    #[error("Placeholder {{{{{name}}}}} in {group}[{index}] is only available in section fragments")]
    PlaceholderOutOfScope {
        group: String,
        index: usize,
        name: String,
    },

    #[error("Font size must be positive in {group}[{index}]")]
    ZeroFontSize { group: String, index: usize },

    #[error("Invalid date format '{0}'")]
    InvalidDateFormat(String),

    #[error("Template '{0}' not found")]
    NotFound(String),
}
