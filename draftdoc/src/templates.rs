//! Embedded template definitions
//!
//! This module contains all built-in boilerplate templates compiled into the binary.

use crate::template_config::{TemplateConfig, TemplateError};

/// Template used when none is requested
pub const DEFAULT_TEMPLATE_ID: &str = "website-brief-pt";

/// Template metadata for display and lookup
#[derive(Debug, Clone)]
pub struct TemplateInfo {
    /// Template identifier (e.g., "website-brief-pt")
    pub id: &'static str,
    /// Language tag of the boilerplate text
    pub language: &'static str,
    /// Template TOML content
    pub content: &'static str,
}

/// Get all available templates
///
/// # Returns
/// * `Vec<TemplateInfo>` - Vector of all built-in template definitions
pub fn get_all_templates() -> Vec<TemplateInfo> {
    vec![TemplateInfo {
        id: DEFAULT_TEMPLATE_ID,
        language: "pt-PT",
        content: include_str!("templates/website-brief-pt.toml"),
    }]
}

/// Get a template by ID or language tag
///
/// # Parameters
/// * `id` - Template identifier or language tag (case-insensitive)
///
/// # Returns
/// * `Some(TemplateInfo)` - Template information if found
/// * `None` - No template found matching the given identifier
pub fn get_template(id: &str) -> Option<TemplateInfo> {
    get_all_templates()
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(id) || t.language.eq_ignore_ascii_case(id))
}

/// Parse a template into TemplateConfig
///
/// # Parameters
/// * `template_info` - Template information containing TOML content to parse
///
/// # Returns
/// * `Ok(TemplateConfig)` - Successfully parsed and validated template
/// * `Err(TemplateError)` - Error parsing or validating TOML content
pub fn parse_template(template_info: &TemplateInfo) -> Result<TemplateConfig, TemplateError> {
    TemplateConfig::from_toml(template_info.content)
}

/// Load the default embedded template
pub fn default_template() -> Result<TemplateConfig, TemplateError> {
    let info = get_all_templates()
        .into_iter()
        .find(|t| t.id == DEFAULT_TEMPLATE_ID)
        .ok_or_else(|| TemplateError::NotFound(DEFAULT_TEMPLATE_ID.to_string()))?;
    parse_template(&info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_load() {
        let templates = get_all_templates();
        assert_eq!(templates.len(), 1);
    }

    #[test]
    fn test_get_template_by_id() {
        assert!(get_template("website-brief-pt").is_some());
        assert!(get_template("WEBSITE-BRIEF-PT").is_some());
    }

    #[test]
    fn test_get_template_by_language() {
        assert!(get_template("pt-PT").is_some());
        assert!(get_template("pt-pt").is_some());
    }

    #[test]
    fn test_parse_templates() {
        for template in get_all_templates() {
            let parsed = parse_template(&template);
            assert!(parsed.is_ok(), "Failed to parse template: {}", template.id);
        }
    }

    #[test]
    fn test_default_template_shape() {
        let template = default_template().unwrap();
        assert_eq!(template.name, DEFAULT_TEMPLATE_ID);
        assert_eq!(template.default_project_name, "Website");
        assert_eq!(template.preamble.len(), 10);
        assert_eq!(template.section.len(), 5);
        assert_eq!(template.trailer.len(), 40);
        assert_eq!(template.preamble[0].text, "{{PROJECT}}\n");
        assert!(template.section[3].collapse_if_empty);
    }

    #[test]
    fn test_unknown_template() {
        assert!(get_template("unknown-template").is_none());
    }
}
