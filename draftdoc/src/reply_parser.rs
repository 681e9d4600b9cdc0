//! Best-effort parsing of a generative model's extraction reply
//!
//! The model is asked for `{"sections": [...]}` but may wrap it in prose or
//! code fences, or return something else entirely. The outermost `{ ... }`
//! span is parsed; if that fails the whole reply becomes a single section so
//! no extracted text is lost.

use crate::content_model::Section;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("object pattern is valid"));

/// What the reply was extracted from; decides the fallback labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    /// Uploaded screenshots
    Images,
    /// A fetched web page
    Url(String),
}

impl ReplySource {
    fn fallback_section(&self, raw: String) -> Section {
        match self {
            Self::Images => Section::new("Todas", "Conteúdo Extraído", "Ver imagens originais", raw),
            Self::Url(url) => Section::new(
                url.as_str(),
                "Conteúdo Extraído Geral",
                "Documento completo",
                raw,
            ),
        }
    }
}

/// Result of parsing a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    /// The reply contained a sections object
    Structured(Vec<Section>),
    /// The reply could not be parsed; it is kept whole
    Raw(Section),
}

impl ParsedReply {
    /// Sections to compile, in order
    pub fn into_sections(self) -> Vec<Section> {
        match self {
            Self::Structured(sections) => sections,
            Self::Raw(section) => vec![section],
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

/// Errors parsing a reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplyParseError {
    #[error("The model reply contains no text")]
    EmptyReply,
}

/// Parse a model reply into sections
///
/// # Parameters
/// * `reply` - Raw text returned by the model
/// * `source` - Origin of the content, used to label the fallback section
///
/// # Returns
/// * `Ok(ParsedReply)` - Structured sections, or the whole reply as one section
/// * `Err(ReplyParseError)` - The reply is blank
pub fn parse_reply(reply: &str, source: &ReplySource) -> Result<ParsedReply, ReplyParseError> {
    let reply = normalize_line_endings(reply);
    if reply.trim().is_empty() {
        return Err(ReplyParseError::EmptyReply);
    }

    match JSON_OBJECT
        .find(&reply)
        .and_then(|m| parse_sections(m.as_str()))
    {
        Some(sections) => Ok(ParsedReply::Structured(sections)),
        None => {
            log::warn!("Model reply is not a sections object, keeping it as one section");
            Ok(ParsedReply::Raw(source.fallback_section(reply)))
        }
    }
}

/// Parse `{"sections": [...]}`, tolerating a missing or null list
fn parse_sections(json: &str) -> Option<Vec<Section>> {
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Reply JSON did not parse: {}", e);
            return None;
        }
    };

    match value.get("sections") {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(section_from_value).collect(),
        Some(_) => None,
    }
}

fn section_from_value(value: &Value) -> Option<Section> {
    let object = value.as_object()?;
    let field = |name: &str| match object.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Some(Section::new(
        field("page"),
        field("section"),
        field("location"),
        field("text"),
    ))
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_reply() {
        let reply = r#"{"sections": [{"page": "Página 1", "section": "Hero", "location": "Topo", "text": "Bem-vindo"}]}"#;
        let parsed = parse_reply(reply, &ReplySource::Images).unwrap();
        assert_eq!(
            parsed,
            ParsedReply::Structured(vec![Section::new("Página 1", "Hero", "Topo", "Bem-vindo")])
        );
    }

    #[test]
    fn test_json_wrapped_in_prose_and_fences() {
        let reply = "Aqui está o resultado:\n```json\n{\"sections\": [{\"page\": \"Homepage\", \"section\": \"Menu\", \"location\": \"Topo\", \"text\": \"Início | Contactos\"}]}\n```\nEspero que ajude.";
        let parsed = parse_reply(reply, &ReplySource::Images).unwrap();
        assert!(parsed.is_structured());
        assert_eq!(parsed.into_sections()[0].text, "Início | Contactos");
    }

    #[test]
    fn test_missing_sections_is_empty() {
        let parsed = parse_reply(r#"{"result": "nada"}"#, &ReplySource::Images).unwrap();
        assert_eq!(parsed, ParsedReply::Structured(Vec::new()));
        let parsed = parse_reply(r#"{"sections": null}"#, &ReplySource::Images).unwrap();
        assert_eq!(parsed, ParsedReply::Structured(Vec::new()));
    }

    #[test]
    fn test_lenient_field_types() {
        let reply = r#"{"sections": [{"page": 2, "section": "Preços", "text": "10€"}]}"#;
        let sections = parse_reply(reply, &ReplySource::Images)
            .unwrap()
            .into_sections();
        assert_eq!(sections[0].page, "2");
        assert_eq!(sections[0].location, "");
    }

    #[test]
    fn test_invalid_json_falls_back_for_images() {
        let reply = "{\"sections\": [ {\"page\": \"Página 1\", oops";
        let parsed = parse_reply(reply, &ReplySource::Images).unwrap();
        assert_eq!(
            parsed,
            ParsedReply::Raw(Section::new(
                "Todas",
                "Conteúdo Extraído",
                "Ver imagens originais",
                reply
            ))
        );
    }

    #[test]
    fn test_no_json_falls_back_for_url() {
        let source = ReplySource::Url("https://example.pt/sobre".to_string());
        let sections = parse_reply("Não consegui ler a página.\r\nDesculpe.", &source)
            .unwrap()
            .into_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].page, "https://example.pt/sobre");
        assert_eq!(sections[0].section, "Conteúdo Extraído Geral");
        assert_eq!(sections[0].location, "Documento completo");
        assert_eq!(sections[0].text, "Não consegui ler a página.\nDesculpe.");
    }

    #[test]
    fn test_non_array_sections_falls_back() {
        let parsed = parse_reply(r#"{"sections": "Hero"}"#, &ReplySource::Images).unwrap();
        assert!(!parsed.is_structured());
    }

    #[test]
    fn test_crlf_normalized_inside_json() {
        let reply = "{\"sections\": [{\"section\": \"Hero\", \"text\": \"a\\r\\nb\"}]}";
        let sections = parse_reply(reply, &ReplySource::Images)
            .unwrap()
            .into_sections();
        // Escaped CR survives JSON decoding; the compiler rejects it later
        assert_eq!(sections[0].text, "a\r\nb");
    }

    #[test]
    fn test_empty_reply() {
        assert_eq!(
            parse_reply("  \n", &ReplySource::Images),
            Err(ReplyParseError::EmptyReply)
        );
    }
}
