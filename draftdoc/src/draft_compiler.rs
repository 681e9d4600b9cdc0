//! Draft compiler: content model to position-addressed edit operations
//!
//! The compiler walks the emission plan (template preamble, the section layout
//! once per extracted section, template trailer) in a single forward pass. Each
//! fragment is inserted at the current cursor and, when it needs non-default
//! styling, styled over the range it just occupied. Every operation is applied
//! by the document service against the document as mutated by the operations
//! before it, so ranges computed at the moment of insertion stay correct and
//! nothing has to be renumbered afterwards.

use crate::content_model::Section;
use crate::operations::{CompiledDraft, EditOperation, Style, DOCUMENT_START};
use crate::template_config::{Bindings, FragmentTemplate, TemplateConfig};
use crate::text_units::{measure, EncodingMismatchError};
use chrono::NaiveDate;

/// Accumulates operations for one compile call
///
/// Owns its cursor; one instance per generated document.
#[derive(Debug)]
pub struct DraftCompiler<'t> {
    template: &'t TemplateConfig,
    /// Position the next insertion lands on
    cursor: usize,
    operations: Vec<EditOperation>,
}

impl<'t> DraftCompiler<'t> {
    /// Create a compiler for an empty document
    pub fn new(template: &'t TemplateConfig) -> Self {
        Self {
            template,
            cursor: DOCUMENT_START,
            operations: Vec::new(),
        }
    }

    /// Current insertion position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Compile the full document
    ///
    /// # Parameters
    /// * `project_name` - Client project name; blank or missing uses the template default
    /// * `sections` - Extracted sections in document order
    /// * `generated_on` - Date printed in the footer
    ///
    /// # Returns
    /// * `Ok(CompiledDraft)` - Operations in application order with the final length
    /// * `Err(EncodingMismatchError)` - Some text cannot be counted like the service counts it
    pub fn compile(
        mut self,
        project_name: Option<&str>,
        sections: &[Section],
        generated_on: NaiveDate,
    ) -> Result<CompiledDraft, EncodingMismatchError> {
        let template = self.template;
        let project = template.project_label(project_name);
        let date = template.format_date(generated_on);

        let document_bindings = Bindings {
            project,
            date: &date,
            section: None,
        };

        self.emit_group("preamble", &template.preamble, &document_bindings)?;

        for (index, section) in sections.iter().enumerate() {
            let bindings = Bindings {
                section: Some(section),
                ..document_bindings
            };
            self.emit_group(&format!("section {}", index + 1), &template.section, &bindings)?;
        }

        self.emit_group("trailer", &template.trailer, &document_bindings)?;

        log::debug!(
            "Compiled {} sections into {} operations ({} positions)",
            sections.len(),
            self.operations.len(),
            self.cursor - DOCUMENT_START
        );

        Ok(CompiledDraft {
            title: template.render_title(project, &date),
            operations: self.operations,
            final_length: self.cursor - DOCUMENT_START,
        })
    }

    fn emit_group(
        &mut self,
        group: &str,
        fragments: &[FragmentTemplate],
        bindings: &Bindings<'_>,
    ) -> Result<(), EncodingMismatchError> {
        for (index, fragment) in fragments.iter().enumerate() {
            let text = fragment.expand(bindings);
            self.emit(text, fragment.style(), &format!("{group} fragment {}", index + 1))?;
        }
        Ok(())
    }

    /// Insert one fragment at the cursor and style it if needed
    pub fn emit(
        &mut self,
        text: String,
        style: Style,
        context: &str,
    ) -> Result<(), EncodingMismatchError> {
        let length = measure(&text, context)?;
        let start_offset = self.cursor;

        self.operations.push(EditOperation::InsertText {
            offset: start_offset,
            text,
        });
        self.cursor += length;

        if length > 0 && !style.is_default() {
            self.operations.push(EditOperation::ApplyStyle {
                start_offset,
                end_offset: self.cursor,
                style,
            });
        }

        Ok(())
    }
}

/// Compile a document with a fresh compiler
pub fn compile(
    template: &TemplateConfig,
    project_name: Option<&str>,
    sections: &[Section],
    generated_on: NaiveDate,
) -> Result<CompiledDraft, EncodingMismatchError> {
    DraftCompiler::new(template).compile(project_name, sections, generated_on)
}
