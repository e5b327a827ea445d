//! Prompt assembly: renders the child's records, an optional profile and
//! conversation summary, and the parent's question into one instruction
//! string for the language model.

pub mod graph_data;
pub mod template;

pub use graph_data::*;
pub use template::*;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub const NO_PROFILE: &str = "No profile information available yet.";
pub const NO_CONTEXT: &str = "No recent conversation history.";
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PromptError {
    #[error("Query cannot be empty")]
    EmptyQuery,
}

/// Stateless renderer over one template.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    template: PromptTemplate,
}

impl PromptAssembler {
    pub fn new(template: PromptTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Build the prompt stamped with the current UTC time.
    pub fn create_query(
        &self,
        profile: Option<&str>,
        context: Option<&str>,
        query: &str,
        graph_data: Option<&GraphData>,
    ) -> Result<String, PromptError> {
        self.create_query_at(profile, context, query, graph_data, Utc::now())
    }

    /// Build the prompt for a fixed timestamp. Output depends only on the inputs.
    ///
    /// A template that fails to render is logged and replaced by the plain
    /// concatenation of profile, context, graph data and question.
    pub fn create_query_at(
        &self,
        profile: Option<&str>,
        context: Option<&str>,
        query: &str,
        graph_data: Option<&GraphData>,
        now: DateTime<Utc>,
    ) -> Result<String, PromptError> {
        if query.trim().is_empty() {
            return Err(PromptError::EmptyQuery);
        }

        let profile = profile.filter(|p| !p.is_empty()).unwrap_or(NO_PROFILE);
        let context_block = match context.filter(|c| !c.is_empty()) {
            Some(c) => format!("{c}\n\n"),
            None => NO_CONTEXT.to_string(),
        };
        let current_date = now.format(DATE_FORMAT).to_string();
        let graph = format_graph_data(graph_data);

        let values = TemplateValues {
            current_date: &current_date,
            profile,
            context_block: &context_block,
            graph_data: &graph,
            query,
        };

        match self.template.render(&values) {
            Ok(prompt) => Ok(prompt),
            Err(e) => {
                tracing::error!(error = %e, "Prompt template failed to render, using plain layout");
                Ok(format!("{profile}\n\n{context_block}\n\n{graph}\n\n{query}"))
            }
        }
    }
}
