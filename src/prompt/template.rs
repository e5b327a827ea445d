use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Instruction document shipped with the crate.
pub const PEDIATRIC_CARE_TEMPLATE: &str = include_str!("../../resources/prompts/pediatric_care.txt");

/// Placeholders a template may reference.
pub const PLACEHOLDERS: [&str; 5] = ["current_date", "profile", "context_block", "graph_data", "query"];

/// Every brace token: escaped pair, `{name}` placeholder, or a stray brace.
static BRACE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|\{|\}").unwrap());

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("Unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),
}

/// Values substituted into a template.
#[derive(Debug, Clone)]
pub struct TemplateValues<'a> {
    pub current_date: &'a str,
    pub profile: &'a str,
    pub context_block: &'a str,
    pub graph_data: &'a str,
    pub query: &'a str,
}

impl TemplateValues<'_> {
    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "current_date" => Some(self.current_date),
            "profile" => Some(self.profile),
            "context_block" => Some(self.context_block),
            "graph_data" => Some(self.graph_data),
            "query" => Some(self.query),
            _ => None,
        }
    }
}

/// A prompt template with `{placeholder}` slots. `{{` and `}}` render as
/// literal braces.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    text: Cow<'static, str>,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Cow::Owned(text.into()),
        }
    }

    /// The bundled template. Its data-source lines name conversation memory
    /// and the health record graph rather than specific backing services.
    pub fn pediatric_care() -> Self {
        Self {
            text: Cow::Borrowed(PEDIATRIC_CARE_TEMPLATE),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute every placeholder. Values are inserted verbatim; braces
    /// inside them are not interpreted.
    pub fn render(&self, values: &TemplateValues<'_>) -> Result<String, RenderError> {
        let text = self.text.as_ref();
        let mut out = String::with_capacity(text.len() + values.graph_data.len() + 512);
        let mut last = 0;

        for caps in BRACE_TOKEN.captures_iter(text) {
            let Some(token) = caps.get(0) else { continue };
            out.push_str(&text[last..token.start()]);
            last = token.end();

            match token.as_str() {
                "{{" => out.push('{'),
                "}}" => out.push('}'),
                "{" | "}" => return Err(RenderError::UnbalancedBrace(token.start())),
                _ => {
                    let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                    match values.lookup(name) {
                        Some(value) => out.push_str(value),
                        None => return Err(RenderError::UnknownPlaceholder(name.to_string())),
                    }
                }
            }
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::pediatric_care()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> TemplateValues<'static> {
        TemplateValues {
            current_date: "2026-03-14 12:00:00",
            profile: "P",
            context_block: "C",
            graph_data: "G",
            query: "Q",
        }
    }

    #[test]
    fn substitutes_all_placeholders() {
        let t = PromptTemplate::new("{current_date}|{profile}|{context_block}|{graph_data}|{query}");
        assert_eq!(t.render(&values()).unwrap(), "2026-03-14 12:00:00|P|C|G|Q");
    }

    #[test]
    fn escaped_braces_render_literally() {
        let t = PromptTemplate::new("{{json}} {query} }}");
        assert_eq!(t.render(&values()).unwrap(), "{json} Q }");
    }

    #[test]
    fn braces_in_values_are_not_expanded() {
        let t = PromptTemplate::new("<{query}>");
        let mut v = values();
        v.query = "what about {profile}?";
        assert_eq!(t.render(&v).unwrap(), "<what about {profile}?>");
    }

    #[test]
    fn unknown_placeholder_fails() {
        let t = PromptTemplate::new("Hello {name}");
        assert_eq!(
            t.render(&values()),
            Err(RenderError::UnknownPlaceholder("name".into()))
        );
    }

    #[test]
    fn stray_brace_fails() {
        assert_eq!(
            PromptTemplate::new("oops { here").render(&values()),
            Err(RenderError::UnbalancedBrace(5))
        );
        assert!(matches!(
            PromptTemplate::new("a } b").render(&values()),
            Err(RenderError::UnbalancedBrace(2))
        ));
    }

    #[test]
    fn bundled_template_uses_every_placeholder() {
        let text = PromptTemplate::pediatric_care();
        for name in PLACEHOLDERS {
            assert!(text.text().contains(&format!("{{{name}}}")), "missing {name}");
        }
        assert!(text.render(&values()).is_ok());
    }
}
