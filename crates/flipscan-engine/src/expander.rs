//! Query broadening through the text-generation service.

use serde_json::Value;

use crate::error::EngineError;
use crate::generative::GenerativeClient;

/// Ordered search terms; the first is always the caller's original query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionResult {
    terms: Vec<String>,
}

impl ExpansionResult {
    /// An expansion that carries only the original query.
    #[must_use]
    pub fn original_only(query: &str) -> Self {
        Self {
            terms: vec![query.to_string()],
        }
    }

    /// The original query followed by `suggestions` in the order given.
    #[must_use]
    pub fn with_suggestions(query: &str, suggestions: Vec<String>) -> Self {
        let mut terms = Vec::with_capacity(suggestions.len() + 1);
        terms.push(query.to_string());
        terms.extend(suggestions);
        Self { terms }
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.terms[0]
    }

    /// Service-suggested terms, excluding the original query.
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.terms[1..]
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn into_terms(self) -> Vec<String> {
        self.terms
    }
}

/// Builds the instruction sent to the service for `query`.
#[must_use]
pub fn expansion_prompt(query: &str) -> String {
    format!(
        "You are a shopping search expert. The user searched for: \"{query}\"\n\n\
         Generate 4-6 specific product categories or items related to this search term.\n\
         Return ONLY a JSON array of search terms, nothing else.\n\
         Example: If user searches \"electronics\", return \
         [\"televisions\", \"smart phones\", \"gaming consoles\", \
         \"smart watches\", \"laptops\"]\n\n\
         Return only the JSON array, no explanations."
    )
}

/// Parses generated text as a JSON array of search terms.
///
/// Non-string elements are skipped; the count is not checked.
///
/// # Errors
///
/// Returns [`EngineError::MalformedExpansion`] when the text is not valid
/// JSON or not an array.
pub fn parse_expansion(text: &str) -> Result<Vec<String>, EngineError> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| EngineError::MalformedExpansion(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(EngineError::MalformedExpansion(format!(
            "expected array, got {}",
            json_kind(&value)
        )));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(term) => Some(term),
            other => {
                tracing::debug!(element = %other, "skipping non-string expansion element");
                None
            }
        })
        .collect())
}

/// Broadens an unproductive query into related search terms.
#[derive(Debug, Clone)]
pub struct QueryExpander {
    client: GenerativeClient,
}

impl QueryExpander {
    #[must_use]
    pub fn new(client: GenerativeClient) -> Self {
        Self { client }
    }

    /// Asks the service for related terms.
    ///
    /// Never fails: any transport, status, or parse problem yields an
    /// expansion containing only `query`.
    pub async fn expand(&self, query: &str) -> ExpansionResult {
        match self.try_expand(query).await {
            Ok(suggestions) => {
                tracing::debug!(query, suggestions = suggestions.len(), "query expanded");
                ExpansionResult::with_suggestions(query, suggestions)
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "query expansion failed; using original query");
                ExpansionResult::original_only(query)
            }
        }
    }

    async fn try_expand(&self, query: &str) -> Result<Vec<String>, EngineError> {
        let text = self.client.generate(&expansion_prompt(query)).await?;
        parse_expansion(&text)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
