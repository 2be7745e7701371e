use crate::core::{Confidence, Severity};
use crate::model::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: Option<usize>,
    pub end_column: Option<usize>,
    pub snippet: Option<String>,
}

impl Location {
    pub fn new(file: String, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            end_line: None,
            end_column: None,
            snippet: None,
        }
    }

    pub fn from_span(file: &str, span: &Span) -> Self {
        Self {
            file: file.to_string(),
            line: span.start_line,
            column: span.start_column,
            end_line: Some(span.end_line),
            end_column: Some(span.end_column),
            snippet: None,
        }
    }

    pub fn with_snippet(mut self, snippet: String) -> Self {
        self.snippet = Some(snippet);
        self
    }
}

/// One rule hit. Immutable once emitted; rules never merge or suppress each
/// other's findings even when they overlap in location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub scanner_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwe_id: Option<String>,

    pub finding_type: String,

    pub severity: Severity,

    pub confidence: Confidence,

    pub title: String,

    pub description: String,

    pub locations: Vec<Location>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FindingMetadata>,
}

impl Finding {
    pub fn new(
        scanner_id: String,
        severity: Severity,
        confidence: Confidence,
        title: String,
        description: String,
    ) -> Self {
        Self {
            scanner_id: scanner_id.clone(),
            cwe_id: None,
            finding_type: scanner_id,
            severity,
            confidence,
            title,
            description,
            locations: Vec::new(),
            metadata: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_cwe(mut self, cwe_id: &str) -> Self {
        self.cwe_id = Some(cwe_id.to_string());
        self
    }

    pub fn with_function(mut self, function: &str) -> Self {
        self.metadata
            .get_or_insert_with(FindingMetadata::default)
            .affected_functions
            .push(function.to_string());
        self
    }

    pub fn with_recommendation(mut self, recommendation: &str) -> Self {
        self.metadata
            .get_or_insert_with(FindingMetadata::default)
            .recommendation = Some(recommendation.to_string());
        self
    }

    pub fn primary_location(&self) -> Option<&Location> {
        self.locations.first()
    }

    /// Every location participates in the key. Pair-style findings (two
    /// storage declarations, say) can share an anchor while pointing at
    /// different secondary sites, and those must survive deduplication.
    pub fn dedup_key(&self) -> String {
        let mut key = format!("{}:{}", self.finding_type, self.scanner_id);
        for loc in &self.locations {
            key.push_str(&format!(":{}:{}:{}", loc.file, loc.line, loc.column));
        }
        key
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FindingMetadata {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub affected_functions: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}
