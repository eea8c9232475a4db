//! JSON contracts of the AI functions
//!
//! Field names follow the wire format the editor client already speaks, so
//! several fields are renamed (`type`, `documentText`, `resumoPT`...).

use serde::{Deserialize, Serialize};

/// Suggestion category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Estrutura,
    Clareza,
    Melhoria,
    Referencia,
}

/// Icon name rendered by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Icon {
    Lightbulb,
    AlertCircle,
    BookOpen,
    CheckCircle,
}

/// One improvement suggestion for a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub content: String,
    pub icon: Icon,
}

/// `POST /analyze-text` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeTextRequest {
    /// Section key (objectives, literature, introduction...)
    pub section: String,
    /// Plain text of the section
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeTextResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Review tip category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipCategory {
    Metodologia,
    #[serde(rename = "Redação")]
    Redacao,
    Resultados,
    Estrutura,
    #[serde(rename = "Fundamentação")]
    Fundamentacao,
}

impl TipCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            TipCategory::Metodologia => "Metodologia",
            TipCategory::Redacao => "Redação",
            TipCategory::Resultados => "Resultados",
            TipCategory::Estrutura => "Estrutura",
            TipCategory::Fundamentacao => "Fundamentação",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            TipCategory::Metodologia,
            TipCategory::Redacao,
            TipCategory::Resultados,
            TipCategory::Estrutura,
            TipCategory::Fundamentacao,
        ]
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl Icon {
    pub fn as_str(self) -> &'static str {
        match self {
            Icon::Lightbulb => "Lightbulb",
            Icon::AlertCircle => "AlertCircle",
            Icon::BookOpen => "BookOpen",
            Icon::CheckCircle => "CheckCircle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [Icon::Lightbulb, Icon::AlertCircle, Icon::BookOpen, Icon::CheckCircle]
            .into_iter()
            .find(|i| i.as_str() == s.trim())
    }
}

/// One numbered article review tip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub id: String,
    pub number: u32,
    pub category: TipCategory,
    pub title: String,
    pub description: String,
    pub icon: Icon,
}

/// `POST /analyze-document` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeDocumentRequest {
    pub document_text: String,
    pub area: String,
    pub premise: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeDocumentResponse {
    #[serde(default)]
    pub tips: Vec<Tip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Abstract language selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbstractLanguage {
    #[serde(rename = "Português")]
    Portuguese,
    #[serde(rename = "Inglês")]
    English,
    #[serde(rename = "Ambos")]
    Both,
}

impl AbstractLanguage {
    pub fn wants_portuguese(self) -> bool {
        matches!(self, AbstractLanguage::Portuguese | AbstractLanguage::Both)
    }

    pub fn wants_english(self) -> bool {
        matches!(self, AbstractLanguage::English | AbstractLanguage::Both)
    }
}

/// Article content an abstract is generated from
///
/// Section fields may be editor HTML; the service converts them to text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractInput {
    pub title: String,
    pub premise: String,
    pub area: String,
    pub objectives: String,
    pub introduction: String,
    pub methodology: String,
    pub results: String,
}

/// `POST /generate-abstract` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateAbstractRequest {
    pub input: AbstractInput,
    pub language: AbstractLanguage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateAbstractResponse {
    #[serde(rename = "resumoPT", default, skip_serializing_if = "Option::is_none")]
    pub resumo_pt: Option<String>,
    #[serde(rename = "resumoEN", default, skip_serializing_if = "Option::is_none")]
    pub resumo_en: Option<String>,
    /// Length warnings; empty when both abstracts are within limits
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
