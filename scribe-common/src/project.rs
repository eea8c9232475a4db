//! Project model
//!
//! A project is one academic article in progress. Setup fields (title, premise,
//! area) are plain text; every [`Section`] holds the HTML produced by the editor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Maximum title length in characters
pub const TITLE_MAX_CHARS: usize = 200;

/// Maximum premise length in characters
pub const PREMISE_MAX_CHARS: usize = 1000;

/// Knowledge areas a project may belong to
pub const KNOWLEDGE_AREAS: [&str; 9] = [
    "Ciências Exatas e da Terra",
    "Ciências Biológicas",
    "Engenharias",
    "Ciências da Saúde",
    "Ciências Agrárias",
    "Ciências Sociais Aplicadas",
    "Ciências Humanas",
    "Linguística, Letras e Artes",
    "Multidisciplinar",
];

/// Editable manuscript section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Objectives,
    Literature,
    Introduction,
    Methodology,
    Results,
    AbstractPt,
    AbstractEn,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Objectives,
        Section::Literature,
        Section::Introduction,
        Section::Methodology,
        Section::Results,
        Section::AbstractPt,
        Section::AbstractEn,
    ];

    /// Column name in the `projects` table
    pub fn column(self) -> &'static str {
        match self {
            Section::Objectives => "objectives",
            Section::Literature => "literature",
            Section::Introduction => "introduction",
            Section::Methodology => "methodology",
            Section::Results => "results",
            Section::AbstractPt => "abstract_pt",
            Section::AbstractEn => "abstract_en",
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Section::Objectives => "Objetivos",
            Section::Literature => "Revisão Bibliográfica",
            Section::Introduction => "Introdução",
            Section::Methodology => "Metodologia",
            Section::Results => "Resultados",
            Section::AbstractPt => "Resumo",
            Section::AbstractEn => "Abstract",
        }
    }

    /// Whether the AI section review accepts this section
    pub fn is_reviewable(self) -> bool {
        !matches!(self, Section::AbstractPt | Section::AbstractEn)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Section {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.column() == s)
            .ok_or_else(|| crate::Error::UnknownSection(s.to_string()))
    }
}

/// Setup-field validation failure, listing every violation found
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

/// Request to create a project (first setup step)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub premise: String,
    pub area: String,
}

impl NewProject {
    /// Validate setup fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        let violations = setup_violations(&self.title, &self.premise, &self.area);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

/// Partial update of setup fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSetupUpdate {
    pub title: Option<String>,
    pub premise: Option<String>,
    pub area: Option<String>,
}

impl ProjectSetupUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.premise.is_none() && self.area.is_none()
    }

    /// Apply to a project, validating the merged values first
    ///
    /// The project is left untouched when validation fails.
    pub fn apply(&self, project: &mut Project) -> Result<(), ValidationError> {
        let title = self.title.as_deref().unwrap_or(&project.title);
        let premise = self.premise.as_deref().unwrap_or(&project.premise);
        let area = self.area.as_deref().unwrap_or(&project.area);

        let violations = setup_violations(title, premise, area);
        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        project.title = title.trim().to_string();
        project.premise = premise.trim().to_string();
        project.area = area.to_string();
        project.updated_at = Utc::now();
        Ok(())
    }
}

fn setup_violations(title: &str, premise: &str, area: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if title.trim().is_empty() {
        violations.push("O título é obrigatório".to_string());
    } else if title.trim().chars().count() > TITLE_MAX_CHARS {
        violations.push(format!(
            "O título deve ter no máximo {} caracteres",
            TITLE_MAX_CHARS
        ));
    }

    if premise.trim().is_empty() {
        violations.push("A premissa é obrigatória".to_string());
    } else if premise.trim().chars().count() > PREMISE_MAX_CHARS {
        violations.push(format!(
            "A premissa deve ter no máximo {} caracteres",
            PREMISE_MAX_CHARS
        ));
    }

    if !is_known_area(area) {
        violations.push(format!("Área de conhecimento inválida: '{}'", area));
    }

    violations
}

/// Check an area against [`KNOWLEDGE_AREAS`]
pub fn is_known_area(area: &str) -> bool {
    KNOWLEDGE_AREAS.contains(&area)
}

/// Academic article project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub premise: String,
    pub area: String,
    pub objectives: String,
    pub literature: String,
    pub abstract_pt: String,
    pub abstract_en: String,
    pub introduction: String,
    pub methodology: String,
    pub results: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a project with empty sections
    ///
    /// Callers validate `setup` first; this constructor only trims.
    pub fn new(setup: NewProject) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: setup.title.trim().to_string(),
            premise: setup.premise.trim().to_string(),
            area: setup.area,
            objectives: String::new(),
            literature: String::new(),
            abstract_pt: String::new(),
            abstract_en: String::new(),
            introduction: String::new(),
            methodology: String::new(),
            results: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn section(&self, section: Section) -> &str {
        match section {
            Section::Objectives => &self.objectives,
            Section::Literature => &self.literature,
            Section::Introduction => &self.introduction,
            Section::Methodology => &self.methodology,
            Section::Results => &self.results,
            Section::AbstractPt => &self.abstract_pt,
            Section::AbstractEn => &self.abstract_en,
        }
    }

    /// Replace a section's content and bump `updated_at`
    pub fn set_section(&mut self, section: Section, content: String) {
        let slot = match section {
            Section::Objectives => &mut self.objectives,
            Section::Literature => &mut self.literature,
            Section::Introduction => &mut self.introduction,
            Section::Methodology => &mut self.methodology,
            Section::Results => &mut self.results,
            Section::AbstractPt => &mut self.abstract_pt,
            Section::AbstractEn => &mut self.abstract_en,
        };
        *slot = content;
        self.updated_at = Utc::now();
    }

    /// Whether title, premise and area are all filled in
    pub fn has_setup(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.premise.trim().is_empty()
            && !self.area.trim().is_empty()
    }
}
