//! Section gating state machine
//!
//! A project moves through six linear steps:
//! SETUP → OBJECTIVES → INTRODUCTION → METHODOLOGY → RESULTS → ABSTRACT → COMPLETE
//!
//! A step unlocks once every earlier step is complete. Completion of the
//! writing steps is decided by word counts of the section HTML against
//! [`SectionThresholds`], which are runtime settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::project::{Project, Section};
use crate::text::word_count_html;

/// Linear workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Title, premise and knowledge area
    Setup,
    /// Objectives and literature review
    Objectives,
    Introduction,
    Methodology,
    Results,
    /// Approved abstract in at least one language
    Abstract,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Setup,
        Step::Objectives,
        Step::Introduction,
        Step::Methodology,
        Step::Results,
        Step::Abstract,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Step::Setup => "Configuração do Projeto",
            Step::Objectives => "Objetivos e Revisão",
            Step::Introduction => "Introdução",
            Step::Methodology => "Metodologia",
            Step::Results => "Resultados",
            Step::Abstract => "Resumo",
        }
    }

    /// Zero-based position in the workflow
    pub fn index(self) -> usize {
        self as usize
    }

    /// Step that owns an editable section
    pub fn for_section(section: Section) -> Step {
        match section {
            Section::Objectives | Section::Literature => Step::Objectives,
            Section::Introduction => Step::Introduction,
            Section::Methodology => Step::Methodology,
            Section::Results => Step::Results,
            Section::AbstractPt | Section::AbstractEn => Step::Abstract,
        }
    }

    /// Steps strictly before this one
    pub fn predecessors(self) -> &'static [Step] {
        &Step::ALL[..self.index()]
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Workflow frontier: the first incomplete step, or `Complete`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStage {
    Setup,
    Objectives,
    Introduction,
    Methodology,
    Results,
    Abstract,
    Complete,
}

impl From<Step> for ProjectStage {
    fn from(step: Step) -> Self {
        match step {
            Step::Setup => ProjectStage::Setup,
            Step::Objectives => ProjectStage::Objectives,
            Step::Introduction => ProjectStage::Introduction,
            Step::Methodology => ProjectStage::Methodology,
            Step::Results => ProjectStage::Results,
            Step::Abstract => ProjectStage::Abstract,
        }
    }
}

/// Word-count thresholds for step completion
///
/// Stored in the `settings` table; see `db::settings::load_thresholds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionThresholds {
    pub objectives_min_words: usize,
    pub literature_min_words: usize,
    pub introduction_min_words: usize,
    pub methodology_min_words: usize,
    pub results_min_words: usize,
    /// Upper bound for generated/approved abstracts (warning only)
    pub abstract_max_words: usize,
}

impl Default for SectionThresholds {
    fn default() -> Self {
        Self {
            objectives_min_words: 1,
            literature_min_words: 1,
            introduction_min_words: 200,
            methodology_min_words: 150,
            results_min_words: 150,
            abstract_max_words: 500,
        }
    }
}

impl SectionThresholds {
    /// Minimum words required for a writing section (None for abstracts)
    pub fn min_words(&self, section: Section) -> Option<usize> {
        match section {
            Section::Objectives => Some(self.objectives_min_words),
            Section::Literature => Some(self.literature_min_words),
            Section::Introduction => Some(self.introduction_min_words),
            Section::Methodology => Some(self.methodology_min_words),
            Section::Results => Some(self.results_min_words),
            Section::AbstractPt | Section::AbstractEn => None,
        }
    }
}

/// One completion condition of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Project field the condition is about
    pub field: String,
    pub met: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_words: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_words: Option<usize>,
}

impl Requirement {
    fn filled(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            met: !value.trim().is_empty(),
            current_words: None,
            required_words: None,
        }
    }

    fn words(section: Section, html: &str, required: usize) -> Self {
        let current = word_count_html(html);
        Self {
            field: section.column().to_string(),
            met: current >= required,
            current_words: Some(current),
            required_words: Some(required),
        }
    }
}

/// Status of one step within a [`ProgressReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatus {
    pub step: Step,
    pub label: String,
    pub complete: bool,
    pub unlocked: bool,
    /// True for the frontier step
    pub current: bool,
    pub requirements: Vec<Requirement>,
}

/// Full progress evaluation of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub stage: ProjectStage,
    /// Completed steps as a rounded percentage (0-100)
    pub percent: u8,
    pub steps: Vec<StepStatus>,
    pub can_generate_abstract: bool,
    pub abstract_warnings: Vec<String>,
}

impl ProgressReport {
    pub fn step(&self, step: Step) -> &StepStatus {
        &self.steps[step.index()]
    }

    /// Steps that are unlocked in `self` but were locked in `before`
    pub fn newly_unlocked(&self, before: &ProgressReport) -> Vec<Step> {
        self.steps
            .iter()
            .zip(&before.steps)
            .filter(|(now, prev)| now.unlocked && !prev.unlocked)
            .map(|(now, _)| now.step)
            .collect()
    }
}

/// Navigation refused by the gate
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
pub enum NavigationError {
    #[error("Step '{target}' is locked until '{blocking_step}' is complete")]
    Locked {
        target: Step,
        /// First incomplete step before the target
        blocking_step: Step,
        /// Unmet requirements of the blocking step
        unmet: Vec<Requirement>,
    },
}

fn requirements(project: &Project, step: Step, thresholds: &SectionThresholds) -> Vec<Requirement> {
    match step {
        Step::Setup => vec![
            Requirement::filled("title", &project.title),
            Requirement::filled("premise", &project.premise),
            Requirement::filled("area", &project.area),
        ],
        Step::Objectives => vec![
            Requirement::words(
                Section::Objectives,
                &project.objectives,
                thresholds.objectives_min_words,
            ),
            Requirement::words(
                Section::Literature,
                &project.literature,
                thresholds.literature_min_words,
            ),
        ],
        Step::Introduction => vec![Requirement::words(
            Section::Introduction,
            &project.introduction,
            thresholds.introduction_min_words,
        )],
        Step::Methodology => vec![Requirement::words(
            Section::Methodology,
            &project.methodology,
            thresholds.methodology_min_words,
        )],
        Step::Results => vec![Requirement::words(
            Section::Results,
            &project.results,
            thresholds.results_min_words,
        )],
        Step::Abstract => {
            // Either language satisfies the step
            let any = !project.abstract_pt.trim().is_empty() || !project.abstract_en.trim().is_empty();
            vec![Requirement {
                field: "abstract".to_string(),
                met: any,
                current_words: None,
                required_words: None,
            }]
        }
    }
}

/// Evaluate every step of a project
pub fn evaluate(project: &Project, thresholds: &SectionThresholds) -> ProgressReport {
    let mut steps = Vec::with_capacity(Step::ALL.len());
    let mut all_previous_complete = true;
    let mut frontier: Option<Step> = None;

    for step in Step::ALL {
        let requirements = requirements(project, step, thresholds);
        let complete = requirements.iter().all(|r| r.met);
        let unlocked = all_previous_complete;

        if !complete && frontier.is_none() {
            frontier = Some(step);
        }

        steps.push(StepStatus {
            step,
            label: step.label().to_string(),
            complete,
            unlocked,
            current: frontier == Some(step),
            requirements,
        });

        all_previous_complete &= complete;
    }

    let completed = steps.iter().filter(|s| s.complete).count();
    let percent = ((completed as f64 / Step::ALL.len() as f64) * 100.0).round() as u8;
    let can_generate_abstract = steps[Step::Abstract.index()].unlocked
        && !project.objectives.trim().is_empty();

    ProgressReport {
        stage: frontier.map(ProjectStage::from).unwrap_or(ProjectStage::Complete),
        percent,
        steps,
        can_generate_abstract,
        abstract_warnings: abstract_warnings(project, thresholds),
    }
}

/// Check whether the user may open `target`
///
/// Steps at or before the frontier are always reachable, so revisiting
/// completed work is never blocked.
pub fn check_navigation(
    project: &Project,
    target: Step,
    thresholds: &SectionThresholds,
) -> Result<(), NavigationError> {
    for &step in target.predecessors() {
        let reqs = requirements(project, step, thresholds);
        if reqs.iter().any(|r| !r.met) {
            return Err(NavigationError::Locked {
                target,
                blocking_step: step,
                unmet: reqs.into_iter().filter(|r| !r.met).collect(),
            });
        }
    }
    Ok(())
}

/// Warnings for stored abstracts longer than the configured maximum
pub fn abstract_warnings(project: &Project, thresholds: &SectionThresholds) -> Vec<String> {
    let mut warnings = Vec::new();
    for section in [Section::AbstractPt, Section::AbstractEn] {
        if let Some(warning) = abstract_length_warning(section, project.section(section), thresholds.abstract_max_words) {
            warnings.push(warning);
        }
    }
    warnings
}

/// Warning text when an abstract exceeds `max_words`
pub fn abstract_length_warning(section: Section, html: &str, max_words: usize) -> Option<String> {
    let words = word_count_html(html);
    if words <= max_words {
        return None;
    }
    Some(match section {
        Section::AbstractEn => format!(
            "The abstract has {} words. Maximum recommended is {}.",
            words, max_words
        ),
        _ => format!(
            "O resumo em português possui {} palavras. Recomenda-se no máximo {}.",
            words, max_words
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::NewProject;

    fn words(n: usize) -> String {
        format!("<p>{}</p>", vec!["palavra"; n].join(" "))
    }

    fn project() -> Project {
        Project::new(NewProject {
            title: "IA na Educação".to_string(),
            premise: "Como a IA transforma o ensino superior".to_string(),
            area: "Ciências Humanas".to_string(),
        })
    }

    fn written_through_results() -> Project {
        let mut p = project();
        p.objectives = "<p>Analisar a adoção</p>".to_string();
        p.literature = "<p>A literatura cresce</p>".to_string();
        p.introduction = words(200);
        p.methodology = words(150);
        p.results = words(150);
        p
    }

    #[test]
    fn test_fresh_project_frontier_is_objectives() {
        let report = evaluate(&project(), &SectionThresholds::default());
        assert_eq!(report.stage, ProjectStage::Objectives);
        assert!(report.step(Step::Setup).complete);
        assert!(report.step(Step::Objectives).unlocked);
        assert!(report.step(Step::Objectives).current);
        assert!(!report.step(Step::Introduction).unlocked);
        // 1 of 6 steps complete
        assert_eq!(report.percent, 17);
        assert!(!report.can_generate_abstract);
    }

    #[test]
    fn test_empty_setup_locks_everything_after_it() {
        let mut p = project();
        p.premise = "  ".to_string();
        let report = evaluate(&p, &SectionThresholds::default());
        assert_eq!(report.stage, ProjectStage::Setup);
        assert!(report.step(Step::Setup).unlocked);
        assert!(Step::ALL[1..].iter().all(|s| !report.step(*s).unlocked));
    }

    #[test]
    fn test_introduction_threshold_is_inclusive() {
        let mut p = project();
        p.objectives = "<p>Analisar</p>".to_string();
        p.literature = "<p>Autores</p>".to_string();
        p.introduction = words(199);
        let t = SectionThresholds::default();

        assert_eq!(evaluate(&p, &t).stage, ProjectStage::Introduction);
        p.introduction = words(200);
        assert_eq!(evaluate(&p, &t).stage, ProjectStage::Methodology);
    }

    #[test]
    fn test_abstract_unlocks_after_results() {
        let report = evaluate(&written_through_results(), &SectionThresholds::default());
        assert_eq!(report.stage, ProjectStage::Abstract);
        assert!(report.step(Step::Abstract).unlocked);
        assert!(report.can_generate_abstract);
        assert_eq!(report.percent, 83);
    }

    #[test]
    fn test_abstract_generation_requires_literature() {
        let mut p = written_through_results();
        p.literature.clear();
        let report = evaluate(&p, &SectionThresholds::default());
        assert!(!report.step(Step::Abstract).unlocked);
        assert!(!report.can_generate_abstract);
    }

    #[test]
    fn test_either_abstract_language_completes_project() {
        let mut p = written_through_results();
        p.abstract_en = "<p>This study analyses...</p>".to_string();
        let report = evaluate(&p, &SectionThresholds::default());
        assert_eq!(report.stage, ProjectStage::Complete);
        assert_eq!(report.percent, 100);
        assert!(report.steps.iter().all(|s| !s.current));
    }

    #[test]
    fn test_percent_counts_steps_independently() {
        // Results written but methodology missing: results counts, abstract stays locked
        let mut p = written_through_results();
        p.methodology.clear();
        let report = evaluate(&p, &SectionThresholds::default());
        assert_eq!(report.stage, ProjectStage::Methodology);
        assert!(report.step(Step::Results).complete);
        assert!(!report.step(Step::Results).unlocked);
        assert_eq!(report.percent, 67);
        assert!(!report.can_generate_abstract);
    }

    #[test]
    fn test_navigation_blocked_reports_first_gap() {
        let mut p = project();
        p.objectives = "<p>Analisar</p>".to_string();
        let err = check_navigation(&p, Step::Methodology, &SectionThresholds::default())
            .unwrap_err();
        let NavigationError::Locked { target, blocking_step, unmet } = err;
        assert_eq!(target, Step::Methodology);
        assert_eq!(blocking_step, Step::Objectives);
        assert_eq!(unmet.len(), 1);
        assert_eq!(unmet[0].field, "literature");
    }

    #[test]
    fn test_navigation_back_is_always_allowed() {
        let p = written_through_results();
        for step in Step::ALL {
            assert!(check_navigation(&p, step, &SectionThresholds::default()).is_ok());
        }
        assert!(check_navigation(&project(), Step::Setup, &SectionThresholds::default()).is_ok());
    }

    #[test]
    fn test_custom_thresholds_apply() {
        let mut p = project();
        p.objectives = words(10);
        p.literature = words(10);
        let strict = SectionThresholds {
            literature_min_words: 50,
            ..SectionThresholds::default()
        };
        assert_eq!(evaluate(&p, &strict).stage, ProjectStage::Objectives);
        assert_eq!(evaluate(&p, &SectionThresholds::default()).stage, ProjectStage::Introduction);
    }

    #[test]
    fn test_newly_unlocked_steps() {
        let t = SectionThresholds::default();
        let mut p = project();
        p.objectives = "<p>Analisar</p>".to_string();
        let before = evaluate(&p, &t);
        p.literature = "<p>Autores</p>".to_string();
        let after = evaluate(&p, &t);
        assert_eq!(after.newly_unlocked(&before), vec![Step::Introduction]);
    }

    #[test]
    fn test_long_abstract_warns_in_its_language() {
        let mut p = written_through_results();
        p.abstract_pt = words(501);
        p.abstract_en = words(500);
        let warnings = abstract_warnings(&p, &SectionThresholds::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("501 palavras"));
    }

    #[test]
    fn test_section_to_step_mapping() {
        assert_eq!(Step::for_section(Section::Literature), Step::Objectives);
        assert_eq!(Step::for_section(Section::AbstractEn), Step::Abstract);
        assert_eq!(Step::Results.predecessors().len(), 4);
    }
}
