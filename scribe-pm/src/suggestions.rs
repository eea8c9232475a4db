//! Offline section advice
//!
//! Used when the AI functions service is unreachable or has nothing to say.
//! Each section has three fixed items; one of them only applies once the
//! text is long enough to be judged.

use scribe_common::api::{Icon, Suggestion, SuggestionKind};
use scribe_common::text::word_count;
use scribe_common::Section;

use Icon::{AlertCircle, BookOpen, Lightbulb};
use SuggestionKind::{Clareza, Estrutura, Melhoria, Referencia};

struct Advice {
    kind: SuggestionKind,
    title: &'static str,
    content: &'static str,
    icon: Icon,
    /// Shown only above this many words
    min_words: Option<usize>,
}

const fn advice(
    kind: SuggestionKind,
    title: &'static str,
    content: &'static str,
    icon: Icon,
    min_words: Option<usize>,
) -> Advice {
    Advice {
        kind,
        title,
        content,
        icon,
        min_words,
    }
}

static OBJECTIVES: [Advice; 3] = [
    advice(
        Estrutura,
        "Objetivos Claros",
        "Divida seus objetivos em Geral (o propósito central da pesquisa) e Específicos (metas mensuráveis para alcançar o objetivo geral).",
        Lightbulb,
        None,
    ),
    advice(
        Clareza,
        "Verbos de Ação",
        "Use verbos precisos como 'analisar', 'investigar', 'avaliar', 'identificar' ao invés de 'estudar' ou 'conhecer'.",
        AlertCircle,
        Some(30),
    ),
    advice(
        Melhoria,
        "Alinhamento",
        "Certifique-se de que seus objetivos específicos respondem diretamente ao objetivo geral e estão alinhados com sua premissa.",
        Lightbulb,
        None,
    ),
];

static LITERATURE: [Advice; 3] = [
    advice(
        Estrutura,
        "Revisão Crítica",
        "Não apenas descreva o que outros autores disseram - faça conexões, identifique lacunas e posicione sua pesquisa no contexto existente.",
        Lightbulb,
        None,
    ),
    advice(
        Referencia,
        "Atualidade das Fontes",
        "Priorize referências dos últimos 5 anos, especialmente em áreas com rápida evolução tecnológica ou conceitual.",
        BookOpen,
        Some(50),
    ),
    advice(
        Melhoria,
        "Organização Temática",
        "Organize sua revisão por temas ou conceitos, não apenas cronologicamente ou por autor.",
        AlertCircle,
        None,
    ),
];

static INTRODUCTION: [Advice; 3] = [
    advice(
        Estrutura,
        "Estrutura da Introdução",
        "Sua introdução poderia começar contextualizando o problema de forma mais ampla. Considere apresentar dados estatísticos ou um panorama geral do tema.",
        Lightbulb,
        None,
    ),
    advice(
        Clareza,
        "Clareza na Escrita",
        "Algumas frases estão muito longas. Considere dividi-las para melhorar a legibilidade.",
        AlertCircle,
        Some(50),
    ),
    advice(
        Referencia,
        "Referência Sugerida",
        "Silva et al. (2023). Inteligência Artificial na Educação: Uma revisão sistemática. Este trabalho apresenta um panorama atualizado do uso de IA em contextos educacionais.",
        BookOpen,
        None,
    ),
];

static METHODOLOGY: [Advice; 3] = [
    advice(
        Estrutura,
        "Tempo Verbal",
        "A metodologia deve estar em tempo passado, descrevendo os procedimentos que foram realizados.",
        AlertCircle,
        None,
    ),
    advice(
        Melhoria,
        "Detalhamento Necessário",
        "Em Ciências Humanas, é importante especificar o perfil dos participantes da pesquisa com mais detalhes (faixa etária, formação, etc.).",
        Lightbulb,
        Some(30),
    ),
    advice(
        Referencia,
        "Referência Metodológica",
        "Creswell, J. W. (2014). Projeto de pesquisa: métodos qualitativo, quantitativo e misto. Esta obra é referência em metodologia de pesquisa.",
        BookOpen,
        None,
    ),
];

static RESULTS: [Advice; 3] = [
    advice(
        Estrutura,
        "Separação de Seções",
        "Evite interpretar resultados nesta seção. Reserve as interpretações e discussões para a seção de Discussão.",
        AlertCircle,
        None,
    ),
    advice(
        Melhoria,
        "Visualização de Dados",
        "Considere adicionar elementos visuais (tabelas, gráficos) para ilustrar os dados de forma mais clara.",
        Lightbulb,
        None,
    ),
    advice(
        Clareza,
        "Organização dos Resultados",
        "Organize os resultados de forma lógica, do geral ao específico, para facilitar a compreensão.",
        Lightbulb,
        Some(40),
    ),
];

/// Fixed advice for a section, given its plain text
///
/// Abstract sections have no advice.
pub fn local_suggestions(section: Section, text: &str) -> Vec<Suggestion> {
    let list: &[Advice] = match section {
        Section::Objectives => &OBJECTIVES,
        Section::Literature => &LITERATURE,
        Section::Introduction => &INTRODUCTION,
        Section::Methodology => &METHODOLOGY,
        Section::Results => &RESULTS,
        Section::AbstractPt | Section::AbstractEn => return Vec::new(),
    };

    let words = word_count(text);
    list.iter()
        .filter(|a| a.min_words.map_or(true, |min| words > min))
        .map(|a| Suggestion {
            kind: a.kind,
            title: a.title.to_string(),
            content: a.content.to_string(),
            icon: a.icon,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_short_text_omits_conditional_advice() {
        let suggestions = local_suggestions(Section::Objectives, "Analisar a adoção");
        assert_eq!(titles(&suggestions), vec!["Objetivos Claros", "Alinhamento"]);
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        let thirty = vec!["palavra"; 30].join(" ");
        assert_eq!(local_suggestions(Section::Methodology, &thirty).len(), 2);

        let thirty_one = vec!["palavra"; 31].join(" ");
        let suggestions = local_suggestions(Section::Methodology, &thirty_one);
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[1].title, "Detalhamento Necessário");
        assert_eq!(suggestions[1].kind, SuggestionKind::Melhoria);
    }

    #[test]
    fn test_results_clarity_item_is_last() {
        let text = vec!["dado"; 41].join(" ");
        let suggestions = local_suggestions(Section::Results, &text);
        assert_eq!(
            titles(&suggestions),
            vec!["Separação de Seções", "Visualização de Dados", "Organização dos Resultados"]
        );
    }

    #[test]
    fn test_literature_and_introduction_use_fifty_words() {
        let fifty = vec!["fonte"; 50].join(" ");
        assert_eq!(local_suggestions(Section::Literature, &fifty).len(), 2);
        assert_eq!(local_suggestions(Section::Introduction, &fifty).len(), 2);

        let fifty_one = vec!["fonte"; 51].join(" ");
        let literature = local_suggestions(Section::Literature, &fifty_one);
        assert_eq!(literature[1].icon, Icon::BookOpen);
        assert_eq!(literature[1].kind, SuggestionKind::Referencia);
    }

    #[test]
    fn test_abstracts_have_no_advice() {
        assert!(local_suggestions(Section::AbstractPt, "Resumo").is_empty());
        assert!(local_suggestions(Section::AbstractEn, "Abstract").is_empty());
    }
}
