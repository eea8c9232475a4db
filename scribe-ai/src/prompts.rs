//! Prompt templates for the AI functions

use scribe_common::api::AbstractInput;

/// Section review system prompt (analyze-text)
pub const SUGGESTIONS_SYSTEM_PROMPT: &str = r#"Você é um especialista em metodologia científica e normas ABNT/ABNT NBR 14724.
Sua tarefa é analisar o conteúdo fornecido pelo usuário para uma seção de um trabalho acadêmico.

SEÇÕES POSSÍVEIS:
- objectives: Objetivos (verbos no infinitivo, clareza, alinhamento)
- literature: Revisão de Literatura (citações, atualidade, organização)
- introduction: Introdução (contextualização, clareza, estrutura)
- methodology: Metodologia (tempo passado, detalhamento, rigor)
- results: Resultados (objetividade, visualização, organização)

INSTRUÇÕES:
1. Gere 3 a 5 sugestões de melhoria focadas em rigor acadêmico, clareza e estrutura
2. As sugestões devem ser curtas e acionáveis
3. Considere as normas ABNT e boas práticas acadêmicas
4. Retorne EXCLUSIVAMENTE um JSON válido (array de objetos)

FORMATO DE SAÍDA (JSON):
[
  {
    "type": "estrutura" | "clareza" | "melhoria" | "referencia",
    "title": "Título curto da sugestão",
    "content": "Descrição acionável da sugestão",
    "icon": "Lightbulb" | "AlertCircle" | "BookOpen"
  }
]"#;

/// Whole-document review system prompt (analyze-document)
pub const TIPS_SYSTEM_PROMPT: &str = r#"Você é um especialista acadêmico em redação científica e normas ABNT.

TAREFA:
Analise o documento fornecido e gere EXATAMENTE 10 dicas práticas e específicas para melhorar este artigo acadêmico.

CATEGORIAS DAS DICAS (distribuir entre):
1. Metodologia (2-3 dicas)
2. Redação (2-3 dicas)
3. Resultados (2 dicas)
4. Estrutura (2 dicas)
5. Fundamentação (1 dica)

FORMATO DE SAÍDA (JSON):
{
  "tips": [
    {
      "id": "tip-1",
      "number": 1,
      "category": "Metodologia" | "Redação" | "Resultados" | "Estrutura" | "Fundamentação",
      "title": "Título curto e direto",
      "description": "Descrição detalhada e acionável da melhoria sugerida",
      "icon": "Lightbulb" | "CheckCircle" | "AlertCircle"
    }
  ]
}

REGRAS:
- Seja específico ao conteúdo fornecido
- Evite dicas genéricas
- Foque em melhorias práticas
- Considere as normas ABNT
- Numere de 1 a 10"#;

const ABSTRACT_SYSTEM_PROMPT_PT: &str = "Você é um assistente especializado em redação científica acadêmica. \
Sua tarefa é gerar resumos (abstracts) para artigos científicos seguindo rigorosamente as normas da ABNT NBR 6028:2021. \
O resumo deve ter entre 150 e 500 palavras, ser escrito em parágrafo único, tempo verbal no passado ou presente, \
e conter: contextualização, objetivos, metodologia, principais resultados e conclusões. \
Não use citações bibliográficas.";

const ABSTRACT_SYSTEM_PROMPT_EN: &str = "You are a specialized assistant in academic scientific writing. \
Your task is to generate abstracts for scientific papers following rigorous academic standards. \
The abstract should be between 150 and 500 words, written in a single paragraph, using past or present tense, \
and contain: contextualization, objectives, methodology, main results and conclusions. \
Do not use bibliographic citations.";

pub fn suggestions_user_prompt(section: &str, content: &str) -> String {
    format!(
        "Analise o seguinte texto da seção \"{section}\" de um trabalho acadêmico:\n\n\
         \"{content}\"\n\n\
         Gere sugestões de melhoria específicas para esta seção, considerando as normas ABNT e boas práticas acadêmicas."
    )
}

pub fn tips_user_prompt(area: &str, premise: &str, document_text: &str) -> String {
    format!(
        "Analise este documento da área de {area}:\n\n\
         Premissa: {premise}\n\n\
         CONTEÚDO DO DOCUMENTO:\n{document_text}\n\n\
         Gere 10 dicas de melhoria seguindo o formato especificado."
    )
}

/// Language of one generated abstract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractTarget {
    Portuguese,
    English,
}

/// System and user prompt for one abstract
///
/// `input` must already be plain text.
pub fn abstract_prompts(target: AbstractTarget, input: &AbstractInput) -> (&'static str, String) {
    match target {
        AbstractTarget::Portuguese => (
            ABSTRACT_SYSTEM_PROMPT_PT,
            format!(
                "Gere um resumo acadêmico em português para o seguinte artigo da área de {}:\n\n\
                 TÍTULO: {}\n\n\
                 PREMISSA: {}\n\n\
                 OBJETIVOS: {}\n\n\
                 INTRODUÇÃO: {}\n\n\
                 METODOLOGIA: {}\n\n\
                 RESULTADOS: {}\n\n\
                 Gere um resumo completo, coeso e acadêmico seguindo todas as diretrizes.",
                input.area,
                input.title,
                input.premise,
                input.objectives,
                input.introduction,
                input.methodology,
                input.results
            ),
        ),
        AbstractTarget::English => (
            ABSTRACT_SYSTEM_PROMPT_EN,
            format!(
                "Generate an academic abstract in English for the following article in the field of {}:\n\n\
                 TITLE: {}\n\n\
                 PREMISE: {}\n\n\
                 OBJECTIVES: {}\n\n\
                 INTRODUCTION: {}\n\n\
                 METHODOLOGY: {}\n\n\
                 RESULTS: {}\n\n\
                 Generate a complete, cohesive and academic abstract following all guidelines.",
                input.area,
                input.title,
                input.premise,
                input.objectives,
                input.introduction,
                input.methodology,
                input.results
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_prompt_quotes_section_and_content() {
        let prompt = suggestions_user_prompt("methodology", "Foram entrevistados 20 docentes.");
        assert!(prompt.contains("seção \"methodology\""));
        assert!(prompt.contains("\"Foram entrevistados 20 docentes.\""));
    }

    #[test]
    fn test_abstract_prompt_per_language() {
        let input = AbstractInput {
            title: "Pontes".to_string(),
            area: "Engenharias".to_string(),
            results: "Resistência 20% maior".to_string(),
            ..Default::default()
        };
        let (system, user) = abstract_prompts(AbstractTarget::Portuguese, &input);
        assert!(system.contains("NBR 6028:2021"));
        assert!(user.contains("TÍTULO: Pontes"));
        assert!(user.contains("RESULTADOS: Resistência 20% maior"));

        let (system, user) = abstract_prompts(AbstractTarget::English, &input);
        assert!(!system.contains("ABNT"));
        assert!(user.contains("in the field of Engenharias"));
    }

    #[test]
    fn test_tips_prompt_includes_context() {
        let prompt = tips_user_prompt("Ciências da Saúde", "Sono e memória", "Texto completo");
        assert!(prompt.starts_with("Analise este documento da área de Ciências da Saúde"));
        assert!(prompt.contains("Premissa: Sono e memória"));
        assert!(TIPS_SYSTEM_PROMPT.contains("EXATAMENTE 10"));
    }
}
