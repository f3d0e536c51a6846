// Keyword vocabulary used as a filter over chat text
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::error::{ChatGraphError, Result};

/// Built-in university vocabulary (Portuguese)
///
/// Grouped by area: courses, admissions, campus structure, teaching,
/// documents, student support, systems, contact and general terms.
const DEFAULT_TERMS: &[&str] = &[
    // Cursos e áreas acadêmicas
    "curso", "cursos", "graduação", "pós-graduação", "mestrado", "doutorado",
    "engenharia", "direito", "medicina", "psicologia", "administração", "economia",
    "arquitetura", "design", "comunicação", "jornalismo", "publicidade", "marketing",
    // Processo seletivo e ingresso
    "vestibular", "enem", "sisu", "prouni", "fies", "nota", "notas", "prova", "provas",
    "inscrição", "inscrições", "matrícula", "rematrícula", "transferência", "transferências",
    // Estrutura acadêmica
    "campus", "laboratório", "laboratórios", "biblioteca", "sala", "salas", "auditório",
    "restaurante", "cantina", "estacionamento", "quadra", "ginásio",
    // Ensino e aprendizagem
    "disciplina", "disciplinas", "matéria", "matérias", "professor", "professores",
    "aula", "aulas", "presencial", "ead", "online", "distância", "híbrido",
    "média", "frequência", "aprovação", "reprovação", "dp",
    // Documentos e serviços
    "histórico", "diploma", "certificado", "declaração", "atestado", "comprovante",
    "boleto", "mensalidade", "taxa", "desconto", "bolsa", "financiamento",
    // Apoio ao estudante
    "caa", "atendimento", "secretaria", "ouvidoria", "monitoria", "estágio", "tcc",
    "iniciação", "científica", "pesquisa", "extensão", "intercâmbio",
    // Tecnologia e sistemas
    "portal", "sistema", "login", "senha", "email", "plataforma", "ambiente", "virtual",
    // Localização e contato
    "campinas", "endereço", "telefone", "contato", "horário", "funcionamento",
    // Outros termos relevantes
    "aluno", "aluna", "estudante", "universitário", "acadêmico", "semestre", "período",
];

/// Immutable set of recognized keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: HashSet<String>,
}

impl Vocabulary {
    /// Build a vocabulary from arbitrary terms (trimmed and lowercased, empty terms dropped)
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// Load a vocabulary file: either a JSON array of strings or one term per line
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ChatGraphError::io(path, e))?;

        let vocabulary = if content.trim_start().starts_with('[') {
            let terms: Vec<String> =
                serde_json::from_str(&content).map_err(|e| ChatGraphError::json(path, e))?;
            Self::from_terms(terms)
        } else {
            Self::from_terms(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.starts_with('#')),
            )
        };

        debug!(path = %path.display(), terms = vocabulary.len(), "vocabulary loaded");
        Ok(vocabulary)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in sorted order
    pub fn sorted_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.terms.iter().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_terms(DEFAULT_TERMS)
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        Self::from_terms(terms)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary
            .sorted_terms()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
