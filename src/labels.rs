//! User-facing text for progress labels, notifications, and prompts.

use crate::action_framework::{Operation, ResourceKind};
use crate::error::ActionError;

/// Shown when an error response carries no `detail`.
pub const UNKNOWN_ERROR: &str = "Erro desconhecido";

/// Progress label for submit controls that have no more specific text.
pub const LOADING: &str = "Carregando...";

struct Noun {
    word: &'static str,
    feminine: bool,
}

impl Noun {
    fn of(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Product => Noun { word: "produto", feminine: false },
            ResourceKind::User => Noun { word: "usuário", feminine: false },
            ResourceKind::Transaction => Noun { word: "transação", feminine: true },
        }
    }

    fn article(&self) -> &'static str {
        if self.feminine {
            "a"
        } else {
            "o"
        }
    }

    /// "do produto", "da transação"
    fn of_the(&self) -> String {
        format!("d{} {}", self.article(), self.word)
    }

    fn participle(&self, masculine: &str) -> String {
        if self.feminine {
            format!("{}a", masculine.trim_end_matches('o'))
        } else {
            masculine.to_string()
        }
    }

    fn capitalized(&self) -> String {
        let mut chars = self.word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

pub fn progress_label(kind: ResourceKind, operation: Operation) -> String {
    let noun = Noun::of(kind);
    match operation {
        Operation::Read => format!("Carregando dados {}...", noun.of_the()),
        Operation::Create => format!("Criando {}...", noun.word),
        Operation::Update => format!("Atualizando {}...", noun.word),
        Operation::Delete => format!("Deletando {}...", noun.word),
        Operation::ToggleStatus => format!("Atualizando status {}...", noun.of_the()),
    }
}

/// Success notification text. Reads reveal the form instead of notifying.
pub fn success_message(kind: ResourceKind, operation: Operation) -> Option<String> {
    let noun = Noun::of(kind);
    let done = |verb: &str| format!("{} {} com sucesso!", noun.capitalized(), noun.participle(verb));
    match operation {
        Operation::Read => None,
        Operation::Create => Some(done("criado")),
        Operation::Update => Some(done("atualizado")),
        Operation::Delete => Some(done("deletado")),
        Operation::ToggleStatus => Some(format!("Status {} atualizado com sucesso!", noun.of_the())),
    }
}

fn failure_prefix(kind: ResourceKind, operation: Operation) -> String {
    let noun = Noun::of(kind);
    match operation {
        Operation::Read => format!("Erro ao carregar {}", noun.word),
        Operation::Create | Operation::Update => format!("Erro ao salvar {}", noun.word),
        Operation::Delete => format!("Erro ao deletar {}", noun.word),
        Operation::ToggleStatus => "Erro ao atualizar status".to_string(),
    }
}

/// Error notification text for a failed dispatch.
///
/// Server rejections quote the `detail` message (or [`UNKNOWN_ERROR`]); anything
/// that never got a server answer asks the user to try again.
pub fn failure_message(kind: ResourceKind, operation: Operation, error: &ActionError) -> String {
    let prefix = failure_prefix(kind, operation);
    match error {
        ActionError::Application { detail, .. } => {
            format!("{prefix}: {}", detail.as_deref().unwrap_or(UNKNOWN_ERROR))
        }
        ActionError::Validation(reason) => reason.to_string(),
        _ => format!("{prefix}. Tente novamente."),
    }
}

pub fn confirm_delete_prompt(kind: ResourceKind, name: &str) -> String {
    let noun = Noun::of(kind);
    format!(
        "Tem certeza que deseja deletar {} {} \"{name}\"?\n\nEsta ação não pode ser desfeita.",
        noun.article(),
        noun.word
    )
}
