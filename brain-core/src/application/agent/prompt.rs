//! Fixed prompt and reply texts.

use crate::types::{Interface, Language};

const BASE_PROMPT: &str = "You are a helpful AI assistant with access to various tools and systems.\n\
You can help with tasks, answer questions, and interact with connected services.";

/// Base instruction, then the interface clause, then the language clause,
/// separated by blank lines. Unknown interfaces and languages add nothing.
pub fn system_prompt(interface: &Interface, language: &Language) -> String {
    let mut parts = vec![BASE_PROMPT];
    parts.extend(interface_clause(interface));
    parts.extend(language_clause(language));
    parts.join("\n\n")
}

fn interface_clause(interface: &Interface) -> Option<&'static str> {
    match interface {
        Interface::Voice => {
            Some("The user is interacting via voice. Keep responses concise and conversational.")
        }
        Interface::Telegram => Some("The user is messaging via Telegram. Use clear, formatted text."),
        Interface::Api => Some("This is a programmatic API interaction."),
        Interface::Other(_) => None,
    }
}

fn language_clause(language: &Language) -> Option<&'static str> {
    match language {
        Language::Polish => Some("Respond in Polish."),
        Language::English => Some("Respond in English."),
        Language::Other(_) => None,
    }
}

/// Reply used when the loop fails.
pub fn apology(language: &Language) -> &'static str {
    match language {
        Language::Polish => {
            "Przepraszam, nie udało mi się wygenerować odpowiedzi. Spróbuj ponownie."
        }
        _ => "I apologize, I couldn't generate a response. Please try again.",
    }
}

/// Reply used when the model's final answer is empty.
pub fn empty_response(language: &Language) -> &'static str {
    match language {
        Language::Polish => "Przepraszam, nie udało mi się wygenerować odpowiedzi.",
        _ => "I apologize, I couldn't generate a response.",
    }
}
