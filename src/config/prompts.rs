//! Prompt templates for Lectern.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub answer: AnswerPrompts,
    pub transcription: TranscriptionPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompt for grounded answer synthesis.
///
/// `{{context}}` receives the retrieved transcript fragments, `{{question}}`
/// the user's question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    pub template: String,
}

impl AnswerPrompts {
    /// Reject templates that would let the model answer without the context.
    pub fn validate(&self) -> crate::error::Result<()> {
        for placeholder in ["{{context}}", "{{question}}"] {
            if !self.template.contains(placeholder) {
                return Err(crate::error::LecternError::Config(format!(
                    "Answer template must contain {}",
                    placeholder
                )));
            }
        }
        Ok(())
    }
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            template: r#"Using the text provided below as context, answer the question clearly and precisely.

CONTEXT:
{{context}}

QUESTION:
{{question}}

INSTRUCTIONS:
- Use only information contained in the provided context;
- If the answer cannot be found in the context, say only that there is not enough information to answer;
- Be objective;
- Keep an educational and professional tone;
- When you use the context, quote the relevant passages and refer to them as "lecture content"."#
                .to_string(),
        }
    }
}

/// Hint passed to the transcription model along with the audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionPrompts {
    pub hint: String,
}

impl Default for TranscriptionPrompts {
    fn default() -> Self {
        Self {
            hint: "Lecture recording. Transcribe accurately and naturally, with proper punctuation, \
                   splitting the text into paragraphs where appropriate."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let answer_path = custom_path.join("answer.toml");
            if answer_path.exists() {
                let content = std::fs::read_to_string(&answer_path)?;
                prompts.answer = toml::from_str(&content)?;
                prompts.answer.validate()?;
            }

            let transcription_path = custom_path.join("transcription.toml");
            if transcription_path.exists() {
                let content = std::fs::read_to_string(&transcription_path)?;
                prompts.transcription = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single left-to-right pass: text inserted for one
    /// placeholder is never scanned again, so a transcript that happens to
    /// contain `{{question}}` is copied verbatim. Unknown placeholders are
    /// left untouched.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];

            match after_open.find("}}") {
                Some(end) => {
                    let key = &after_open[..end];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after_open[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
