//! Grounded answer synthesis.

use crate::config::Prompts;
use crate::error::{LecternError, Result};
use crate::generation::Generator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Builds a context-constrained prompt and asks the generator for an answer.
///
/// Holds no state between calls.
#[derive(Clone)]
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Render the answer prompt for a question and its context texts.
    ///
    /// Fails with `Config` if the template has no slot for the context or
    /// the question.
    pub fn build_prompt(&self, question: &str, contexts: &[String]) -> Result<String> {
        self.prompts.answer.validate()?;

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), contexts.join("\n\n"));
        vars.insert("question".to_string(), question.to_string());
        Ok(self
            .prompts
            .render_with_custom(&self.prompts.answer.template, &vars))
    }

    /// Answer `question` using only `contexts`.
    ///
    /// Returns `Ok(None)` without calling the generator when `contexts` is
    /// empty.
    #[instrument(skip(self, question, contexts), fields(contexts = contexts.len()))]
    pub async fn synthesize(&self, question: &str, contexts: &[String]) -> Result<Option<String>> {
        if contexts.is_empty() {
            debug!("No context, skipping generation");
            return Ok(None);
        }

        let prompt = self.build_prompt(question, contexts)?;
        let answer = self.generator.generate(&prompt).await.map_err(|e| match e {
            LecternError::AnswerGenerationFailed(_) => e,
            other => LecternError::AnswerGenerationFailed(other.to_string()),
        })?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(LecternError::AnswerGenerationFailed(
                "Generator returned an empty answer".to_string(),
            ));
        }

        debug!("Generated answer of {} characters", answer.len());
        Ok(Some(answer.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingGenerator;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_empty_context_skips_generator() {
        let generator = Arc::new(CountingGenerator::replying("unused"));
        let synthesizer = AnswerSynthesizer::new(generator.clone());

        let answer = assert_ok!(synthesizer.synthesize("What is ATP?", &[]).await);
        assert!(answer.is_none());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_prompt_contains_every_context_and_question() {
        let generator = Arc::new(CountingGenerator::replying("  Light becomes sugar.\n"));
        let synthesizer = AnswerSynthesizer::new(generator.clone());
        let contexts = vec![
            "Photosynthesis converts light into chemical energy.".to_string(),
            "Chlorophyll absorbs {{question}} red and blue light.".to_string(),
        ];

        let answer = synthesizer
            .synthesize("What is photosynthesis?", &contexts)
            .await
            .unwrap();
        assert_eq!(answer.as_deref(), Some("Light becomes sugar."));

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("What is photosynthesis?"));
        for context in &contexts {
            assert!(prompts[0].contains(context.as_str()));
        }
        let first = prompts[0].find("Photosynthesis converts").unwrap();
        let second = prompts[0].find("Chlorophyll absorbs").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_generator_failure() {
        let synthesizer = AnswerSynthesizer::new(Arc::new(CountingGenerator::failing()));
        let err = synthesizer
            .synthesize("q", &["context".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::AnswerGenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_blank_answer_is_failure() {
        let synthesizer = AnswerSynthesizer::new(Arc::new(CountingGenerator::replying(" \n ")));
        let err = synthesizer
            .synthesize("q", &["context".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::AnswerGenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_custom_template_and_variables() {
        let generator = Arc::new(CountingGenerator::replying("ok"));
        let mut prompts = Prompts::default();
        prompts.answer.template = "[{{course}}] {{question}} :: {{context}}".to_string();
        prompts
            .variables
            .insert("course".to_string(), "BIO-101".to_string());
        let synthesizer = AnswerSynthesizer::new(generator.clone()).with_prompts(prompts);

        synthesizer
            .synthesize("Why?", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(generator.prompts()[0], "[BIO-101] Why? :: a\n\nb");
    }

    #[tokio::test]
    async fn test_template_without_context_never_reaches_generator() {
        let generator = Arc::new(CountingGenerator::replying("made up"));
        let mut prompts = Prompts::default();
        prompts.answer.template = "Answer briefly: {{question}}".to_string();
        let synthesizer = AnswerSynthesizer::new(generator.clone()).with_prompts(prompts);

        let err = synthesizer
            .synthesize(
                "How do plants make energy?",
                &["Photosynthesis converts light into chemical energy.".to_string()],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LecternError::Config(_)));
        assert_eq!(generator.calls(), 0);
    }
}
