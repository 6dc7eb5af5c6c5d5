/*!
 * Prompt construction for the supported operations.
 *
 * Templates come from the configuration and are validated once, when a
 * `PromptTemplates` value is created. Building a prompt afterwards is a pure
 * string operation that cannot fail.
 */

use crate::app_config::PromptsConfig;
use crate::errors::AppError;

/// Placeholder substituted with the target language in the translate template
pub const LANGUAGE_SLOT: &str = "{target_language}";

/// Language used when a translation is requested without one
pub const DEFAULT_TARGET_LANGUAGE: &str = "English";

/// The transformation requested for an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Rewrite the input for clarity
    Rewrite,
    /// Translate the input into the given language
    Translate {
        /// Language name substituted into the template
        target_language: String,
    },
    /// Summarize the input
    Summarize,
    /// Send the input verbatim
    General,
}

impl Operation {
    /// Translate into `target_language`, falling back to English when it is blank
    pub fn translate(target_language: impl Into<String>) -> Self {
        let target_language = target_language.into();
        let target_language = if target_language.trim().is_empty() {
            DEFAULT_TARGET_LANGUAGE.to_string()
        } else {
            target_language.trim().to_string()
        };
        Self::Translate { target_language }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rewrite => "rewrite",
            Self::Translate { .. } => "translate",
            Self::Summarize => "summarize",
            Self::General => "general",
        }
    }
}

/// Validated prompt templates for the templated operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    rewrite: String,
    translate: String,
    summarize: String,
}

impl PromptTemplates {
    /// Create a template set, rejecting a translate template without exactly one slot
    pub fn new(
        rewrite: impl Into<String>,
        translate: impl Into<String>,
        summarize: impl Into<String>,
    ) -> Result<Self, AppError> {
        let translate = translate.into();

        match translate.matches(LANGUAGE_SLOT).count() {
            1 => {}
            0 => {
                return Err(AppError::Config(format!(
                    "prompts.translate must contain the {} placeholder",
                    LANGUAGE_SLOT
                )));
            }
            n => {
                return Err(AppError::Config(format!(
                    "prompts.translate must contain {} exactly once, found {} occurrences",
                    LANGUAGE_SLOT, n
                )));
            }
        }

        Ok(Self {
            rewrite: rewrite.into(),
            translate,
            summarize: summarize.into(),
        })
    }

    /// Create the template set from configuration
    pub fn from_config(prompts: &PromptsConfig) -> Result<Self, AppError> {
        Self::new(
            prompts.rewrite.clone(),
            prompts.translate.clone(),
            prompts.summarize.clone(),
        )
    }

    /// Build the final prompt for `operation` applied to `input`
    pub fn build(&self, operation: &Operation, input: &str) -> String {
        match operation {
            Operation::Rewrite => format!("{} {}", self.rewrite, input),
            Operation::Translate { target_language } => format!(
                "{} {}",
                self.translate.replace(LANGUAGE_SLOT, target_language),
                input
            ),
            Operation::Summarize => format!("{} {}", self.summarize, input),
            Operation::General => input.to_string(),
        }
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        let prompts = PromptsConfig::default();
        Self {
            rewrite: prompts.rewrite,
            translate: prompts.translate,
            summarize: prompts.summarize,
        }
    }
}
