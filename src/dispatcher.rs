/*!
 * Operation dispatch.
 *
 * Turns the caller's operation flags into a single `Operation` and invokes the
 * matching provider method. When several flags are set the first one in the
 * order rewrite, translate, summarize wins; with none set the input is sent
 * as a general query.
 */

use log::{debug, info};

use crate::errors::AppError;
use crate::language_utils;
use crate::prompts::Operation;
use crate::providers::Provider;
use crate::transport::CallContext;

/// Operation flags as supplied by the front-end
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFlags {
    pub rewrite: bool,
    pub translate: bool,
    pub summarize: bool,
    /// Target language for translate, code or name
    pub language: Option<String>,
}

impl OperationFlags {
    /// Select the operation by precedence
    pub fn resolve(&self) -> Operation {
        let set = [self.rewrite, self.translate, self.summarize]
            .iter()
            .filter(|flag| **flag)
            .count();

        let operation = if self.rewrite {
            Operation::Rewrite
        } else if self.translate {
            let requested = self.language.as_deref().unwrap_or_default();
            Operation::translate(language_utils::resolve_target_language(requested))
        } else if self.summarize {
            Operation::Summarize
        } else {
            Operation::General
        };

        if set > 1 {
            debug!("Several operations requested, running {} only", operation.name());
        }

        operation
    }
}

/// Runs one operation against one provider
#[derive(Debug)]
pub struct Dispatcher {
    provider: Box<dyn Provider>,
}

impl Dispatcher {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// Resolve `flags` and run the selected operation on `input`
    pub async fn run(
        &self,
        ctx: &CallContext,
        flags: &OperationFlags,
        input: &str,
    ) -> Result<String, AppError> {
        let operation = flags.resolve();
        self.execute(ctx, &operation, input).await
    }

    /// Run `operation` on `input`
    ///
    /// Blank input is rejected before the provider is invoked.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        operation: &Operation,
        input: &str,
    ) -> Result<String, AppError> {
        if input.trim().is_empty() {
            return Err(AppError::MissingInput);
        }

        info!(
            "Running {} with {}",
            operation.name(),
            self.provider.kind().display_name()
        );

        let provider = self.provider.as_ref();
        let result = match operation {
            Operation::Rewrite => provider.rewrite(ctx, input).await,
            Operation::Translate { target_language } => {
                provider.translate(ctx, input, target_language).await
            }
            Operation::Summarize => provider.summarize(ctx, input).await,
            Operation::General => provider.general(ctx, input).await,
        };

        Ok(result?)
    }
}
