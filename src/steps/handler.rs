//! The step handler seam and the name-to-handler registry.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::Result;
use crate::runner::Session;
use crate::steps::outcome::StepOutcome;

/// Something that can run a named step.
///
/// Handlers drive external commands through the [`Session`], which records
/// every failure. Returning `Err` marks the step as failed; the orchestrator
/// then applies the failure policy.
pub trait StepHandler {
    /// Run the step with the payload from its descriptor, if any.
    fn run(&self, session: &mut Session<'_>, data: Option<&Value>) -> Result<StepOutcome>;

    /// Short description shown by `orgbuilder list`.
    fn describe(&self) -> String {
        String::new()
    }
}

struct FnHandler<F> {
    description: String,
    run: F,
}

impl<F> StepHandler for FnHandler<F>
where
    F: Fn(&mut Session<'_>, Option<&Value>) -> Result<StepOutcome>,
{
    fn run(&self, session: &mut Session<'_>, data: Option<&Value>) -> Result<StepOutcome> {
        (self.run)(session, data)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Maps step names to handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn StepHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: impl StepHandler + 'static) {
        let name = name.into();
        if self.handlers.insert(name.clone(), Box::new(handler)).is_some() {
            tracing::debug!("Handler '{}' replaced", name);
        }
    }

    /// Register a closure as a handler.
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        run: F,
    ) where
        F: Fn(&mut Session<'_>, Option<&Value>) -> Result<StepOutcome> + 'static,
    {
        self.register(
            name,
            FnHandler {
                description: description.into(),
                run,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&dyn StepHandler> {
        self.handlers.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_lists_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register_fn("Zeta", "", |_, _| Ok(StepOutcome::Succeeded));
        registry.register_fn("Alpha", "first", |_, _| Ok(StepOutcome::Succeeded));
        assert_eq!(registry.names(), vec!["Alpha", "Zeta"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("Alpha").unwrap().describe(), "first");
    }

    #[test]
    fn later_registration_wins() {
        let mut registry = HandlerRegistry::new();
        registry.register_fn("Step", "old", |_, _| Ok(StepOutcome::Succeeded));
        registry.register_fn("Step", "new", |_, _| Ok(StepOutcome::Succeeded));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Step").unwrap().describe(), "new");
    }

    #[test]
    fn unknown_name_is_none() {
        let registry = HandlerRegistry::new();
        assert!(registry.get("Nope").is_none());
        assert!(!registry.contains("Nope"));
        assert!(registry.is_empty());
    }
}
