use std::sync::{Arc, OnceLock};

use crate::error::AdapterError;

use super::{MockSystem, TargetSystem};

#[derive(Clone)]
pub struct SystemRegistry {
    systems: Vec<Arc<dyn TargetSystem>>,
}

impl SystemRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        if let Err(err) = registry.register(MockSystem) {
            tracing::warn!("Skipping duplicate builtin target system: {}", err);
        }
        registry
    }

    /// Registers a target system under its name.
    ///
    /// # Errors
    ///
    /// Returns an error when a system with the same name is already
    /// registered.
    pub fn register<T>(&mut self, system: T) -> Result<(), AdapterError>
    where
        T: TargetSystem + 'static,
    {
        let name = system.name();
        if self.systems.iter().any(|existing| existing.name() == name) {
            return Err(AdapterError::DuplicateSystem {
                name: name.to_owned(),
            });
        }
        self.systems.push(Arc::new(system));
        Ok(())
    }

    #[must_use]
    pub fn system(&self, name: &str) -> Option<Arc<dyn TargetSystem>> {
        self.systems
            .iter()
            .find(|system| system.name() == name)
            .cloned()
    }

    #[must_use]
    pub fn names_csv(&self) -> String {
        let mut names: Vec<&'static str> = self.systems.iter().map(|system| system.name()).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

#[must_use]
pub fn system_registry() -> &'static SystemRegistry {
    static REGISTRY: OnceLock<SystemRegistry> = OnceLock::new();
    REGISTRY.get_or_init(SystemRegistry::with_builtins)
}
