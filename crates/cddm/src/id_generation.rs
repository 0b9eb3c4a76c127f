//! Monotonic id generation for entity records.
//!
//! A single counter issues ids for every entity kind. Uniqueness is the only
//! contract; ordering across kinds carries no meaning. Ids already present in
//! a loaded dataset are registered so the counter resumes past them.
//!
//! # Example
//!
//! ```
//! use cddm::id_generation::IdGenerator;
//!
//! let mut generator = IdGenerator::new();
//! generator.register_id(41);
//!
//! assert_eq!(generator.generate().unwrap(), 42);
//! assert_eq!(generator.generate().unwrap(), 43);
//! ```

use thiserror::Error;
use tracing::debug;

/// Errors that can occur during id generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// The counter reached `u64::MAX`
    #[error("Id space exhausted after {last}")]
    Exhausted {
        /// Last id handed out or registered
        last: u64,
    },
}

/// Monotonic id generator.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    /// Highest id handed out or registered so far (0 = none)
    last: u64,
}

impl IdGenerator {
    /// Create a generator whose first id is `1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing id so it is never handed out again.
    pub fn register_id(&mut self, id: u64) {
        if id > self.last {
            debug!(id, previous = self.last, "Advancing id counter past registered id");
            self.last = id;
        }
    }

    /// Highest id seen so far.
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Generate the next unique id.
    ///
    /// # Errors
    ///
    /// Returns `IdGenerationError::Exhausted` once `u64::MAX` has been issued.
    pub fn generate(&mut self) -> Result<u64, IdGenerationError> {
        let next = self
            .last
            .checked_add(1)
            .ok_or(IdGenerationError::Exhausted { last: self.last })?;
        self.last = next;
        Ok(next)
    }
}
