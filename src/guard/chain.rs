use std::collections::HashSet;

use crate::catalog::EntityKind;
use crate::error::ApiError;
use crate::store::Store;

use super::context::RequestContext;
use super::guards::Guard;

/// Ordered list of guards declared on a route. Execution folds left to
/// right and short-circuits on the first failure; the handler only runs if
/// every guard passed.
#[derive(Debug)]
pub struct GuardChain {
    guards: Vec<Guard>,
}

impl GuardChain {
    /// Build a chain, asserting in debug builds that every guard's
    /// prerequisites are resolved by an earlier guard. A misdeclared chain
    /// is a programming error caught the first time the route is exercised.
    pub fn new(guards: Vec<Guard>) -> Self {
        let chain = Self { guards };
        debug_assert!(
            chain.verify().is_ok(),
            "misdeclared guard chain: {}",
            chain.verify().unwrap_err()
        );
        chain
    }

    /// Check that each guard's `requires()` set is provided by guards that
    /// run before it.
    pub fn verify(&self) -> Result<(), String> {
        let mut available: HashSet<EntityKind> = HashSet::new();
        for guard in &self.guards {
            for needed in guard.requires() {
                if !available.contains(&needed) {
                    return Err(format!(
                        "{:?} requires {:?}, which no earlier guard resolves",
                        guard, needed
                    ));
                }
            }
            if let Some(provided) = guard.provides() {
                available.insert(provided);
            }
        }
        Ok(())
    }

    pub async fn run(&self, store: &dyn Store, ctx: &mut RequestContext) -> Result<(), ApiError> {
        for guard in &self.guards {
            guard.check(store, ctx).await?;
        }
        Ok(())
    }
}
