//! One-time conversion of descriptors into concrete flags.

use std::sync::Arc;

use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::invoke::{ConstructorArgs, invoke};
use crate::{ConstructionOp, Flag, FlagDescriptor, FlagSet};

impl FlagDescriptor {
    /// Returns the concrete flag for this descriptor, building it on first
    /// use.
    ///
    /// The constructor named by [`operation`](Self::operation) runs against
    /// a throwaway single-flag [`FlagSet`]; the resulting flag gets this
    /// descriptor's shorthand and visibility and is cached. Later calls
    /// return the same [`Arc`].
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownOperation`] when the operation name does
    /// not resolve, [`ConfigurationError::TypeMismatch`] when the value or
    /// default does not fit it. Nothing is cached on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use redhawk_flags::FlagDescriptor;
    ///
    /// let output = FlagDescriptor::string("output", "table").with_shorthand('o');
    /// let first = output.materialize().unwrap();
    /// let second = output.materialize().unwrap();
    /// assert!(Arc::ptr_eq(&first, &second));
    /// assert_eq!(first.shorthand(), Some('o'));
    ///
    /// let broken = FlagDescriptor::string("output", "table").with_operation("doesNotExist");
    /// assert!(broken.materialize().is_err());
    /// ```
    pub fn materialize(&self) -> Result<Arc<Flag>> {
        if let Some(flag) = self.materialized_slot().get() {
            return Ok(Arc::clone(flag));
        }

        let op = ConstructionOp::resolve(self.name(), self.operation())?;
        let args = ConstructorArgs {
            value: self.value_container().clone(),
            name: self.name().to_string(),
            default: op
                .takes_default()
                .then(|| self.default_value().clone()),
            usage: self.usage().to_string(),
        };

        let mut set = FlagSet::new(self.name());
        invoke(&mut set, op, args)?;
        let mut flag = take_constructed(&mut set, self.name(), op)?;
        flag.set_shorthand(self.shorthand());
        flag.set_hidden(self.is_hidden());
        debug!(flag = %self.name(), operation = %op, "Materialized flag");

        let cached = self.materialized_slot().get_or_init(|| Arc::new(flag));
        Ok(Arc::clone(cached))
    }
}

fn take_constructed(set: &mut FlagSet, name: &str, op: ConstructionOp) -> Result<Flag> {
    let built = set
        .take(name)
        .ok_or_else(|| ConfigurationError::FlagNotConstructed {
            flag: name.to_string(),
            operation: op.name().to_string(),
        })?;
    Ok(Arc::unwrap_or_clone(built))
}
