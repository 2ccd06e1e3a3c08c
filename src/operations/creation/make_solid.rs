use crate::error::{Result, TopologyError};
use crate::topology::{ShellId, SolidData, SolidId, TopologyStore};

/// Creates a solid from shells.
pub struct MakeSolid {
    outer_shell: ShellId,
    inner_shells: Vec<ShellId>,
}

impl MakeSolid {
    /// Creates a new `MakeSolid` operation.
    #[must_use]
    pub fn new(outer_shell: ShellId, inner_shells: Vec<ShellId>) -> Self {
        Self {
            outer_shell,
            inner_shells,
        }
    }

    /// Executes the operation, creating the solid in the topology store.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidTopology` if the outer shell is open or
    /// empty, or an error if a shell is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let outer = store.shell(self.outer_shell)?;
        if !outer.is_closed || outer.faces.is_empty() {
            return Err(TopologyError::InvalidTopology(
                "a solid needs a closed, non-empty outer shell".into(),
            )
            .into());
        }
        for &inner in &self.inner_shells {
            store.shell(inner)?;
        }
        Ok(store.add_solid(SolidData {
            outer_shell: self.outer_shell,
            inner_shells: self.inner_shells.clone(),
        }))
    }
}
