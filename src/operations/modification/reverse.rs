use crate::error::Result;
use crate::operations::creation::MakeSolid;
use crate::topology::{FaceData, ShellData, ShellId, SolidId, TopologyStore};

/// Flips the orientation of every face of a solid.
///
/// The input solid is left untouched; a new inside-out copy is returned.
pub struct Reverse {
    solid: SolidId,
}

impl Reverse {
    /// Creates a new `Reverse` operation.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its entities is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let solid = store.solid(self.solid)?.clone();

        let outer_shell = reverse_shell(store, solid.outer_shell)?;
        let mut inner_shells = Vec::with_capacity(solid.inner_shells.len());
        for shell in solid.inner_shells {
            inner_shells.push(reverse_shell(store, shell)?);
        }
        MakeSolid::new(outer_shell, inner_shells).execute(store)
    }
}

fn reverse_shell(store: &mut TopologyStore, shell: ShellId) -> Result<ShellId> {
    let shell = store.shell(shell)?.clone();
    let mut faces = Vec::with_capacity(shell.faces.len());
    for face in shell.faces {
        let data = store.face(face)?.clone();
        let outer = store.wire(data.outer_wire)?.reversed();
        let outer_wire = store.add_wire(outer);
        let mut inner_wires = Vec::with_capacity(data.inner_wires.len());
        for inner in &data.inner_wires {
            let reversed = store.wire(*inner)?.reversed();
            inner_wires.push(store.add_wire(reversed));
        }
        faces.push(store.add_face(FaceData {
            plane: data.plane,
            outer_wire,
            inner_wires,
            same_sense: !data.same_sense,
        }));
    }
    Ok(store.add_shell(ShellData {
        faces,
        is_closed: shell.is_closed,
    }))
}
