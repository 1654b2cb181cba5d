//! Dependency ordering of the module hierarchy.
//!
//! Modules are processed leaves-first: a module is emitted only after every
//! module referenced by one of its cells. Each module is visited at most
//! once, which also breaks instantiation cycles (rare and illegal, but they
//! must not hang the pass).

use std::collections::HashSet;
use takt_ir::{Design, ModuleId};

/// Returns every module of the design in dependency-leaves-first order.
///
/// The order is deterministic: roots are taken in arena order and children
/// in cell order, so repeated runs over the same design yield the same
/// sequence.
pub(crate) fn sorted_modules(design: &Design) -> Vec<ModuleId> {
    let mut order = Vec::with_capacity(design.modules.len());
    let mut visited = HashSet::new();
    for (id, _) in design.modules.iter() {
        visit(design, id, &mut order, &mut visited);
    }
    order
}

fn visit(
    design: &Design,
    id: ModuleId,
    order: &mut Vec<ModuleId>,
    visited: &mut HashSet<ModuleId>,
) {
    if !visited.insert(id) {
        return;
    }
    for cell in design.modules[id].cells.values() {
        if let Some(sub) = design.module_by_name(cell.ty) {
            visit(design, sub, order, visited);
        }
    }
    order.push(id);
}
