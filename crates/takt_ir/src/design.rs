//! Top-level design container.

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::module::Module;
use serde::{Deserialize, Serialize};
use takt_common::Ident;

/// A complete hardware design: all modules of the hierarchy, blackbox
/// declarations included.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Design {
    /// All modules in the design, keyed by [`ModuleId`].
    pub modules: Arena<ModuleId, Module>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty regular module with the given name.
    pub fn add_module(&mut self, name: Ident) -> ModuleId {
        let id = self.modules.next_id();
        self.modules.alloc(Module::new(id, name))
    }

    /// Looks up a module by name.
    ///
    /// Cell types resolve through this: a cell whose `ty` names a module of
    /// the design instantiates that module.
    pub fn module_by_name(&self, name: Ident) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(id, _)| id)
    }

    /// Returns the module marked `top`, if any.
    pub fn top_module(&self) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|(_, m)| m.top)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_look_up_modules() {
        let mut design = Design::new();
        let a = design.add_module(Ident::from_raw(1));
        let b = design.add_module(Ident::from_raw(2));
        assert_ne!(a, b);
        assert_eq!(design.module_by_name(Ident::from_raw(2)), Some(b));
        assert_eq!(design.module_by_name(Ident::from_raw(9)), None);
    }

    #[test]
    fn top_module_query() {
        let mut design = Design::new();
        let _a = design.add_module(Ident::from_raw(1));
        assert_eq!(design.top_module(), None);
        let b = design.add_module(Ident::from_raw(2));
        design.modules.get_mut(b).top = true;
        assert_eq!(design.top_module(), Some(b));
    }

    #[test]
    fn module_ids_match_arena_slots() {
        let mut design = Design::new();
        let a = design.add_module(Ident::from_raw(1));
        assert_eq!(design.modules[a].id, a);
    }

    #[test]
    fn serde_roundtrip() {
        let mut design = Design::new();
        let a = design.add_module(Ident::from_raw(1));
        design.modules.get_mut(a).blackbox = true;
        let json = serde_json::to_string(&design).unwrap();
        let restored: Design = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.modules.len(), 1);
        assert!(restored.modules[a].blackbox);
    }
}
