use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::{
    declarations::{DeclaredFfi, DeclaredFunction, DeclaredType},
    error::DuplicateSymbol,
    types::Type,
};

/// A stored variable binding: shared mutable type slot, mutability and
/// whether the binding was created by a match pattern. Pattern bindings are
/// omitted when the scope is cloned for a generic instantiation so pattern
/// nodes rebind their own symbols on re-inference.
#[derive(Debug, Clone)]
struct StoredVariable {
    type_id: Rc<RefCell<Option<Type>>>,
    mutable: bool,
    from_pattern: bool,
}

/// A single lexical frame: value bindings, constants and the declaration
/// registries visible from this frame inward.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    variables: HashMap<String, StoredVariable>,
    constants: HashMap<String, Type>,
    types: HashMap<String, DeclaredType>,
    functions: HashMap<String, DeclaredFunction>,
    ffis: HashMap<String, DeclaredFfi>,
}

type StackFrame = Rc<RefCell<Frame>>;

/// Hierarchical lexical scope stack; innermost frame last, lookups walk
/// backwards. Bindings added after a lookup never retroactively affect it.
#[derive(Debug, Clone)]
pub struct Scope {
    stacks: Vec<StackFrame>,
}

impl Default for Scope {
    fn default() -> Self {
        Scope {
            stacks: vec![StackFrame::default()],
        }
    }
}

impl Scope {
    pub fn new() -> Scope {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.stacks.push(StackFrame::default());
    }

    pub fn exit_scope(&mut self) {
        self.stacks.pop();
    }

    /// Add a variable binding to the innermost frame. Duplicates within the
    /// same frame are rejected.
    pub fn add_variable(
        &mut self,
        name: impl ToString,
        type_id: Rc<RefCell<Option<Type>>>,
        mutable: bool,
    ) -> Result<(), DuplicateSymbol> {
        self.insert_variable(name, type_id, mutable, false)
    }

    /// Same as [`Scope::add_variable`] but marks the binding as
    /// pattern-created.
    pub fn add_pattern_variable(
        &mut self,
        name: impl ToString,
        type_id: Rc<RefCell<Option<Type>>>,
    ) -> Result<(), DuplicateSymbol> {
        self.insert_variable(name, type_id, false, true)
    }

    fn insert_variable(
        &mut self,
        name: impl ToString,
        type_id: Rc<RefCell<Option<Type>>>,
        mutable: bool,
        from_pattern: bool,
    ) -> Result<(), DuplicateSymbol> {
        let name = name.to_string();

        let Some(last) = self.stacks.last() else {
            unreachable!("trying to add variable {name} in empty scope");
        };

        {
            let frame = last.borrow();
            if frame.variables.contains_key(&name) || frame.constants.contains_key(&name) {
                return Err(DuplicateSymbol { name });
            }
        }

        last.borrow_mut().variables.insert(
            name,
            StoredVariable {
                type_id,
                mutable,
                from_pattern,
            },
        );

        Ok(())
    }

    /// Add an immutable constant to the innermost frame.
    pub fn add_constant(
        &mut self,
        name: impl ToString,
        type_id: Type,
    ) -> Result<(), DuplicateSymbol> {
        let name = name.to_string();

        let Some(last) = self.stacks.last() else {
            unreachable!("trying to add constant {name} in empty scope");
        };

        {
            let frame = last.borrow();
            if frame.variables.contains_key(&name) || frame.constants.contains_key(&name) {
                return Err(DuplicateSymbol { name });
            }
        }

        last.borrow_mut().constants.insert(name, type_id);

        Ok(())
    }

    /// Resolve a value name to a shared type slot, innermost binding wins.
    pub fn resolve_name(&self, name: impl ToString) -> Option<Rc<RefCell<Option<Type>>>> {
        let name = name.to_string();

        for frame in self.stacks.iter().rev() {
            let frame = frame.borrow();
            if let Some(constant) = frame.constants.get(&name) {
                return Some(Rc::new(RefCell::new(Some(constant.clone()))));
            }
            if let Some(variable) = frame.variables.get(&name) {
                return Some(variable.type_id.clone());
            }
        }

        None
    }

    /// Whether the innermost binding of this name is a constant.
    pub fn is_constant(&self, name: impl ToString) -> bool {
        let name = name.to_string();

        for frame in self.stacks.iter().rev() {
            let frame = frame.borrow();
            if frame.constants.contains_key(&name) {
                return true;
            }
            if frame.variables.contains_key(&name) {
                return false;
            }
        }

        false
    }

    pub fn is_variable_mutable(&self, name: impl ToString) -> Option<bool> {
        let name = name.to_string();

        for frame in self.stacks.iter().rev() {
            let frame = frame.borrow();
            if frame.constants.contains_key(&name) {
                return Some(false);
            }
            if let Some(variable) = frame.variables.get(&name) {
                return Some(variable.mutable);
            }
        }

        None
    }

    pub fn add_declared_type(&mut self, declared: DeclaredType) -> Result<(), DuplicateSymbol> {
        let Some(last) = self.stacks.last() else {
            unreachable!("trying to add type {} in empty scope", declared.name);
        };

        if last.borrow().types.contains_key(&declared.name) {
            return Err(DuplicateSymbol {
                name: declared.name,
            });
        }

        last.borrow_mut().types.insert(declared.name.clone(), declared);

        Ok(())
    }

    /// Replace a declared type wherever it is bound. Used by the second
    /// shallow pass when a pre-registered name receives its resolved body.
    pub fn override_declared_type(&mut self, declared: DeclaredType) {
        for frame in self.stacks.iter().rev() {
            if frame.borrow().types.contains_key(&declared.name) {
                frame
                    .borrow_mut()
                    .types
                    .insert(declared.name.clone(), declared);
                return;
            }
        }

        if let Some(last) = self.stacks.last() {
            last.borrow_mut()
                .types
                .insert(declared.name.clone(), declared);
        }
    }

    pub fn get_declared_type(&self, name: impl ToString) -> Option<DeclaredType> {
        let name = name.to_string();
        self.stacks
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().types.get(&name).cloned())
    }

    pub fn add_function(&mut self, declared: DeclaredFunction) -> Result<(), DuplicateSymbol> {
        let Some(last) = self.stacks.last() else {
            unreachable!("trying to add function {} in empty scope", declared.name);
        };

        if last.borrow().functions.contains_key(&declared.name) {
            return Err(DuplicateSymbol {
                name: declared.name,
            });
        }

        last.borrow_mut()
            .functions
            .insert(declared.name.clone(), declared);

        Ok(())
    }

    /// Late binding for function declarations: the shallow pass reserves a
    /// prototype slot which the deep pass replaces once the body has been
    /// checked.
    pub fn override_function(&mut self, declared: DeclaredFunction) {
        for frame in self.stacks.iter().rev() {
            if frame.borrow().functions.contains_key(&declared.name) {
                frame
                    .borrow_mut()
                    .functions
                    .insert(declared.name.clone(), declared);
                return;
            }
        }

        if let Some(last) = self.stacks.last() {
            last.borrow_mut()
                .functions
                .insert(declared.name.clone(), declared);
        }
    }

    pub fn get_function(&self, name: impl ToString) -> Option<DeclaredFunction> {
        let name = name.to_string();
        self.stacks
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().functions.get(&name).cloned())
    }

    pub fn add_ffi(&mut self, declared: DeclaredFfi) -> Result<(), DuplicateSymbol> {
        let Some(last) = self.stacks.last() else {
            unreachable!("trying to add namespace {} in empty scope", declared.name);
        };

        if last.borrow().ffis.contains_key(&declared.name) {
            return Err(DuplicateSymbol {
                name: declared.name,
            });
        }

        last.borrow_mut().ffis.insert(declared.name.clone(), declared);

        Ok(())
    }

    pub fn get_ffi(&self, name: impl ToString) -> Option<DeclaredFfi> {
        let name = name.to_string();
        self.stacks
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().ffis.get(&name).cloned())
    }

    /// Deep clone for a generic instantiation. Pattern-created bindings are
    /// left out: the cloned body's pattern nodes bind fresh symbols when
    /// they are re-inferred.
    pub fn clone_for_instantiation(&self) -> Scope {
        let stacks = self
            .stacks
            .iter()
            .map(|frame| {
                let frame = frame.borrow();
                let cloned = Frame {
                    variables: frame
                        .variables
                        .iter()
                        .filter(|(_, v)| !v.from_pattern)
                        .map(|(name, v)| (name.clone(), v.clone()))
                        .collect(),
                    constants: frame.constants.clone(),
                    types: frame.types.clone(),
                    functions: frame.functions.clone(),
                    ffis: frame.ffis.clone(),
                };
                Rc::new(RefCell::new(cloned))
            })
            .collect();

        Scope { stacks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typechecker::types::BasicType;

    fn slot(ty: Type) -> Rc<RefCell<Option<Type>>> {
        Rc::new(RefCell::new(Some(ty)))
    }

    #[test]
    fn test_add_and_resolve() {
        let mut scope = Scope::new();
        scope
            .add_variable("foo", slot(Type::Basic(BasicType::I64)), false)
            .expect("adding failed");

        assert_eq!(
            scope.resolve_name("foo"),
            Some(slot(Type::Basic(BasicType::I64)))
        );
    }

    #[test]
    fn test_duplicate_in_same_frame_fails() {
        let mut scope = Scope::new();
        scope
            .add_variable("foo", slot(Type::Boolean), false)
            .expect("adding failed");

        assert!(scope
            .add_variable("foo", slot(Type::Boolean), false)
            .is_err());
    }

    #[test]
    fn test_shadowing_in_inner_frame() {
        let mut scope = Scope::new();
        scope
            .add_variable("foo", slot(Type::Boolean), false)
            .expect("adding failed");

        scope.enter_scope();
        scope
            .add_variable("foo", slot(Type::Void), false)
            .expect("shadowing in an inner frame is allowed");

        assert_eq!(scope.resolve_name("foo"), Some(slot(Type::Void)));

        scope.exit_scope();
        assert_eq!(scope.resolve_name("foo"), Some(slot(Type::Boolean)));
    }

    #[test]
    fn test_constant_shadowing_rejected() {
        let mut scope = Scope::new();
        scope
            .add_constant("foo", Type::Boolean)
            .expect("adding failed");

        assert!(scope.add_variable("foo", slot(Type::Void), false).is_err());
    }

    #[test]
    fn test_instantiation_clone_omits_pattern_bindings() {
        let mut scope = Scope::new();
        scope
            .add_variable("plain", slot(Type::Boolean), false)
            .expect("adding failed");
        scope
            .add_pattern_variable("bound", slot(Type::Boolean))
            .expect("adding failed");

        let cloned = scope.clone_for_instantiation();
        assert!(cloned.resolve_name("plain").is_some());
        assert!(cloned.resolve_name("bound").is_none());
    }
}
