//! The immutable command table the interpreter dispatches through.

use crate::builtin::{self, BuiltinCommand, Cat, Cd, Echo, Exit, Pwd, Type};
use crate::command::{BuiltinHandler, Command};
use crate::env::Environment;
use crate::external::find_command_path;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// External utilities whose arguments are independent operands.
pub const DEFAULT_PER_OPERAND: &[&str] = &["cat", "head", "tail", "wc"];

/// Builtin handlers by name, plus the external commands that run once per
/// operand.
///
/// Built once at startup and handed to the [`Interpreter`](crate::Interpreter);
/// nothing mutates it afterwards.
///
/// ```
/// use minishell::Registry;
/// let registry = Registry::default();
/// assert!(registry.is_builtin("cd"));
/// assert!(registry.is_per_operand("head"));
/// ```
#[derive(Clone)]
pub struct Registry {
    builtins: BTreeMap<&'static str, BuiltinHandler>,
    per_operand: BTreeSet<String>,
}

impl Registry {
    /// An empty registry: no builtins, every command is external and runs once.
    pub fn new() -> Self {
        Self {
            builtins: BTreeMap::new(),
            per_operand: BTreeSet::new(),
        }
    }

    pub fn register<T: BuiltinCommand>(mut self) -> Self {
        self.builtins
            .insert(T::name(), builtin::invoke::<T> as BuiltinHandler);
        self
    }

    pub fn with_per_operand<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.per_operand.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    pub fn is_per_operand(&self, name: &str) -> bool {
        self.per_operand.contains(name)
    }

    pub fn builtin_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builtins.keys().copied()
    }

    /// Resolves `name` to a builtin first, then to an executable on the
    /// environment's search path.
    pub fn resolve(&self, name: &str, env: &Environment) -> Option<Command> {
        if let Some(handler) = self.builtins.get(name) {
            return Some(Command::Builtin(*handler));
        }
        find_command_path(&env.search_path(), Path::new(name)).map(Command::External)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("builtins", &self.builtins.keys().collect::<Vec<_>>())
            .field("per_operand", &self.per_operand)
            .finish()
    }
}

impl Default for Registry {
    /// The shell's startup configuration:
    /// - built-ins: `cd`, `echo`, `exit`, `pwd`, `type`, `cat`
    /// - per-operand externals: `cat`, `head`, `tail`, `wc`
    fn default() -> Self {
        Registry::new()
            .register::<Cd>()
            .register::<Echo>()
            .register::<Exit>()
            .register::<Pwd>()
            .register::<Type>()
            .register::<Cat>()
            .with_per_operand(DEFAULT_PER_OPERAND.iter().copied())
    }
}
