use std::{collections::HashMap, rc::Rc, time::Instant};

use tracing::{debug, trace};

use crate::{
    ast::ast::Node, errors::errors::Error, lexer::lexer::tokenize, parser::parser::parse,
};

use super::{
    scope::{ScopeId, Symbol},
    type_checker::analyze,
};

/// Source of the `io` module, shipped with the compiler.
pub const IO_SOURCE: &str = include_str!("../../std/io.sp");

/// An analyzed builtin module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    pub name: String,
    pub root: Node,
    members: HashMap<String, Symbol>,
}

impl ModuleInfo {
    pub fn member(&self, name: &str) -> Option<&Symbol> {
        self.members.get(name)
    }

    pub fn member_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.members.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Cache of compiled builtin modules.
///
/// Each module is parsed and analyzed the first time it is imported and shared
/// afterwards. The cache belongs to whoever drives compilation, so separate
/// owners never see each other's state.
#[derive(Debug, Default)]
pub struct BuiltinModules {
    cache: HashMap<String, Rc<ModuleInfo>>,
    compilations: usize,
}

impl BuiltinModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(name: &str) -> Option<&'static str> {
        match name {
            "io" => Some(IO_SOURCE),
            _ => None,
        }
    }

    /// Returns the module named `name`, compiling it on first use.
    ///
    /// `Ok(None)` means there is no such builtin module.
    pub fn load(&mut self, name: &str) -> Result<Option<Rc<ModuleInfo>>, Error> {
        if let Some(module) = self.cache.get(name) {
            trace!(module = name, "builtin module cache hit");
            return Ok(Some(Rc::clone(module)));
        }

        let Some(source) = Self::source(name) else {
            return Ok(None);
        };

        let start = Instant::now();
        let root = parse(tokenize(source.to_string())?)?;
        // Builtin modules do not import anything themselves
        let annotated = analyze(root, &mut BuiltinModules::new())?;

        let members = annotated
            .symbols
            .scope(ScopeId(0))
            .symbols()
            .iter()
            .filter(|symbol| !symbol.is_builtin())
            .map(|symbol| (symbol.name.clone(), symbol.clone()))
            .collect();

        let module = Rc::new(ModuleInfo {
            name: name.to_string(),
            root: annotated.root,
            members,
        });

        self.compilations += 1;
        debug!(module = name, elapsed = ?start.elapsed(), "compiled builtin module");

        self.cache.insert(name.to_string(), Rc::clone(&module));
        Ok(Some(module))
    }

    /// How many modules were actually compiled rather than served from cache.
    pub fn compilations(&self) -> usize {
        self.compilations
    }
}
