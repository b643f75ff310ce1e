//! Name allocation for compiled code.
//!
//! Scopes form a tree stored in an arena. A name reserved in a scope is
//! visible to all its descendants, so children never shadow a parent's
//! names.
use super::ir::ExprType;
use smol_str::SmolStr;
use std::collections::HashMap;

pub type ScopeId = usize;

/// Facts recorded against a reserved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// Type of the value the name holds.
    ExprType(ExprType),
    /// Type a function name returns.
    ReturnType(ExprType),
    /// The name holds this external argument.
    ExternalArg(SmolStr),
}

#[derive(Debug, Default)]
struct ScopeData {
    parent: Option<ScopeId>,
    names: HashMap<String, Vec<Property>>,
    /// Names with an assignment in this scope.
    assigned: Vec<String>,
    /// Next suffix per sanitized request.
    counters: HashMap<String, usize>,
}

#[rustfmt::skip]
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
    "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop",
    "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self",
    "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Arena of scopes.
#[derive(Debug)]
pub struct Scopes {
    scopes: Vec<ScopeData>,
}

impl Scopes {
    /// Arena holding only the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData::default()],
        }
    }

    #[inline]
    pub fn root(&self) -> ScopeId {
        0
    }

    pub fn child(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(ScopeData {
            parent: Some(parent),
            ..ScopeData::default()
        });
        self.scopes.len() - 1
    }

    /// The scope followed by its ancestors.
    fn chain(&self, scope: ScopeId) -> impl Iterator<Item = &ScopeData> {
        let mut next = Some(scope);
        std::iter::from_fn(move || {
            let data = &self.scopes[next?];
            next = data.parent;
            Some(data)
        })
    }

    pub fn is_name_in_use(&self, scope: ScopeId, name: &str) -> bool {
        self.chain(scope).any(|data| data.names.contains_key(name))
    }

    /// Reserves a unique name derived from `requested`.
    ///
    /// The request is sanitized first. Clashes get a numeric suffix,
    /// starting at 2.
    pub fn reserve_name(&mut self, scope: ScopeId, requested: &str, properties: Vec<Property>) -> String {
        let base = sanitize(requested);
        let mut counter = self.scopes[scope].counters.get(&base).copied().unwrap_or(1);
        let mut name = if counter == 1 {
            base.clone()
        } else {
            format!("{}{}", base, counter)
        };

        while self.is_name_in_use(scope, &name) {
            counter += 1;
            name = format!("{}{}", base, counter);
        }

        let data = &mut self.scopes[scope];
        data.counters.insert(base, counter);
        data.names.insert(name.clone(), properties);
        name
    }

    /// Reserves a name as is. Returns `false` if it is already taken.
    pub fn reserve_exact(&mut self, scope: ScopeId, name: &str) -> bool {
        if self.is_name_in_use(scope, name) {
            return false;
        }
        self.scopes[scope].names.insert(name.to_string(), Vec::new());
        true
    }

    pub fn properties(&self, scope: ScopeId, name: &str) -> Option<&[Property]> {
        self.chain(scope)
            .find_map(|data| data.names.get(name))
            .map(Vec::as_slice)
    }

    pub fn set_property(&mut self, scope: ScopeId, name: &str, property: Property) {
        let owner = self.owner(scope, name);
        if let Some(properties) = owner.and_then(|id| self.scopes[id].names.get_mut(name)) {
            properties.retain(|p| std::mem::discriminant(p) != std::mem::discriminant(&property));
            properties.push(property);
        }
    }

    /// Scope that reserved `name`, as seen from `scope`.
    pub fn owner(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut next = Some(scope);
        while let Some(id) = next {
            if self.scopes[id].names.contains_key(name) {
                return Some(id);
            }
            next = self.scopes[id].parent;
        }
        None
    }

    /// Names visible from `scope` with a property matching the predicate.
    pub fn find_names_by_property<F>(&self, scope: ScopeId, predicate: F) -> Vec<&str>
    where
        F: Fn(&Property) -> bool,
    {
        let mut names: Vec<&str> = self
            .chain(scope)
            .flat_map(|data| data.names.iter())
            .filter(|(_, properties)| properties.iter().any(&predicate))
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn register_assignment(&mut self, scope: ScopeId, name: &str) {
        let assigned = &mut self.scopes[scope].assigned;
        if !assigned.iter().any(|n| n == name) {
            assigned.push(name.to_string());
        }
    }

    /// Whether `name` is assigned in `scope` or an ancestor.
    pub fn has_assignment(&self, scope: ScopeId, name: &str) -> bool {
        self.chain(scope)
            .any(|data| data.assigned.iter().any(|n| n == name))
    }
}

impl Default for Scopes {
    #[inline]
    fn default() -> Self {
        Scopes::new()
    }
}

/// Turns an arbitrary string into a usable identifier.
pub fn sanitize(requested: &str) -> String {
    let mut name: String = requested
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect();

    if name.chars().next().map_or(true, |ch| ch.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if KEYWORDS.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

/// Whether `name` can be used as an identifier unchanged.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && sanitize(name) == name
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("hello-world"), "hello_world");
        assert_eq!(sanitize("foo.title"), "foo_title");
        assert_eq!(sanitize("1st"), "_1st");
        assert_eq!(sanitize("fn"), "fn_");
        assert_eq!(sanitize(""), "_");
        assert!(is_valid_identifier("minimumFractionDigits"));
        assert!(!is_valid_identifier("with-hyphen"));
        assert!(!is_valid_identifier("match"));
    }

    #[test]
    fn test_reserve_suffix() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        assert_eq!(scopes.reserve_name(root, "foo-bar", vec![]), "foo_bar");
        assert_eq!(scopes.reserve_name(root, "foo.bar", vec![]), "foo_bar2");
        assert_eq!(scopes.reserve_name(root, "foo_bar", vec![]), "foo_bar3");

        let child = scopes.child(root);
        assert_eq!(scopes.reserve_name(child, "foo_bar", vec![]), "foo_bar4");
        assert!(!scopes.reserve_exact(child, "foo_bar2"));
    }

    #[test]
    fn test_siblings_share_names() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        let a = scopes.child(root);
        let b = scopes.child(root);
        assert_eq!(scopes.reserve_name(a, "_ret", vec![]), "_ret");
        assert_eq!(scopes.reserve_name(b, "_ret", vec![]), "_ret");
    }

    #[test]
    fn test_properties() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        let func = scopes.child(root);
        let name = scopes.reserve_name(
            func,
            "count",
            vec![Property::ExternalArg("count".into()), Property::ExprType(ExprType::Unknown)],
        );
        let inner = scopes.child(func);

        let found = scopes.find_names_by_property(inner, |p| *p == Property::ExternalArg("count".into()));
        assert_eq!(found, vec![name.as_str()]);

        scopes.set_property(inner, &name, Property::ExprType(ExprType::Number));
        assert_eq!(
            scopes.properties(inner, &name),
            Some(&[Property::ExternalArg("count".into()), Property::ExprType(ExprType::Number)][..])
        );

        assert!(!scopes.has_assignment(inner, &name));
        scopes.register_assignment(func, &name);
        assert!(scopes.has_assignment(inner, &name));
        assert!(!scopes.has_assignment(root, &name));
    }
}
