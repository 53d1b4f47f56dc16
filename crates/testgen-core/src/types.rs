use serde::{Deserialize, Serialize};
use std::fmt;

/// Extracted summary of a single C++ header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDescriptor {
    /// File name of the header, e.g. "foo.h"
    pub name: String,
    pub namespaces: Vec<NamespaceDescriptor>,
    pub classes: Vec<ClassDescriptor>,
    pub includes: Vec<IncludeDescriptor>,
}

impl HeaderDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
            classes: Vec::new(),
            includes: Vec::new(),
        }
    }

    /// File name without its extension: "foo.h" -> "foo"
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

/// A namespace declared directly in the header. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDescriptor {
    pub name: String,
}

/// A class definition and its public methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    pub mock_name: String,
    /// Enclosing namespaces, outermost first.
    pub namespaces: Vec<String>,
    /// Enclosing classes for nested definitions, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outer_classes: Vec<String>,
    pub methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>, namespaces: Vec<String>) -> Self {
        let name = name.into();
        Self {
            mock_name: format!("Mock{name}"),
            name,
            namespaces,
            outer_classes: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn nested_in(mut self, outer_classes: Vec<String>) -> Self {
        self.outer_classes = outer_classes;
        self
    }

    pub fn is_nested(&self) -> bool {
        !self.outer_classes.is_empty()
    }

    /// Fully qualified name, e.g. "demo::Foo".
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = self.namespaces.iter().map(String::as_str).collect();
        parts.extend(self.outer_classes.iter().map(String::as_str));
        parts.push(&self.name);
        parts.join("::")
    }

    /// Qualified name of the generated mock, placed in the class's namespace.
    pub fn qualified_mock_name(&self) -> String {
        let mut parts: Vec<&str> = self.namespaces.iter().map(String::as_str).collect();
        parts.push(&self.mock_name);
        parts.join("::")
    }

    pub fn virtual_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter().filter(|m| m.is_virtual())
    }

    pub fn non_virtual_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter().filter(|m| !m.is_virtual())
    }
}

/// Method specifier recorded on a public method.
///
/// Ordered so that a sorted specifier list always reads `override, const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specifier {
    Override,
    Const,
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specifier::Override => write!(f, "override"),
            Specifier::Const => write!(f, "const"),
        }
    }
}

/// A public method of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub return_type: String,
    pub specifiers: Vec<Specifier>,
    pub arguments: Vec<ArgumentDescriptor>,
}

impl MethodDescriptor {
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        mut specifiers: Vec<Specifier>,
        arguments: Vec<ArgumentDescriptor>,
    ) -> Self {
        specifiers.sort();
        specifiers.dedup();
        Self {
            name: name.into(),
            return_type: return_type.into(),
            specifiers,
            arguments,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.specifiers.contains(&Specifier::Override)
    }

    pub fn is_const(&self) -> bool {
        self.specifiers.contains(&Specifier::Const)
    }

    pub fn returns_void(&self) -> bool {
        self.return_type == "void"
    }

    /// Arguments as they should be rendered. A lone `void` parameter is a
    /// C-style placeholder for "no arguments" and yields an empty slice.
    pub fn effective_arguments(&self) -> &[ArgumentDescriptor] {
        match self.arguments.as_slice() {
            [only] if only.is_void() => &self.arguments[..0],
            args => args,
        }
    }

    /// "int x, const std::string& name"
    pub fn typed_args(&self) -> String {
        self.effective_arguments()
            .iter()
            .map(|a| {
                if a.name.is_empty() {
                    a.data_type.clone()
                } else {
                    format!("{} {}", a.data_type, a.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// "int, const std::string&"
    pub fn arg_types(&self) -> String {
        self.effective_arguments()
            .iter()
            .map(|a| a.data_type.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// "x, name"
    pub fn arg_names(&self) -> String {
        self.effective_arguments()
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// "override, const"
    pub fn specifier_list(&self) -> String {
        self.specifiers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A method parameter. `name` is empty for unnamed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub data_type: String,
}

impl ArgumentDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    pub fn is_void(&self) -> bool {
        self.data_type == "void" && self.name.is_empty()
    }
}

/// An `#include` directive of the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeDescriptor {
    /// Path as written, without delimiters.
    pub name: String,
    /// `<...>` rather than `"..."`
    pub system: bool,
}

impl fmt::Display for IncludeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.system {
            write!(f, "<{}>", self.name)
        } else {
            write!(f, "\"{}\"", self.name)
        }
    }
}
