use std::path::Path;

use tracing::{debug, info};
use tree_sitter::{Language, Node, Parser};

use testgen_core::error::{GenError, Result};
use testgen_core::extractor::DeclarationExtractor;
use testgen_core::types::*;

/// C++ declaration extractor using tree-sitter.
///
/// Each header is parsed on its own; includes are never expanded, so every
/// declaration found belongs to the file being described.
pub struct CppExtractor {
    language: Language,
}

impl CppExtractor {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

impl Default for CppExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationExtractor for CppExtractor {
    fn language(&self) -> &'static str {
        "cpp"
    }

    fn extract_source(&self, path: &Path, source: &str) -> Result<HeaderDescriptor> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| GenError::Parse {
                path: path.to_path_buf(),
                message: format!("failed to set C++ language: {e}"),
            })?;
        let tree = parser.parse(source, None).ok_or_else(|| GenError::Parse {
            path: path.to_path_buf(),
            message: "parser produced no syntax tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            info!(
                path = %path.display(),
                "header did not parse cleanly, keeping recoverable declarations"
            );
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut walker = Walker {
            source,
            header: HeaderDescriptor::new(name),
            namespaces: Vec::new(),
            outer_classes: Vec::new(),
        };
        walker.visit(root);

        debug!(
            path = %path.display(),
            classes = walker.header.classes.len(),
            includes = walker.header.includes.len(),
            "extracted declarations"
        );
        Ok(walker.header)
    }
}

/// Node categories the walker cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Namespace,
    Class,
    Method,
    Include,
    Other,
}

impl NodeKind {
    fn of(node: Node) -> Self {
        match node.kind() {
            "namespace_definition" => NodeKind::Namespace,
            "class_specifier" | "struct_specifier" => NodeKind::Class,
            "field_declaration" | "function_definition" | "declaration" => NodeKind::Method,
            "preproc_include" => NodeKind::Include,
            _ => NodeKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    fn parse(text: &str) -> Self {
        match text.trim().trim_end_matches(':').trim() {
            "public" => Access::Public,
            "protected" => Access::Protected,
            _ => Access::Private,
        }
    }
}

/// Pre-order walk that accumulates a header descriptor.
struct Walker<'s> {
    source: &'s str,
    header: HeaderDescriptor,
    namespaces: Vec<String>,
    outer_classes: Vec<String>,
}

impl<'s> Walker<'s> {
    fn visit(&mut self, node: Node) {
        match NodeKind::of(node) {
            NodeKind::Namespace => self.visit_namespace(node),
            NodeKind::Class => self.visit_class(node),
            NodeKind::Include => self.visit_include(node),
            // Methods are collected by their class; only look for type
            // definitions nested in the declaration, not in function bodies.
            NodeKind::Method => {
                for child in named_children(node) {
                    if child.kind() != "compound_statement" {
                        self.visit(child);
                    }
                }
            }
            NodeKind::Other => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        for child in named_children(node) {
            self.visit(child);
        }
    }

    fn visit_namespace(&mut self, node: Node) {
        let names = node
            .child_by_field_name("name")
            .map(|n| namespace_names(n, self.source))
            .unwrap_or_default();
        for name in &names {
            self.header.namespaces.push(NamespaceDescriptor { name: name.clone() });
        }

        let depth = self.namespaces.len();
        self.namespaces.extend(names);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body);
        }
        self.namespaces.truncate(depth);
    }

    fn visit_class(&mut self, node: Node) {
        if node
            .parent()
            .is_some_and(|p| p.kind() == "template_declaration")
        {
            return;
        }
        // Forward declaration
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        // Specialisations and out-of-line qualified definitions
        if name_node.kind() != "type_identifier" {
            return;
        }

        let name = text(name_node, self.source).to_string();
        let mut class = ClassDescriptor::new(name.clone(), self.namespaces.clone())
            .nested_in(self.outer_classes.clone());
        let default_access = if node.kind() == "class_specifier" {
            Access::Private
        } else {
            Access::Public
        };
        class.methods = self.public_methods(body, default_access);
        self.header.classes.push(class);

        self.outer_classes.push(name);
        self.visit_children(body);
        self.outer_classes.pop();
    }

    fn public_methods(&self, body: Node, default_access: Access) -> Vec<MethodDescriptor> {
        let mut access = default_access;
        let mut methods = Vec::new();
        for member in named_children(body) {
            if member.kind() == "access_specifier" {
                access = Access::parse(text(member, self.source));
                continue;
            }
            if access == Access::Public && NodeKind::of(member) == NodeKind::Method {
                if let Some(method) = self.method(member) {
                    methods.push(method);
                }
            }
        }
        methods
    }

    /// Describe a member declaration or inline definition. Fields,
    /// constructors, destructors and operators yield `None`.
    fn method(&self, node: Node) -> Option<MethodDescriptor> {
        let type_node = node.child_by_field_name("type")?;
        let declarator = peel_declarator(node.child_by_field_name("declarator")?, self.source);
        let func = declarator.inner?;
        if func.kind() != "function_declarator" {
            return None;
        }
        let name_node = func.child_by_field_name("declarator")?;
        if !matches!(name_node.kind(), "field_identifier" | "identifier") {
            return None;
        }

        let trailing = find_child(func, "trailing_return_type").and_then(|t| t.named_child(0));
        let return_type = match trailing {
            Some(trailing) => normalize(text(trailing, self.source)),
            None => spell_type(node, type_node, &declarator.suffix, self.source),
        };

        let is_virtual = has_child_kind(
            node,
            &["virtual", "virtual_function_specifier", "virtual_specifier"],
        ) || has_child_kind(func, &["virtual_specifier"]);
        let is_const = named_children(func)
            .into_iter()
            .any(|c| c.kind() == "type_qualifier" && text(c, self.source) == "const");

        let mut specifiers = Vec::new();
        if is_virtual {
            specifiers.push(Specifier::Override);
        }
        if is_const {
            specifiers.push(Specifier::Const);
        }

        let arguments = func
            .child_by_field_name("parameters")
            .map(|params| self.arguments(params))
            .unwrap_or_default();

        Some(MethodDescriptor::new(
            text(name_node, self.source),
            return_type,
            specifiers,
            arguments,
        ))
    }

    fn arguments(&self, params: Node) -> Vec<ArgumentDescriptor> {
        named_children(params)
            .into_iter()
            .filter_map(|param| match param.kind() {
                "parameter_declaration" | "optional_parameter_declaration" => self.argument(param),
                "variadic_parameter" | "variadic_parameter_declaration" => Some(
                    ArgumentDescriptor::new("", normalize(text(param, self.source))),
                ),
                _ => None,
            })
            .collect()
    }

    fn argument(&self, param: Node) -> Option<ArgumentDescriptor> {
        let type_node = param.child_by_field_name("type")?;
        let Some(declarator) = param.child_by_field_name("declarator") else {
            return Some(ArgumentDescriptor::new(
                "",
                spell_type(param, type_node, "", self.source),
            ));
        };

        let peeled = peel_declarator(declarator, self.source);
        match peeled.inner {
            None => Some(ArgumentDescriptor::new(
                "",
                spell_type(param, type_node, &peeled.suffix, self.source),
            )),
            Some(inner) if inner.kind() == "identifier" => Some(ArgumentDescriptor::new(
                text(inner, self.source),
                spell_type(param, type_node, &peeled.suffix, self.source),
            )),
            // Function pointers and the like keep their full spelling.
            Some(_) => Some(ArgumentDescriptor::new(
                "",
                normalize(text(param, self.source)),
            )),
        }
    }

    fn visit_include(&mut self, node: Node) {
        let Some(path) = node.child_by_field_name("path") else {
            return;
        };
        let raw = text(path, self.source).trim();
        let include = match path.kind() {
            "system_lib_string" => IncludeDescriptor {
                name: raw.trim_start_matches('<').trim_end_matches('>').to_string(),
                system: true,
            },
            _ => IncludeDescriptor {
                name: raw.trim_matches('"').to_string(),
                system: false,
            },
        };
        self.header.includes.push(include);
    }
}

/// Innermost declarator after stripping pointer, reference and array
/// wrappers, plus the type suffix those wrappers spell.
struct Peeled<'t> {
    inner: Option<Node<'t>>,
    suffix: String,
}

fn peel_declarator<'t>(node: Node<'t>, source: &str) -> Peeled<'t> {
    let mut current = Some(node);
    let mut suffix = String::new();

    while let Some(n) = current {
        match n.kind() {
            "pointer_declarator" | "abstract_pointer_declarator" => {
                suffix.push('*');
                for q in named_children(n) {
                    if q.kind() == "type_qualifier" {
                        suffix.push(' ');
                        suffix.push_str(text(q, source));
                    }
                }
                current = n.child_by_field_name("declarator");
            }
            "reference_declarator" | "abstract_reference_declarator" => {
                let op = n.child(0).map(|c| c.kind()).unwrap_or("&");
                suffix.push_str(op);
                current = n.named_child(0);
            }
            "array_declarator" | "abstract_array_declarator" => {
                let size = n
                    .child_by_field_name("size")
                    .map(|s| text(s, source))
                    .unwrap_or("");
                suffix.push_str(&format!("[{size}]"));
                current = n.child_by_field_name("declarator");
            }
            _ => break,
        }
    }

    Peeled {
        inner: current,
        suffix,
    }
}

/// "const" + "std::string" + "&" -> "const std::string&"
fn spell_type(decl: Node, type_node: Node, suffix: &str, source: &str) -> String {
    let mut parts: Vec<String> = named_children(decl)
        .into_iter()
        .filter(|c| c.kind() == "type_qualifier")
        .map(|c| text(c, source))
        .filter(|q| matches!(*q, "const" | "volatile"))
        .map(str::to_string)
        .collect();
    parts.push(normalize(text(type_node, source)));
    let mut spelled = parts.join(" ");
    spelled.push_str(suffix);
    spelled
}

/// `a` or `a::b::c`; empty for anything else.
fn namespace_names(node: Node, source: &str) -> Vec<String> {
    match node.kind() {
        "namespace_identifier" => vec![text(node, source).to_string()],
        "nested_namespace_specifier" => named_children(node)
            .into_iter()
            .flat_map(|c| namespace_names(c, source))
            .collect(),
        _ => Vec::new(),
    }
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn find_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn has_child_kind(node: Node, kinds: &[&str]) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| kinds.contains(&c.kind()));
    found
}

/// Extract text from a tree-sitter node.
fn text<'s>(node: Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

/// Collapse runs of whitespace so multi-line spellings render on one line.
fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn extract(source: &str) -> HeaderDescriptor {
        CppExtractor::new()
            .extract_source(&PathBuf::from("src/foo.h"), source)
            .unwrap()
    }

    fn class<'h>(header: &'h HeaderDescriptor, name: &str) -> &'h ClassDescriptor {
        header
            .classes
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("class {name} not found in {:?}", header.classes))
    }

    fn method_names(class: &ClassDescriptor) -> Vec<&str> {
        class.methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_simple_namespaced_class() {
        let header = extract("namespace demo { class Foo { public: int bar(int x); }; }");

        assert_eq!(header.name, "foo.h");
        assert_eq!(
            header.namespaces,
            vec![NamespaceDescriptor {
                name: "demo".into()
            }]
        );
        assert_eq!(header.classes.len(), 1);
        let foo = &header.classes[0];
        assert_eq!(foo.qualified_name(), "demo::Foo");
        assert_eq!(foo.mock_name, "MockFoo");
        assert_eq!(
            foo.methods,
            vec![MethodDescriptor::new(
                "bar",
                "int",
                vec![],
                vec![ArgumentDescriptor::new("x", "int")]
            )]
        );
    }

    #[test]
    fn test_only_public_methods_are_kept() {
        let header = extract(
            r#"
class Widget {
    int hidden();
public:
    Widget();
    ~Widget();
    void draw() const;
    bool operator==(const Widget& other) const;
protected:
    void helper();
private:
    void secret();
public:
    static int count();
    int width;
};
"#,
        );

        assert_eq!(method_names(class(&header, "Widget")), vec!["draw", "count"]);
    }

    #[test]
    fn test_struct_members_default_to_public() {
        let header = extract("struct Point { int x() const; private: int y(); };");
        assert_eq!(method_names(class(&header, "Point")), vec!["x"]);
    }

    #[test]
    fn test_specifiers() {
        let header = extract(
            r#"
class Shape {
public:
    int area() const;
    virtual void draw();
    virtual double perimeter() const = 0;
    void resize(int w) override;
    int plain();
};
"#,
        );
        let shape = class(&header, "Shape");
        let specs: Vec<(&str, Vec<Specifier>)> = shape
            .methods
            .iter()
            .map(|m| (m.name.as_str(), m.specifiers.clone()))
            .collect();

        assert_eq!(
            specs,
            vec![
                ("area", vec![Specifier::Const]),
                ("draw", vec![Specifier::Override]),
                ("perimeter", vec![Specifier::Override, Specifier::Const]),
                ("resize", vec![Specifier::Override]),
                ("plain", vec![]),
            ]
        );
    }

    #[test]
    fn test_void_argument() {
        let header = extract("class Runner { public: int run(void); };");
        let run = &class(&header, "Runner").methods[0];
        assert_eq!(run.arguments, vec![ArgumentDescriptor::new("", "void")]);
        assert!(run.effective_arguments().is_empty());
        assert_eq!(run.typed_args(), "");
    }

    #[test]
    fn test_type_spellings() {
        let header = extract(
            r#"
#include <map>
#include <string>
class Store {
public:
    const std::string& name() const;
    char* buffer();
    std::vector<int> values(const std::map<int, int>& m, int*, unsigned long n);
};
"#,
        );
        let store = class(&header, "Store");

        assert_eq!(store.methods[0].return_type, "const std::string&");
        assert_eq!(store.methods[1].return_type, "char*");
        assert_eq!(store.methods[2].return_type, "std::vector<int>");
        assert_eq!(
            store.methods[2].arguments,
            vec![
                ArgumentDescriptor::new("m", "const std::map<int, int>&"),
                ArgumentDescriptor::new("", "int*"),
                ArgumentDescriptor::new("n", "unsigned long"),
            ]
        );
    }

    #[test]
    fn test_inline_definitions_are_methods() {
        let header = extract(
            "class Counter { public: int get() const { return n_; } private: int n_; };",
        );
        let counter = class(&header, "Counter");
        assert_eq!(method_names(counter), vec!["get"]);
        assert_eq!(counter.methods[0].specifiers, vec![Specifier::Const]);
    }

    #[test]
    fn test_includes() {
        let header = extract("#include <vector>\n#include \"drivers/uart.h\"\n");
        assert_eq!(
            header.includes,
            vec![
                IncludeDescriptor {
                    name: "vector".into(),
                    system: true
                },
                IncludeDescriptor {
                    name: "drivers/uart.h".into(),
                    system: false
                },
            ]
        );
    }

    #[test]
    fn test_header_guard_is_transparent() {
        let header = extract(
            r#"
#ifndef FOO_H
#define FOO_H

namespace demo {
class Foo {
public:
    void run();
};
}

#endif
"#,
        );
        assert_eq!(class(&header, "Foo").qualified_name(), "demo::Foo");
    }

    #[test]
    fn test_nested_and_anonymous_namespaces() {
        let header = extract(
            r#"
namespace a::b { class C { public: void f(); }; }
namespace { class Hidden { public: void g(); }; }
"#,
        );
        let names: Vec<&str> = header.namespaces.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(class(&header, "C").qualified_name(), "a::b::C");
        assert_eq!(class(&header, "Hidden").qualified_name(), "Hidden");
    }

    #[test]
    fn test_forward_declarations_and_templates_are_skipped() {
        let header = extract(
            r#"
class Fwd;
template <typename T>
class Box { public: T get(); };
class Real { public: void go(); };
"#,
        );
        let names: Vec<&str> = header.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Real"]);
    }

    #[test]
    fn test_nested_classes_follow_their_parent() {
        let header = extract(
            r#"
class Tree {
public:
    class Node {
    public:
        int value() const;
    };
    void insert(int v);
};
"#,
        );
        let names: Vec<&str> = header.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Tree", "Node"]);
        assert_eq!(method_names(class(&header, "Tree")), vec!["insert"]);
        let node = class(&header, "Node");
        assert!(node.is_nested());
        assert_eq!(node.qualified_name(), "Tree::Node");
    }

    #[test]
    fn test_partial_parse_keeps_recoverable_declarations() {
        let header = extract(
            r#"
class Fine { public: void run(); };
int oops = ;
"#,
        );
        assert_eq!(method_names(class(&header, "Fine")), vec!["run"]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let source = r#"
namespace n {
class A { public: void a1(); void a2(int); };
class B { public: virtual int b() const; };
}
"#;
        assert_eq!(extract(source), extract(source));
        let header = extract(source);
        let names: Vec<&str> = header.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_unreadable_file_is_io_error() {
        let err = CppExtractor::new()
            .extract(Path::new("/nonexistent/testgen/missing.h"))
            .unwrap_err();
        assert!(matches!(err, GenError::Io { .. }));
    }
}
