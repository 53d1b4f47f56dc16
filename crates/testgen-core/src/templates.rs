//! Text bodies for every generated artifact.
//!
//! Each function is pure: descriptor in, file contents out.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::types::{ClassDescriptor, HeaderDescriptor, MethodDescriptor};

/// Written once at the top of a build list when the file is created.
pub const BUILD_LIST_PREAMBLE: &str = "\
# Unit-test build list maintained by testgen.
# add_subdirectory() lines are appended as test directories are generated.
";

/// Parameters of a leaf unit-test `CMakeLists.txt`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildListParams {
    /// CMake target name, e.g. "tests_ut_fs2"
    pub test_name: String,
    /// Compiled files of the test directory itself, by file name.
    pub unit_tests: Vec<String>,
    /// Project-relative sources under test.
    pub sources: Vec<PathBuf>,
    /// Project-relative include directories.
    pub include_dirs: Vec<PathBuf>,
    /// Subdirectories already declared in the file being replaced.
    pub subdirectories: Vec<String>,
}

pub fn interface_header(header: &HeaderDescriptor) -> String {
    let mut out = generated_banner(header);
    out.push_str("#pragma once\n");

    if !header.includes.is_empty() {
        out.push('\n');
        for include in &header.includes {
            out.push_str(&format!("#include {include}\n"));
        }
    }

    for class in top_level_classes(header) {
        out.push('\n');
        out.push_str(&open_namespaces(class));
        out.push_str(&format!("class {}\n{{\npublic:\n", class.name));
        if class.virtual_methods().next().is_some() {
            out.push_str(&format!("    virtual ~{}() = default;\n", class.name));
        }
        for method in &class.methods {
            out.push_str(&format!("    {};\n", interface_declaration(method)));
        }
        out.push_str("};\n");
        out.push_str(&close_namespaces(class));
    }

    out
}

pub fn mock_header(header: &HeaderDescriptor) -> String {
    let mut out = generated_banner(header);
    out.push_str("#pragma once\n\n#include <gmock/gmock.h>\n\n");
    out.push_str(&format!("#include \"{}\"\n", header.name));

    for class in top_level_classes(header) {
        let has_virtual = class.virtual_methods().next().is_some();
        out.push('\n');
        out.push_str(&open_namespaces(class));
        out.push_str(&format!(
            "class {} : public {}\n{{\npublic:\n",
            class.mock_name, class.name
        ));
        out.push_str(&format!("    {}();\n", class.mock_name));
        if has_virtual {
            out.push_str(&format!("    ~{}() override;\n", class.mock_name));
        } else {
            out.push_str(&format!("    ~{}();\n", class.mock_name));
        }
        if has_virtual {
            out.push('\n');
        }
        for method in class.virtual_methods() {
            out.push_str(&format!("    {};\n", mock_method(method)));
        }
        out.push_str("};\n");
        out.push_str(&close_namespaces(class));
    }

    out
}

pub fn mock_source(header: &HeaderDescriptor) -> String {
    let mut out = generated_banner(header);
    out.push_str(&format!("#include \"mock_{}\"\n", header.name));

    let classes: Vec<&ClassDescriptor> = top_level_classes(header).collect();
    let needs_type_traits = classes
        .iter()
        .flat_map(|c| c.non_virtual_methods())
        .any(returns_reference);
    if needs_type_traits {
        out.push_str("\n#include <type_traits>\n");
    }

    for class in classes {
        out.push('\n');
        out.push_str(&open_namespaces(class));
        out.push_str(&format!(
            "{mock}::{mock}() = default;\n{mock}::~{mock}() = default;\n",
            mock = class.mock_name
        ));
        for method in class.non_virtual_methods() {
            out.push('\n');
            out.push_str(&stub_definition(class, method));
        }
        out.push_str(&close_namespaces(class));
    }

    out
}

pub fn unit_test(header: &HeaderDescriptor, include: &str) -> String {
    let mut out = generated_banner(header);
    out.push_str("#include <gtest/gtest.h>\n\n");
    out.push_str(&format!("#include <{include}>\n"));

    if header.classes.is_empty() {
        let suite = format!("{}Test", pascal_case(header.stem()));
        out.push_str(&placeholder_test(&suite, &header.name));
        return out;
    }

    for class in &header.classes {
        let suite = format!(
            "{}Test",
            class
                .outer_classes
                .iter()
                .chain(std::iter::once(&class.name))
                .map(String::as_str)
                .collect::<String>()
        );
        let qualified = class.qualified_name();

        if class.methods.is_empty() {
            out.push_str(&placeholder_test(&suite, &qualified));
            continue;
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        for method in &class.methods {
            let base = pascal_case(&method.name);
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let test_name = if *count == 1 {
                base
            } else {
                format!("{base}{count}")
            };
            out.push_str(&format!("\nTEST({suite}, {test_name})\n{{\n"));
            out.push_str(&format!(
                "    GTEST_SKIP() << \"no test written for {qualified}::{}({}) yet\";\n}}\n",
                method.name,
                method.arg_types()
            ));
        }
    }

    out
}

pub fn test_build_list(params: &BuildListParams) -> String {
    let mut out = String::from(BUILD_LIST_PREAMBLE);
    out.push_str("# This file is regenerated on every unit-test generation for its directory.\n\n");
    out.push_str(&format!("set(UT_NAME {})\n\n", params.test_name));

    out.push_str("add_executable(${UT_NAME}\n");
    for file in &params.unit_tests {
        out.push_str(&format!("    {file}\n"));
    }
    for source in &params.sources {
        out.push_str(&format!("    ${{CMAKE_SOURCE_DIR}}/{}\n", slash_path(source)));
    }
    out.push_str(")\n\n");

    if !params.include_dirs.is_empty() {
        out.push_str("target_include_directories(${UT_NAME} PRIVATE\n");
        for dir in &params.include_dirs {
            out.push_str(&format!("    ${{CMAKE_SOURCE_DIR}}/{}\n", slash_path(dir)));
        }
        out.push_str(")\n\n");
    }

    out.push_str("target_link_libraries(${UT_NAME} PRIVATE GTest::gtest_main GTest::gmock)\n\n");
    out.push_str("gtest_discover_tests(${UT_NAME})\n");

    if !params.subdirectories.is_empty() {
        out.push('\n');
        for subdir in &params.subdirectories {
            out.push_str(&format!("add_subdirectory({subdir})\n"));
        }
    }

    out
}

fn placeholder_test(suite: &str, subject: &str) -> String {
    format!(
        "\nTEST({suite}, Placeholder)\n{{\n    \
         GTEST_SKIP() << \"no tests written for {subject} yet\";\n}}\n"
    )
}

fn generated_banner(header: &HeaderDescriptor) -> String {
    format!("// Generated by testgen from {}.\n\n", header.name)
}

/// Nested classes are declared by their parent and get no artifacts of
/// their own.
fn top_level_classes(header: &HeaderDescriptor) -> impl Iterator<Item = &ClassDescriptor> {
    header.classes.iter().filter(|c| !c.is_nested())
}

fn open_namespaces(class: &ClassDescriptor) -> String {
    let mut out = String::new();
    for ns in &class.namespaces {
        out.push_str(&format!("namespace {ns} {{\n"));
    }
    if !class.namespaces.is_empty() {
        out.push('\n');
    }
    out
}

fn close_namespaces(class: &ClassDescriptor) -> String {
    let mut out = String::new();
    if !class.namespaces.is_empty() {
        out.push('\n');
    }
    for ns in class.namespaces.iter().rev() {
        out.push_str(&format!("}}  // namespace {ns}\n"));
    }
    out
}

/// Virtual methods are declared pure: the mock overrides every one of them,
/// and the mirrored class never gets an out-of-line key function.
fn interface_declaration(method: &MethodDescriptor) -> String {
    let const_kw = if method.is_const() { " const" } else { "" };
    let declaration = format!(
        "{} {}({}){const_kw}",
        method.return_type,
        method.name,
        method.typed_args()
    );
    if method.is_virtual() {
        format!("virtual {declaration} = 0")
    } else {
        declaration
    }
}

/// `MOCK_METHOD(int, get, (int), (override, const))`
fn mock_method(method: &MethodDescriptor) -> String {
    let arg_types = method
        .effective_arguments()
        .iter()
        .map(|a| protect_commas(&a.data_type))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "MOCK_METHOD({}, {}, ({arg_types}), ({}))",
        protect_commas(&method.return_type),
        method.name,
        method.specifier_list()
    )
}

/// Out-of-line definition for a non-virtual method, returning a
/// value-initialised result.
fn stub_definition(class: &ClassDescriptor, method: &MethodDescriptor) -> String {
    let const_kw = if method.is_const() { " const" } else { "" };
    let mut out = format!(
        "{} {}::{}({}){const_kw}\n{{\n",
        method.return_type,
        class.name,
        method.name,
        method.typed_args()
    );
    if returns_reference(method) {
        out.push_str(&format!(
            "    static std::decay_t<{}> stub{{}};\n    return stub;\n",
            method.return_type
        ));
    } else if !method.returns_void() {
        out.push_str("    return {};\n");
    }
    out.push_str("}\n");
    out
}

fn returns_reference(method: &MethodDescriptor) -> bool {
    method.return_type.trim_end().ends_with('&')
}

/// Macro arguments containing commas must be parenthesised.
fn protect_commas(ty: &str) -> String {
    if ty.contains(',') {
        format!("({ty})")
    } else {
        ty.to_string()
    }
}

fn pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c == '.')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn slash_path(path: &std::path::Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
