use importguard_core::LayoutSegment;

/// The house import layout: module imports (when the host has them),
/// `java`, `javax`, everything else, a blank line, then static imports.
pub fn canonical_layout(module_imports_supported: bool) -> Vec<LayoutSegment> {
    let mut layout = Vec::with_capacity(6);
    if module_imports_supported {
        layout.push(LayoutSegment::ModuleImports);
    }
    layout.extend([
        LayoutSegment::package("java"),
        LayoutSegment::package("javax"),
        LayoutSegment::AllOtherImports,
        LayoutSegment::BlankLine,
        LayoutSegment::AllOtherStaticImports,
    ]);
    layout
}

/// First two non-module groups are `java.**` then `javax.**`
pub fn starts_with_java_then_javax(layout: &[LayoutSegment]) -> bool {
    let mut groups = layout.iter().filter(|s| !s.is_module_imports());

    let first = groups.next();
    let second = groups.next();

    match (first, second) {
        (Some(first), Some(second)) => first.is_package_tree("java") && second.is_package_tree("javax"),
        _ => false,
    }
}

pub fn module_imports_lead(layout: &[LayoutSegment]) -> bool {
    layout.first().map_or(false, LayoutSegment::is_module_imports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_layout_shape() {
        let without = canonical_layout(false);
        assert_eq!(without.len(), 5);
        assert!(without[0].is_package_tree("java"));
        assert_eq!(without[4], LayoutSegment::AllOtherStaticImports);

        let with = canonical_layout(true);
        assert_eq!(with.len(), 6);
        assert!(with[0].is_module_imports());
        assert_eq!(&with[1..], without.as_slice());
    }

    #[test]
    fn test_canonical_layout_satisfies_both_checks() {
        for supported in [true, false] {
            let layout = canonical_layout(supported);
            assert!(starts_with_java_then_javax(&layout));
            assert_eq!(module_imports_lead(&layout), supported);
        }
    }

    #[test]
    fn test_swapped_java_javax_fails() {
        let layout = vec![
            LayoutSegment::package("javax"),
            LayoutSegment::package("java"),
            LayoutSegment::AllOtherImports,
            LayoutSegment::BlankLine,
            LayoutSegment::AllOtherStaticImports,
        ];
        assert!(!starts_with_java_then_javax(&layout));
    }

    #[test]
    fn test_module_group_is_skipped_anywhere() {
        let layout = vec![
            LayoutSegment::package("java"),
            LayoutSegment::ModuleImports,
            LayoutSegment::package("javax"),
        ];
        assert!(starts_with_java_then_javax(&layout));
        assert!(!module_imports_lead(&layout));
    }

    #[test]
    fn test_static_java_group_does_not_count() {
        let layout = vec![LayoutSegment::static_package("java"), LayoutSegment::package("javax")];
        assert!(!starts_with_java_then_javax(&layout));
    }

    #[test]
    fn test_short_layouts_fail() {
        assert!(!starts_with_java_then_javax(&[]));
        assert!(!starts_with_java_then_javax(&[LayoutSegment::package("java")]));
        assert!(!module_imports_lead(&[]));
    }
}
