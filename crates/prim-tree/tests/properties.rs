use prim_tree::prelude::*;
use prim_tree::{classify, AttributeMeta};
use proptest::prelude::*;
use proptest::sample::Index;
use stage::{InMemoryStage, PrimSpec};

/// Random prim hierarchies with unique sibling names
fn prim_hierarchy() -> impl Strategy<Value = PrimSpec> {
    let leaf = Just(PrimSpec::new("leaf", "Mesh"));
    leaf.prop_recursive(4, 40, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|children| {
            children
                .into_iter()
                .enumerate()
                .fold(PrimSpec::new("group", "Xform"), |parent, (i, mut child)| {
                    child.name = format!("{}{}", child.name, i);
                    parent.with_child(child)
                })
        })
    })
}

fn stage_from(mut root: PrimSpec) -> InMemoryStage {
    root.name = "world".into();
    InMemoryStage::new("proptest", root)
}

/// Expand every row, returning all indices in fetch order
fn expand_all(model: &mut TreeModel, stage: &InMemoryStage) -> Vec<TreeIndex> {
    let root = model.root().unwrap();
    let mut all = vec![root];
    let mut pending = vec![root];
    while let Some(index) = pending.pop() {
        let children = model.expand(stage, index).unwrap();
        all.extend(&children);
        pending.extend(children);
    }
    all
}

fn attribute_meta() -> impl Strategy<Value = AttributeMeta> {
    let name = prop_oneof![
        "[a-z]{1,8}",
        "[a-z]{1,8}".prop_map(|s| format!("xformOp:{}", s)),
        "[a-z]{1,8}".prop_map(|s| format!("primvars:{}", s)),
    ];
    let type_name = prop_oneof![
        Just("token".to_string()),
        Just("double3".to_string()),
        Just("float".to_string()),
        Just("string".to_string()),
    ];
    (name, any::<bool>(), type_name, any::<bool>()).prop_map(
        |(name, custom, type_name, time_sampled)| AttributeMeta {
            name,
            custom,
            type_name,
            time_sampled,
        },
    )
}

proptest! {
    #[test]
    fn expand_agrees_with_row_count_and_index(root in prim_hierarchy()) {
        let stage = stage_from(root);
        let mut model = TreeModel::new();
        model.bind_stage(&stage).unwrap();

        for index in expand_all(&mut model, &stage) {
            let children = model.expand(&stage, index).unwrap();
            prop_assert_eq!(model.row_count(&stage, index).unwrap(), children.len());
            for (row, child) in children.iter().enumerate() {
                prop_assert_eq!(model.index(&stage, index, row).unwrap(), Some(*child));
                prop_assert_eq!(model.parent(*child).unwrap(), Some(index));
            }
            prop_assert_eq!(model.has_children(&stage, index).unwrap(), !children.is_empty());
        }
    }

    #[test]
    fn invalidate_is_scoped_to_the_subtree(root in prim_hierarchy(), pick in any::<Index>()) {
        let stage = stage_from(root);
        let mut model = TreeModel::new();
        model.bind_stage(&stage).unwrap();

        let all = expand_all(&mut model, &stage);
        let rows: Vec<_> = all
            .iter()
            .map(|&index| (index, model.path(index).unwrap().clone()))
            .collect();
        let (target, target_path) = rows[pick.index(rows.len())].clone();

        model.invalidate(target).unwrap();

        for (index, path) in &rows {
            let inside = path.has_prefix(&target_path) && *path != target_path;
            prop_assert_eq!(model.is_valid(*index), !inside, "{}", path);
        }
    }

    #[test]
    fn classify_is_pure_and_total(meta in attribute_meta()) {
        let class = classify(&meta);
        prop_assert_eq!(class, classify(&meta.clone()));
        prop_assert!(ColorClass::PRECEDENCE.contains(&class));
        if meta.custom {
            prop_assert_eq!(class, ColorClass::Custom);
        }
    }
}
