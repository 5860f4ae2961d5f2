use pretty_assertions::assert_eq;
use prim_tree::prelude::*;
use prim_tree::{classify, AttributeMeta};
use stage::{
    AttributeInfo, EditableSceneGraph, InMemoryStage, PrimMetadata, PrimPath, PrimSpec,
    SceneGraph, StageEdit, Value, VariantSetSpec,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn path(s: &str) -> PrimPath {
    PrimPath::new(s).unwrap()
}

/// world/
///   geo/            Xform, xformOp:translate
///     mesh          Mesh, custom foo, payload (loaded) with detail
///   lookdev/        Scope, variant set shading = red | blue
///   _class          abstract, never listed
fn shot_stage() -> InMemoryStage {
    let mesh = PrimSpec::new("mesh", "Mesh")
        .with_attribute(AttributeInfo::new("foo", "string", Value::String("bar".into())).custom())
        .with_payload(true, vec![PrimSpec::new("detail", "Mesh")]);
    let geo = PrimSpec::new("geo", "Xform")
        .with_attribute(AttributeInfo::new(
            "xformOp:translate",
            "double3",
            Value::Vec3([0.0, 1.0, 0.0]),
        ))
        .with_child(mesh);
    let lookdev = PrimSpec::new("lookdev", "Scope").with_variant_set(
        VariantSetSpec::new("shading")
            .with_variant("red", vec![PrimSpec::new("redMat", "Material")])
            .with_variant("blue", vec![PrimSpec::new("blueMat", "Material")]),
    );
    let class = PrimSpec::new("_class", "Xform").abstract_prim();

    InMemoryStage::new(
        "shot.json",
        PrimSpec::new("world", "Xform")
            .with_kind("assembly")
            .with_child(geo)
            .with_child(lookdev)
            .with_child(class),
    )
}

fn names(model: &TreeModel, indices: &[TreeIndex]) -> Vec<String> {
    indices
        .iter()
        .map(|&i| model.node(i).unwrap().name.clone())
        .collect()
}

fn record_events(model: &mut TreeModel) -> Rc<RefCell<Vec<ModelEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    model.subscribe(move |event: &ModelEvent| sink.borrow_mut().push(*event));
    events
}

/// Counts calls into the wrapped stage
struct CountingStage {
    inner: InMemoryStage,
    children_calls: Cell<usize>,
}

impl CountingStage {
    fn new(inner: InMemoryStage) -> Self {
        Self {
            inner,
            children_calls: Cell::new(0),
        }
    }
}

impl SceneGraph for CountingStage {
    fn identifier(&self) -> &str {
        self.inner.identifier()
    }

    fn root(&self) -> anyhow::Result<PrimPath> {
        self.inner.root()
    }

    fn children(&self, path: &PrimPath) -> anyhow::Result<Option<Vec<PrimPath>>> {
        self.children_calls.set(self.children_calls.get() + 1);
        self.inner.children(path)
    }

    fn attributes(&self, path: &PrimPath) -> anyhow::Result<Option<Vec<AttributeInfo>>> {
        self.inner.attributes(path)
    }

    fn metadata(&self, path: &PrimPath) -> anyhow::Result<Option<PrimMetadata>> {
        self.inner.metadata(path)
    }
}

#[test]
fn test_geo_mesh_scenario() {
    let stage = InMemoryStage::new(
        "scenario",
        PrimSpec::new("world", "Xform").with_child(
            PrimSpec::new("geo", "Xform")
                .with_attribute(AttributeInfo::new(
                    "xformOp:translate",
                    "double3",
                    Value::Vec3([0.0; 3]),
                ))
                .with_child(PrimSpec::new("mesh", "Mesh").with_attribute(
                    AttributeInfo::new("foo", "string", Value::String("bar".into())).custom(),
                )),
        ),
    );
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();

    let top = model.expand(&stage, root).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(model.path(top[0]).unwrap(), &path("/world/geo"));

    let geo_children = model.expand(&stage, top[0]).unwrap();
    assert_eq!(geo_children.len(), 1);
    assert_eq!(model.path(geo_children[0]).unwrap(), &path("/world/geo/mesh"));

    let adapter = SceneNodeAdapter::new(&stage);
    let geo_attributes = adapter.attributes(&path("/world/geo")).unwrap();
    assert_eq!(
        classify(&AttributeMeta::from(&geo_attributes[0])),
        ColorClass::Transform
    );
    let mesh_attributes = adapter.attributes(&path("/world/geo/mesh")).unwrap();
    assert_eq!(
        classify(&AttributeMeta::from(&mesh_attributes[0])),
        ColorClass::Custom
    );

    // Row tags follow the strongest attribute
    assert_eq!(model.node(top[0]).unwrap().tag, ColorClass::Transform);
    assert_eq!(model.node(geo_children[0]).unwrap().tag, ColorClass::Custom);
}

#[test]
fn test_payload_unload_stales_descendants() {
    let mut stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();

    let top = model.expand(&stage, root).unwrap();
    let geo = top[0];
    let lookdev = top[1];
    let mesh = model.expand(&stage, geo).unwrap()[0];
    let detail = model.expand(&stage, mesh).unwrap()[0];
    assert_eq!(model.node(detail).unwrap().name, "detail");

    let edit = StageEdit::UnloadPayload {
        path: path("/world/geo/mesh"),
    };
    stage.apply(&edit).unwrap();
    model.invalidate(geo).unwrap();

    // Old descendants are stale on every query
    assert_eq!(model.node(mesh), Err(TreeError::StaleIndex(mesh)));
    assert_eq!(model.parent(mesh), Err(TreeError::StaleIndex(mesh)));
    assert_eq!(model.row(detail), Err(TreeError::StaleIndex(detail)));
    assert!(matches!(
        model.expand(&stage, mesh),
        Err(TreeError::StaleIndex(_))
    ));
    assert!(matches!(
        model.row_count(&stage, detail),
        Err(TreeError::StaleIndex(_))
    ));

    // The invalidated row, its siblings and ancestors survive
    assert!(model.is_valid(geo));
    assert!(model.is_valid(lookdev));
    assert!(model.is_valid(root));

    let mesh_again = model.expand(&stage, geo).unwrap()[0];
    assert_ne!(mesh_again, mesh);
    assert_eq!(model.expand(&stage, mesh_again).unwrap(), Vec::<TreeIndex>::new());
    assert!(!model.node(mesh_again).unwrap().payload_loaded);

    // Recover by path
    assert_eq!(
        model
            .index_for_path(&stage, &path("/world/geo/mesh"))
            .unwrap(),
        mesh_again
    );
}

#[test]
fn test_resolve_missing_path() {
    let stage = shot_stage();
    let adapter = SceneNodeAdapter::new(&stage);
    assert_eq!(
        adapter.resolve(&path("/does/not/exist")),
        Err(TreeError::NotFound(path("/does/not/exist")))
    );
}

#[test]
fn test_expand_is_idempotent() {
    let stage = CountingStage::new(shot_stage());
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();

    let first = model.expand(&stage, root).unwrap();
    let calls = stage.children_calls.get();
    let second = model.expand(&stage, root).unwrap();

    assert_eq!(first, second);
    assert_eq!(stage.children_calls.get(), calls);

    // row_count and indexed lookups read the same cache
    assert_eq!(model.row_count(&stage, root).unwrap(), first.len());
    assert_eq!(stage.children_calls.get(), calls);
    for (row, &child) in first.iter().enumerate() {
        assert_eq!(model.index(&stage, root, row).unwrap(), Some(child));
        assert_eq!(model.row(child).unwrap(), row);
    }
    assert_eq!(model.index(&stage, root, first.len()).unwrap(), None);
}

#[test]
fn test_row_count_materialises_once() {
    let stage = CountingStage::new(shot_stage());
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();

    let before = stage.children_calls.get();
    assert_eq!(model.row_count(&stage, root).unwrap(), 2);
    let after_count = stage.children_calls.get();
    assert!(after_count > before);

    assert_eq!(model.expand(&stage, root).unwrap().len(), 2);
    assert_eq!(stage.children_calls.get(), after_count);
}

#[test]
fn test_abstract_prims_are_skipped() {
    let stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();

    let top = model.expand(&stage, root).unwrap();
    assert_eq!(names(&model, &top), vec!["geo", "lookdev"]);
}

#[test]
fn test_has_children_does_not_materialise() {
    let stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();

    let geo = model.expand(&stage, root).unwrap()[0];
    assert!(model.has_children(&stage, geo).unwrap());
    assert!(!model.is_loaded(geo));
    assert_eq!(model.node_count(), 3);
}

#[test]
fn test_invalidate_scope() {
    let stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();

    let top = model.expand(&stage, root).unwrap();
    let (geo, lookdev) = (top[0], top[1]);
    let mesh = model.expand(&stage, geo).unwrap()[0];
    let red = model.expand(&stage, lookdev).unwrap()[0];

    model.invalidate(lookdev).unwrap();

    assert!(!model.is_valid(red));
    assert!(!model.is_loaded(lookdev));
    for index in [root, geo, lookdev, mesh] {
        assert!(model.is_valid(index), "{} should survive", index);
    }
    assert!(model.is_loaded(geo));

    // Invalidating an unexpanded row is a no-op
    model.invalidate(mesh).unwrap();
    assert!(model.is_valid(mesh));
}

#[test]
fn test_invalidate_root_keeps_root() {
    let stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let top = model.expand(&stage, root).unwrap();

    model.invalidate_root().unwrap();

    assert!(model.is_valid(root));
    assert!(top.iter().all(|&i| !model.is_valid(i)));
    assert_eq!(model.node_count(), 1);
}

#[test]
fn test_invalidate_events() {
    let stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let events = record_events(&mut model);

    // First fetch is silent
    model.expand(&stage, root).unwrap();
    assert!(events.borrow().is_empty());

    model.invalidate(root).unwrap();
    assert_eq!(
        *events.borrow(),
        vec![
            ModelEvent::RowsAboutToBeRemoved {
                parent: root,
                first: 0,
                last: 1,
            },
            ModelEvent::RowsRemoved {
                parent: root,
                first: 0,
                last: 1,
            },
        ]
    );
}

#[test]
fn test_events_delivered_before_return() {
    let stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let geo = model.expand(&stage, root).unwrap()[0];
    let mesh = model.expand(&stage, geo).unwrap()[0];

    let seen = Rc::new(Cell::new(0));
    let counter = Rc::clone(&seen);
    model.subscribe(move |event: &ModelEvent| {
        if let ModelEvent::RowsAboutToBeRemoved { parent, .. } = event {
            assert_eq!(*parent, geo);
            counter.set(counter.get() + 1);
        }
    });

    model.invalidate(geo).unwrap();
    assert_eq!(seen.get(), 1);
    assert!(!model.is_valid(mesh));
}

#[test]
fn test_refresh_events_and_restore() {
    let mut stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let geo = model.expand(&stage, root).unwrap()[0];
    let mesh = model.expand(&stage, geo).unwrap()[0];
    model.expand(&stage, mesh).unwrap();
    let events = record_events(&mut model);

    stage
        .apply(&StageEdit::UnloadPayload {
            path: path("/world/geo/mesh"),
        })
        .unwrap();
    model.refresh(&stage, geo).unwrap();

    let mesh_again = model.index_for_path(&stage, &path("/world/geo/mesh")).unwrap();
    // mesh had been expanded, so it is fetched again
    assert!(model.is_loaded(mesh_again));
    assert_eq!(model.row_count(&stage, mesh_again).unwrap(), 0);

    assert_eq!(
        *events.borrow(),
        vec![
            ModelEvent::RowsAboutToBeRemoved {
                parent: geo,
                first: 0,
                last: 0,
            },
            ModelEvent::RowsRemoved {
                parent: geo,
                first: 0,
                last: 0,
            },
            ModelEvent::DataChanged { index: geo },
            ModelEvent::RowsAboutToBeInserted {
                parent: geo,
                first: 0,
                last: 0,
            },
            ModelEvent::RowsInserted {
                parent: geo,
                first: 0,
                last: 0,
            },
        ]
    );
}

#[test]
fn test_notify_payload_unload() {
    let mut stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let geo = model.expand(&stage, root).unwrap()[0];
    let mesh = model.expand(&stage, geo).unwrap()[0];
    let detail = model.expand(&stage, mesh).unwrap()[0];

    let edit = StageEdit::UnloadPayload {
        path: path("/world/geo/mesh"),
    };
    stage.apply(&edit).unwrap();
    model.notify_edit(&stage, &edit).unwrap();

    assert!(model.is_valid(geo));
    assert!(!model.is_valid(mesh));
    assert!(!model.is_valid(detail));

    let mesh_again = model.index(&stage, geo, 0).unwrap().unwrap();
    assert_eq!(model.row_count(&stage, mesh_again).unwrap(), 0);

    // Loading it back brings detail back under the restored expansion
    let edit = StageEdit::LoadPayload {
        path: path("/world/geo/mesh"),
    };
    stage.apply(&edit).unwrap();
    model.notify_edit(&stage, &edit).unwrap();

    let mesh_loaded = model.index_for_path(&stage, &path("/world/geo/mesh")).unwrap();
    assert!(model.is_loaded(mesh_loaded));
    let children = model.expand(&stage, mesh_loaded).unwrap();
    assert_eq!(names(&model, &children), vec!["detail"]);
}

#[test]
fn test_notify_variant_switch() {
    let mut stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let lookdev = model.expand(&stage, root).unwrap()[1];
    let materials = model.expand(&stage, lookdev).unwrap();
    assert_eq!(names(&model, &materials), vec!["redMat"]);

    let edit = StageEdit::SelectVariant {
        path: path("/world/lookdev"),
        set: "shading".into(),
        variant: "blue".into(),
    };
    stage.apply(&edit).unwrap();
    model.notify_edit(&stage, &edit).unwrap();

    assert!(model.is_valid(root));
    assert!(!model.is_valid(materials[0]));

    let lookdev = model.index_for_path(&stage, &path("/world/lookdev")).unwrap();
    assert!(model.is_loaded(lookdev));
    assert_eq!(model.node(lookdev).unwrap().variant_summary(), "shading: blue");
    let materials = model.expand(&stage, lookdev).unwrap();
    assert_eq!(names(&model, &materials), vec!["blueMat"]);
}

#[test]
fn test_notify_property_edit_updates_in_place() {
    let mut stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let top = model.expand(&stage, root).unwrap();
    let lookdev = top[1];
    let events = record_events(&mut model);

    assert_eq!(model.node(lookdev).unwrap().tag, ColorClass::Default);

    let edit = StageEdit::AddAttribute {
        path: path("/world/lookdev"),
        name: "notes".into(),
        value: "todo".into(),
    };
    stage.apply(&edit).unwrap();
    model.notify_edit(&stage, &edit).unwrap();

    assert!(model.is_valid(lookdev));
    assert_eq!(model.node(lookdev).unwrap().tag, ColorClass::Custom);
    assert_eq!(
        *events.borrow(),
        vec![ModelEvent::DataChanged { index: lookdev }]
    );
    assert!(top.iter().all(|&i| model.is_valid(i)));
}

#[test]
fn test_notify_edit_on_unmaterialised_prim() {
    let mut stage = shot_stage();
    let mut model = TreeModel::new();
    model.bind_stage(&stage).unwrap();
    let events = record_events(&mut model);

    let edit = StageEdit::SetKind {
        path: path("/world/geo/mesh"),
        kind: "component".into(),
    };
    stage.apply(&edit).unwrap();
    model.notify_edit(&stage, &edit).unwrap();

    assert!(events.borrow().is_empty());
    assert_eq!(model.node_count(), 1);
}

#[test]
fn test_selection_and_expansion_survive_refresh() {
    let mut stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let geo = model.expand(&stage, root).unwrap()[0];
    let mesh = model.expand(&stage, geo).unwrap()[0];

    model.set_expanded(geo, true).unwrap();
    model.select(mesh).unwrap();
    model.select(mesh).unwrap();
    assert_eq!(model.selection(), vec![mesh]);

    let edit = StageEdit::UnloadPayload {
        path: path("/world/geo/mesh"),
    };
    stage.apply(&edit).unwrap();
    model.notify_edit(&stage, &edit).unwrap();

    let mesh_again = model.index_for_path(&stage, &path("/world/geo/mesh")).unwrap();
    assert_eq!(model.selection(), vec![mesh_again]);
    assert_eq!(model.selected_paths(), &[path("/world/geo/mesh")]);
    assert!(model.is_expanded(geo).unwrap());
    assert!(!model.is_expanded(mesh_again).unwrap());

    model.clear_selection();
    assert!(model.selection().is_empty());
}

#[test]
fn test_swapped_stage() {
    let stage = shot_stage();
    let other = InMemoryStage::new("other.json", PrimSpec::new("root", "Xform"));
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let top = model.expand(&stage, root).unwrap();
    let events = record_events(&mut model);

    assert!(matches!(
        model.expand(&other, root),
        Err(TreeError::StageUnavailable(_))
    ));

    let other_root = model.bind_stage(&other).unwrap();
    assert_eq!(*events.borrow(), vec![ModelEvent::Reset]);
    assert_eq!(model.bound_identifier(), Some("other.json"));
    assert!(top.iter().all(|&i| !model.is_valid(i)));
    assert_eq!(model.node(other_root).unwrap().name, "root");
}

#[test]
fn test_closed_stage() {
    let mut stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();

    stage.close();
    assert!(matches!(
        model.expand(&stage, root),
        Err(TreeError::StageUnavailable(_))
    ));
    // Cached data is still readable
    assert_eq!(model.node(root).unwrap().name, "world");

    let mut fresh = TreeModel::new();
    assert!(matches!(
        fresh.bind_stage(&stage),
        Err(TreeError::StageUnavailable(_))
    ));
    assert!(!fresh.is_bound());
}

#[test]
fn test_failed_refresh_keeps_cache() {
    let mut stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let geo = model.expand(&stage, root).unwrap()[0];
    let mesh = model.expand(&stage, geo).unwrap()[0];
    let count = model.node_count();
    let events = record_events(&mut model);

    stage.close();
    assert!(matches!(
        model.refresh(&stage, geo),
        Err(TreeError::StageUnavailable(_))
    ));

    assert!(model.is_loaded(geo));
    assert!(model.is_valid(mesh));
    assert_eq!(model.node_count(), count);
    assert_eq!(*events.borrow(), vec![]);
}

#[test]
fn test_colliding_child_names_give_one_row() {
    let stage = InMemoryStage::new(
        "collide",
        PrimSpec::new("world", "Xform")
            .with_child(PrimSpec::new("geo", "Xform"))
            .with_variant_set(VariantSetSpec::new("lod").with_variant(
                "high",
                vec![PrimSpec::new("geo", "Mesh"), PrimSpec::new("extra", "Mesh")],
            )),
    );
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();

    let children = model.expand(&stage, root).unwrap();
    assert_eq!(names(&model, &children), vec!["geo", "extra"]);
    assert_eq!(model.row_count(&stage, root).unwrap(), 2);
    assert_eq!(model.node_count(), 3);
    assert_eq!(model.node(children[0]).unwrap().type_name, "Xform");
    assert_eq!(
        model.index_for_path(&stage, &path("/world/geo")).unwrap(),
        children[0]
    );
}

#[test]
fn test_unbound_model() {
    let stage = shot_stage();
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    model.unbind();

    assert!(matches!(
        model.expand(&stage, root),
        Err(TreeError::StageUnavailable(_))
    ));
    assert!(matches!(
        model.invalidate_root(),
        Err(TreeError::StageUnavailable(_))
    ));
}

#[test]
fn test_data_roles() {
    let stage = InMemoryStage::new(
        "roles",
        PrimSpec::new("world", "Xform")
            .with_kind("assembly")
            .with_child(PrimSpec::new("hidden", "Mesh").inactive())
            .with_child(
                PrimSpec::new("asset", "Xform")
                    .with_payload(false, vec![])
                    .with_variant_set(VariantSetSpec::new("lod").with_variant("high", vec![])),
            ),
    );
    let mut model = TreeModel::new();
    let root = model.bind_stage(&stage).unwrap();
    let top = model.expand(&stage, root).unwrap();
    let (hidden, asset) = (top[0], top[1]);

    assert_eq!(model.column_count(), 6);
    assert_eq!(model.header(Column::Name), "Prim Name");

    let text = |index, column| match model.data(index, column, Role::Display).unwrap() {
        Some(CellValue::Text(text)) => text,
        other => panic!("unexpected cell {:?}", other),
    };
    assert_eq!(text(root, Column::Kind), "assembly");
    assert_eq!(text(asset, Column::Payload), "Yes");
    assert_eq!(text(hidden, Column::Payload), "No");
    assert_eq!(text(asset, Column::VariantSets), "lod: high");
    assert_eq!(text(hidden, Column::Type), "Mesh");

    assert_eq!(
        model.data(hidden, Column::Name, Role::Foreground).unwrap(),
        Some(CellValue::Color([150, 150, 150]))
    );
    assert_eq!(
        model.data(hidden, Column::Name, Role::Background).unwrap(),
        Some(CellValue::Color([200, 200, 200]))
    );
    assert_eq!(model.data(asset, Column::Name, Role::Background).unwrap(), None);
    assert_eq!(
        model.data(asset, Column::Name, Role::Path).unwrap(),
        Some(CellValue::Text("/world/asset".into()))
    );
}
