use anyhow::Result;
use stage::{
    AttributeInfo, InMemoryStage, PrimPath, PrimPurpose, PrimSpec, SceneGraph, Value,
    VariantSetSpec,
};
use std::env;

fn main() -> Result<()> {
    // Write to shot.json if no path provided
    let path = env::args().nth(1).unwrap_or_else(|| "shot.json".to_string());

    let mesh = PrimSpec::new("mesh", "Mesh")
        .with_kind("component")
        .with_attribute(AttributeInfo::new("foo", "string", Value::String("bar".into())).custom())
        .with_attribute(
            AttributeInfo::new("radius", "double", Value::Float(1.0))
                .with_sample(1.0, Value::Float(1.0))
                .with_sample(24.0, Value::Float(2.5)),
        )
        .with_attribute(AttributeInfo::new(
            "primvars:displayColor",
            "color3f",
            Value::Vec3([1.0, 0.0, 0.0]),
        ))
        .with_payload(true, vec![PrimSpec::new("detail", "Mesh")]);
    let geo = PrimSpec::new("geo", "Xform")
        .with_attribute(AttributeInfo::new(
            "xformOp:translate",
            "double3",
            Value::Vec3([0.0, 1.0, 0.0]),
        ))
        .with_child(mesh)
        .with_child(
            PrimSpec::new("proxy", "Mesh")
                .with_purpose(PrimPurpose::Proxy)
                .inactive(),
        );
    let lookdev = PrimSpec::new("lookdev", "Scope").with_variant_set(
        VariantSetSpec::new("shading")
            .with_variant("red", vec![PrimSpec::new("redMat", "Material")])
            .with_variant("blue", vec![PrimSpec::new("blueMat", "Material")]),
    );
    let root = PrimSpec::new("world", "Xform")
        .with_kind("assembly")
        .with_child(geo)
        .with_child(lookdev)
        .with_child(PrimSpec::new("_baseClass", "Xform").abstract_prim());

    let stage = InMemoryStage::new(path.clone(), root);
    stage.save(&path)?;
    println!("Wrote stage to: {}", path);

    // Read it back
    let stage = InMemoryStage::open(&path)?;
    let root = stage.root()?;
    println!("\nChildren of {}:", root);
    for child in stage.children(&root)?.unwrap_or_default() {
        println!("  {}", child);
    }

    let mesh = PrimPath::new("/world/geo/mesh")?;
    println!("\nAttributes of {}:", mesh);
    for attribute in stage.attributes(&mesh)?.unwrap_or_default() {
        println!("  {} ({})", attribute.name, attribute.type_name);
    }

    Ok(())
}
