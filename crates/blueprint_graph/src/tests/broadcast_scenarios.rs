//! Broadcast views over a four-legged model built from one leg template

use crate::catalog::{BODY, GEOM, JOINT, SITE, WORLD};
use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;
use crate::graph::{AttachOptions, Graph};
use crate::lattice::Lattice;
use crate::value::Value;
use crate::view::{Index, Outcome, Selection};

/// World holding a torso with four copies of a leg
fn create_test_quadruped() -> (Graph, NodeId, NodeId) {
    let mut graph = Graph::with_standard_kinds(GraphConfig::default()).unwrap();
    let world = graph.create(WORLD, Some("world")).unwrap();
    let torso = graph.create(BODY, Some("torso")).unwrap();

    let leg = graph.create(BODY, Some("leg")).unwrap();
    let hip = graph.create(JOINT, Some("hip")).unwrap();
    let thigh = graph.create(GEOM, Some("thigh")).unwrap();
    let foot = graph.create(SITE, Some("foot")).unwrap();
    graph.attach(leg, [hip, thigh, foot], AttachOptions::moving()).unwrap();

    let offsets = [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];
    for (x, y) in offsets {
        let placed = graph.relocated_copy(leg, Vec3::new(x, y, 0.0)).unwrap().root;
        graph.attach(torso, [placed], AttachOptions::moving()).unwrap();
    }
    let torso = graph.attach(world, [torso], AttachOptions::moving()).unwrap().nodes[0];
    (graph, world, torso)
}

#[test]
fn test_view_get_set_round_trip() {
    let (mut graph, _, torso) = create_test_quadruped();
    let legs = graph.view(torso, "bodies").unwrap();
    assert_eq!(legs.display(&graph), "View[4|torso.bodies]");

    let positions = legs.get(&graph, "pos").unwrap().into_values().unwrap();
    legs.set(&mut graph, "pos", Value::List(positions.clone())).unwrap();
    assert_eq!(legs.get(&graph, "pos").unwrap().into_values().unwrap(), positions);
    assert_eq!(positions[2], Value::Vec3(Vec3::new(-1.0, -1.0, 0.0)));
}

#[test]
fn test_nested_roles_flatten() {
    let (mut graph, _, torso) = create_test_quadruped();
    let legs = graph.view(torso, "bodies").unwrap();
    let thighs = legs.get(&graph, "geoms").unwrap().into_view().unwrap();
    assert_eq!(thighs.len(), 4);

    thighs.set(&mut graph, "mass", 0.25_f32).unwrap();
    let masses = thighs.get(&graph, "mass").unwrap().into_values().unwrap();
    assert_eq!(masses, vec![Value::Float(0.25); 4]);

    let names: Vec<String> = thighs.iter().map(|thigh| graph.name(thigh).unwrap().to_string()).collect();
    assert_eq!(names, vec!["thigh_(0)", "thigh_(1)", "thigh_(2)", "thigh_(3)"]);
}

#[test]
fn test_function_broadcast_and_distribute() {
    let (mut graph, _, torso) = create_test_quadruped();
    let thighs = graph.view(torso, "bodies").unwrap().get(&graph, "geoms").unwrap().into_view().unwrap();
    let scale = thighs.get(&graph, "scale").unwrap().into_function().unwrap();

    assert_eq!(scale.call(&mut graph, &[Value::Float(2.0)]).unwrap(), Outcome::None);
    let factors: Vec<Vec<Value>> = (1..=4).map(|factor| vec![Value::Int(factor)]).collect();
    scale.distribute(&mut graph, &factors).unwrap();

    let last = thighs.get_node(3).unwrap();
    assert_eq!(graph.field(last, "size").unwrap(), &Value::Vec3(Vec3::new(8.0, 8.0, 8.0)));
    assert!(matches!(
        scale.distribute(&mut graph, &factors[..2]),
        Err(GraphError::LengthMismatch { expected: 4, actual: 2 })
    ));
}

#[test]
fn test_all_view_reaches_nested_descendants() {
    let (mut graph, world, _) = create_test_quadruped();
    let all = graph.all(world).unwrap();
    let feet = all.get(&graph, "sites").unwrap().into_view().unwrap();
    assert_eq!(feet.len(), 4);

    all.set(&mut graph, "axis", Vec3::x()).unwrap();
    let hips = all.get(&graph, "joints").unwrap().into_view().unwrap();
    assert_eq!(hips.len(), 4);
    for hip in &hips {
        assert_eq!(graph.field(hip, "axis").unwrap(), &Value::Vec3(Vec3::x()));
    }
    assert!(matches!(all.set(&mut graph, "size", 0.05_f32), Err(GraphError::InvalidValue { .. })));

    let result = all.set(&mut graph, "size", Vec3::new(2.0, 2.0, 2.0));
    assert!(matches!(result, Err(GraphError::InvalidValue { .. })));
    let thighs = all.get(&graph, "geoms").unwrap().into_view().unwrap();
    for thigh in &thighs {
        assert_eq!(graph.field(thigh, "size").unwrap(), &Value::Vec3(Vec3::new(1.0, 1.0, 1.0)));
    }
    for foot in &feet {
        assert_eq!(graph.field(foot, "size").unwrap(), &Value::Float(0.01));
    }
}

#[test]
fn test_one_element_view_broadcasts_as_value() {
    let (mut graph, _, torso) = create_test_quadruped();
    let legs = graph.view(torso, "bodies").unwrap();
    let extra = graph.create(SITE, Some("sensorpad")).unwrap();
    let extras = crate::view::View::new([extra], "extras", extra);

    legs.set(&mut graph, "sites", &extras).unwrap();
    for leg in &legs {
        let sites = graph.children(leg, "sites").unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(graph.label(sites[0]).unwrap(), "sensorpad");
    }
}

#[test]
fn test_lattice_of_legs() {
    let (mut graph, _, torso) = create_test_quadruped();
    let leg = graph.view(torso, "bodies").unwrap().elements()[0];
    let grid = Lattice::new(&mut graph, leg, vec![Vec3::x(), Vec3::y()], vec![2, 3]).unwrap();
    let view = grid.view();

    let Selection::View(row) = view.index(&[Index::At(1)]).unwrap() else {
        panic!("expected a row");
    };
    row.set(&mut graph, "pos", Vec3::zeros()).unwrap();
    for cell in row.nodes() {
        assert_eq!(graph.field(cell, "pos").unwrap(), &Value::Vec3(Vec3::zeros()));
    }
    let feet = view.get(&graph, "sites").unwrap().into_view().unwrap();
    assert_eq!(feet.len(), 6);

    graph.attach(torso, [&grid], AttachOptions::default()).unwrap();
    assert_eq!(graph.children(torso, "bodies").unwrap().len(), 10);
}
