//! Ant model demo
//!
//! Builds a four-legged ant from a single leg template, tunes it through
//! broadcast views and prints the finished outline as RON.
//!
//! Usage: `ant_outline [config.toml|config.ron]`

use std::f32::consts::FRAC_PI_2;

use blueprint_graph::foundation::logging;
use blueprint_graph::prelude::*;

/// Builds the ant model into a graph
pub struct AntBuilder {
    graph: Graph,
    world: NodeId,
}

impl AntBuilder {
    /// Empty world in a fresh graph
    pub fn new(config: GraphConfig) -> Result<Self, GraphError> {
        log::info!("Creating graph with the standard kinds...");
        let mut graph = Graph::with_standard_kinds(config)?;
        let world = graph.create("world", Some("ant_world"))?;
        Ok(Self { graph, world })
    }

    /// Template leg: hip joint, thigh geom and a foot site
    fn leg_template(&mut self) -> Result<NodeId, GraphError> {
        let graph = &mut self.graph;
        let leg = graph.create("body", Some("leg"))?;
        let hip = graph.create("joint", Some("hip"))?;
        let thigh = graph.create("geom", Some("thigh"))?;
        let foot = graph.create("site", Some("foot"))?;

        graph.set_field(hip, "range", Value::Floats(vec![-0.5, 0.5]))?;
        graph.set_field(thigh, "type", "capsule")?;
        graph.set_field(thigh, "size", Vec3::new(0.08, 0.4, 0.08))?;
        graph.set_field(foot, "pos", Vec3::new(0.4, 0.0, 0.0))?;
        graph.attach(leg, [hip, thigh, foot], AttachOptions::moving())?;
        Ok(leg)
    }

    /// Assemble the ant under the world and return the world
    pub fn build(&mut self) -> Result<NodeId, GraphError> {
        log::info!("Building ant...");
        let leg = self.leg_template()?;
        let graph = &mut self.graph;

        let torso = graph.create("body", Some("torso"))?;
        let shell = graph.create("geom", Some("shell"))?;
        graph.set_field(shell, "type", "sphere")?;
        graph.attach(torso, [shell], AttachOptions::moving())?;

        for quarter in 0..4_u8 {
            let angle = FRAC_PI_2.mul_add(f32::from(quarter), std::f32::consts::FRAC_PI_4);
            let rotation = Quat::from_axis_angle(&Vec3::z_axis(), angle);
            graph.set_local_transform(leg, &Transform::from_position_rotation(rotation * Vec3::new(0.3, 0.0, 0.0), rotation))?;
            graph.attach(torso, [leg], AttachOptions::default())?;
        }
        graph.set_field(torso, "pos", Vec3::new(0.0, 0.0, 0.75))?;
        let torso = graph.attach(self.world, [torso], AttachOptions::moving())?.nodes[0];

        let legs = graph.view(torso, "bodies")?;
        log::info!("{} attached", legs.display(graph));
        if let Some(thighs) = legs.get(graph, "geoms")?.into_view() {
            thighs.set(graph, "color", Value::Floats(vec![0.6, 0.3, 0.1, 1.0]))?;

            // Hind legs are longer
            if let Some(scale) = thighs.get(graph, "scale")?.into_function() {
                let factors: Vec<Vec<Value>> = [1.0_f32, 1.0, 1.2, 1.2]
                    .iter()
                    .map(|factor| vec![Value::Float(*factor)])
                    .collect();
                scale.distribute(graph, &factors)?;
            }
        }

        let camera = graph.create("camera", Some("tracker"))?;
        graph.set_field(camera, "pos", Vec3::new(0.0, -3.0, 1.5))?;
        let camera = graph.attach(self.world, [camera], AttachOptions::moving())?.nodes[0];
        graph.set_reference(camera, "target", Some(torso))?;

        let feet = graph.all(self.world)?.get(graph, "sites")?.into_view();
        let tendon = graph.create("tendon", Some("girdle"))?;
        let tendon = graph.attach(self.world, [tendon], AttachOptions::moving())?.nodes[0];
        if let Some(feet) = feet {
            graph.set_references(tendon, "bindings", feet.elements().to_vec())?;
        }

        log::info!("Ant built with {} nodes", graph.subtree(self.world)?.len());
        Ok(self.world)
    }

    /// Outline of the world, taken while the tree is finalized
    pub fn outline(&mut self) -> Result<Outline, GraphError> {
        self.graph.set_finalized(self.world, true)?;
        let outline = self.graph.outline(self.world);
        self.graph.set_finalized(self.world, false)?;
        outline
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1);
    let loaded = path.as_deref().map(GraphConfig::load_from_file);
    let config = match &loaded {
        Some(Ok(config)) => config.clone(),
        _ => GraphConfig::default(),
    };
    config.validate()?;

    logging::init_with_filter(&config.log_level);

    match (&path, loaded) {
        (Some(path), Some(Ok(_))) => log::info!("Loaded configuration from {}", path),
        (Some(path), Some(Err(e))) => log::warn!("Failed to load {} ({}), using defaults", path, e),
        _ => {}
    }

    log::info!("Starting ant outline demo");
    let mut builder = AntBuilder::new(config)?;
    builder.build()?;

    let outline = builder.outline()?;
    let text = ron::ser::to_string_pretty(&outline, ron::ser::PrettyConfig::default())?;
    println!("{text}");
    log::info!("Outline written ({} nodes)", outline.node_count());
    Ok(())
}
