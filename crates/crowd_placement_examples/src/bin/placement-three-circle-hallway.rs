use std::f64::consts::PI;

use crowd_placement::prelude::*;
use crowd_placement_examples::{init_tracing, render_configuration_to_png, RenderConfig};
use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // A 30 x 5 hallway with exits at both ends. The left half walks east, the right half west.
    let (width, height) = (30.0, 5.0);
    let domain = rectangle(DVec2::ZERO, DVec2::new(width, height));

    let defaults = BodyTypeTable::default();
    let adult = defaults.distribution("adult")?.clone();
    let table = BodyTypeTable::empty()
        .with("walk_east", adult.clone().with_orientation(0.0))
        .with("walk_west", adult.with_orientation(PI));

    let mut cfg = Configuration::with_parameters(domain, 120, BodyVariant::ThreeCircle, table)?;
    cfg.add_target(rectangle(DVec2::ZERO, DVec2::new(1.0, height)))?;
    cfg.add_target(rectangle(
        DVec2::new(width - 1.0, 0.0),
        DVec2::new(width, height),
    ))?;

    let mut rng = StdRng::seed_from_u64(2024);
    let left = rectangle(DVec2::ZERO, DVec2::new(width / 2.0, height));
    let right = rectangle(DVec2::new(width / 2.0, 0.0), DVec2::new(width, height));
    let east = cfg.add_agents(60, &left, "walk_east", DEFAULT_ITERATION_LIMIT, &mut rng)?;
    let west = cfg.add_agents(60, &right, "walk_west", DEFAULT_ITERATION_LIMIT, &mut rng)?;
    println!("placed {east} agents walking east and {west} walking west");

    let rc = RenderConfig::new((1500, 250), DVec2::ZERO, DVec2::new(width, height));
    render_configuration_to_png(&cfg, &rc, "placement-three-circle-hallway.png")?;
    Ok(())
}
