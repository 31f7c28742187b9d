use crowd_placement::prelude::*;
use crowd_placement_examples::{init_tracing, render_configuration_to_png, RenderConfig};
use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // 10 x 10 room with a round pillar in the middle; every body has radius 0.3.
    let domain = rectangle(DVec2::ZERO, DVec2::new(10.0, 10.0));
    let mut cfg = Configuration::with_parameters(
        domain.clone(),
        200,
        BodyVariant::Circular,
        BodyDistribution::fixed(0.3),
    )?;
    cfg.add_obstacle(circle_polygon(DVec2::new(5.0, 5.0), 2.0, 64))?;

    let mut sink = VecSink::without_rejections();
    let mut rng = StdRng::seed_from_u64(7);
    let report = cfg.place_with_events(200, &domain, "pillar", 50, &mut rng, &mut sink)?;

    println!(
        "placed {} agents; {} candidates hit the pillar, {} hit other agents",
        report.placed, report.rejected_occupied, report.rejected_overlap
    );
    println!("{} events recorded", sink.len());

    let rc = RenderConfig::new((800, 800), DVec2::ZERO, DVec2::new(10.0, 10.0));
    render_configuration_to_png(&cfg, &rc, "placement-obstacle-disk.png")?;
    Ok(())
}
