use crowd_placement::prelude::*;
use crowd_placement_examples::{init_tracing, render_configuration_to_png, RenderConfig};
use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Square room, circular bodies drawn from the built-in "adult" type.
    let domain = rectangle(DVec2::ZERO, DVec2::new(20.0, 20.0));
    let mut cfg = Configuration::new(domain.clone(), 300, BodyVariant::Circular)?;

    let mut rng = StdRng::seed_from_u64(42);
    let report = cfg.fill(&domain, "adult", &mut rng)?;
    println!(
        "placed {} / {} agents in {} trials ({} overlap rejections)",
        report.placed, report.requested, report.trials, report.rejected_overlap
    );

    let rc = RenderConfig::new((800, 800), DVec2::ZERO, DVec2::new(20.0, 20.0));
    render_configuration_to_png(&cfg, &rc, "placement-circular-basic.png")?;
    Ok(())
}
