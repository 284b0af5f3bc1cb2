//! Simple kernel example.
//!
//! Renders the sphere scene on the CPU and saves it as a PNG.

use orb_renderer::{render, CameraSettings, SCENE_SPHERE};

fn main() -> orb_renderer::Result<()> {
    println!("Orb Kernel - PNG Example");
    println!("========================");

    let settings = CameraSettings::new().with_resolution(800, 450);
    let camera = settings.to_camera()?;

    println!("Rendering {}x{}...", settings.image_width, settings.image_height);

    let start = std::time::Instant::now();
    let image = render(&camera, &SCENE_SPHERE, settings.image_width, settings.image_height)?;
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.png";
    image.save_png(filename)?;
    println!("Saved to {}", filename);

    Ok(())
}
