use anyhow::Context;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

use sphere_sim::{
    generate_sphere, FrameLoop, FrameOutcome, GpuBackend, InputEvent, LoopState, Scene, SimConfig,
};

/// Real-time sphere visualizer: bodies bounce inside a cube under
/// semi-implicit Euler integration and are drawn with Phong shading.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON scene file overriding the built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };

    // Mesh preconditions are checked before any window or GPU work
    let mesh = generate_sphere(cfg.mesh.lat_res, cfg.mesh.lon_res, cfg.mesh.radius)
        .context("generating sphere mesh")?;
    log::info!(
        "Sphere mesh: {} vertices, {} indices",
        mesh.vertex_count(),
        mesh.index_count()
    );

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(cfg.window.title.as_str())
        .with_inner_size(winit::dpi::PhysicalSize::new(cfg.window.width, cfg.window.height))
        .build(&event_loop)
        .context("creating window")?;
    let window = Arc::new(window);

    let scene = Scene::from_config(&cfg);
    let mut backend = pollster::block_on(GpuBackend::new(
        window.clone(),
        mesh,
        scene.bodies.len(),
        cfg.render.shader.as_deref(),
    ))
    .context("initializing renderer")?;
    log::info!(
        "Renderer ready: {} bodies, {} indices per draw",
        scene.bodies.len(),
        backend.index_count()
    );

    let mut frame_loop = FrameLoop::new(scene, cfg.integrator(), cfg.renderer());
    let base_title = cfg.window.title.clone();
    let mut shown_state = frame_loop.state();

    println!("Physics Sim started");
    println!("Controls: Space pause, arrows/PageUp/PageDown push, Tab select, R reset, C clear, Esc quit");

    let fatal: Rc<RefCell<Option<anyhow::Error>>> = Rc::new(RefCell::new(None));
    let fatal_slot = fatal.clone();

    let win_id = window.id();
    let win_clone = window.clone();
    event_loop.run(move |event, target| match event {
        Event::WindowEvent { event, window_id } if window_id == win_id => match event {
            WindowEvent::RedrawRequested => {
                match frame_loop.run_frame(&mut backend) {
                    Ok(FrameOutcome::Presented) => {}
                    Ok(FrameOutcome::Skipped) => log::trace!("frame skipped, surface reconfigured"),
                    Err(e) => {
                        log::error!("Render error: {e}");
                        *fatal_slot.borrow_mut() = Some(e.into());
                        target.exit();
                        return;
                    }
                }
                let state = frame_loop.state();
                if state == LoopState::Closed {
                    target.exit();
                } else if state != shown_state {
                    win_clone.set_title(&frame_loop.scene.title(&base_title));
                    shown_state = state;
                }
            }
            other => {
                if let Some(input) = InputEvent::from_window_event(&other) {
                    frame_loop.push_event(input);
                }
            }
        },
        Event::AboutToWait => win_clone.request_redraw(),
        _ => {}
    })?;

    let failure = fatal.borrow_mut().take();
    if let Some(e) = failure {
        return Err(e);
    }
    log::info!("Shutting down");
    Ok(())
}
