use log::{error, info};

use softshade::config::Config;
use softshade::input::KeyCode;
use softshade::pipeline::Pipeline;
use softshade::window::{FrameLimiter, Window, WindowEvent};

fn run() -> softshade::Result<()> {
    let config = Config::load()?;
    let mut pipeline = Pipeline::from_config(&config)?;

    let mut window = Window::new(&config.title, config.width as u32, config.height as u32)?;
    let mut limiter = FrameLimiter::new(&window, config.target_fps);
    let start = window.ticks();

    loop {
        if window.poll_events() == WindowEvent::Quit {
            break;
        }

        let seconds = window.ticks().saturating_sub(start) as f32 / 1000.0;
        pipeline.render_frame(seconds);

        if window.input().just_pressed(KeyCode::SPACE) {
            pipeline.screenshot(&config.screenshot_dir)?;
            info!("Screenshot saved to {}", config.screenshot_dir.display());
        }

        window.present(pipeline.color())?;
        limiter.wait_and_get_delta(&window);
    }

    Ok(())
}

fn main() {
    // Initialize logger with default level INFO
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("softshade v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }

    info!("Shutting down");
}
