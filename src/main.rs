use log::{LevelFilter, error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sdl2::image::InitFlag;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::time::{Duration, Instant};
use stolen_crown::assets::DirectoryAssets;
use stolen_crown::audio::{LogSink, Mixer};
use stolen_crown::canvas::Painter;
use stolen_crown::config::GameConfig;
use stolen_crown::game::context::{SCREEN_HEIGHT, SCREEN_WIDTH};
use stolen_crown::input_system::InputSystem;
use stolen_crown::render::Frame;
use stolen_crown::save::SaveManager;
use stolen_crown::timer::SystemClock;
use stolen_crown::{Controller, GameContext};

/// Terminal logging, plus a log file when the config names one.
fn init_logging(config: &GameConfig) {
    let log_config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Debug)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        config.log_level,
        log_config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = &config.log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(config.log_level, log_config, file)),
            Err(e) => eprintln!("Warning: could not open log file {}: {}", path.display(), e),
        }
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Warning: logging unavailable: {}", e);
    }
}

fn main() -> Result<(), String> {
    let config = GameConfig::load();
    init_logging(&config);
    info!("assets: {}", config.assets_dir.display());
    info!("saves: {}", config.save_dir.display());

    let sdl_context = sdl2::init()?;
    let video_subsystem = sdl_context.video()?;
    let _image_context = sdl2::image::init(InitFlag::PNG)?;

    let window = video_subsystem
        .window(&config.window.title, config.window.width, config.window.height)
        .position_centered()
        .build()
        .map_err(|e| e.to_string())?;

    let mut canvas = window
        .into_canvas()
        .accelerated()
        .build()
        .map_err(|e| e.to_string())?;
    canvas
        .set_logical_size(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32)
        .map_err(|e| e.to_string())?;

    let texture_creator = canvas.texture_creator();
    let assets = DirectoryAssets::new(&config.assets_dir);
    let mut painter = Painter::new(&texture_creator, assets.clone());
    let mut event_pump = sdl_context.event_pump()?;
    let input = InputSystem::new();

    let store = SaveManager::new(&config.save_dir).map_err(|e| e.to_string())?;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut ctx = GameContext::new(
        Box::new(SystemClock::new()),
        Box::new(assets),
        Box::new(store),
        Mixer::new(Box::new(LogSink)),
        rng,
        config.new_game,
    );

    let mut controller = Controller::with_all_modes();
    controller.start(&mut ctx).map_err(|e| e.to_string())?;

    let frame_time = Duration::from_millis(config.window.frame_ms());
    let mut frame = Frame::new();

    while !controller.should_quit() {
        let started = Instant::now();

        let events = input.poll_events(&mut event_pump);
        if let Err(e) = controller.tick(&events, &mut ctx) {
            error!("{}", e);
            return Err(e.to_string());
        }

        frame.clear();
        controller.draw(&ctx, &mut frame);
        painter.paint(&mut canvas, &frame)?;
        canvas.present();

        if let Some(rest) = frame_time.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!("goodbye");
    Ok(())
}
