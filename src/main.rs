use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use datagrid::{
    event_actions, source, App, AppConfig, AppEvent, Args, ConfigManager, TableSchema, Theme,
    APP_NAME,
};
use ratatui::DefaultTerminal;
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(
    mut terminal: DefaultTerminal,
    mut app: App,
    rx: Receiver<AppEvent>,
    tx: Sender<AppEvent>,
    poll_ms: u64,
) -> Result<()> {
    render(&mut terminal, &mut app)?;

    loop {
        if crossterm::event::poll(Duration::from_millis(poll_ms))? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match ConfigManager::new(APP_NAME) {
            Ok(config) => match config.write_default_config(args.force) {
                Ok(path) => {
                    println!("Wrote default configuration to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

/// Log to `[debug] log_file`, or `datagrid.log` in the cache directory.
fn init_logging(config: &AppConfig, debug_flag: bool) -> Result<()> {
    if !debug_flag && !config.debug.wants_log_file() {
        return Ok(());
    }
    let path = match &config.debug.log_file {
        Some(path) => path.clone(),
        None => dirs::cache_dir()
            .ok_or_else(|| eyre!("Could not determine cache directory"))?
            .join(APP_NAME)
            .join(format!("{}.log", APP_NAME)),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path)
        .map_err(|e| eyre!("Failed to create log file {}: {}", path.display(), e))?;
    WriteLogger::init(config.debug.level_filter()?, Config::default(), file)
        .map_err(|e| eyre!("Failed to initialize logger: {}", e))?;
    log::info!("{} {} logging to {}", APP_NAME, env!("CARGO_PKG_VERSION"), path.display());
    Ok(())
}

/// `--export PATH`: a directory gets `{title}.csv`, anything else is the file.
fn export_headless(app: &App, target: &Path) -> Result<PathBuf> {
    let export = app.csv_export();
    let path = if target.is_dir() {
        export
            .save_to(target)
            .map_err(|e| eyre!("Failed to export to {}: {}", target.display(), e))?
    } else {
        std::fs::write(target, &export.data)
            .map_err(|e| eyre!("Failed to export to {}: {}", target.display(), e))?;
        target.to_path_buf()
    };
    Ok(path)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let config = AppConfig::load(APP_NAME)?;
    init_logging(&config, args.debug)?;
    let theme = Theme::from_config(&config.theme)?;

    let rows_path = args
        .rows
        .clone()
        .ok_or_else(|| eyre!("No row file given"))?;
    let rows = source::load_rows(&rows_path, args.format)?;
    let schema = match &args.schema {
        Some(path) => TableSchema::load(path)?,
        None => TableSchema::default(),
    };

    let (tx, rx) = channel::<AppEvent>();
    let table = datagrid::build_table(rows, &schema, &config, &args)?
        .with_actions(event_actions(&config, args.role.clone(), &tx));
    let poll_ms = config.performance.event_poll_interval_ms;
    let mut app = App::new(table, config, theme, tx.clone());

    if let Some(target) = &args.export {
        let path = export_headless(&app, target)?;
        println!(
            "Exported {} rows to {}",
            app.table().visible_len(),
            path.display()
        );
        return Ok(());
    }

    if args.debug {
        app.enable_debug();
    }

    let terminal = ratatui::init();
    let result = run(terminal, app, rx, tx, poll_ms);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
