//! A scripted grove session on the headless platform: a header block over a
//! scrolling list of blocks, driven by a reproducible stream of random input.

use std::sync::{Arc, Mutex};

use grove::{
    Backend, Core, EntityId, Error, Result, TypedId,
    backend::headless::{HeadlessPlatform, Record},
    config::Config,
    dump::{dump, dump_subtree},
    event::{Button, Key, KeyCode, ScrollDelta, WindowEvent, key},
    geom::{Expanse, Point},
    theme::DefaultTheme,
    widgets::{Block, List, Stack},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{info, warn};

/// Handles into the demo scene.
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    /// Window root.
    pub root: EntityId,
    /// The header block.
    pub header: TypedId<Block>,
    /// The scrolling list.
    pub list: TypedId<List>,
}

/// Build the demo tree: a stack holding a header and a list of `rows`
/// blocks. The tree is left detached.
pub fn build(core: &mut Core, rows: usize) -> Scene {
    let root = core.create(Stack::new().with_gap(1));
    let header = core.create_typed(Block::new(12, 2));
    let list = core.create_typed(List::new());
    for _ in 0..rows {
        let row = core.create(Block::new(8, 2));
        core.adopt(list.id(), row);
    }
    core.adopt(root, header.id());
    core.adopt(root, list.id());
    Scene { root, header, list }
}

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Press and release the left button.
    Click(Point),
    /// Scroll vertically by some notches.
    Scroll(Point, i32),
    /// Move focus forward or, with shift, backward.
    Tab {
        /// Move backward.
        back: bool,
    },
    /// Press and release a key.
    Key(KeyCode),
}

impl Step {
    /// The window events that make up this step.
    fn events(self) -> Vec<WindowEvent> {
        let mods = key::Empty;
        match self {
            Self::Click(point) => vec![
                WindowEvent::MouseDown {
                    point,
                    button: Button::Left,
                    mods,
                },
                WindowEvent::MouseUp {
                    point,
                    button: Button::Left,
                    mods,
                },
            ],
            Self::Scroll(point, dy) => vec![WindowEvent::Scroll {
                point,
                delta: ScrollDelta::new(0, dy),
                mods,
            }],
            Self::Tab { back } => {
                let key = Key {
                    code: KeyCode::Tab,
                    mods: if back { key::Shift } else { key::Empty },
                };
                vec![WindowEvent::KeyDown(key), WindowEvent::KeyUp(key)]
            }
            Self::Key(code) => vec![
                WindowEvent::KeyDown(code.into()),
                WindowEvent::KeyUp(code.into()),
            ],
        }
    }
}

/// A reproducible random script of `steps` inputs inside a window of the
/// given size.
pub fn script(seed: u64, steps: usize, size: Expanse) -> Vec<Step> {
    let mut rng = StdRng::seed_from_u64(seed);
    let keys = [KeyCode::Up, KeyCode::Down, KeyCode::Enter, KeyCode::Home];
    (0..steps)
        .map(|_| {
            let point = Point::new(
                rng.random_range(0..size.w.max(1)) as i32,
                rng.random_range(0..size.h.max(1)) as i32,
            );
            match rng.random_range(0..4) {
                0 => Step::Click(point),
                1 => Step::Scroll(point, if rng.random_bool(0.5) { 1 } else { -1 }),
                2 => Step::Tab {
                    back: rng.random_bool(0.25),
                },
                _ => Step::Key(keys[rng.random_range(0..keys.len())]),
            }
        })
        .collect()
}

/// Settings for a demo session.
#[derive(Debug, Clone)]
pub struct Options {
    /// Initial window size.
    pub size: Expanse,
    /// Rows in the list.
    pub rows: usize,
    /// Random seed for the script.
    pub seed: u64,
    /// Number of scripted steps.
    pub steps: usize,
    /// Toolkit configuration.
    pub config: Config,
    /// Render the dump with ANSI colors.
    pub color: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            size: Expanse::new(16, 12),
            rows: 6,
            seed: 0,
            steps: 20,
            config: Config::default(),
            color: false,
        }
    }
}

/// What a session left behind.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// The tree as it stood after the last step.
    pub dump: String,
    /// Regions pushed to the platform.
    pub pushes: usize,
    /// Platform requests of any kind.
    pub requests: usize,
    /// Header activations.
    pub activations: u32,
}

/// Run a scripted session to completion. The window is closed after the
/// last step, which ends the loop.
pub fn run(opts: &Options) -> Result<Report> {
    let (log, platform) = HeadlessPlatform::create();
    let mut backend = Backend::new(platform, opts.config.clone(), DefaultTheme)?;
    let scene = build(backend.core_mut(), opts.rows);
    let window = backend.create_window(opts.size, Some(scene.root))?;
    backend.set_title(window, "grove demo")?;
    let handle = backend.native_handle(window)?;

    let steps = script(opts.seed, opts.steps, opts.size);
    info!(steps = steps.len(), seed = opts.seed, "queueing script");
    let sink = backend.sink();
    for event in steps.into_iter().flat_map(Step::events) {
        sink.send(handle, event)?;
    }

    let report = Arc::new(Mutex::new(Report::default()));
    let out = Arc::clone(&report);
    let color = opts.color;
    backend.post(move |core| {
        let text = if color {
            dump(core, window)
        } else {
            dump_subtree(core, scene.root)
        };
        let activations = core.with_widget(scene.header, |b: &mut Block, _| b.activations());
        match (text, activations, out.lock()) {
            (Ok(text), Ok(n), Ok(mut report)) => {
                report.dump = text;
                report.activations = n;
            }
            _ => warn!("could not capture the final tree"),
        }
    })?;
    sink.send(handle, WindowEvent::Close)?;
    backend.run()?;

    let log = log
        .lock()
        .map_err(|e| Error::Platform(format!("headless log poisoned: {e}")))?;
    let mut report = report
        .lock()
        .map_err(|e| Error::Internal(format!("report poisoned: {e}")))?
        .clone();
    report.pushes = log
        .records
        .iter()
        .filter(|r| matches!(r, Record::Push(..)))
        .count();
    report.requests = log.records.len();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_are_reproducible() {
        let size = Expanse::new(10, 10);
        assert_eq!(script(3, 30, size), script(3, 30, size));
        assert_ne!(script(3, 30, size), script(4, 30, size));
    }

    #[test]
    fn session_reports_final_tree() -> Result<()> {
        let report = run(&Options::default())?;
        assert!(report.dump.starts_with("Stack"));
        assert_eq!(report.dump.matches("Block").count(), 7);
        assert!(report.dump.contains("List"));
        assert!(report.pushes >= 1);
        assert!(report.requests > report.pushes);
        Ok(())
    }

    #[test]
    fn clicking_the_header_activates_it() -> Result<()> {
        let (_, platform) = HeadlessPlatform::create();
        let mut backend = Backend::new(platform, Config::default(), DefaultTheme)?;
        let scene = build(backend.core_mut(), 2);
        let window = backend.create_window(Expanse::new(16, 12), Some(scene.root))?;
        let handle = backend.native_handle(window)?;
        let sink = backend.sink();
        for event in Step::Click(Point::new(1, 1)).events() {
            sink.send(handle, event)?;
        }
        backend.pump()?;
        let n = backend
            .core_mut()
            .with_widget(scene.header, |b: &mut Block, _| b.activations())?;
        assert_eq!(n, 1);
        Ok(())
    }
}
