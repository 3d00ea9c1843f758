//! Arcade Hub entry point
//!
//! Handles platform-specific initialization and runs the host loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use arcade_hub::platform::{LocalStorage, NullRenderer, RenderSink};
    use arcade_hub::renderer::DomRenderer;
    use arcade_hub::{FrameOutcome, GameKind, HighScores, HostContext, HostShell, Settings};

    /// Element the character grid is written into
    const SCREEN_ID: &str = "screen";

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Arcade Hub starting...");

        let settings = Settings::load();
        let renderer: Box<dyn RenderSink> = match DomRenderer::by_id(SCREEN_ID) {
            Some(dom) => Box::new(dom),
            None => {
                log::warn!("No #{} element, frames will not be shown", SCREEN_ID);
                Box::new(NullRenderer)
            }
        };
        let scores = Rc::new(RefCell::new(HighScores::load()));
        let host = Rc::new(RefCell::new(HostShell::new(HostContext {
            renderer,
            storage: Box::new(LocalStorage),
            scores: Box::new(scores.clone()),
            settings,
        })));

        for game in GameKind::ALL {
            log::info!("{}: {} [{}]", game.name(), game.description(), game.categories().join(", "));
        }

        setup_keyboard(host.clone());
        setup_page_hide(host.clone());
        request_animation_frame(host, scores);

        log::info!("Arcade Hub running! Press 1 for Snake, 2 for Tetris");
    }

    fn launch_seed(host: &HostShell) -> u64 {
        host.settings().seed.unwrap_or_else(|| js_sys::Date::now() as u64)
    }

    fn setup_keyboard(host: Rc<RefCell<HostShell>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down: hub shortcuts while idle, otherwise forwarded to the buffer
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut h = host.borrow_mut();
                let code = event.code();
                let picked = match code.as_str() {
                    "Digit1" => Some(GameKind::Snake),
                    "Digit2" => Some(GameKind::Tetris),
                    _ => None,
                };
                match picked {
                    Some(game) if !h.is_running() => {
                        let seed = launch_seed(&h);
                        h.resume(game, seed);
                    }
                    _ if code == "Escape" => h.destroy(),
                    _ => {
                        if arcade_hub::sim::Key::from_code(&code).is_some() {
                            event.prevent_default();
                        }
                        h.on_key_down(&code);
                    }
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                host.borrow_mut().on_key_up(&event.code());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Persist the running game when the tab goes away
    fn setup_page_hide(host: Rc<RefCell<HostShell>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut h = host.borrow_mut();
                if h.is_running() {
                    h.destroy();
                    log::info!("Saved and closed (tab hidden)");
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(host: Rc<RefCell<HostShell>>, scores: Rc<RefCell<HighScores>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            host_loop(host, scores, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn host_loop(host: Rc<RefCell<HostShell>>, scores: Rc<RefCell<HighScores>>, time: f64) {
        let outcome = host.borrow_mut().frame(time);
        if let FrameOutcome::Closed { game, score } = outcome {
            let s = scores.borrow();
            log::info!(
                "{} closed at {} (best {}, {} games played)",
                game.name(),
                score,
                s.top_score(game).unwrap_or(0),
                s.stats.games_played
            );
        }
        request_animation_frame(host, scores);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::process::ExitCode;
    use std::rc::Rc;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use arcade_hub::platform::MemoryStorage;
    use arcade_hub::renderer::TextRenderer;
    use arcade_hub::sim::snake::{BODY_TOKEN, FOOD_TOKEN, HEAD_TOKEN};
    use arcade_hub::sim::{Key, RenderSnapshot};
    use arcade_hub::{FrameOutcome, GameKind, HighScores, HostContext, HostShell, Settings};

    /// Simulated host frame spacing (ms), roughly a 60 Hz display
    const FRAME_MS: f64 = 16.0;
    /// Ten simulated minutes
    const MAX_FRAMES: u32 = 37_500;

    pub fn run() -> ExitCode {
        let mut args = std::env::args().skip(1);
        let game = match args.next() {
            None => GameKind::Snake,
            Some(id) => match GameKind::from_id(&id) {
                Some(game) => game,
                None => {
                    eprintln!("unknown game '{}', expected one of: snake, tetris", id);
                    return ExitCode::from(2);
                }
            },
        };
        let settings = Settings::load();
        let seed = match args.next() {
            Some(s) => match s.parse::<u64>() {
                Ok(seed) => seed,
                Err(e) => {
                    eprintln!("invalid seed '{}': {}", s, e);
                    return ExitCode::from(2);
                }
            },
            None => settings.seed.unwrap_or_else(clock_seed),
        };

        log::info!("Arcade Hub (native) autoplaying {} with seed {}", game.name(), seed);

        let renderer = Rc::new(RefCell::new(TextRenderer::new()));
        let storage = Rc::new(RefCell::new(MemoryStorage::new()));
        let scores = Rc::new(RefCell::new(HighScores::new()));
        let mut host = HostShell::new(HostContext {
            renderer: Box::new(renderer.clone()),
            storage: Box::new(storage.clone()),
            scores: Box::new(scores.clone()),
            settings,
        });
        host.launch(game, seed);

        let mut bot = Pcg32::seed_from_u64(seed ^ 0x5eed);
        let mut now = 0.0;
        let mut closed = false;
        for _ in 0..MAX_FRAMES {
            let key = host
                .session()
                .map(|s| s.snapshot())
                .and_then(|frame| autoplay_key(&frame, &mut bot));
            if let Some(key) = key {
                host.on_key_down(key.code());
                host.on_key_up(key.code());
            }
            if let FrameOutcome::Closed { .. } = host.frame(now) {
                closed = true;
                break;
            }
            now += FRAME_MS;
        }
        if !closed {
            log::info!("Frame limit reached, saving the running game");
            host.destroy();
        }

        println!("{}", renderer.borrow().last_frame());
        let s = scores.borrow();
        println!(
            "games played: {}, total score: {}, best {}: {}",
            s.stats.games_played,
            s.stats.total_score,
            game,
            s.top_score(game).unwrap_or(0)
        );
        if let Some(save) = storage.borrow().raw(&game.storage_key()) {
            println!("saved state: {} bytes", save.len());
        }
        ExitCode::SUCCESS
    }

    fn clock_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn autoplay_key(frame: &RenderSnapshot, rng: &mut Pcg32) -> Option<Key> {
        match frame.game {
            GameKind::Snake => snake_key(frame),
            GameKind::Tetris => tetris_key(rng),
        }
    }

    /// Greedy: head for the food along a safe direction
    fn snake_key(frame: &RenderSnapshot) -> Option<Key> {
        let find = |token: u8| {
            (0..frame.height)
                .flat_map(|y| (0..frame.width).map(move |x| (x as i32, y as i32)))
                .find(|&(x, y)| frame.cell(x as usize, y as usize) == token)
        };
        let (hx, hy) = find(HEAD_TOKEN)?;
        let (fx, fy) = find(FOOD_TOKEN).unwrap_or((hx, hy));

        let safe = |(dx, dy): (i32, i32)| {
            let (x, y) = (hx + dx, hy + dy);
            x >= 0
                && y >= 0
                && (x as usize) < frame.width
                && (y as usize) < frame.height
                && frame.cell(x as usize, y as usize) != BODY_TOKEN
        };

        let mut preferred = Vec::with_capacity(4);
        if fx != hx {
            preferred.push(if fx > hx { Key::Right } else { Key::Left });
        }
        if fy != hy {
            preferred.push(if fy > hy { Key::Down } else { Key::Up });
        }
        preferred.extend([Key::Up, Key::Right, Key::Down, Key::Left]);

        preferred.into_iter().find(|&key| {
            let delta = match key {
                Key::Up => (0, -1),
                Key::Down => (0, 1),
                Key::Left => (-1, 0),
                Key::Right => (1, 0),
                Key::Space => (0, 0),
            };
            safe(delta)
        })
    }

    /// Random taps; hard drops are rare enough that the stack builds up
    fn tetris_key(rng: &mut Pcg32) -> Option<Key> {
        match rng.random_range(0..100) {
            0..6 => Some(Key::Left),
            6..12 => Some(Key::Right),
            12..16 => Some(Key::Up),
            16..18 => Some(Key::Space),
            _ => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
