//! Akshar Strike entry point
//!
//! On wasm32 this only sets up logging; the page drives the game through
//! `WasmGame`. Natively it runs a headless, seeded session with a simulated
//! typist, which is handy as a smoke run of the whole core.

#[cfg(target_arch = "wasm32")]
fn main() {
    akshar_strike::platform::web::init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Akshar Strike (native) starting...");

    let mut args = std::env::args().skip(1);
    let round = args.next().and_then(|a| a.parse().ok()).unwrap_or(1);
    let difficulty = args
        .next()
        .and_then(|a| akshar_strike::Difficulty::from_str(&a))
        .unwrap_or_default();
    let seed = args.next().and_then(|a| a.parse().ok()).unwrap_or(7);

    match demo::run(round, difficulty, seed) {
        Ok(summary) => println!("{}", summary),
        Err(e) => {
            log::error!("Demo failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use akshar_strike::consts::FRAME_MS;
    use akshar_strike::platform::ManualScheduler;
    use akshar_strike::sim::{GamePhase, Snapshot};
    use akshar_strike::text::{grapheme_len, segment};
    use akshar_strike::words::WordSourceError;
    use akshar_strike::{Difficulty, Game, KeyInput};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Simulated minutes before the demo gives up
    const MAX_MINUTES: f64 = 15.0;
    /// Frames between simulated keystrokes (~300 ms)
    const FRAMES_PER_KEY: u32 = 18;
    /// Chance that a keystroke is a typo
    const TYPO_RATE: f64 = 0.08;
    /// Frames an explosion stays on screen
    const EXPLOSION_FRAMES: u32 = 30;

    pub fn run(round: u32, difficulty: Difficulty, seed: u64) -> Result<String, WordSourceError> {
        let mut game = Game::with_builtin_words(ManualScheduler::new(), seed)?;
        let mut typist = Pcg32::seed_from_u64(seed ^ 0x5eed);
        let mut now = 0.0;
        let mut frame: u32 = 0;
        let mut next_timer = 0.0;
        let mut explosions: Vec<(u32, u32)> = Vec::new();

        game.select_round_and_start(round, difficulty, now);

        while now < MAX_MINUTES * 60_000.0 {
            match game.phase() {
                GamePhase::RoundComplete => {
                    log::info!("Round cleared, moving on");
                    game.continue_to_next_round(now);
                    continue;
                }
                GamePhase::Playing | GamePhase::Paused => {}
                _ => break,
            }

            now += FRAME_MS;
            frame += 1;
            if game.scheduler_mut().take_frame().is_some() {
                game.on_frame(now);
            }
            if let Some(interval) = game.scheduler().spawn_timer_interval() {
                if now >= next_timer {
                    game.on_spawn_timer(now);
                    next_timer = now + interval;
                }
            }

            // Play the part of the view: finish animations
            for e in &game.state().explosions {
                if !explosions.iter().any(|(id, _)| *id == e.id) {
                    explosions.push((e.id, frame + EXPLOSION_FRAMES));
                }
            }
            let (done, pending): (Vec<_>, Vec<_>) =
                explosions.into_iter().partition(|(_, until)| *until <= frame);
            explosions = pending;
            for (id, _) in done {
                game.remove_explosion(id, now);
            }
            if game.state().difficulty_up_notice && frame % 120 == 0 {
                game.hide_difficulty_up(now);
            }

            if frame % FRAMES_PER_KEY == 0 {
                if let Some(key) = next_key(&game, &mut typist) {
                    game.on_key(&KeyInput::new(key), now);
                }
            }
        }

        Ok(summarize(&game.snapshot(now), now))
    }

    /// What the simulated typist presses next
    fn next_key(game: &Game<ManualScheduler>, rng: &mut Pcg32) -> Option<String> {
        let state = game.state();
        let typing = &state.typing;

        if !typing.buffer.is_empty() && typing.active_target.is_none() {
            return Some("Backspace".into());
        }

        // Stick with the lock, otherwise go for whatever is closest to the floor
        let target = typing
            .active_target
            .and_then(|id| state.enemy(id))
            .or_else(|| {
                state
                    .live_enemies()
                    .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            })?;

        if rng.random_bool(TYPO_RATE) {
            return Some("ॐ".into());
        }
        let typed = grapheme_len(&typing.buffer);
        segment(&target.word).into_iter().nth(typed)
    }

    fn summarize(snapshot: &Snapshot, now: f64) -> String {
        format!(
            "phase: {:?}\nround: {}/{}\ndifficulty: {}\nscore: {}\nwords: {}\nlives: {}/{}\nwpm: {}\naccuracy: {}%\nsimulated: {:.1} s",
            snapshot.phase,
            snapshot.round,
            snapshot.total_rounds,
            snapshot.difficulty.as_str(),
            snapshot.score,
            snapshot.words_destroyed,
            snapshot.lives,
            snapshot.max_lives,
            snapshot.wpm,
            snapshot.accuracy,
            now / 1000.0,
        )
    }
}
