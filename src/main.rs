use anyhow::Result;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use input_arbiter::core::time::FRAMES_60;
use input_arbiter::engine::input::{self, MouseButtons};
use input_arbiter::engine::input::flags::{KEY_ESC, MOUSE_LEFT};
use input_arbiter::{
    BindingEntry, Channel, FixedTimestep, GameClock, InputDevice, InputFlags, PerformancePolicy,
};

/// Give up if the scripted producer never sends the quit key
const DEMO_TIMEOUT: Duration = Duration::from_secs(5);

fn bindings() -> Vec<BindingEntry> {
    vec![
        BindingEntry::new("Quit App", "", "ESC", "ButtonDown", "ESC"),
        BindingEntry::new("Jump", "Game", "Space", "ButtonDown", " "),
        BindingEntry::new("Fire", "Game", "LMB", "ButtonDown", "MouseLeft"),
        BindingEntry::new("Open Menu", "Game", "M", "ButtonDown", "M"),
        BindingEntry::new("Menu Select", "Menu", "Return", "ButtonDown", "Return"),
        BindingEntry::new("Save", "", "Ctrl-K Ctrl-S", "ButtonDown|ButtonCtrl", "K")
            .then("ButtonDown|ButtonCtrl", "S"),
    ]
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting input arbiter demo...");
    log::debug!("Binding reference:\n{}", input::action_constants());

    let mut device = InputDevice::new(&bindings());
    device.push_context("Game");

    let quit = Arc::new(AtomicBool::new(false));
    let quit_flag = Arc::clone(&quit);
    device.register_simple_action_callback("Quit App", move || {
        quit_flag.store(true, Ordering::Relaxed)
    });
    for action in ["Jump", "Fire", "Open Menu", "Menu Select", "Save"] {
        device.register_action_callback(action, |event| {
            info!(
                "Action '{}' at {} ({}, {}) [{}]",
                event.action, event.timestamp, event.mouse_x, event.mouse_y, event.flags
            );
        });
    }

    // Scripted input from a separate thread
    let sender = device.sender();
    let producer = thread::spawn(move || {
        let pause = || thread::sleep(Duration::from_millis(50));
        let ctrl_down = InputFlags::BUTTON_DOWN | InputFlags::BUTTON_CTRL;

        sender.key_record(InputFlags::BUTTON_DOWN, b' ');
        pause();
        sender.mouse_record(
            InputFlags::BUTTON_DOWN,
            MouseButtons::single(MOUSE_LEFT),
            0,
            glam::IVec2::new(640, 360),
        );
        pause();
        sender.key_record(ctrl_down, b'K');
        sender.key_record(ctrl_down, b'S');
        pause();
        sender.key_record(InputFlags::BUTTON_DOWN, b'M');
        pause();
        sender.key_record(InputFlags::BUTTON_DOWN, KEY_ESC);
    });

    let mut clock = GameClock::new();
    let mut stepper = FixedTimestep::new(FRAMES_60);
    let policy = PerformancePolicy::default().with_max_records(64);
    let mut channel = Channel::new("Input");

    let started = Instant::now();
    let mut last_frame = started;

    // Main loop
    while !quit.load(Ordering::Relaxed) && started.elapsed() < DEMO_TIMEOUT {
        let now = Instant::now();
        let steps = stepper.advance(now - last_frame);
        last_frame = now;

        for _ in 0..steps {
            device.tick(&clock, &policy, &mut channel);
            clock.tick(stepper.step_micros());
        }

        // Menu opened: switch context once the game context saw 'M'
        if device.binding("Open Menu").and_then(|b| b.last_fired()).is_some()
            && device.active_context() == "Game"
        {
            device.push_context("Menu");
        }

        thread::sleep(Duration::from_millis(1));
    }

    producer
        .join()
        .map_err(|_| anyhow::anyhow!("Input producer thread panicked"))?;

    for (name, value) in channel.counters() {
        info!("{}: {}", name, value);
    }
    info!("Shutting down after {} logic steps", stepper.step_count());

    Ok(())
}
