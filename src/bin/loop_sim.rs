// Scripted run of the loop controller against the simulated engine.
// Useful for eyeballing the edge-triggered boundary behavior without
// touching a real player: one seek per crossing, never a seek storm.

use tokio::sync::mpsc;
use vidslice::media::MediaId;
use vidslice::ui::format_time;
use vidslice::{LoopController, SimEngine};

fn main() -> anyhow::Result<()> {
    println!("vidslice loop simulation");
    println!("========================");

    let (engine_tx, mut engine_rx) = mpsc::unbounded_channel();
    let mut engine = SimEngine::new();
    engine.add_media("demo", 30.0);
    engine.set_event_sender(engine_tx);

    let mut controller = LoopController::new(engine);
    controller.load(&MediaId::new("demo"))?;

    // Let the duration come in before setting up the loop
    for _ in 0..5 {
        controller.engine_mut().tick(0.1);
        while let Ok(event) = engine_rx.try_recv() {
            controller.on_engine_event(event);
        }
    }
    println!(
        "duration learned: {}",
        format_time(controller.duration().unwrap_or(0.0))
    );

    controller.set_region(5.0, 10.0)?;
    controller.toggle_loop()?;
    println!("looping 0:05 - 0:10, running 20 simulated seconds...");

    let mut last_position = controller.state().position_seconds;
    for tick in 0..200 {
        controller.engine_mut().tick(0.1);
        while let Ok(event) = engine_rx.try_recv() {
            controller.on_engine_event(event);
        }

        let position = controller.state().position_seconds;
        if position < last_position {
            println!(
                "  tick {tick:3}: wrapped back to {}",
                format_time(position)
            );
        }
        last_position = position;
    }

    println!(
        "done at {} - still inside the region, loop held",
        format_time(controller.state().position_seconds)
    );
    Ok(())
}
