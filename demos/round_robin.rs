//! Round-robin demo: four simulated buzzers fed from a MIDI byte stream.
//!
//! A writer thread plays a short arpeggio into a serial buffer while the main
//! loop polls it. The last note is never released, so the duration watchdog
//! cuts it off.
//!
//! ```bash
//! cargo run --example round_robin
//! ```

use std::thread;
use std::time::Duration;

use mdc::prelude::*;
use mdc::midi::note_to_hz;

struct Buzzer {
    id: usize,
}

impl Actuator for Buzzer {
    fn note_on(&mut self, note: u8) {
        tracing::info!("buzzer {} on  {:>3} ({:.1} Hz)", self.id, note, note_to_hz(f32::from(note)));
    }

    fn note_off(&mut self) {
        tracing::info!("buzzer {} off", self.id);
    }
}

struct Led;

impl ActivityIndicator for Led {
    fn set_active(&mut self, active: bool) {
        tracing::info!("LED {}", if active { "on" } else { "off" });
    }
}

fn main() -> mdc::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut mdc = MidiDeviceController::builder()
        .max_devices(4)
        .max_duration_ms(500)
        .idle_timeout_ms(1_000)
        .activity_indicator(Led)
        .build()?;

    mdc.add_devices((0..4).map(|id| Box::new(Buzzer { id }) as Box<dyn Actuator>));
    mdc.create_chain(0, ChainType::RoundRobin, &[0, 1, 2, 3])?;

    let (mut uart, mut rx) = serial_buffer(256);
    let writer = thread::spawn(move || {
        use ringbuf::traits::Producer;

        for note in [60u8, 64, 67, 72, 76] {
            uart.push_slice(&[0x90, note, 100]);
            thread::sleep(Duration::from_millis(120));
            if note != 76 {
                uart.push_slice(&[0x80, note, 0]);
            }
        }
    });

    for _ in 0..200 {
        mdc.poll(&mut rx);
        thread::sleep(Duration::from_millis(10));
    }
    writer.join().ok();

    mdc.log_status();
    Ok(())
}
