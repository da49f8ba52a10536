//! The opaque engine boundary
//!
//! The scheduler treats the engine as a deterministic black box that
//! advances one logical tick per [`Engine::step`]. Per-step hooks are
//! optional capabilities rather than nullable function pointers.

use crate::LatchedInput;
use std::time::Duration;

/// Frame-time hook, invoked after every step with the engine's own reference
pub trait FrameTimeCallback {
    /// Reference token handed back to [`frame_time`](Self::frame_time)
    fn reference(&self) -> Duration;

    /// Called once after each step
    fn frame_time(&mut self, reference: Duration);
}

/// Audio hook, invoked after every step
pub trait AudioCallback {
    /// Called once after each step
    fn audio(&mut self);
}

/// A deterministic step function consuming latched input
pub trait Engine {
    /// Advance exactly one logical tick using `input`
    fn step(&mut self, input: &LatchedInput);

    /// Frame-time capability, if the engine has one
    fn frame_time_callback(&mut self) -> Option<&mut dyn FrameTimeCallback> {
        None
    }

    /// Audio capability, if the engine has one
    fn audio_callback(&mut self) -> Option<&mut dyn AudioCallback> {
        None
    }
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn step(&mut self, input: &LatchedInput) {
        (**self).step(input)
    }

    fn frame_time_callback(&mut self) -> Option<&mut dyn FrameTimeCallback> {
        (**self).frame_time_callback()
    }

    fn audio_callback(&mut self) -> Option<&mut dyn AudioCallback> {
        (**self).audio_callback()
    }
}

/// Step the engine once, then run whichever per-step callbacks it exposes
pub fn run_step<E: Engine + ?Sized>(engine: &mut E, input: &LatchedInput) {
    engine.step(input);
    if let Some(callback) = engine.frame_time_callback() {
        let reference = callback.reference();
        callback.frame_time(reference);
    }
    if let Some(callback) = engine.audio_callback() {
        callback.audio();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Button, InputState, Port};

    #[derive(Default)]
    struct Hooked {
        log: Vec<String>,
        frame_time: FrameTimer,
        audio: AudioPump,
    }

    #[derive(Default)]
    struct FrameTimer {
        calls: Vec<Duration>,
    }

    impl FrameTimeCallback for FrameTimer {
        fn reference(&self) -> Duration {
            Duration::from_micros(16_667)
        }

        fn frame_time(&mut self, reference: Duration) {
            self.calls.push(reference);
        }
    }

    #[derive(Default)]
    struct AudioPump {
        calls: u32,
    }

    impl AudioCallback for AudioPump {
        fn audio(&mut self) {
            self.calls += 1;
        }
    }

    impl Engine for Hooked {
        fn step(&mut self, input: &LatchedInput) {
            self.log.push(format!("{}:{}", input.tick, input.port(Port::One)));
        }

        fn frame_time_callback(&mut self) -> Option<&mut dyn FrameTimeCallback> {
            Some(&mut self.frame_time)
        }

        fn audio_callback(&mut self) -> Option<&mut dyn AudioCallback> {
            Some(&mut self.audio)
        }
    }

    struct Bare {
        steps: u32,
    }

    impl Engine for Bare {
        fn step(&mut self, _input: &LatchedInput) {
            self.steps += 1;
        }
    }

    #[test]
    fn test_callbacks_run_after_step() {
        let mut engine = Hooked::default();
        let mut input = LatchedInput::neutral(0);
        input.ports[0] = InputState::NEUTRAL.with(Button::B);

        run_step(&mut engine, &input);
        run_step(&mut engine, &LatchedInput::neutral(1));

        assert_eq!(engine.log, vec!["0:0001", "1:0000"]);
        assert_eq!(engine.frame_time.calls, vec![Duration::from_micros(16_667); 2]);
        assert_eq!(engine.audio.calls, 2);
    }

    #[test]
    fn test_absent_callbacks_are_skipped() {
        let mut engine = Bare { steps: 0 };
        run_step(&mut engine, &LatchedInput::neutral(0));
        assert_eq!(engine.steps, 1);
    }

    #[test]
    fn test_boxed_engine_forwards_capabilities() {
        let mut engine: Box<dyn Engine> = Box::new(Hooked::default());
        run_step(&mut engine, &LatchedInput::neutral(0));
        assert!(engine.audio_callback().is_some());
        assert!(engine.frame_time_callback().is_some());
    }
}
