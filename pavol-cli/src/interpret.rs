use pavol::api::{Direction, ParsedNumber, SinkControl, FULL_SCALE_VOLUME};
use pavol::error::BridgeError;
use tracing::{debug, warn};

use crate::cli::Token;

/// What applying a single token did
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Usage text was asked for
    Help,
    Mute(bool),
    /// Only interpreter settings changed
    Setting,
    /// The volume was set to this value
    Volume(u32),
}

/// Walks the command line left to right, applying each argument to the sink as it is reached.
///
/// Volume changes are computed from the sink's locally tracked volume, which is not re-read
/// between tokens, so several relative changes compound on the predicted value.
#[derive(Debug, Clone)]
pub struct Interpreter {
    /// Once a number is a percentage, later numbers without a radix are too
    percentage: bool,
    max_volume: f64,
    want_percentage_output: bool,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter {
            percentage: false,
            max_volume: 2.0 * FULL_SCALE_VOLUME as f64,
            want_percentage_output: false,
        }
    }
}

impl Interpreter {
    pub fn max_volume(&self) -> f64 {
        self.max_volume
    }

    pub fn want_percentage_output(&self) -> bool {
        self.want_percentage_output
    }

    /// Applies every argument in order. `show_help` is called for each help token. A failed
    /// request is logged and the remaining arguments are still applied.
    pub fn run<S, A>(&mut self, args: &[A], sink: &mut S, mut show_help: impl FnMut())
    where
        S: SinkControl,
        A: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref();
            match self.apply(Token::classify(arg), sink) {
                Ok(Effect::Help) => show_help(),
                Ok(effect) => debug!(arg, ?effect, "applied"),
                Err(e) => warn!(arg, "{}", e),
            }
        }
    }

    pub fn apply<S: SinkControl>(
        &mut self,
        token: Token<'_>,
        sink: &mut S,
    ) -> Result<Effect, BridgeError> {
        let change = match token {
            Token::Help => return Ok(Effect::Help),
            Token::Mute => return Self::mute(sink, true),
            Token::Unmute => return Self::mute(sink, false),
            Token::ToggleMute => {
                let mute = !sink.muted();
                return Self::mute(sink, mute);
            }
            Token::Boost => {
                self.max_volume *= 2.0;
                return Ok(Effect::Setting);
            }
            Token::PercentOutput => {
                self.want_percentage_output = true;
                return Ok(Effect::Setting);
            }
            Token::StepUp => self.step(Direction::Increase),
            Token::StepDown => self.step(Direction::Decrease),
            Token::Number(s) => {
                let n = ParsedNumber::parse(s, self.percentage);
                self.percentage = n.is_percentage;
                n
            }
        };

        let target = change.target(sink.volume(), self.max_volume);
        sink.set_volume(target)?;
        Ok(Effect::Volume(target))
    }

    // a bare step also raises the ceiling, so repeated `+` can go past the default maximum
    fn step(&mut self, direction: Direction) -> ParsedNumber {
        self.max_volume *= 2.0;
        self.percentage = true;
        ParsedNumber::step(direction)
    }

    fn mute<S: SinkControl>(sink: &mut S, mute: bool) -> Result<Effect, BridgeError> {
        sink.set_mute(mute)?;
        Ok(Effect::Mute(mute))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use pavol::api::DEFAULT_RELATIVE_VOLUME;

    use super::*;

    /// In-memory sink that behaves like the real one: setters update local state first, then
    /// "send" the request, which may be configured to fail.
    #[derive(Debug, Default)]
    pub(crate) struct FakeSink {
        pub volume: u32,
        pub muted: bool,
        pub fail: bool,
        pub volume_requests: Vec<u32>,
        pub mute_requests: Vec<bool>,
    }

    impl FakeSink {
        pub fn at(volume: u32) -> FakeSink {
            FakeSink {
                volume,
                ..FakeSink::default()
            }
        }
    }

    impl SinkControl for FakeSink {
        fn volume(&self) -> u32 {
            self.volume
        }

        fn muted(&self) -> bool {
            self.muted
        }

        fn set_volume(&mut self, volume: u32) -> Result<(), BridgeError> {
            self.volume = volume;
            self.volume_requests.push(volume);
            match self.fail {
                true => Err(BridgeError::Rejected {
                    op: "set volume request",
                    reason: "No such entity".into(),
                }),
                false => Ok(()),
            }
        }

        fn set_mute(&mut self, mute: bool) -> Result<(), BridgeError> {
            self.muted = mute;
            self.mute_requests.push(mute);
            match self.fail {
                true => Err(BridgeError::NoDefaultSink),
                false => Ok(()),
            }
        }
    }

    const FULL: f64 = FULL_SCALE_VOLUME as f64;

    fn run(args: &[&str], sink: &mut FakeSink) -> (Interpreter, usize) {
        let mut interpreter = Interpreter::default();
        let mut helps = 0;
        interpreter.run(args, sink, || helps += 1);
        (interpreter, helps)
    }

    #[test]
    fn mute_then_unmute_restores_state() {
        let mut sink = FakeSink::default();
        run(&["m", "u"], &mut sink);
        assert!(!sink.muted);
        assert_eq!(sink.mute_requests, [true, false]);
    }

    #[test]
    fn toggle_twice_restores_state() {
        for initial in [false, true] {
            let mut sink = FakeSink {
                muted: initial,
                ..FakeSink::default()
            };
            run(&["t", "toggle"], &mut sink);
            assert_eq!(sink.muted, initial);
            assert_eq!(sink.mute_requests, [!initial, initial]);
        }
    }

    #[test]
    fn help_changes_nothing() {
        let mut sink = FakeSink::at(1000);
        let (interpreter, helps) = run(&["h", "-h", "--help"], &mut sink);
        assert_eq!(helps, 3);
        assert!(sink.volume_requests.is_empty());
        assert!(sink.mute_requests.is_empty());
        assert_eq!(interpreter.max_volume(), 2.0 * FULL);
    }

    #[test]
    fn absolute_percentage() {
        let mut sink = FakeSink::at(1000);
        run(&["50."], &mut sink);
        assert_eq!(sink.volume_requests, [FULL_SCALE_VOLUME / 2]);
    }

    #[test]
    fn absolute_raw_value() {
        let mut sink = FakeSink::at(1000);
        run(&["20000"], &mut sink);
        assert_eq!(sink.volume_requests, [20000]);
    }

    #[test]
    fn decrease_is_clamped_at_zero() {
        let mut sink = FakeSink::at(0);
        run(&["-50."], &mut sink);
        assert_eq!(sink.volume_requests, [0]);
    }

    #[test]
    fn default_ceiling_is_twice_full_scale() {
        let mut sink = FakeSink::at(0);
        let (interpreter, _) = run(&["400."], &mut sink);
        assert_eq!(interpreter.max_volume(), 2.0 * FULL);
        assert_eq!(sink.volume, 2 * FULL_SCALE_VOLUME);
    }

    #[test]
    fn boost_and_step_raise_the_ceiling() {
        let mut sink = FakeSink::at(0);
        let (interpreter, _) = run(&["f", "+", "400."], &mut sink);
        assert_eq!(interpreter.max_volume(), 8.0 * FULL);
        // 400% is under the raised ceiling, so it is not clamped
        assert_eq!(sink.volume, 4 * FULL_SCALE_VOLUME);

        let mut sink = FakeSink::at(0);
        let (interpreter, _) = run(&["f", "+", "+", "1000."], &mut sink);
        assert_eq!(interpreter.max_volume(), 16.0 * FULL);
        assert_eq!(sink.volume, 10 * FULL_SCALE_VOLUME);
    }

    #[test]
    fn steps_compound_on_the_local_volume() {
        let v0 = 10_000;
        let step = DEFAULT_RELATIVE_VOLUME / 100.0 * FULL;

        let mut sink = FakeSink::at(v0);
        run(&["+", "+"], &mut sink);

        let first = (v0 as f64 + step) as u32;
        let second = (first as f64 + step) as u32;
        assert_eq!(sink.volume_requests, [first, second]);
        // each step truncates, so the result is at most one unit under the exact sum
        let exact = v0 as f64 + 2.0 * step;
        assert!(exact - (sink.volume as f64) < 1.0);
    }

    #[test]
    fn steps_down() {
        let mut sink = FakeSink::at(FULL_SCALE_VOLUME);
        run(&["-"], &mut sink);
        let expected = (FULL - DEFAULT_RELATIVE_VOLUME / 100.0 * FULL) as u32;
        assert_eq!(sink.volume_requests, [expected]);
    }

    #[test]
    fn percentage_carries_over_to_later_numbers() {
        let mut sink = FakeSink::at(0);
        run(&["50.", "10"], &mut sink);
        assert_eq!(
            sink.volume_requests,
            [FULL_SCALE_VOLUME / 2, (0.1 * FULL) as u32]
        );
    }

    #[test]
    fn step_makes_later_numbers_percentages() {
        let mut sink = FakeSink::at(0);
        run(&["+", "25"], &mut sink);
        assert_eq!(sink.volume, FULL_SCALE_VOLUME / 4);
    }

    #[test]
    fn unknown_words_set_the_volume_to_zero() {
        let mut sink = FakeSink::at(30_000);
        run(&["xyz"], &mut sink);
        assert_eq!(sink.volume_requests, [0]);
    }

    #[test]
    fn percent_output_is_a_setting() {
        let mut sink = FakeSink::at(123);
        let (interpreter, _) = run(&["p"], &mut sink);
        assert!(interpreter.want_percentage_output());
        assert!(sink.volume_requests.is_empty());
        assert_eq!(sink.volume, 123);
    }

    #[test]
    fn failures_do_not_stop_later_arguments() {
        let mut sink = FakeSink {
            fail: true,
            ..FakeSink::at(0)
        };
        run(&["m", "1000", "+1000"], &mut sink);
        assert!(sink.muted);
        assert_eq!(sink.volume_requests, [1000, 2000]);
    }

    #[test]
    fn apply_reports_effects() {
        let mut sink = FakeSink::at(0);
        let mut interpreter = Interpreter::default();
        assert_eq!(
            interpreter.apply(Token::Mute, &mut sink).unwrap(),
            Effect::Mute(true)
        );
        assert_eq!(
            interpreter.apply(Token::Boost, &mut sink).unwrap(),
            Effect::Setting
        );
        assert_eq!(
            interpreter.apply(Token::Number("777"), &mut sink).unwrap(),
            Effect::Volume(777)
        );
        assert!(matches!(
            interpreter.apply(Token::Mute, &mut FakeSink { fail: true, ..FakeSink::default() }),
            Err(BridgeError::NoDefaultSink)
        ));
    }
}
