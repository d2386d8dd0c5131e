//! Parameter automation with Web Audio `AudioParam` curve semantics.
//!
//! Recipes describe gains, pitches and cutoffs as a handful of timed events
//! (`setValueAtTime`, linear/exponential ramps, `setTargetAtTime`). The
//! timeline is evaluated per sample while rendering.

/// One scheduled change on a timeline. Times are seconds from the trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEvent {
    SetValue { value: f64, time: f64 },
    LinearRamp { value: f64, end: f64 },
    ExponentialRamp { value: f64, end: f64 },
    SetTarget { target: f64, start: f64, tau: f64 },
}

impl ParamEvent {
    fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValue { time, .. } => time,
            ParamEvent::LinearRamp { end, .. } | ParamEvent::ExponentialRamp { end, .. } => end,
            ParamEvent::SetTarget { start, .. } => start,
        }
    }
}

/// An automatable parameter: a default value plus ordered events.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTimeline {
    default: f64,
    events: Vec<ParamEvent>,
}

/// An exponential approach that is still running when evaluation passes it.
#[derive(Debug, Clone, Copy)]
struct Approach {
    target: f64,
    start: f64,
    tau: f64,
    from: f64,
}

impl Approach {
    fn at(&self, t: f64) -> f64 {
        if self.tau <= 0.0 {
            return self.target;
        }
        self.target + (self.from - self.target) * (-(t - self.start) / self.tau).exp()
    }
}

impl ParamTimeline {
    pub fn new(default: f64) -> Self {
        ParamTimeline {
            default,
            events: Vec::new(),
        }
    }

    /// A timeline that never changes.
    pub fn constant(value: f64) -> Self {
        Self::new(value)
    }

    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    fn push(&mut self, event: ParamEvent) {
        // Keep insertion order among equal times, as AudioParam does.
        let at = self
            .events
            .iter()
            .position(|e| e.time() > event.time())
            .unwrap_or(self.events.len());
        self.events.insert(at, event);
    }

    pub fn set_value_at_time(mut self, value: f64, time: f64) -> Self {
        self.push(ParamEvent::SetValue { value, time });
        self
    }

    pub fn linear_ramp_to(mut self, value: f64, end: f64) -> Self {
        self.push(ParamEvent::LinearRamp { value, end });
        self
    }

    pub fn exponential_ramp_to(mut self, value: f64, end: f64) -> Self {
        self.push(ParamEvent::ExponentialRamp { value, end });
        self
    }

    pub fn set_target_at_time(mut self, target: f64, start: f64, tau: f64) -> Self {
        self.push(ParamEvent::SetTarget { target, start, tau });
        self
    }

    /// Value of the parameter at `t` seconds.
    pub fn value_at(&self, t: f64) -> f64 {
        let mut value = self.default;
        let mut since = 0.0;
        let mut approach: Option<Approach> = None;

        for event in &self.events {
            match *event {
                ParamEvent::SetValue { value: v, time } => {
                    if t < time {
                        break;
                    }
                    value = v;
                    since = time;
                    approach = None;
                }
                ParamEvent::SetTarget { target, start, tau } => {
                    if t < start {
                        break;
                    }
                    if let Some(a) = approach.take() {
                        value = a.at(start);
                    }
                    since = start;
                    approach = Some(Approach {
                        target,
                        start,
                        tau,
                        from: value,
                    });
                }
                ParamEvent::LinearRamp { value: v, end } => {
                    if let Some(a) = approach.take() {
                        value = a.at(since);
                    }
                    if t < end {
                        return lerp(value, v, progress(since, end, t));
                    }
                    value = v;
                    since = end;
                }
                ParamEvent::ExponentialRamp { value: v, end } => {
                    if let Some(a) = approach.take() {
                        value = a.at(since);
                    }
                    if t < end {
                        return exp_interp(value, v, progress(since, end, t));
                    }
                    value = v;
                    since = end;
                }
            }
        }

        match approach {
            Some(a) => a.at(t),
            None => value,
        }
    }

    /// Time of the last scheduled event, or 0 for a constant.
    pub fn last_event_time(&self) -> f64 {
        self.events.last().map_or(0.0, ParamEvent::time)
    }
}

fn progress(from: f64, to: f64, t: f64) -> f64 {
    if to <= from {
        1.0
    } else {
        ((t - from) / (to - from)).clamp(0.0, 1.0)
    }
}

fn lerp(a: f64, b: f64, x: f64) -> f64 {
    a + (b - a) * x
}

/// Exponential interpolation; undefined across zero or a sign change, where
/// the start value is held until the ramp ends.
fn exp_interp(a: f64, b: f64, x: f64) -> f64 {
    if a == 0.0 || b == 0.0 || a.signum() != b.signum() {
        return a;
    }
    a * (b / a).powf(x)
}
