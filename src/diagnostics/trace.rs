use super::timing::TimingBreakdown;
use serde::{Deserialize, Serialize};

/// What happened on one pyramid level during a pyramidal flow call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTrace {
    pub level: usize,
    pub width: usize,
    pub height: usize,
    /// Points tracked on this level.
    pub active: usize,
    /// Points that ended the level with `Success`.
    pub succeeded: usize,
    /// Mean Newton iterations over the active points.
    pub mean_iterations: f32,
    pub elapsed_ms: f64,
}

/// Diagnostics of one flow call, coarsest level first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTrace {
    pub levels: Vec<LevelTrace>,
    /// Storage build timings followed by per-level tracking stages.
    pub timings: TimingBreakdown,
    /// True when the previous pyramid was taken over from the last call.
    pub reused_previous: bool,
}

impl FlowTrace {
    /// Points that survived every level down to full resolution.
    pub fn final_success_count(&self) -> usize {
        self.levels.last().map_or(0, |l| l.succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_serializes_camel_case() {
        let mut timings = TimingBreakdown {
            total_ms: 2.5,
            ..TimingBreakdown::default()
        };
        timings.push("level_0", 1.0);
        let trace = FlowTrace {
            levels: vec![LevelTrace {
                level: 0,
                width: 64,
                height: 48,
                active: 3,
                succeeded: 2,
                mean_iterations: 4.0,
                elapsed_ms: 1.0,
            }],
            timings,
            reused_previous: true,
        };
        let json = serde_json::to_value(&trace).expect("serializable");
        assert_eq!(json["reusedPrevious"], true);
        assert_eq!(json["levels"][0]["meanIterations"], 4.0);
        assert_eq!(json["timings"]["stages"][0]["elapsedMs"], 1.0);
        assert_eq!(trace.final_success_count(), 2);
        assert_eq!(trace.timings.stage_ms("level_0"), Some(1.0));
    }
}
