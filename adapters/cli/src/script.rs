//! Scripted input used to play levels without a keypad.
//!
//! A script is a comma separated list of `action:seconds` steps, for example
//! `upRight:1.5,release:0.5,pause:1,resume:0`. Direction steps press the
//! keypad, `release` lets go of it, `pause` and `resume` toggle the pause menu
//! and `wait` does nothing. Each step lasts the given number of seconds.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use iso_dimension_core::FacingDirection;
use iso_dimension_rendering::FrameInput;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Action {
    Steer(FacingDirection),
    Release,
    Pause,
    Resume,
    Wait,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Step {
    action: Action,
    duration: Duration,
}

/// Parses a comma separated script.
pub(crate) fn parse(script: &str) -> Result<Vec<Step>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(parse_step)
        .collect()
}

fn parse_step(step: &str) -> Result<Step> {
    let Some((name, seconds)) = step.split_once(':') else {
        bail!("script step `{step}` must be written as action:seconds");
    };
    let seconds: f64 = seconds
        .trim()
        .parse()
        .with_context(|| format!("script step `{step}` has an invalid duration"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("script step `{step}` has a negative duration");
    }

    let action = match name.trim() {
        "release" => Action::Release,
        "pause" => Action::Pause,
        "resume" => Action::Resume,
        "wait" => Action::Wait,
        other => match FacingDirection::from_name(other) {
            Some(direction) => Action::Steer(direction),
            None => bail!("unknown script action `{other}`"),
        },
    };

    Ok(Step {
        action,
        duration: Duration::from_secs_f64(seconds),
    })
}

/// Expands the script into per-frame input snapshots.
///
/// Every step contributes its input on its first frame and idles for the rest
/// of its duration. Steps always occupy at least one frame.
pub(crate) fn frame_inputs(steps: &[Step], frame: Duration) -> Vec<FrameInput> {
    let mut inputs = Vec::new();
    let mut paused = false;
    for step in steps {
        let first = match step.action {
            Action::Steer(direction) => FrameInput {
                steer: Some(direction),
                ..FrameInput::default()
            },
            Action::Release => FrameInput {
                release: true,
                ..FrameInput::default()
            },
            Action::Pause | Action::Resume => {
                let wants_pause = step.action == Action::Pause;
                let toggle = wants_pause != paused;
                paused = wants_pause;
                FrameInput {
                    pause_toggle: toggle,
                    ..FrameInput::default()
                }
            }
            Action::Wait => FrameInput::default(),
        };

        let frames = frames_for(step.duration, frame);
        inputs.push(first);
        inputs.extend(std::iter::repeat(FrameInput::default()).take(frames - 1));
    }
    inputs
}

fn frames_for(duration: Duration, frame: Duration) -> usize {
    if frame.is_zero() {
        return 1;
    }
    let frames = (duration.as_secs_f64() / frame.as_secs_f64()).ceil();
    usize::try_from(frames as u64).unwrap_or(usize::MAX).max(1)
}
