//! Rendering backend that presents nothing and replays scripted input.

use std::time::Duration;

use anyhow::Result;
use iso_dimension_rendering::{FrameInput, Presentation, RenderingBackend, Scene};

/// Backend stepping the scene at a fixed frame time.
#[derive(Clone, Debug)]
pub(crate) struct HeadlessBackend {
    frame: Duration,
    inputs: Vec<FrameInput>,
}

impl HeadlessBackend {
    /// Creates a backend that runs one frame per input snapshot.
    pub(crate) fn new(frame: Duration, inputs: Vec<FrameInput>) -> Self {
        Self { frame, inputs }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<()>,
    {
        let Presentation {
            window_title,
            scene,
            ..
        } = presentation;
        let mut scene = scene;
        log::info!(
            "{window_title}: replaying {} frames of {:?}",
            self.inputs.len(),
            self.frame
        );

        for input in self.inputs {
            update_scene(self.frame, input, &mut scene)?;
            log::trace!("frame drew {} entries", scene.draw_list().len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use iso_dimension_core::IsometricProjection;
    use iso_dimension_rendering::Color;
    use iso_dimension_world::decode_map;

    use super::*;

    #[test]
    fn every_input_is_replayed_in_order() {
        let level = decode_map(["SF"]).expect("map decodes");
        let scene = Scene::from_level(
            &level,
            &IsometricProjection::default(),
            Vec2::ZERO,
            "D42",
            Vec2::splat(100.0),
        )
        .expect("valid view");
        let presentation = Presentation::new("test", Color::new(0.0, 0.0, 0.0, 1.0), scene);
        let inputs = vec![
            FrameInput::default(),
            FrameInput {
                release: true,
                ..FrameInput::default()
            },
        ];

        let mut seen = Vec::new();
        HeadlessBackend::new(Duration::from_millis(10), inputs.clone())
            .run(presentation, |dt, input, _scene| {
                assert_eq!(dt, Duration::from_millis(10));
                seen.push(input);
                Ok(())
            })
            .expect("replay succeeds");

        assert_eq!(seen, inputs);
    }

    #[test]
    fn update_errors_stop_the_replay() {
        let level = decode_map(["SF"]).expect("map decodes");
        let scene = Scene::from_level(
            &level,
            &IsometricProjection::default(),
            Vec2::ZERO,
            "D42",
            Vec2::splat(100.0),
        )
        .expect("valid view");
        let presentation = Presentation::new("test", Color::new(0.0, 0.0, 0.0, 1.0), scene);

        let mut frames = 0;
        let result = HeadlessBackend::new(Duration::from_millis(10), vec![FrameInput::default(); 5])
            .run(presentation, |_, _, _| {
                frames += 1;
                anyhow::bail!("stop")
            });

        assert!(result.is_err());
        assert_eq!(frames, 1);
    }
}
