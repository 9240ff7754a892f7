/// Start/stop-able frame ticker.
///
/// The host calls [`RenderLoop::tick`] once per repaint; while running, the
/// tick paints and asks the host for the next frame, so the loop keeps itself
/// alive until [`RenderLoop::stop`].
#[derive(Debug, Default)]
pub struct RenderLoop {
    running: bool,
    frames: u64,
}

/// Whatever can schedule another repaint.
pub trait RepaintScheduler {
    fn schedule_next_frame(&self);
}

impl RepaintScheduler for egui::Context {
    fn schedule_next_frame(&self) {
        self.request_repaint();
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if !self.running {
            log::debug!("render loop started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("render loop stopped after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run `frame` and schedule the next tick. Returns whether the frame ran.
    pub fn tick(&mut self, scheduler: &impl RepaintScheduler, frame: impl FnOnce()) -> bool {
        if !self.running {
            return false;
        }
        frame();
        self.frames += 1;
        scheduler.schedule_next_frame();
        true
    }
}
