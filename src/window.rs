//! SDL2 display sink, event pump and frame pacing.
//!
//! SDL is only used to put finished frames on screen and to read the keyboard;
//! all rendering happens in [`FrameBuffer`]s.

use sdl2::event::Event;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::colors::DisplayTexel;
use crate::error::{Error, Result};
use crate::input::{Input, KeyCode, KeyEvent};
use crate::render::FrameBuffer;

/// What one [`Window::poll_events`] call observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
}

/// Sleeps out the remainder of each frame to hold a target rate.
pub struct FrameLimiter {
    frame_target_ms: u64,
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window, target_fps: u32) -> Self {
        Self {
            frame_target_ms: 1000 / u64::from(target_fps.max(1)),
            previous_frame_time: window.ticks(),
        }
    }

    /// Waits if necessary to maintain frame rate and returns the delta time in milliseconds.
    /// Delta time represents the time elapsed since the last call to this method.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.ticks();
        let mut delta_time = current_time.saturating_sub(self.previous_frame_time);

        if delta_time < self.frame_target_ms {
            let time_to_wait = self.frame_target_ms - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.ticks();
            delta_time = current_time.saturating_sub(self.previous_frame_time);
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // Declared before `_texture_creator` so it is dropped first.
    texture: sdl2::render::Texture<'static>,
    _texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    input: Input,
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let sdl_context = sdl2::init().map_err(Error::Window)?;
        let video_subsystem = sdl_context.video().map_err(Error::Window)?;
        let timer_subsystem = sdl_context.timer().map_err(Error::Window)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| Error::Window(e.to_string()))?;

        let canvas = window
            .into_canvas()
            .build()
            .map_err(|e| Error::Window(e.to_string()))?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump().map_err(Error::Window)?;

        // SAFETY: texture_creator is heap-allocated and lives as long as Window,
        // and `texture` is dropped before it (field order).
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| Error::Window(e.to_string()))?;

        log::info!("Opened {width}x{height} window \"{title}\"");

        Ok(Self {
            canvas,
            texture,
            _texture_creator: texture_creator,
            event_pump,
            timer_subsystem,
            input: Input::new(),
            pixels: vec![0; width as usize * height as usize * 4],
            width,
            height,
        })
    }

    /// Drains pending events into the keyboard snapshot.
    ///
    /// Returns [`WindowEvent::Quit`] on window close or Escape.
    pub fn poll_events(&mut self) -> WindowEvent {
        let mut quit = false;
        let mut key_events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => quit = true,
                Event::KeyDown {
                    scancode: Some(scancode),
                    ..
                } => key_events.push(KeyEvent::Down(KeyCode(scancode as i32))),
                Event::KeyUp {
                    scancode: Some(scancode),
                    ..
                } => key_events.push(KeyEvent::Up(KeyCode(scancode as i32))),
                _ => {}
            }
        }

        self.input.update(key_events);
        if quit || self.input.just_pressed(KeyCode::ESCAPE) {
            WindowEvent::Quit
        } else {
            WindowEvent::None
        }
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Shows a color target, flipping it so row 0 ends up at the bottom.
    ///
    /// Accepts float (`Vec4`) or byte (`[u8; 4]`) texels.
    pub fn present<T: DisplayTexel>(&mut self, frame: &FrameBuffer<T>) -> Result<()> {
        debug_assert_eq!(frame.width(), self.width as usize);
        debug_assert_eq!(frame.height(), self.height as usize);

        for (dst, &texel) in self
            .pixels
            .chunks_exact_mut(4)
            .zip(frame.rows_top_down().flatten())
        {
            dst.copy_from_slice(&texel.to_argb8888().to_ne_bytes());
        }

        self.texture
            .update(None, &self.pixels, (self.width * 4) as usize)
            .map_err(|e| Error::Window(e.to_string()))?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))
            .map_err(Error::Window)?;
        self.canvas.present();
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Milliseconds since SDL was initialised.
    pub fn ticks(&self) -> u64 {
        self.timer_subsystem.ticks64()
    }
}
